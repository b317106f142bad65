use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use crate::application::usecases::{HandleReportUseCase, ReportOutcome};
use crate::domain::RaidReport;

#[derive(Clone)]
pub struct ApiState {
    pub handle_report: Arc<HandleReportUseCase>,
}

pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/raid", post(post_raid))
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn post_raid(
    State(state): State<ApiState>,
    Json(report): Json<RaidReport>,
) -> impl IntoResponse {
    let outcome = state.handle_report.execute(&report).await;
    response_for(outcome)
}

pub fn response_for(outcome: ReportOutcome) -> (StatusCode, &'static str) {
    match outcome {
        ReportOutcome::Accepted => (StatusCode::OK, "Raid message processed"),
        ReportOutcome::UnknownRaidType => (StatusCode::BAD_REQUEST, "Unknown raid type"),
        ReportOutcome::Unauthorized => (StatusCode::FORBIDDEN, "Reporter is not a guild member"),
        ReportOutcome::RateLimited => (StatusCode::TOO_MANY_REQUESTS, "Raid already reported"),
        ReportOutcome::DeliveryFailed => {
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to deliver raid message")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcomes_map_to_status_codes() {
        assert_eq!(response_for(ReportOutcome::Accepted), (StatusCode::OK, "Raid message processed"));
        assert_eq!(response_for(ReportOutcome::UnknownRaidType).0, StatusCode::BAD_REQUEST);
        assert_eq!(response_for(ReportOutcome::Unauthorized).0, StatusCode::FORBIDDEN);
        assert_eq!(response_for(ReportOutcome::RateLimited).0, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            response_for(ReportOutcome::DeliveryFailed).0,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
