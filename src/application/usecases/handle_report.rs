use std::sync::Arc;

use crate::application::{CooldownTracker, MembershipCheck, Notifier};
use crate::domain::{CooldownPolicy, RaidMessage, RaidReport, RaidType};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportOutcome {
    Accepted,
    UnknownRaidType,
    Unauthorized,
    RateLimited,
    DeliveryFailed,
}

/// Validates a report and forwards it.
///
/// Checks run in a fixed order and stop at the first failure:
/// raid type, then membership, then cooldown, then delivery.
pub struct HandleReportUseCase {
    pub guild: String,
    pub membership: Arc<dyn MembershipCheck>,
    pub cooldown: Arc<CooldownTracker>,
    pub policy: CooldownPolicy,
    pub notifier: Arc<dyn Notifier>,
}

impl HandleReportUseCase {
    pub async fn execute(&self, report: &RaidReport) -> ReportOutcome {
        let Some(raid) = RaidType::from_name(&report.raid_type) else {
            tracing::warn!(raid_type = %report.raid_type, "unknown raid type");
            return ReportOutcome::UnknownRaidType;
        };

        // a failed lookup counts as not a member
        let member = match self.membership.is_member(&report.reporter_uuid).await {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!(reporter = %report.reporter_uuid, "membership check failed: {e}");
                false
            }
        };
        if !member {
            tracing::warn!(reporter = %report.reporter_uuid, guild = %self.guild, "reporter is not a guild member");
            return ReportOutcome::Unauthorized;
        }

        let key = self.policy.key_for(raid, report);
        if !self.cooldown.should_process(&key) {
            tracing::info!(raid = %raid, players = ?report.players, "duplicate report inside cooldown window");
            return ReportOutcome::RateLimited;
        }

        let message = RaidMessage::from_report(raid, report, &self.guild);
        if let Err(e) = self.notifier.notify(&message).await {
            tracing::error!(raid = %raid, "failed to deliver raid message: {e}");
            return ReportOutcome::DeliveryFailed;
        }

        tracing::info!(raid = %raid, reporter = %report.reporter_uuid, "raid message processed");
        ReportOutcome::Accepted
    }
}
