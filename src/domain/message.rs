use serde::Serialize;

use super::{PARTY_SIZE, RaidReport, RaidType};

pub const EMPTY_SLOT: &str = "N/A";

/// What gets announced for an accepted raid report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RaidMessage {
    pub raid: RaidType,
    pub title: String,
    pub guild: String,
    pub players: [String; PARTY_SIZE],
    pub reporter_uuid: String,
    pub gxp_gained: Option<String>,
    pub sr_gained: Option<i64>,
    pub thumbnail_url: String,
}

impl RaidMessage {
    /// Empty slots are filled with `N/A`; anything past the fourth player is dropped.
    pub fn from_report(raid: RaidType, report: &RaidReport, guild: &str) -> Self {
        let players = std::array::from_fn(|i| {
            report
                .players
                .get(i)
                .cloned()
                .unwrap_or_else(|| EMPTY_SLOT.to_string())
        });

        Self {
            raid,
            title: format!("{} completed!", raid.name()),
            guild: guild.to_string(),
            players,
            reporter_uuid: report.reporter_uuid.clone(),
            gxp_gained: report.gxp_gained.clone(),
            sr_gained: report.sr_gained,
            thumbnail_url: raid.icon_url().to_string(),
        }
    }
}
