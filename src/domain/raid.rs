use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of player slots a raid party has.
pub const PARTY_SIZE: usize = 4;

/// A raid completion as reported by the in-game client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaidReport {
    pub raid_type: String,
    #[serde(default)]
    pub players: Vec<String>,
    pub reporter_uuid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gxp_gained: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sr_gained: Option<i64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RaidType {
    NestOfTheGrootslangs,
    OrphionsNexusOfLight,
    TheCanyonColossus,
    TheNamelessAnomaly,
}

impl RaidType {
    pub const ALL: [RaidType; 4] = [
        RaidType::NestOfTheGrootslangs,
        RaidType::OrphionsNexusOfLight,
        RaidType::TheCanyonColossus,
        RaidType::TheNamelessAnomaly,
    ];

    /// Resolve the name the client sends. Names must match exactly.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            RaidType::NestOfTheGrootslangs => "Nest of the Grootslangs",
            RaidType::OrphionsNexusOfLight => "Orphion's Nexus of Light",
            RaidType::TheCanyonColossus => "The Canyon Colossus",
            RaidType::TheNamelessAnomaly => "The Nameless Anomaly",
        }
    }

    /// Thumbnail shown in the notification embed.
    pub fn icon_url(&self) -> &'static str {
        match self {
            RaidType::NestOfTheGrootslangs => {
                "https://cdn.wynncraft.com/nextgen/raids/nest_of_the_grootslangs.png"
            }
            RaidType::OrphionsNexusOfLight => {
                "https://cdn.wynncraft.com/nextgen/raids/orphions_nexus_of_light.png"
            }
            RaidType::TheCanyonColossus => {
                "https://cdn.wynncraft.com/nextgen/raids/the_canyon_colossus.png"
            }
            RaidType::TheNamelessAnomaly => {
                "https://cdn.wynncraft.com/nextgen/raids/the_nameless_anomaly.png"
            }
        }
    }
}

impl fmt::Display for RaidType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_every_known_raid_by_name() {
        for raid in RaidType::ALL {
            assert_eq!(RaidType::from_name(raid.name()), Some(raid));
        }
        assert_eq!(RaidType::from_name("Unknown Raid"), None);
        assert_eq!(RaidType::from_name("the canyon colossus"), None);
    }

    #[test]
    fn report_uses_camel_case_fields() {
        let raw = r#"{
            "raidType": "The Canyon Colossus",
            "players": ["A", "B"],
            "reporterUuid": "uuid-1",
            "gxpGained": "1.2B",
            "srGained": 540
        }"#;
        let report: RaidReport = serde_json::from_str(raw).unwrap();
        assert_eq!(report.raid_type, "The Canyon Colossus");
        assert_eq!(report.players, vec!["A", "B"]);
        assert_eq!(report.reporter_uuid, "uuid-1");
        assert_eq!(report.gxp_gained.as_deref(), Some("1.2B"));
        assert_eq!(report.sr_gained, Some(540));
    }

    #[test]
    fn optional_fields_may_be_absent() {
        let raw = r#"{"raidType": "The Nameless Anomaly", "reporterUuid": "u"}"#;
        let report: RaidReport = serde_json::from_str(raw).unwrap();
        assert!(report.players.is_empty());
        assert!(report.gxp_gained.is_none());
        assert!(report.sr_gained.is_none());
    }
}
