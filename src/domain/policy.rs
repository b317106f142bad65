use std::collections::BTreeSet;
use std::time::Duration;

use serde::Deserialize;

use super::{RaidReport, RaidType};

#[derive(Clone, Debug)]
pub struct CooldownPolicy {
    pub window: Duration,
    pub scope: CooldownScope,
}

impl CooldownPolicy {
    pub fn key_for(&self, raid: RaidType, report: &RaidReport) -> CooldownKey {
        match self.scope {
            CooldownScope::RaidType => CooldownKey {
                raid,
                players: BTreeSet::new(),
            },
            CooldownScope::RaidTypeAndPlayers => CooldownKey {
                raid,
                players: report.players.iter().cloned().collect(),
            },
        }
    }
}

impl Default for CooldownPolicy {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(10),
            scope: CooldownScope::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CooldownScope {
    RaidType, // one report per raid type
    #[default]
    RaidTypeAndPlayers, // same raid + same party, any player order
}

/// Identity two reports must share to be treated as duplicates.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CooldownKey {
    pub raid: RaidType,
    pub players: BTreeSet<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(players: &[&str]) -> RaidReport {
        RaidReport {
            raid_type: RaidType::TheCanyonColossus.name().to_string(),
            players: players.iter().map(|p| p.to_string()).collect(),
            reporter_uuid: "u".to_string(),
            gxp_gained: None,
            sr_gained: None,
        }
    }

    #[test]
    fn party_key_ignores_player_order() {
        let policy = CooldownPolicy::default();
        let a = policy.key_for(RaidType::TheCanyonColossus, &report(&["A", "B", "C"]));
        let b = policy.key_for(RaidType::TheCanyonColossus, &report(&["C", "A", "B"]));
        assert_eq!(a, b);
    }

    #[test]
    fn party_key_separates_different_parties() {
        let policy = CooldownPolicy::default();
        let a = policy.key_for(RaidType::TheCanyonColossus, &report(&["A", "B"]));
        let b = policy.key_for(RaidType::TheCanyonColossus, &report(&["A", "D"]));
        assert_ne!(a, b);
    }

    #[test]
    fn raid_scope_collapses_parties() {
        let policy = CooldownPolicy {
            scope: CooldownScope::RaidType,
            ..CooldownPolicy::default()
        };
        let a = policy.key_for(RaidType::TheNamelessAnomaly, &report(&["A"]));
        let b = policy.key_for(RaidType::TheNamelessAnomaly, &report(&["Z", "Y"]));
        let c = policy.key_for(RaidType::TheCanyonColossus, &report(&["A"]));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
