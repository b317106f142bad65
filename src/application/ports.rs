use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::RaidMessage;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("upstream lookup error: {0}")]
    Upstream(String),
    #[error("notifier error: {0}")]
    Notifier(String),
    #[error("cache error: {0}")]
    Cache(String),
    #[error("invalid config: {0}")]
    Config(String),
}

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub name: String,
    pub guild: Option<String>,
}

/// Authoritative member list of a guild.
#[async_trait]
pub trait GuildSource: Send + Sync {
    async fn fetch_guild_members(&self, guild: &str) -> AppResult<HashSet<String>>;
}

/// Single player profile lookup.
#[async_trait]
pub trait PlayerLookup: Send + Sync {
    async fn fetch_player_info(&self, uuid: &str) -> AppResult<PlayerInfo>;
}

/// Answers whether a reporter belongs to the configured guild.
#[async_trait]
pub trait MembershipCheck: Send + Sync {
    async fn is_member(&self, uuid: &str) -> AppResult<bool>;
}

/// Deliver notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, message: &RaidMessage) -> AppResult<()>;
}

/// Wall-clock milliseconds since the unix epoch.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

/// `d` in milliseconds, saturating at `i64::MAX` instead of wrapping.
pub fn duration_millis(d: Duration) -> i64 {
    i64::try_from(d.as_millis()).unwrap_or(i64::MAX)
}
