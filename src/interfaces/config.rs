use std::time::Duration;

use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use crate::domain::{CooldownPolicy, CooldownScope, WebhookUrl, WebhookUrlError};
use crate::infrastructure::wynncraft_provider::DEFAULT_API_BASE;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(&'static str),
    #[error("DISCORD_WEBHOOK_URL: {0}")]
    InvalidWebhook(#[from] WebhookUrlError),
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        source: serde_yaml::Error,
    },
}

/// Tunables, optionally read from a YAML file. Every field has a default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub port: u16,
    pub cooldown_seconds: u64,
    pub cooldown_scope: CooldownScope,
    pub guild_cache_ttl_seconds: u64,
    pub guild_refresh_backoff_seconds: u64,
    pub upstream_timeout_seconds: u64,
    pub membership_mode: MembershipMode,
    pub api_base: String,
    pub purge_interval_seconds: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipMode {
    #[default]
    Cache,
    Profile,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            cooldown_seconds: 10,
            cooldown_scope: CooldownScope::default(),
            guild_cache_ttl_seconds: 600,
            guild_refresh_backoff_seconds: 5,
            upstream_timeout_seconds: 10,
            membership_mode: MembershipMode::default(),
            api_base: DEFAULT_API_BASE.to_string(),
            purge_interval_seconds: 300,
        }
    }
}

impl Config {
    pub fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        Self::from_yaml(&expand_env(&raw)).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })
    }

    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        // an empty file means "all defaults"
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }

    pub fn cooldown_policy(&self) -> CooldownPolicy {
        CooldownPolicy {
            window: Duration::from_secs(self.cooldown_seconds),
            scope: self.cooldown_scope,
        }
    }

    pub fn guild_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.guild_cache_ttl_seconds)
    }

    pub fn guild_refresh_backoff(&self) -> Duration {
        Duration::from_secs(self.guild_refresh_backoff_seconds)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_seconds)
    }
}

/// Values that must come from the environment.
#[derive(Debug, Clone)]
pub struct Env {
    pub webhook: WebhookUrl,
    pub guild: String,
}

impl Env {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let webhook = lookup("DISCORD_WEBHOOK_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::MissingEnvVar("DISCORD_WEBHOOK_URL"))?;
        let webhook = WebhookUrl::parse(&webhook)?;

        let guild = lookup("GUILD")
            .map(|g| g.trim().to_string())
            .filter(|g| !g.is_empty())
            .ok_or(ConfigError::MissingEnvVar("GUILD"))?;

        Ok(Self { webhook, guild })
    }
}

pub const DEFAULT_LOG_FILTER: &str = "raidrelay=info";

/// `RUST_LOG` when set and parseable, otherwise `raidrelay=info`.
pub fn log_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .filter(|v| !v.trim().is_empty())
        .and_then(|v| EnvFilter::try_new(v).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// very small ${VAR} expansion to keep config simple
fn expand_env(s: &str) -> String {
    let mut out = s.to_string();
    for (k, v) in std::env::vars() {
        out = out.replace(&format!("${{{}}}", k), &v);
    }
    out
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn env_requires_both_variables() {
        let err = Env::from_lookup(lookup(&[("GUILD", "Example")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar("DISCORD_WEBHOOK_URL")));

        let err = Env::from_lookup(lookup(&[(
            "DISCORD_WEBHOOK_URL",
            "https://discord.com/api/webhooks/1/tok",
        )]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar("GUILD")));

        let err = Env::from_lookup(lookup(&[
            ("DISCORD_WEBHOOK_URL", "https://discord.com/api/webhooks/1/tok"),
            ("GUILD", "   "),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar("GUILD")));
    }

    #[test]
    fn env_rejects_malformed_webhook() {
        let err = Env::from_lookup(lookup(&[
            ("DISCORD_WEBHOOK_URL", "https://example.com/hook"),
            ("GUILD", "Example"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidWebhook(_)));
    }

    #[test]
    fn env_accepts_valid_values() {
        let env = Env::from_lookup(lookup(&[
            ("DISCORD_WEBHOOK_URL", "https://discord.com/api/webhooks/1/tok"),
            ("GUILD", " Example Guild "),
        ]))
        .unwrap();
        assert_eq!(env.guild, "Example Guild");
        assert_eq!(env.webhook.as_str(), "https://discord.com/api/webhooks/1/tok");
    }

    #[test]
    fn yaml_fills_missing_fields_with_defaults() {
        let cfg = Config::from_yaml("cooldown_seconds: 60\ncooldown_scope: raid_type\n").unwrap();
        assert_eq!(cfg.cooldown_seconds, 60);
        assert_eq!(cfg.cooldown_scope, CooldownScope::RaidType);
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.guild_cache_ttl_seconds, 600);
        assert_eq!(cfg.membership_mode, MembershipMode::Cache);

        let empty = Config::from_yaml("").unwrap();
        assert_eq!(empty.cooldown_seconds, 10);
        assert_eq!(empty.api_base, DEFAULT_API_BASE);
    }

    #[test]
    fn rust_log_overrides_default_filter() {
        let filter = log_filter(Some("raidrelay=debug")).to_string();
        assert!(filter.contains("raidrelay=debug"), "{filter}");
        assert!(!filter.contains("raidrelay=info"), "{filter}");
    }

    #[test]
    fn default_filter_applies_without_rust_log() {
        assert_eq!(log_filter(None).to_string(), DEFAULT_LOG_FILTER);
        assert_eq!(log_filter(Some("  ")).to_string(), DEFAULT_LOG_FILTER);
    }

    #[test]
    fn huge_durations_do_not_wrap_the_cooldown() {
        use std::sync::Arc;

        use crate::application::CooldownTracker;
        use crate::domain::{CooldownKey, RaidType};
        use crate::infrastructure::clock::ManualClock;

        let cfg = Config::from_yaml("cooldown_seconds: 18446744073709551\n").unwrap();
        let tracker = CooldownTracker::new(
            cfg.cooldown_policy().window,
            Arc::new(ManualClock::new(1_700_000_000_000)),
        );
        let key = CooldownKey {
            raid: RaidType::TheCanyonColossus,
            players: Default::default(),
        };
        assert!(tracker.should_process(&key));
        assert!(!tracker.should_process(&key));
    }

    #[test]
    fn yaml_rejects_unknown_modes() {
        assert!(Config::from_yaml("membership_mode: magic\n").is_err());
    }
}
