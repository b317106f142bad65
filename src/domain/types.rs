use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static WEBHOOK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https://([a-z0-9-]+\.)?discord\.com/api/webhooks/\d+/[A-Za-z0-9._-]+$")
        .expect("webhook pattern is valid")
});

/// A Discord webhook endpoint, checked against the `discord.com/api/webhooks/<id>/<token>` shape.
///
/// Only constructed through [`WebhookUrl::parse`].
#[derive(Clone, PartialEq, Eq)]
pub struct WebhookUrl(String);

impl WebhookUrl {
    pub fn parse(s: &str) -> Result<Self, WebhookUrlError> {
        let s = s.trim();
        if !WEBHOOK_PATTERN.is_match(s) {
            return Err(WebhookUrlError::InvalidFormat);
        }
        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// the token is a secret; keep it out of logs
impl fmt::Debug for WebhookUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redacted = self
            .0
            .rsplit_once('/')
            .map(|(head, _)| format!("{head}/***"))
            .unwrap_or_else(|| "***".to_string());
        f.debug_tuple("WebhookUrl").field(&redacted).finish()
    }
}

#[derive(Clone, Debug, thiserror::Error)]
pub enum WebhookUrlError {
    #[error(
        "invalid webhook url (expected https://[subdomain.]discord.com/api/webhooks/<id>/<token>)"
    )]
    InvalidFormat,
}
