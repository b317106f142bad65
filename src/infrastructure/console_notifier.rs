use async_trait::async_trait;

use crate::application::{AppResult, Notifier};
use crate::domain::RaidMessage;

pub struct ConsoleNotifier;

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn notify(&self, message: &RaidMessage) -> AppResult<()> {
        println!(
            "NOTIFY: raid={} guild={} players=[{}] reporter={} gxp={} sr={}",
            message.raid,
            message.guild,
            message.players.join(", "),
            message.reporter_uuid,
            message.gxp_gained.as_deref().unwrap_or("(none)"),
            message
                .sr_gained
                .map(|sr| sr.to_string())
                .unwrap_or_else(|| "(none)".into())
        );
        Ok(())
    }
}
