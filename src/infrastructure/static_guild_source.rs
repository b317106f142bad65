use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::application::{AppError, AppResult, GuildSource};

/// In-process guild source whose member list can be swapped or made to fail.
#[derive(Default)]
pub struct StaticGuildSource {
    members: Mutex<HashSet<String>>,
    failing: AtomicBool,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl StaticGuildSource {
    pub fn new<I, S>(members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            members: Mutex::new(members.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    /// Every fetch sleeps for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn set_members<I, S>(&self, members: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut guard = self.members.lock().unwrap_or_else(|p| p.into_inner());
        *guard = members.into_iter().map(Into::into).collect();
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GuildSource for StaticGuildSource {
    async fn fetch_guild_members(&self, guild: &str) -> AppResult<HashSet<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::Upstream(format!("guild {guild} unavailable")));
        }
        let guard = self
            .members
            .lock()
            .map_err(|_| AppError::Upstream("lock poisoned".into()))?;
        Ok(guard.clone())
    }
}
