use std::collections::HashSet;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::application::{
    AppError, AppResult, Clock, GuildSource, MembershipCheck, PlayerLookup, duration_millis,
};

const NO_FAILURE: i64 = i64::MIN;

#[derive(Debug, Default)]
struct Snapshot {
    members: HashSet<String>,
    refreshed_at: Option<i64>,
}

/// Member uuids of one guild, refetched once the snapshot is older than the TTL.
///
/// A refresh replaces the whole set at once. If it fails the previous snapshot
/// stays in place and remains stale. The next caller tries again once the
/// retry backoff has passed; until then stale lookups answer from the old set.
pub struct GuildMembershipCache {
    guild: String,
    source: Arc<dyn GuildSource>,
    clock: Arc<dyn Clock>,
    ttl_millis: i64,
    fetch_timeout: Duration,
    retry_backoff_millis: i64,
    last_failure: AtomicI64,
    snapshot: RwLock<Arc<Snapshot>>,
    refresh_lock: Mutex<()>,
}

impl GuildMembershipCache {
    pub fn new(
        guild: impl Into<String>,
        source: Arc<dyn GuildSource>,
        clock: Arc<dyn Clock>,
        ttl: Duration,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            guild: guild.into(),
            source,
            clock,
            ttl_millis: duration_millis(ttl),
            fetch_timeout,
            retry_backoff_millis: 0,
            last_failure: AtomicI64::new(NO_FAILURE),
            snapshot: RwLock::new(Arc::new(Snapshot::default())),
            refresh_lock: Mutex::new(()),
        }
    }

    /// After a failed refresh, skip refetching for `backoff`.
    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff_millis = duration_millis(backoff);
        self
    }

    pub fn guild(&self) -> &str {
        &self.guild
    }

    pub fn member_count(&self) -> AppResult<usize> {
        Ok(self.current()?.members.len())
    }

    pub fn last_refreshed(&self) -> AppResult<Option<i64>> {
        Ok(self.current()?.refreshed_at)
    }

    /// Fetch the member list now, regardless of age.
    pub async fn refresh(&self) -> AppResult<()> {
        let _guard = self.refresh_lock.lock().await;
        self.fetch_and_swap().await
    }

    fn current(&self) -> AppResult<Arc<Snapshot>> {
        let snapshot = self
            .snapshot
            .read()
            .map_err(|_| AppError::Cache("lock poisoned".into()))?;
        Ok(Arc::clone(&snapshot))
    }

    fn is_stale(&self, snapshot: &Snapshot) -> bool {
        match snapshot.refreshed_at {
            Some(at) => self.clock.now_millis() - at > self.ttl_millis,
            None => true,
        }
    }

    fn in_backoff(&self) -> bool {
        let failed_at = self.last_failure.load(Ordering::SeqCst);
        failed_at != NO_FAILURE
            && self.clock.now_millis().saturating_sub(failed_at) < self.retry_backoff_millis
    }

    /// Single flight: callers queue on the refresh lock and whoever gets it
    /// first does the fetch; the rest find a fresh snapshot and skip theirs.
    async fn refresh_if_stale(&self) -> AppResult<Arc<Snapshot>> {
        let _guard = self.refresh_lock.lock().await;
        let snapshot = self.current()?;
        if !self.is_stale(&snapshot) {
            return Ok(snapshot);
        }
        if self.in_backoff() {
            tracing::debug!(guild = %self.guild, "guild refresh backing off, serving stale snapshot");
            return Ok(snapshot);
        }
        self.fetch_and_swap().await?;
        self.current()
    }

    // caller must hold refresh_lock
    async fn fetch_and_swap(&self) -> AppResult<()> {
        let fetched = match self.fetch().await {
            Ok(members) => {
                self.last_failure.store(NO_FAILURE, Ordering::SeqCst);
                members
            }
            Err(e) => {
                self.last_failure
                    .store(self.clock.now_millis(), Ordering::SeqCst);
                return Err(e);
            }
        };

        let next = Arc::new(Snapshot {
            members: fetched,
            refreshed_at: Some(self.clock.now_millis()),
        });
        let count = next.members.len();

        let mut slot = self
            .snapshot
            .write()
            .map_err(|_| AppError::Cache("lock poisoned".into()))?;
        *slot = next;
        drop(slot);

        tracing::info!(guild = %self.guild, members = count, "guild member cache refreshed");
        Ok(())
    }

    async fn fetch(&self) -> AppResult<HashSet<String>> {
        tokio::time::timeout(
            self.fetch_timeout,
            self.source.fetch_guild_members(&self.guild),
        )
        .await
        .map_err(|_| {
            AppError::Upstream(format!(
                "guild lookup timed out after {:?}",
                self.fetch_timeout
            ))
        })?
    }
}

#[async_trait]
impl MembershipCheck for GuildMembershipCache {
    async fn is_member(&self, uuid: &str) -> AppResult<bool> {
        let snapshot = self.current()?;
        if !self.is_stale(&snapshot) {
            return Ok(snapshot.members.contains(uuid));
        }

        let snapshot = match self.refresh_if_stale().await {
            Ok(s) => s,
            Err(AppError::Cache(msg)) => return Err(AppError::Cache(msg)),
            Err(e) => {
                tracing::warn!(guild = %self.guild, "guild refresh failed, serving last snapshot: {e}");
                self.current()?
            }
        };
        Ok(snapshot.members.contains(uuid))
    }
}

/// Checks the reporter's own profile instead of caching the whole guild.
///
/// Costs one upstream call per report. Lookup failures are returned to the
/// caller, which decides how to treat them.
pub struct ProfileMembership {
    guild: String,
    lookup: Arc<dyn PlayerLookup>,
    fetch_timeout: Duration,
}

impl ProfileMembership {
    pub fn new(guild: impl Into<String>, lookup: Arc<dyn PlayerLookup>, fetch_timeout: Duration) -> Self {
        Self {
            guild: guild.into(),
            lookup,
            fetch_timeout,
        }
    }
}

#[async_trait]
impl MembershipCheck for ProfileMembership {
    async fn is_member(&self, uuid: &str) -> AppResult<bool> {
        let info = tokio::time::timeout(self.fetch_timeout, self.lookup.fetch_player_info(uuid))
            .await
            .map_err(|_| {
                AppError::Upstream(format!("player lookup timed out after {:?}", self.fetch_timeout))
            })??;

        Ok(info
            .guild
            .is_some_and(|g| g.eq_ignore_ascii_case(&self.guild)))
    }
}
