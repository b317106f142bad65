use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::application::{Clock, duration_millis};
use crate::domain::CooldownKey;

/// Admits at most one report per key per cooldown window.
///
/// The read-compare-write for a key happens while holding that key's shard
/// lock, so concurrent callers see a single linear order of decisions.
pub struct CooldownTracker {
    window_millis: i64,
    clock: Arc<dyn Clock>,
    last_accepted: DashMap<CooldownKey, i64>,
}

impl CooldownTracker {
    pub fn new(window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            window_millis: duration_millis(window),
            clock,
            last_accepted: DashMap::new(),
        }
    }

    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_millis as u64)
    }

    /// `true` if the report may go through; records the admission.
    pub fn should_process(&self, key: &CooldownKey) -> bool {
        match self.last_accepted.entry(key.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(self.clock.now_millis());
                true
            }
            Entry::Occupied(mut slot) => {
                let now = self.clock.now_millis();
                let previous = *slot.get();
                if now - previous <= self.window_millis {
                    return false;
                }
                slot.insert(now);
                true
            }
        }
    }

    /// Drop keys whose last admission is already outside the window.
    /// Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now_millis();
        let before = self.last_accepted.len();
        self.last_accepted
            .retain(|_, last| now - *last <= self.window_millis);
        before.saturating_sub(self.last_accepted.len())
    }

    pub fn len(&self) -> usize {
        self.last_accepted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_accepted.is_empty()
    }
}
