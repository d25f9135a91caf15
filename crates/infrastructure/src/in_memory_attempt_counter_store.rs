use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use gatekeep_application::{AttemptCounter, AttemptCounterStore};
use gatekeep_core::AppResult;
use gatekeep_domain::ThrottleKey;
use tokio::sync::Mutex;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy)]
struct CounterEntry {
    attempts: u32,
    expires_at: Instant,
}

impl CounterEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }

    fn snapshot(&self, now: Instant) -> AttemptCounter {
        AttemptCounter {
            attempts: self.attempts,
            expires_in: self.expires_at.saturating_duration_since(now),
        }
    }
}

/// In-memory counter store for single-instance deployments and tests.
///
/// The map lock is held across each read-modify-write, which makes
/// increments atomic within the process.
#[derive(Default)]
pub struct InMemoryAttemptCounterStore {
    entries: Mutex<HashMap<String, CounterEntry>>,
}

impl InMemoryAttemptCounterStore {
    /// Creates an empty in-memory counter store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AttemptCounterStore for InMemoryAttemptCounterStore {
    async fn increment(&self, key: &ThrottleKey, decay_seconds: u64) -> AppResult<AttemptCounter> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;

        let entry = entries
            .entry(key.as_str().to_owned())
            .and_modify(|entry| {
                if entry.is_live(now) {
                    entry.attempts = entry.attempts.saturating_add(1);
                } else {
                    *entry = fresh_entry(now, decay_seconds);
                }
            })
            .or_insert_with(|| fresh_entry(now, decay_seconds));

        Ok(entry.snapshot(now))
    }

    async fn get(&self, key: &ThrottleKey) -> AppResult<Option<AttemptCounter>> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;

        match entries.get(key.as_str()) {
            Some(entry) if entry.is_live(now) => Ok(Some(entry.snapshot(now))),
            Some(_) => {
                entries.remove(key.as_str());
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, key: &ThrottleKey) -> AppResult<()> {
        self.entries.lock().await.remove(key.as_str());
        Ok(())
    }

    async fn purge_expired(&self) -> AppResult<u64> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.is_live(now));

        Ok(u64::try_from(before - entries.len()).unwrap_or(u64::MAX))
    }
}

fn fresh_entry(now: Instant, decay_seconds: u64) -> CounterEntry {
    let expires_at = now
        .checked_add(Duration::from_secs(decay_seconds))
        .unwrap_or(now);

    CounterEntry {
        attempts: 1,
        expires_at,
    }
}
