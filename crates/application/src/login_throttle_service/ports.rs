use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use gatekeep_core::AppResult;
use gatekeep_domain::ThrottleKey;

/// Failure counter for one throttle key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptCounter {
    /// Consecutive failures recorded in the active window.
    pub attempts: u32,
    /// Time left before the window expires.
    pub expires_in: Duration,
}

impl AttemptCounter {
    /// Whole seconds until the window expires, rounded up and never zero.
    #[must_use]
    pub fn retry_after_seconds(&self) -> u64 {
        let millis = u64::try_from(self.expires_in.as_millis()).unwrap_or(u64::MAX);
        millis.div_ceil(1000).max(1)
    }
}

/// Shared expiring counter store.
///
/// Implementations must make `increment` atomic: concurrent failures for the
/// same key may not lose updates.
#[async_trait]
pub trait AttemptCounterStore: Send + Sync {
    /// Increments the counter for `key` and returns its new state.
    ///
    /// Creates the counter with a fresh `decay_seconds` window when it is
    /// absent or expired. An existing window is never extended.
    async fn increment(&self, key: &ThrottleKey, decay_seconds: u64) -> AppResult<AttemptCounter>;

    /// Returns the live counter for `key`. Expired counters read as absent.
    async fn get(&self, key: &ThrottleKey) -> AppResult<Option<AttemptCounter>>;

    /// Deletes the counter for `key`. Deleting a missing key is a no-op.
    async fn delete(&self, key: &ThrottleKey) -> AppResult<()>;

    /// Removes expired counters and returns how many were dropped.
    ///
    /// Stores with native key expiry may return zero.
    async fn purge_expired(&self) -> AppResult<u64>;
}

/// Notification emitted when a locked key rejects an attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockoutEvent {
    /// Locked throttle key.
    pub key: ThrottleKey,
    /// Failures recorded in the active window.
    pub attempts: u32,
    /// Seconds until the window expires.
    pub retry_after_seconds: u64,
    /// When the attempt was rejected.
    pub occurred_at: DateTime<Utc>,
}

/// Port receiving lockout notifications for alerting and audit.
#[async_trait]
pub trait LockoutEventSink: Send + Sync {
    /// Publishes a lockout event.
    async fn publish(&self, event: LockoutEvent) -> AppResult<()>;
}
