use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use gatekeep_core::{AppError, AppResult};
use gatekeep_domain::{ThrottleKey, ThrottlePolicy};

use super::ports::{AttemptCounterStore, LockoutEvent, LockoutEventSink};

/// Application service deciding admission for login attempts.
#[derive(Clone)]
pub struct LoginThrottleService {
    store: Arc<dyn AttemptCounterStore>,
    lockout_sink: Arc<dyn LockoutEventSink>,
    policy: ThrottlePolicy,
}

impl LoginThrottleService {
    /// Creates a new login throttle service.
    #[must_use]
    pub fn new(
        store: Arc<dyn AttemptCounterStore>,
        lockout_sink: Arc<dyn LockoutEventSink>,
        policy: ThrottlePolicy,
    ) -> Self {
        Self {
            store,
            lockout_sink,
            policy,
        }
    }

    /// Returns the active policy.
    #[must_use]
    pub fn policy(&self) -> ThrottlePolicy {
        self.policy
    }

    /// Checks whether an attempt for `key` may proceed.
    ///
    /// Returns `Err(AppError::Locked)` once the key has reached the policy
    /// maximum within its window. Every rejection is published to the
    /// lockout sink. Call this immediately before verifying credentials.
    pub async fn check_allowed(&self, key: &ThrottleKey) -> AppResult<()> {
        let Some(counter) = self.store.get(key).await? else {
            return Ok(());
        };

        if !self.policy.is_locked(counter.attempts) {
            return Ok(());
        }

        let retry_after_seconds = counter.retry_after_seconds();
        let event = LockoutEvent {
            key: key.clone(),
            attempts: counter.attempts,
            retry_after_seconds,
            occurred_at: Utc::now(),
        };

        // A failing sink must not unlock the key.
        if let Err(error) = self.lockout_sink.publish(event).await {
            warn!(%key, %error, "failed to publish lockout event");
        }

        Err(AppError::Locked {
            retry_after_seconds,
        })
    }

    /// Records a failed attempt for `key`.
    ///
    /// Errors only when the counter store is unreachable.
    pub async fn record_failure(&self, key: &ThrottleKey) -> AppResult<()> {
        let counter = self
            .store
            .increment(key, self.policy.decay_seconds())
            .await?;

        if counter.attempts == self.policy.max_attempts() {
            info!(
                %key,
                attempts = counter.attempts,
                retry_after_seconds = counter.retry_after_seconds(),
                "login throttle key locked"
            );
        } else {
            debug!(%key, attempts = counter.attempts, "recorded failed login attempt");
        }

        Ok(())
    }

    /// Clears the failure counter for `key`.
    pub async fn record_success(&self, key: &ThrottleKey) -> AppResult<()> {
        self.store.delete(key).await
    }

    /// Returns the failures recorded for `key` in its active window.
    pub async fn attempts(&self, key: &ThrottleKey) -> AppResult<u32> {
        Ok(self
            .store
            .get(key)
            .await?
            .map_or(0, |counter| counter.attempts))
    }

    /// Removes expired counters. Intended for periodic cleanup.
    pub async fn purge_expired(&self) -> AppResult<u64> {
        self.store.purge_expired().await
    }
}
