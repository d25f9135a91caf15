use async_trait::async_trait;
use gatekeep_application::{LockoutEvent, LockoutEventSink};
use gatekeep_core::AppResult;
use tracing::warn;

/// Lockout sink that writes each event to the structured log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLockoutEventSink;

impl TracingLockoutEventSink {
    /// Creates a tracing lockout sink.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl LockoutEventSink for TracingLockoutEventSink {
    async fn publish(&self, event: LockoutEvent) -> AppResult<()> {
        warn!(
            key = %event.key,
            attempts = event.attempts,
            retry_after_seconds = event.retry_after_seconds,
            occurred_at = %event.occurred_at,
            "login attempt rejected by lockout"
        );

        Ok(())
    }
}
