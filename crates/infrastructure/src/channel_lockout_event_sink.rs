use async_trait::async_trait;
use gatekeep_application::{LockoutEvent, LockoutEventSink};
use gatekeep_core::{AppError, AppResult};
use tokio::sync::mpsc;

/// Lockout sink that forwards events to an in-process channel, for alerting
/// tasks that consume lockouts as a stream.
#[derive(Debug, Clone)]
pub struct ChannelLockoutEventSink {
    sender: mpsc::UnboundedSender<LockoutEvent>,
}

impl ChannelLockoutEventSink {
    /// Creates a sink and the receiver its events are delivered to.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<LockoutEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl LockoutEventSink for ChannelLockoutEventSink {
    async fn publish(&self, event: LockoutEvent) -> AppResult<()> {
        self.sender
            .send(event)
            .map_err(|_| AppError::Internal("lockout event receiver was dropped".to_owned()))
    }
}
