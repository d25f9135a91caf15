use std::time::Duration;

use gatekeep_application::LoginThrottleService;
use tracing::{debug, error, info};

/// Periodically deletes expired attempt counters.
///
/// A zero interval disables the task.
pub fn spawn_throttle_purge_task(throttle: LoginThrottleService, interval_seconds: u64) {
    if interval_seconds == 0 {
        info!("throttle purge task disabled (THROTTLE_PURGE_INTERVAL_SECONDS is 0)");
        return;
    }

    tokio::spawn(async move {
        info!(interval_seconds, "throttle purge task started");

        loop {
            tokio::time::sleep(Duration::from_secs(interval_seconds)).await;

            match throttle.purge_expired().await {
                Ok(0) => {}
                Ok(removed) => debug!(removed, "purged expired login attempt counters"),
                Err(error) => error!(error = %error, "throttle purge failed"),
            }
        }
    });
}
