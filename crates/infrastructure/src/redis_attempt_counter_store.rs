//! Redis-backed login attempt counters.

use std::time::Duration;

use async_trait::async_trait;
use gatekeep_application::{AttemptCounter, AttemptCounterStore};
use gatekeep_core::{AppError, AppResult};
use gatekeep_domain::ThrottleKey;
use redis::{AsyncCommands, Script};
use tracing::warn;

const INCREMENT_SCRIPT: &str = r#"
local key = KEYS[1]
local window_ms = tonumber(ARGV[1])

local count = redis.call('INCR', key)
local ttl = redis.call('PTTL', key)

if ttl < 0 then
  redis.call('PEXPIRE', key, window_ms)
  ttl = window_ms
end

return {count, ttl}
"#;

/// Redis implementation of the attempt counter store port.
///
/// Counters are plain integer keys with a millisecond TTL, so expiry is
/// handled by Redis itself.
#[derive(Clone)]
pub struct RedisAttemptCounterStore {
    client: redis::Client,
    key_prefix: String,
}

impl RedisAttemptCounterStore {
    /// Creates a store with a configured Redis client and key prefix.
    #[must_use]
    pub fn new(client: redis::Client, key_prefix: impl Into<String>) -> Self {
        Self {
            client,
            key_prefix: key_prefix.into(),
        }
    }

    fn key_for(&self, key: &ThrottleKey) -> String {
        format!("{}:{key}", self.key_prefix)
    }

    async fn connection(&self) -> AppResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|error| AppError::Internal(format!("failed to connect to redis: {error}")))
    }
}

#[async_trait]
impl AttemptCounterStore for RedisAttemptCounterStore {
    async fn increment(&self, key: &ThrottleKey, decay_seconds: u64) -> AppResult<AttemptCounter> {
        let window_ms = decay_seconds.checked_mul(1000).ok_or_else(|| {
            AppError::Validation(format!("invalid throttle decay period: {decay_seconds}"))
        })?;

        let mut connection = self.connection().await?;
        let (count, ttl_ms): (i64, i64) = Script::new(INCREMENT_SCRIPT)
            .key(self.key_for(key))
            .arg(window_ms)
            .invoke_async(&mut connection)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to increment redis attempt counter: {error}"))
            })?;

        counter_from_parts(count, ttl_ms)
    }

    async fn get(&self, key: &ThrottleKey) -> AppResult<Option<AttemptCounter>> {
        let redis_key = self.key_for(key);
        let mut connection = self.connection().await?;

        let (count, ttl_ms): (Option<i64>, i64) = redis::pipe()
            .atomic()
            .get(&redis_key)
            .pttl(&redis_key)
            .query_async(&mut connection)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to read redis attempt counter: {error}"))
            })?;

        let Some(count) = count else {
            return Ok(None);
        };

        if ttl_ms < 0 {
            // Without a TTL the counter would lock the key forever.
            warn!(key = %redis_key, "ignoring redis attempt counter without expiry");
            return Ok(None);
        }

        counter_from_parts(count, ttl_ms).map(Some)
    }

    async fn delete(&self, key: &ThrottleKey) -> AppResult<()> {
        let mut connection = self.connection().await?;
        let _: i64 = connection.del(self.key_for(key)).await.map_err(|error| {
            AppError::Internal(format!("failed to delete redis attempt counter: {error}"))
        })?;

        Ok(())
    }

    async fn purge_expired(&self) -> AppResult<u64> {
        // Redis counters expire automatically via TTL.
        Ok(0)
    }
}

fn counter_from_parts(count: i64, ttl_ms: i64) -> AppResult<AttemptCounter> {
    let attempts = u32::try_from(count)
        .map_err(|error| AppError::Internal(format!("invalid redis attempt count: {error}")))?;
    let expires_in = Duration::from_millis(u64::try_from(ttl_ms.max(0)).unwrap_or_default());

    Ok(AttemptCounter {
        attempts,
        expires_in,
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use gatekeep_domain::ThrottleKey;

    use super::{RedisAttemptCounterStore, counter_from_parts};

    #[test]
    fn keys_are_prefixed() {
        let client = redis::Client::open("redis://127.0.0.1:6379");
        let Ok(client) = client else {
            panic!("static redis url should parse");
        };
        let store = RedisAttemptCounterStore::new(client, "gatekeep:login_throttle");

        let key = ThrottleKey::for_login("a@b.com", "10.0.0.1");
        assert_eq!(store.key_for(&key), "gatekeep:login_throttle:a@b.com|10.0.0.1");
    }

    #[test]
    fn script_reply_maps_to_counter() {
        let counter = counter_from_parts(3, 41_500).ok();
        assert_eq!(counter.map(|counter| counter.attempts), Some(3));
        assert_eq!(
            counter.map(|counter| counter.expires_in),
            Some(Duration::from_millis(41_500))
        );
    }

    #[test]
    fn negative_count_is_rejected() {
        assert!(counter_from_parts(-1, 1000).is_err());
    }
}
