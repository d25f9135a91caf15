//! PostgreSQL-backed login attempt counters using the
//! `login_throttle_counters` table.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;

use gatekeep_application::{AttemptCounter, AttemptCounterStore};
use gatekeep_core::{AppError, AppResult};
use gatekeep_domain::ThrottleKey;


/// PostgreSQL implementation of the attempt counter store port.
#[derive(Clone)]
pub struct PostgresAttemptCounterStore {
    pool: PgPool,
}

impl PostgresAttemptCounterStore {
    /// Creates a store with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttemptCounterStore for PostgresAttemptCounterStore {
    async fn increment(&self, key: &ThrottleKey, decay_seconds: u64) -> AppResult<AttemptCounter> {
        // UPSERT: insert a fresh window or bump the counter in a single
        // statement. Expired windows are restarted, live ones keep their expiry.
        let row = sqlx::query_as::<_, CounterRow>(
            r#"
            INSERT INTO login_throttle_counters (key, attempts, expires_at)
            VALUES ($1, 1, now() + make_interval(secs => $2::float8))
            ON CONFLICT (key) DO UPDATE
            SET
                attempts = CASE
                    WHEN login_throttle_counters.expires_at <= now()
                    THEN 1
                    ELSE login_throttle_counters.attempts + 1
                END,
                expires_at = CASE
                    WHEN login_throttle_counters.expires_at <= now()
                    THEN EXCLUDED.expires_at
                    ELSE login_throttle_counters.expires_at
                END
            RETURNING
                attempts,
                (EXTRACT(EPOCH FROM (expires_at - now())) * 1000)::BIGINT AS expires_in_ms
            "#,
        )
        .bind(key.as_str())
        .bind(decay_seconds as f64)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to record login attempt: {error}"))
        })?;

        row.try_into()
    }

    async fn get(&self, key: &ThrottleKey) -> AppResult<Option<AttemptCounter>> {
        let row = sqlx::query_as::<_, CounterRow>(
            r#"
            SELECT
                attempts,
                (EXTRACT(EPOCH FROM (expires_at - now())) * 1000)::BIGINT AS expires_in_ms
            FROM login_throttle_counters
            WHERE key = $1 AND expires_at > now()
            "#,
        )
        .bind(key.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read login attempts: {error}")))?;

        row.map(AttemptCounter::try_from).transpose()
    }

    async fn delete(&self, key: &ThrottleKey) -> AppResult<()> {
        sqlx::query(
            r#"
            DELETE FROM login_throttle_counters
            WHERE key = $1
            "#,
        )
        .bind(key.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to clear login attempts: {error}")))?;

        Ok(())
    }

    async fn purge_expired(&self) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM login_throttle_counters
            WHERE expires_at <= now()
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to purge expired login attempts: {error}"))
        })?;

        Ok(result.rows_affected())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CounterRow {
    attempts: i32,
    expires_in_ms: i64,
}

impl TryFrom<CounterRow> for AttemptCounter {
    type Error = AppError;

    fn try_from(row: CounterRow) -> Result<Self, Self::Error> {
        let attempts = u32::try_from(row.attempts)
            .map_err(|error| AppError::Internal(format!("invalid attempt count: {error}")))?;
        let expires_in =
            Duration::from_millis(u64::try_from(row.expires_in_ms.max(0)).unwrap_or_default());

        Ok(Self {
            attempts,
            expires_in,
        })
    }
}
