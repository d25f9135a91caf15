use async_trait::async_trait;
use sqlx::PgPool;

use gatekeep_application::{LockoutEvent, LockoutEventSink};
use gatekeep_core::{AppError, AppResult};

/// PostgreSQL-backed lockout sink appending to `auth_events`.
#[derive(Clone)]
pub struct PostgresLockoutEventSink {
    pool: PgPool,
}

impl PostgresLockoutEventSink {
    /// Creates a sink with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LockoutEventSink for PostgresLockoutEventSink {
    async fn publish(&self, event: LockoutEvent) -> AppResult<()> {
        let attempts = i32::try_from(event.attempts).unwrap_or(i32::MAX);
        let retry_after_seconds = i64::try_from(event.retry_after_seconds).unwrap_or(i64::MAX);

        sqlx::query(
            r#"
            INSERT INTO auth_events (
                event_type,
                throttle_key,
                attempts,
                retry_after_seconds,
                occurred_at
            )
            VALUES ('lockout', $1, $2, $3, $4)
            "#,
        )
        .bind(event.key.as_str())
        .bind(attempts)
        .bind(retry_after_seconds)
        .bind(event.occurred_at)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to append lockout event: {error}")))?;

        Ok(())
    }
}
