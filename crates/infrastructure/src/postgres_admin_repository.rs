//! PostgreSQL-backed administrator repository.

use async_trait::async_trait;
use sqlx::PgPool;

use gatekeep_application::{AdminRecord, AdminRepository};
use gatekeep_core::{AppError, AppResult};
use gatekeep_domain::AdminId;

/// PostgreSQL implementation of the admin repository port.
#[derive(Clone)]
pub struct PostgresAdminRepository {
    pool: PgPool,
}

impl PostgresAdminRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AdminRow {
    id: uuid::Uuid,
    name: String,
    email: String,
    password_hash: String,
}

impl From<AdminRow> for AdminRecord {
    fn from(row: AdminRow) -> Self {
        Self {
            id: AdminId::from_uuid(row.id),
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
        }
    }
}

#[async_trait]
impl AdminRepository for PostgresAdminRepository {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<AdminRecord>> {
        let row = sqlx::query_as::<_, AdminRow>(
            r#"
            SELECT id, name, email, password_hash
            FROM admins
            WHERE LOWER(email) = LOWER($1)
            LIMIT 1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find admin by email: {error}")))?;

        Ok(row.map(AdminRecord::from))
    }

    async fn create(&self, name: &str, email: &str, password_hash: &str) -> AppResult<AdminId> {
        let admin_id = AdminId::new();

        sqlx::query(
            r#"
            INSERT INTO admins (id, name, email, password_hash)
            VALUES ($1, $2, LOWER($3), $4)
            "#,
        )
        .bind(admin_id.as_uuid())
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .map_err(|error| email_conflict_or_internal(error, "create admin"))?;

        Ok(admin_id)
    }
}

fn email_conflict_or_internal(error: sqlx::Error, operation: &str) -> AppError {
    if let sqlx::Error::Database(ref database_error) = error
        && database_error.code().as_deref() == Some("23505")
    {
        return AppError::Conflict("an admin with this email already exists".to_owned());
    }

    AppError::Internal(format!("failed to {operation}: {error}"))
}
