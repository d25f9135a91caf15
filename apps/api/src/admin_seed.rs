use std::sync::Arc;

use gatekeep_application::{AdminService, NewAdmin};
use gatekeep_core::AppResult;
use gatekeep_infrastructure::{Argon2PasswordHasher, PostgresAdminRepository};
use sqlx::PgPool;
use tracing::info;

use crate::api_config::SeedAdminConfig;

pub async fn run(pool: PgPool) -> AppResult<()> {
    let seed = SeedAdminConfig::load()?;
    let admin_service = AdminService::new(
        Arc::new(PostgresAdminRepository::new(pool)),
        Arc::new(Argon2PasswordHasher::new()),
    );

    let admin_id = admin_service
        .ensure_admin(NewAdmin {
            name: seed.name,
            email: seed.email,
            password: seed.password,
        })
        .await?;

    info!(%admin_id, "admin seed completed");
    Ok(())
}
