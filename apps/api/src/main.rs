//! Gatekeep API composition root.

#![forbid(unsafe_code)]

mod admin_seed;
mod api_config;
mod api_router;
mod api_services;
mod client_address;
mod dto;
mod error;
mod handlers;
mod state;

use std::net::SocketAddr;

use gatekeep_core::AppError;
use tracing::info;

use crate::api_config::{ApiCommand, ApiConfig, ThrottleStoreConfig};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    api_config::init_tracing();

    let config = ApiConfig::load()?;
    let pool = api_services::connect_and_migrate(&config.database_url).await?;

    match config.command {
        ApiCommand::Migrate => {
            info!("database migrations applied successfully");
            return Ok(());
        }
        ApiCommand::Seed => return admin_seed::run(pool).await,
        ApiCommand::Serve => {}
    }

    let login_service = api_services::build_login_service(&pool, &config)?;
    if !matches!(config.throttle_store, ThrottleStoreConfig::Redis { .. }) {
        api_services::spawn_throttle_purge_task(
            login_service.throttle().clone(),
            config.purge_interval_seconds,
        );
    }

    let policy = login_service.throttle().policy();
    let app_state = api_services::build_app_state(login_service, &config);
    let app = api_router::build_router(app_state, &config.frontend_url)?;

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(
        %address,
        max_attempts = policy.max_attempts(),
        decay_seconds = policy.decay_seconds(),
        trusted_proxies = config.trusted_proxies.len(),
        "gatekeep-api listening"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}
