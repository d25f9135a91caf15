use std::sync::Arc;

use gatekeep_application::{
    AttemptCounterStore, LockoutEventSink, LoginService, LoginThrottleService,
};
use gatekeep_core::AppError;
use gatekeep_infrastructure::{
    Argon2PasswordHasher, InMemoryAttemptCounterStore, PostgresAdminRepository,
    PostgresAttemptCounterStore, PostgresLockoutEventSink, RedisAttemptCounterStore,
    TracingLockoutEventSink,
};
use sqlx::PgPool;
use tracing::info;

use crate::api_config::{ApiConfig, LockoutSinkConfig, ThrottleStoreConfig};
use crate::state::AppState;

use super::redis::build_redis_client;

const REDIS_THROTTLE_KEY_PREFIX: &str = "gatekeep:login_throttle";

pub fn build_app_state(login_service: LoginService, config: &ApiConfig) -> AppState {
    AppState {
        login_service,
        trusted_proxies: config.trusted_proxies.clone().into(),
    }
}

pub fn build_login_service(pool: &PgPool, config: &ApiConfig) -> Result<LoginService, AppError> {
    let throttle = LoginThrottleService::new(
        build_attempt_counter_store(pool, &config.throttle_store)?,
        build_lockout_sink(pool, config.lockout_sink),
        config.throttle_policy,
    );

    Ok(LoginService::new(
        Arc::new(PostgresAdminRepository::new(pool.clone())),
        Arc::new(Argon2PasswordHasher::new()),
        throttle,
    ))
}

fn build_attempt_counter_store(
    pool: &PgPool,
    store: &ThrottleStoreConfig,
) -> Result<Arc<dyn AttemptCounterStore>, AppError> {
    let store: Arc<dyn AttemptCounterStore> = match store {
        ThrottleStoreConfig::Postgres => {
            info!("login throttle counters stored in postgres");
            Arc::new(PostgresAttemptCounterStore::new(pool.clone()))
        }
        ThrottleStoreConfig::Redis { redis_url } => {
            info!("login throttle counters stored in redis");
            Arc::new(RedisAttemptCounterStore::new(
                build_redis_client(redis_url)?,
                REDIS_THROTTLE_KEY_PREFIX,
            ))
        }
        ThrottleStoreConfig::Memory => {
            info!("login throttle counters kept in process memory");
            Arc::new(InMemoryAttemptCounterStore::new())
        }
    };

    Ok(store)
}

fn build_lockout_sink(pool: &PgPool, sink: LockoutSinkConfig) -> Arc<dyn LockoutEventSink> {
    match sink {
        LockoutSinkConfig::Tracing => Arc::new(TracingLockoutEventSink::new()),
        LockoutSinkConfig::Postgres => Arc::new(PostgresLockoutEventSink::new(pool.clone())),
    }
}
