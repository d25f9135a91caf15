//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod argon2_password_hasher;
mod channel_lockout_event_sink;
mod in_memory_attempt_counter_store;
mod postgres_admin_repository;
mod postgres_attempt_counter_store;
mod postgres_lockout_event_sink;
mod redis_attempt_counter_store;
mod tracing_lockout_event_sink;

pub use argon2_password_hasher::Argon2PasswordHasher;
pub use channel_lockout_event_sink::ChannelLockoutEventSink;
pub use in_memory_attempt_counter_store::InMemoryAttemptCounterStore;
pub use postgres_admin_repository::PostgresAdminRepository;
pub use postgres_attempt_counter_store::PostgresAttemptCounterStore;
pub use postgres_lockout_event_sink::PostgresLockoutEventSink;
pub use redis_attempt_counter_store::RedisAttemptCounterStore;
pub use tracing_lockout_event_sink::TracingLockoutEventSink;
