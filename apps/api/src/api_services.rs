mod database;
mod purge;
mod redis;
mod state_builder;

pub use database::connect_and_migrate;
pub use purge::spawn_throttle_purge_task;
pub use state_builder::{build_app_state, build_login_service};
