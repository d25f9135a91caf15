//! Application services and ports.

#![forbid(unsafe_code)]

mod admin_service;
mod login_service;
mod login_throttle_service;

pub use admin_service::{AdminRecord, AdminRepository, AdminService, NewAdmin, PasswordHasher};
pub use login_service::{AuthenticatedAdmin, FAILED_LOGIN_MESSAGE, LoginAttempt, LoginService};
pub use login_throttle_service::{
    AttemptCounter, AttemptCounterStore, LockoutEvent, LockoutEventSink, LoginThrottleService,
};
