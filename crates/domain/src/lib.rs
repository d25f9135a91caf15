//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod admin;
mod throttle;
mod transliterate;

pub use admin::{
    AdminId, EmailAddress, PASSWORD_MAX_LENGTH, PASSWORD_MIN_LENGTH, validate_password,
};
pub use throttle::{
    DEFAULT_DECAY_SECONDS, DEFAULT_MAX_ATTEMPTS, LockoutNotice, THROTTLE_KEY_SEPARATOR,
    ThrottleKey, ThrottlePolicy,
};
pub use transliterate::{UNKNOWN_CHARACTER, transliterate};
