//! Login throttling domain types.
//!
//! Failed login attempts are bucketed per identity and origin address, so an
//! attacker hammering one account from one address is slowed down without
//! penalizing other addresses or other accounts.

use std::fmt::{Display, Formatter};

use gatekeep_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

use crate::transliterate::transliterate;

/// Separator between the identity and the address in a throttle key.
pub const THROTTLE_KEY_SEPARATOR: char = '|';

/// Default number of failures that locks a key.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default lifetime of an attempt window, in seconds.
pub const DEFAULT_DECAY_SECONDS: u64 = 60;

/// Rate limiting bucket for one identity and origin address pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThrottleKey(String);

impl ThrottleKey {
    /// Derives the key for a login attempt.
    ///
    /// The identity is lowercased, joined to the address with `|` and the
    /// whole string is transliterated to ASCII. Persisted counters depend on
    /// this exact derivation.
    #[must_use]
    pub fn for_login(identity: &str, address: &str) -> Self {
        let raw = format!(
            "{}{THROTTLE_KEY_SEPARATOR}{address}",
            identity.to_lowercase()
        );

        Self(transliterate(&raw))
    }

    /// Restores a key that was derived elsewhere.
    ///
    /// Rejects empty keys and keys that are not in canonical ASCII form.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = NonEmptyString::new(value)
            .map_err(|_| AppError::Validation("throttle key must not be empty".to_owned()))?;

        if !value.as_str().is_ascii() {
            return Err(AppError::Validation(format!(
                "throttle key '{}' is not in canonical ASCII form",
                value.as_str()
            )));
        }

        Ok(Self(value.into()))
    }

    /// Returns the key as stored in the counter store.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for ThrottleKey {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(&self.0)
    }
}

/// Lockout threshold and attempt window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottlePolicy {
    max_attempts: u32,
    decay_seconds: u64,
}

impl ThrottlePolicy {
    /// Creates a policy; both values must be positive.
    pub fn new(max_attempts: u32, decay_seconds: u64) -> AppResult<Self> {
        if max_attempts == 0 {
            return Err(AppError::Validation(
                "max_attempts must be greater than zero".to_owned(),
            ));
        }

        if decay_seconds == 0 {
            return Err(AppError::Validation(
                "decay_seconds must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            max_attempts,
            decay_seconds,
        })
    }

    /// Failures at which a key becomes locked.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Seconds an attempt window lives after its first failure.
    #[must_use]
    pub fn decay_seconds(&self) -> u64 {
        self.decay_seconds
    }

    /// Whether `attempts` failures lock the key.
    #[must_use]
    pub fn is_locked(&self, attempts: u32) -> bool {
        attempts >= self.max_attempts
    }
}

impl Default for ThrottlePolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            decay_seconds: DEFAULT_DECAY_SECONDS,
        }
    }
}

/// User-facing details of a lockout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LockoutNotice {
    retry_after_seconds: u64,
}

impl LockoutNotice {
    /// Creates a notice for the given remaining window.
    #[must_use]
    pub fn new(retry_after_seconds: u64) -> Self {
        Self {
            retry_after_seconds,
        }
    }

    /// Seconds the user must wait.
    #[must_use]
    pub fn retry_after_seconds(&self) -> u64 {
        self.retry_after_seconds
    }

    /// Minutes the user must wait, rounded up.
    #[must_use]
    pub fn retry_after_minutes(&self) -> u64 {
        self.retry_after_seconds.div_ceil(60)
    }

    /// Message shown next to the login form.
    #[must_use]
    pub fn message(&self) -> String {
        let minutes = self.retry_after_minutes();
        let minute_label = if minutes == 1 { "minute" } else { "minutes" };

        format!(
            "Too many login attempts. Please try again in {} seconds ({minutes} {minute_label}).",
            self.retry_after_seconds
        )
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn login_key_joins_identity_and_address() {
        let key = ThrottleKey::for_login("a@b.com", "10.0.0.1");
        assert_eq!(key.as_str(), "a@b.com|10.0.0.1");
    }

    #[test]
    fn login_key_ignores_identity_case() {
        let upper = ThrottleKey::for_login("USER@Example.com", "1.2.3.4");
        let lower = ThrottleKey::for_login("user@example.com", "1.2.3.4");
        assert_eq!(upper, lower);
    }

    #[test]
    fn login_key_separates_addresses() {
        let first = ThrottleKey::for_login("user@example.com", "1.2.3.4");
        let second = ThrottleKey::for_login("user@example.com", "1.2.3.5");
        assert_ne!(first, second);
    }

    #[test]
    fn login_key_transliterates_identity() {
        let key = ThrottleKey::for_login("JOSÉ@Café.fr", "::1");
        assert_eq!(key.as_str(), "jose@cafe.fr|::1");
    }

    #[test]
    fn distinct_cyrillic_identities_get_distinct_keys() {
        let first = ThrottleKey::for_login("дима@x.ru", "10.0.0.1");
        let second = ThrottleKey::for_login("петя@x.ru", "10.0.0.1");

        assert_eq!(first.as_str(), "dima@x.ru|10.0.0.1");
        assert_ne!(first, second);
    }

    #[test]
    fn restored_key_rejects_empty_value() {
        assert!(ThrottleKey::new("").is_err());
        assert!(ThrottleKey::new("  ").is_err());
    }

    #[test]
    fn restored_key_rejects_non_ascii_value() {
        assert!(ThrottleKey::new("josé@café.fr|::1").is_err());
    }

    #[test]
    fn restored_key_round_trips_derived_key() {
        let derived = ThrottleKey::for_login("a@b.com", "10.0.0.1");
        let restored = ThrottleKey::new(derived.as_str());
        assert_eq!(restored.ok(), Some(derived));
    }

    #[test]
    fn policy_rejects_zero_values() {
        assert!(ThrottlePolicy::new(0, 60).is_err());
        assert!(ThrottlePolicy::new(5, 0).is_err());
    }

    #[test]
    fn default_policy_locks_at_five() {
        let policy = ThrottlePolicy::default();
        assert!(!policy.is_locked(4));
        assert!(policy.is_locked(5));
        assert_eq!(policy.decay_seconds(), 60);
    }

    #[test]
    fn notice_rounds_minutes_up() {
        assert_eq!(LockoutNotice::new(1).retry_after_minutes(), 1);
        assert_eq!(LockoutNotice::new(60).retry_after_minutes(), 1);
        assert_eq!(LockoutNotice::new(61).retry_after_minutes(), 2);
    }

    #[test]
    fn notice_message_mentions_seconds_and_minutes() {
        assert_eq!(
            LockoutNotice::new(42).message(),
            "Too many login attempts. Please try again in 42 seconds (1 minute)."
        );
        assert_eq!(
            LockoutNotice::new(125).message(),
            "Too many login attempts. Please try again in 125 seconds (3 minutes)."
        );
    }

    proptest! {
        #[test]
        fn login_key_is_case_insensitive(identity in "[a-zA-Z0-9.@]{1,32}", address in "[0-9.]{1,15}") {
            let mixed = ThrottleKey::for_login(&identity, &address);
            let lowered = ThrottleKey::for_login(&identity.to_lowercase(), &address);
            prop_assert_eq!(mixed, lowered);
        }

        #[test]
        fn login_key_is_always_ascii(identity in "\\PC{0,24}", address in "\\PC{0,24}") {
            let key = ThrottleKey::for_login(&identity, &address);
            prop_assert!(key.as_str().is_ascii());
            prop_assert!(ThrottleKey::new(key.as_str()).is_ok());
        }
    }
}
