//! Throttled administrator login.
//!
//! Runs the check, verify, record sequence for each attempt: the throttle is
//! consulted immediately before the credential store and the outcome is
//! recorded immediately after, keeping the window in which concurrent
//! attempts for one key can both pass the check as small as possible.

use std::sync::Arc;

use tracing::info;

use gatekeep_core::{AppError, AppResult};
use gatekeep_domain::{AdminId, EmailAddress, ThrottleKey};

use crate::{AdminRepository, LoginThrottleService, PasswordHasher};

#[cfg(test)]
mod tests;

/// Message returned for unknown emails and wrong passwords alike.
pub const FAILED_LOGIN_MESSAGE: &str = "These credentials do not match our records.";

/// A single login attempt as received from the HTTP layer.
#[derive(Debug, Clone)]
pub struct LoginAttempt {
    /// Submitted email address.
    pub email: String,
    /// Submitted plaintext password.
    pub password: String,
    /// Whether the caller asked to be remembered.
    pub remember: bool,
    /// Network address of the caller.
    pub ip_address: String,
}

/// Administrator authenticated by a successful attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedAdmin {
    /// Administrator identifier.
    pub id: AdminId,
    /// Display name.
    pub name: String,
    /// Canonical email address.
    pub email: String,
    /// Echo of the attempt's remember flag.
    pub remember: bool,
}

/// Application service for throttled password login.
#[derive(Clone)]
pub struct LoginService {
    admin_repository: Arc<dyn AdminRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
    throttle: LoginThrottleService,
}

impl LoginService {
    /// Creates a new login service.
    #[must_use]
    pub fn new(
        admin_repository: Arc<dyn AdminRepository>,
        password_hasher: Arc<dyn PasswordHasher>,
        throttle: LoginThrottleService,
    ) -> Self {
        Self {
            admin_repository,
            password_hasher,
            throttle,
        }
    }

    /// Returns the throttle guarding this service.
    #[must_use]
    pub fn throttle(&self) -> &LoginThrottleService {
        &self.throttle
    }

    /// Authenticates an administrator by email and password.
    ///
    /// Fails with `AppError::Validation` for malformed input,
    /// `AppError::Locked` while the attempt's key is locked, and
    /// `AppError::Unauthorized` with a generic message for any credential
    /// mismatch.
    pub async fn authenticate(&self, attempt: LoginAttempt) -> AppResult<AuthenticatedAdmin> {
        let submitted_email = attempt.email.trim();
        let email = EmailAddress::new(submitted_email)?;
        if attempt.password.is_empty() {
            return Err(AppError::Validation(
                "the password field is required".to_owned(),
            ));
        }

        let key = ThrottleKey::for_login(submitted_email, &attempt.ip_address);
        self.throttle.check_allowed(&key).await?;

        let admin = self.admin_repository.find_by_email(email.as_str()).await?;
        let verified = match admin {
            Some(admin) => self
                .password_hasher
                .verify_password(&attempt.password, &admin.password_hash)?
                .then_some(admin),
            None => {
                // Hash anyway so unknown emails take as long as wrong passwords.
                let _ = self.password_hasher.hash_password(&attempt.password);
                None
            }
        };

        let Some(admin) = verified else {
            self.throttle.record_failure(&key).await?;
            info!(%key, "admin login rejected");
            return Err(AppError::Unauthorized(FAILED_LOGIN_MESSAGE.to_owned()));
        };

        self.throttle.record_success(&key).await?;
        info!(admin_id = %admin.id, "admin authenticated");

        Ok(AuthenticatedAdmin {
            id: admin.id,
            name: admin.name,
            email: admin.email,
            remember: attempt.remember,
        })
    }
}
