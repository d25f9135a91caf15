//! Administrator credential ports and provisioning service.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use gatekeep_core::{AppResult, NonEmptyString};
use gatekeep_domain::{AdminId, EmailAddress, validate_password};

// ---------------------------------------------------------------------------
// Ports
// ---------------------------------------------------------------------------

/// Administrator record returned by repository queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminRecord {
    /// Unique administrator identifier.
    pub id: AdminId,
    /// Display name.
    pub name: String,
    /// Canonical (lowercased) email address.
    pub email: String,
    /// Argon2id password hash.
    pub password_hash: String,
}

/// Repository port for administrator persistence. This is the credential
/// store consulted by the login flow.
#[async_trait]
pub trait AdminRepository: Send + Sync {
    /// Finds an administrator by canonical email.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<AdminRecord>>;

    /// Creates an administrator and returns the assigned identifier.
    async fn create(&self, name: &str, email: &str, password_hash: &str) -> AppResult<AdminId>;
}

/// Port for password hashing operations. Keeps application code free of
/// direct cryptographic library coupling.
pub trait PasswordHasher: Send + Sync {
    /// Hashes a plaintext password.
    fn hash_password(&self, password: &str) -> AppResult<String>;

    /// Verifies a plaintext password against a stored hash.
    /// Must run in constant time regardless of validity.
    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool>;
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Input for provisioning an administrator.
#[derive(Debug, Clone)]
pub struct NewAdmin {
    /// Display name.
    pub name: String,
    /// Email address, validated and lowercased before storage.
    pub email: String,
    /// Plaintext password, validated before hashing.
    pub password: String,
}

/// Application service for administrator provisioning.
#[derive(Clone)]
pub struct AdminService {
    admin_repository: Arc<dyn AdminRepository>,
    password_hasher: Arc<dyn PasswordHasher>,
}

impl AdminService {
    /// Creates a new admin service.
    #[must_use]
    pub fn new(
        admin_repository: Arc<dyn AdminRepository>,
        password_hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        Self {
            admin_repository,
            password_hasher,
        }
    }

    /// Creates the administrator unless one with the same email exists.
    ///
    /// Returns the identifier of the new or existing record. The password of
    /// an existing administrator is left untouched.
    pub async fn ensure_admin(&self, admin: NewAdmin) -> AppResult<AdminId> {
        let name = NonEmptyString::new(admin.name)?;
        let email = EmailAddress::new(admin.email)?;

        if let Some(existing) = self.admin_repository.find_by_email(email.as_str()).await? {
            info!(admin_id = %existing.id, "administrator already provisioned");
            return Ok(existing.id);
        }

        validate_password(&admin.password)?;
        let password_hash = self.password_hasher.hash_password(&admin.password)?;

        let admin_id = self
            .admin_repository
            .create(name.as_str(), email.as_str(), &password_hash)
            .await?;

        info!(%admin_id, "administrator provisioned");
        Ok(admin_id)
    }
}
