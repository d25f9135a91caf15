use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use gatekeep_core::{AppError, AppResult};
use gatekeep_domain::{AdminId, ThrottleKey, ThrottlePolicy};
use tokio::sync::Mutex;

use crate::{
    AdminRecord, AdminRepository, AttemptCounter, AttemptCounterStore, LockoutEvent,
    LockoutEventSink, LoginThrottleService, PasswordHasher,
};

use super::{FAILED_LOGIN_MESSAGE, LoginAttempt, LoginService};

#[derive(Default)]
struct MemoryCounterStore {
    counters: Mutex<HashMap<String, u32>>,
}

#[async_trait]
impl AttemptCounterStore for MemoryCounterStore {
    async fn increment(&self, key: &ThrottleKey, decay_seconds: u64) -> AppResult<AttemptCounter> {
        let mut counters = self.counters.lock().await;
        let attempts = counters.entry(key.as_str().to_owned()).or_insert(0);
        *attempts += 1;
        Ok(AttemptCounter {
            attempts: *attempts,
            expires_in: Duration::from_secs(decay_seconds),
        })
    }

    async fn get(&self, key: &ThrottleKey) -> AppResult<Option<AttemptCounter>> {
        Ok(self
            .counters
            .lock()
            .await
            .get(key.as_str())
            .map(|attempts| AttemptCounter {
                attempts: *attempts,
                expires_in: Duration::from_secs(45),
            }))
    }

    async fn delete(&self, key: &ThrottleKey) -> AppResult<()> {
        self.counters.lock().await.remove(key.as_str());
        Ok(())
    }

    async fn purge_expired(&self) -> AppResult<u64> {
        Ok(0)
    }
}

struct NoopSink;

#[async_trait]
impl LockoutEventSink for NoopSink {
    async fn publish(&self, _event: LockoutEvent) -> AppResult<()> {
        Ok(())
    }
}

#[derive(Default)]
struct CountingAdminRepo {
    admins: Vec<AdminRecord>,
    lookups: AtomicUsize,
}

#[async_trait]
impl AdminRepository for CountingAdminRepo {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<AdminRecord>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.admins.iter().find(|admin| admin.email == email).cloned())
    }

    async fn create(&self, _name: &str, _email: &str, _password_hash: &str) -> AppResult<AdminId> {
        Err(AppError::Internal("read-only test repository".to_owned()))
    }
}

#[derive(Default)]
struct PlainHasher {
    hashes: AtomicUsize,
}

impl PasswordHasher for PlainHasher {
    fn hash_password(&self, password: &str) -> AppResult<String> {
        self.hashes.fetch_add(1, Ordering::SeqCst);
        Ok(format!("plain:{password}"))
    }

    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
        Ok(hash == format!("plain:{password}"))
    }
}

struct Fixture {
    service: LoginService,
    repo: Arc<CountingAdminRepo>,
    hasher: Arc<PlainHasher>,
}

fn fixture() -> Fixture {
    let repo = Arc::new(CountingAdminRepo {
        admins: vec![AdminRecord {
            id: AdminId::new(),
            name: "Admin User".to_owned(),
            email: "a@b.com".to_owned(),
            password_hash: "plain:correct horse".to_owned(),
        }],
        lookups: AtomicUsize::new(0),
    });
    let hasher = Arc::new(PlainHasher::default());
    let throttle = LoginThrottleService::new(
        Arc::new(MemoryCounterStore::default()),
        Arc::new(NoopSink),
        ThrottlePolicy::default(),
    );

    Fixture {
        service: LoginService::new(repo.clone(), hasher.clone(), throttle),
        repo,
        hasher,
    }
}

fn attempt(email: &str, password: &str) -> LoginAttempt {
    LoginAttempt {
        email: email.to_owned(),
        password: password.to_owned(),
        remember: false,
        ip_address: "10.0.0.1".to_owned(),
    }
}

#[tokio::test]
async fn valid_credentials_authenticate() {
    let fixture = fixture();

    let admin = fixture
        .service
        .authenticate(LoginAttempt {
            remember: true,
            ..attempt("A@B.com", "correct horse")
        })
        .await;

    let admin = admin.unwrap_or_else(|error| panic!("login failed: {error}"));
    assert_eq!(admin.email, "a@b.com");
    assert_eq!(admin.name, "Admin User");
    assert!(admin.remember);
}

#[tokio::test]
async fn wrong_password_is_rejected_generically() {
    let fixture = fixture();

    let result = fixture
        .service
        .authenticate(attempt("a@b.com", "wrong"))
        .await;

    match result {
        Err(AppError::Unauthorized(message)) => assert_eq!(message, FAILED_LOGIN_MESSAGE),
        other => panic!("expected unauthorized, got {other:?}"),
    }
    let key = ThrottleKey::for_login("a@b.com", "10.0.0.1");
    assert_eq!(fixture.service.throttle().attempts(&key).await.ok(), Some(1));
}

#[tokio::test]
async fn unknown_email_still_hashes_and_counts() {
    let fixture = fixture();

    let result = fixture
        .service
        .authenticate(attempt("ghost@b.com", "whatever"))
        .await;

    assert!(matches!(result, Err(AppError::Unauthorized(_))));
    assert_eq!(fixture.hasher.hashes.load(Ordering::SeqCst), 1);
    let key = ThrottleKey::for_login("ghost@b.com", "10.0.0.1");
    assert_eq!(fixture.service.throttle().attempts(&key).await.ok(), Some(1));
}

#[tokio::test]
async fn sixth_attempt_is_locked_without_consulting_store() {
    let fixture = fixture();
    for _ in 0..5 {
        let result = fixture.service.authenticate(attempt("a@b.com", "wrong")).await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }
    assert_eq!(fixture.repo.lookups.load(Ordering::SeqCst), 5);

    let result = fixture
        .service
        .authenticate(attempt("a@b.com", "correct horse"))
        .await;

    assert!(matches!(
        result,
        Err(AppError::Locked {
            retry_after_seconds: 45
        })
    ));
    assert_eq!(fixture.repo.lookups.load(Ordering::SeqCst), 5);
}

#[tokio::test]
async fn success_before_lockout_resets_counter() {
    let fixture = fixture();
    for _ in 0..4 {
        let _ = fixture.service.authenticate(attempt("a@b.com", "wrong")).await;
    }

    assert!(
        fixture
            .service
            .authenticate(attempt("a@b.com", "correct horse"))
            .await
            .is_ok()
    );

    let key = ThrottleKey::for_login("a@b.com", "10.0.0.1");
    assert_eq!(fixture.service.throttle().attempts(&key).await.ok(), Some(0));
    assert!(fixture.service.throttle().check_allowed(&key).await.is_ok());
}

#[tokio::test]
async fn invalid_input_is_rejected_before_throttling() {
    let fixture = fixture();

    let missing_email = fixture.service.authenticate(attempt("  ", "secret")).await;
    let bad_email = fixture.service.authenticate(attempt("not-an-email", "secret")).await;
    let missing_password = fixture.service.authenticate(attempt("a@b.com", "")).await;

    assert!(matches!(missing_email, Err(AppError::Validation(_))));
    assert!(matches!(bad_email, Err(AppError::Validation(_))));
    assert!(matches!(missing_password, Err(AppError::Validation(_))));
    assert_eq!(fixture.repo.lookups.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn padded_email_shares_key_with_trimmed_email() {
    let fixture = fixture();
    let _ = fixture
        .service
        .authenticate(attempt("  A@B.COM  ", "wrong"))
        .await;

    let key = ThrottleKey::for_login("a@b.com", "10.0.0.1");
    assert_eq!(fixture.service.throttle().attempts(&key).await.ok(), Some(1));
}
