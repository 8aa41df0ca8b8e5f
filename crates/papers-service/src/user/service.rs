//! Registration, login, and account lookup.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::info;

use papers_auth::{JwtEncoder, PasswordHasher};
use papers_core::config::AuthConfig;
use papers_core::error::AppError;
use papers_core::result::AppResult;
use papers_core::traits::EntityStore;
use papers_core::types::{FilterField, Query, UserId};
use papers_entity::user::{User, normalize_email};

/// Data required to register an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterUser {
    pub fullname: String,
    pub email: String,
    pub password: String,
    pub password_conf: String,
}

/// Returned by a successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResult {
    pub user_id: UserId,
    pub token: String,
}

/// Handles account registration and credential checks.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn EntityStore<User>>,
    hasher: Arc<PasswordHasher>,
    encoder: Arc<JwtEncoder>,
    password_min_length: usize,
    /// Serializes the uniqueness check and insert of registrations.
    register_lock: Arc<Mutex<()>>,
}

impl std::fmt::Debug for UserService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserService")
            .field("password_min_length", &self.password_min_length)
            .finish_non_exhaustive()
    }
}

impl UserService {
    /// Creates a new user service.
    pub fn new(
        store: Arc<dyn EntityStore<User>>,
        hasher: Arc<PasswordHasher>,
        encoder: Arc<JwtEncoder>,
        config: &AuthConfig,
    ) -> Self {
        Self {
            store,
            hasher,
            encoder,
            password_min_length: config.password_min_length,
            register_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Create an account. The email must not be registered yet.
    pub async fn register(&self, req: RegisterUser) -> AppResult<User> {
        let fullname = req.fullname.trim();
        if fullname.is_empty() {
            return Err(AppError::validation("Full name is required"));
        }
        let email = normalize_email(&req.email);
        if email.is_empty() {
            return Err(AppError::validation("Email is required"));
        }
        if req.password.chars().count() < self.password_min_length {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters",
                self.password_min_length
            )));
        }
        if req.password != req.password_conf {
            return Err(AppError::validation("Passwords do not match"));
        }

        let hash = self.hasher.hash_password(&req.password)?;

        let _guard = self.register_lock.lock().await;
        if self.find_by_email(&email).await?.is_some() {
            return Err(AppError::conflict("Email is already registered"));
        }
        let user = self.store.insert(User::new(fullname, &email, hash)).await?;

        info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Check credentials and issue a token.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<LoginResult> {
        let invalid = || AppError::authentication("Invalid email or password");

        let user = self
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or_else(invalid)?;
        if !self.hasher.verify_password(password, &user.password_hash)? {
            return Err(invalid());
        }

        let token = self.encoder.issue(user.id)?;
        info!(user_id = %user.id, "User logged in");
        Ok(LoginResult {
            user_id: user.id,
            token,
        })
    }

    /// Fetch an account by id.
    pub async fn get(&self, id: UserId) -> AppResult<User> {
        self.store
            .get(id.into_uuid())
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {id} not found")))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let mut found = self
            .store
            .filter(&Query::new().and(FilterField::eq("email", email)))
            .await?;
        Ok(found.pop())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use papers_core::error::ErrorKind;
    use papers_database::MemoryStore;

    fn service() -> UserService {
        let config = AuthConfig {
            jwt_secret: "test-secret".into(),
            ..AuthConfig::default()
        };
        UserService::new(
            Arc::new(MemoryStore::<User>::new()),
            Arc::new(PasswordHasher::new()),
            Arc::new(JwtEncoder::new(&config)),
            &config,
        )
    }

    fn request(email: &str) -> RegisterUser {
        RegisterUser {
            fullname: "Grace Hopper".into(),
            email: email.into(),
            password: "cobol-1959".into(),
            password_conf: "cobol-1959".into(),
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let svc = service();
        let user = svc.register(request("grace@navy.mil")).await.expect("register");
        assert_ne!(user.password_hash, "cobol-1959");

        let login = svc.login("Grace@Navy.mil", "cobol-1959").await.expect("login");
        assert_eq!(login.user_id, user.id);
        assert!(!login.token.is_empty());
        assert_eq!(svc.get(user.id).await.expect("get").email, "grace@navy.mil");
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let svc = service();
        svc.register(request("a@b.io")).await.expect("first");
        let err = svc.register(request("A@B.io")).await.expect_err("duplicate");
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_password_confirmation_must_match() {
        let svc = service();
        let mut req = request("c@d.io");
        req.password_conf = "something-else".into();
        let err = svc.register(req).await.expect_err("mismatch");
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_short_password_rejected() {
        let svc = service();
        let mut req = request("e@f.io");
        req.password = "short".into();
        req.password_conf = "short".into();
        assert_eq!(
            svc.register(req).await.expect_err("short").kind,
            ErrorKind::Validation
        );
    }

    #[tokio::test]
    async fn test_bad_credentials_are_indistinguishable() {
        let svc = service();
        svc.register(request("g@h.io")).await.expect("register");
        let wrong_password = svc.login("g@h.io", "nope-nope").await.expect_err("wrong");
        let unknown = svc.login("who@h.io", "cobol-1959").await.expect_err("unknown");
        assert_eq!(wrong_password.kind, ErrorKind::Authentication);
        assert_eq!(wrong_password.message, unknown.message);
    }
}
