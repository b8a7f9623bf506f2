use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use rand::Rng;
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

use crate::models::{CreateUserRequest, NewUser, User};
use crate::services::store::{Store, StoreError};

/// Errors from registration, login and token lookup
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User with this email address already exists: {0}")]
    EmailTaken(String),

    #[error("Password hashing error: {0}")]
    Hashing(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

pub fn hash_password(plain: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            AuthError::Hashing(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

pub fn verify_password(plain: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        AuthError::Hashing(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

/// Fresh opaque session token
pub fn generate_token() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Placeholder location for clients that do not send one
pub fn random_coordinates() -> (f64, f64) {
    let mut rng = rand::thread_rng();
    (rng.gen_range(-90.0..=90.0), rng.gen_range(-180.0..=180.0))
}

/// Account registration and token-based login
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn Store>,
}

impl AccountService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Register a user from an already validated request
    pub async fn register(&self, req: CreateUserRequest) -> Result<User, AuthError> {
        let password_hash = hash_password(&req.password)?;

        let (latitude, longitude) = match (req.latitude, req.longitude) {
            (Some(lat), Some(lon)) => (lat, lon),
            _ => random_coordinates(),
        };

        let new_user = NewUser {
            email: req.email.clone(),
            password_hash,
            name: req.name,
            gender: req.gender,
            age: req.age,
            latitude,
            longitude,
        };

        match self.store.create_user(new_user).await {
            Ok(user) => {
                tracing::info!("Registered user {}", user.id);
                Ok(user)
            }
            Err(StoreError::Conflict(_)) => Err(AuthError::EmailTaken(req.email)),
            Err(e) => Err(e.into()),
        }
    }

    /// Verify credentials and issue a token, replacing any previous one
    ///
    /// Unknown email and wrong password produce the same error.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, AuthError> {
        let user = self
            .store
            .find_user_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        let token = generate_token();
        self.store.issue_token(user.id, &token).await?;

        tracing::info!("User {} logged in", user.id);

        Ok(token)
    }

    /// Resolve a token to its user
    pub async fn authenticate(&self, token: &str) -> Result<Option<User>, AuthError> {
        Ok(self.store.find_user_by_token(token).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::MemoryStore;

    fn registration(email: &str) -> CreateUserRequest {
        CreateUserRequest {
            email: email.to_string(),
            password: "correct-horse-battery-staple".to_string(),
            name: "Ada".to_string(),
            gender: "female".to_string(),
            age: 30,
            latitude: Some(51.5),
            longitude: Some(-0.12),
        }
    }

    #[test]
    fn hash_and_verify_roundtrip() {
        let password = "Secur3P@ssw0rd!";
        let hash = hash_password(password).expect("hashing should succeed");
        assert_ne!(hash, password);
        assert!(verify_password(password, &hash).expect("verify should succeed"));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let hash = hash_password("correct-horse-battery-staple").expect("hashing should succeed");
        assert!(!verify_password("wrong-password", &hash).expect("verify should not error"));
    }

    #[test]
    fn verify_errors_on_malformed_hash() {
        let err = verify_password("anything", "not-a-valid-hash").unwrap_err();
        assert!(matches!(err, AuthError::Hashing(_)));
    }

    #[test]
    fn random_coordinates_are_on_the_globe() {
        for _ in 0..100 {
            let (lat, lon) = random_coordinates();
            assert!((-90.0..=90.0).contains(&lat));
            assert!((-180.0..=180.0).contains(&lon));
        }
    }

    #[tokio::test]
    async fn register_then_login_issues_token() {
        let store = Arc::new(MemoryStore::new());
        let accounts = AccountService::new(store.clone());

        let user = accounts.register(registration("ada@example.com")).await.unwrap();
        assert_ne!(user.password_hash, "correct-horse-battery-staple");

        let token = accounts.login("ada@example.com", "correct-horse-battery-staple").await.unwrap();
        let resolved = accounts.authenticate(&token).await.unwrap().unwrap();
        assert_eq!(resolved.id, user.id);
    }

    #[tokio::test]
    async fn login_rejects_bad_credentials_uniformly() {
        let store = Arc::new(MemoryStore::new());
        let accounts = AccountService::new(store.clone());
        accounts.register(registration("ada@example.com")).await.unwrap();

        let wrong_password = accounts.login("ada@example.com", "nope").await.unwrap_err();
        let unknown_email = accounts.login("bob@example.com", "nope").await.unwrap_err();

        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
        assert!(matches!(unknown_email, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn second_login_invalidates_first_token() {
        let store = Arc::new(MemoryStore::new());
        let accounts = AccountService::new(store.clone());
        accounts.register(registration("ada@example.com")).await.unwrap();

        let first = accounts.login("ada@example.com", "correct-horse-battery-staple").await.unwrap();
        let second = accounts.login("ada@example.com", "correct-horse-battery-staple").await.unwrap();

        assert!(accounts.authenticate(&first).await.unwrap().is_none());
        assert!(accounts.authenticate(&second).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = Arc::new(MemoryStore::new());
        let accounts = AccountService::new(store.clone());
        accounts.register(registration("ada@example.com")).await.unwrap();

        let err = accounts.register(registration("ada@example.com")).await.unwrap_err();
        assert!(matches!(err, AuthError::EmailTaken(_)));
    }

    #[tokio::test]
    async fn missing_coordinates_are_generated() {
        let store = Arc::new(MemoryStore::new());
        let accounts = AccountService::new(store.clone());

        let mut req = registration("ada@example.com");
        req.latitude = None;
        req.longitude = None;

        let user = accounts.register(req).await.unwrap();
        assert!((-90.0..=90.0).contains(&user.latitude));
        assert!((-180.0..=180.0).contains(&user.longitude));
    }
}
