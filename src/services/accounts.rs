//! Demo account service.
//!
//! Thin coordination over the user repository. The credential scheme is an
//! unsalted SHA-256 hex digest; the store is a demo fixture, not a hardened
//! authentication system, and its contract is documented as such.

use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::domain::errors::StoreError;
use crate::domain::models::UserAccount;
use crate::domain::ports::UserRepository;

/// Registration and login over a [`UserRepository`].
pub struct AccountService {
    repository: Arc<dyn UserRepository>,
}

impl AccountService {
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self { repository }
    }

    /// Register a new account. Returns `Ok(None)` when the email is taken.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<UserAccount>, StoreError> {
        self.repository
            .insert(email, &hash_password(password))
            .await
    }

    /// Log in with email and password. Returns `Ok(None)` on bad credentials.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<UserAccount>, StoreError> {
        self.repository
            .find_by_credentials(email, &hash_password(password))
            .await
    }
}

/// Unsalted SHA-256 hex digest of the password.
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::default();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}
