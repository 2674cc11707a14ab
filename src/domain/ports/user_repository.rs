//! User repository port for the demo account store.

use async_trait::async_trait;

use crate::domain::errors::StoreError;
use crate::domain::models::UserAccount;

/// Persistence operations for user accounts.
///
/// Implementations store a password digest, never the password itself. The
/// digest scheme is an unsalted SHA-256 hex string; this is a demo-grade
/// contract, not a hardened one.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account. Returns `Ok(None)` when the email is taken.
    async fn insert(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<Option<UserAccount>, StoreError>;

    /// Look up an account by email and password digest.
    async fn find_by_credentials(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<Option<UserAccount>, StoreError>;
}
