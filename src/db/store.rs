use async_trait::async_trait;

use crate::db::models::{Account, NewAccount};
use crate::error::BrainError;

/// Persistence operations behind the request handlers.
///
/// Every call round-trips to the backing store; implementations hold no
/// account state of their own.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Number of registered accounts.
    async fn count_accounts(&self) -> Result<i64, BrainError>;

    /// Create the credential and the account together, or neither.
    ///
    /// Fails with [`BrainError::DuplicateEmail`] if the email is taken.
    async fn register_account(&self, new: NewAccount) -> Result<Account, BrainError>;

    /// Check `password` against the stored credential for `email` and return
    /// the matching account.
    ///
    /// - [`BrainError::NotFound`]: no credential, or no account, for `email`
    /// - [`BrainError::InvalidCredentials`]: the password does not match
    async fn authenticate(&self, email: &str, password: &str) -> Result<Account, BrainError>;

    /// Add `delta` to the account's `entries` and return the updated row.
    /// The sign of `delta` is not checked.
    async fn increment_entries(&self, id: i32, delta: i64) -> Result<Account, BrainError>;
}
