//! Driven port for account rows.

use async_trait::async_trait;

use crate::domain::{Account, AccountId, NewAccount};

use super::define_port_error;

define_port_error! {
    /// Failures raised by account repository adapters.
    pub enum AccountRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "account repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "account repository query failed: {message}",
        /// Another account already uses this email.
        DuplicateEmail { email: String } => "email already registered: {email}",
    }
}

/// Persistence for [`Account`] rows.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Insert a new account and return it with its assigned id.
    async fn insert(&self, account: &NewAccount) -> Result<Account, AccountRepositoryError>;

    /// Remove an account. Removing a missing id is not an error.
    async fn delete(&self, id: AccountId) -> Result<(), AccountRepositoryError>;

    /// Every account registered under `email`.
    ///
    /// Returns a list so callers can detect duplicates left by a missing
    /// uniqueness constraint.
    async fn find_by_email(&self, email: &str) -> Result<Vec<Account>, AccountRepositoryError>;

    /// Whether any account uses `email`.
    async fn email_exists(&self, email: &str) -> Result<bool, AccountRepositoryError>;
}
