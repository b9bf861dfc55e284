//! Driving port for registration and password login.

use async_trait::async_trait;

use crate::domain::{Account, Error, LoginCredentials, Registration};

/// Account lifecycle as seen by inbound adapters.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Create an account with its credential.
    ///
    /// Either both rows exist afterwards or neither does.
    async fn register(&self, registration: Registration) -> Result<Account, Error>;

    /// Resolve a login attempt to exactly one account.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Account, Error>;
}
