//! Driven port for password digests.

use async_trait::async_trait;

use crate::domain::{AccountId, PasswordDigest};

use super::define_port_error;

define_port_error! {
    /// Failures raised by credential repository adapters.
    pub enum CredentialRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "credential repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "credential repository query failed: {message}",
        /// The account already has a stored digest.
        Duplicate { account: i64 } => "account {account} already has a credential",
    }
}

/// Persistence for the one-to-one account/digest relation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialRepository: Send + Sync {
    /// Store the digest for `account`. A second digest is rejected with
    /// [`CredentialRepositoryError::Duplicate`].
    async fn insert(
        &self,
        account: AccountId,
        digest: &PasswordDigest,
    ) -> Result<(), CredentialRepositoryError>;

    /// Every digest stored for `account`.
    async fn find_by_account(
        &self,
        account: AccountId,
    ) -> Result<Vec<PasswordDigest>, CredentialRepositoryError>;
}
