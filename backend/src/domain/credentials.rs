//! Password hashing and the account service built on it.
//!
//! Registration writes the account row, hashes the password, then writes the
//! credential row. If anything after the account insert fails, the account is
//! deleted again so no account is left without a credential.
//!
//! Every login failure surfaces as the same 401; the specific reason is only
//! logged.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::ports::{
    AccountRepository, AccountRepositoryError, AccountService, CredentialRepository,
    CredentialRepositoryError,
};
use super::{Account, AccountId, Error, LoginCredentials, Registration};

/// bcrypt cost used by the running service.
pub const DEFAULT_BCRYPT_COST: u32 = bcrypt::DEFAULT_COST;

const INVALID_CREDENTIALS: &str = "invalid credentials";

/// Stored bcrypt digest.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    /// Wrap a digest loaded from storage.
    pub fn new(digest: impl Into<String>) -> Self {
        Self(digest.into())
    }

    /// Encoded digest, including algorithm and cost prefix.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordDigest(..)")
    }
}

/// [`AccountService`] backed by account and credential repositories.
#[derive(Clone)]
pub struct CredentialService<A, C> {
    accounts: Arc<A>,
    credentials: Arc<C>,
    cost: u32,
}

impl<A, C> CredentialService<A, C> {
    /// Service hashing with [`DEFAULT_BCRYPT_COST`].
    pub fn new(accounts: Arc<A>, credentials: Arc<C>) -> Self {
        Self::with_cost(accounts, credentials, DEFAULT_BCRYPT_COST)
    }

    /// Service hashing with an explicit bcrypt cost.
    pub fn with_cost(accounts: Arc<A>, credentials: Arc<C>, cost: u32) -> Self {
        Self {
            accounts,
            credentials,
            cost,
        }
    }
}

impl<A, C> CredentialService<A, C>
where
    A: AccountRepository,
    C: CredentialRepository,
{
    fn map_account_error(error: AccountRepositoryError) -> Error {
        match error {
            AccountRepositoryError::DuplicateEmail { .. } => {
                Error::invalid_request("email already registered")
            }
            other => Error::internal(format!("account repository error: {other}")),
        }
    }

    fn map_credential_error(error: CredentialRepositoryError) -> Error {
        Error::internal(format!("credential repository error: {error}"))
    }

    async fn hash(&self, password: &str) -> Result<PasswordDigest, Error> {
        let password = zeroize::Zeroizing::new(password.to_owned());
        let cost = self.cost;
        let digest = tokio::task::spawn_blocking(move || bcrypt::hash(password.as_str(), cost))
            .await
            .map_err(|err| Error::internal(format!("password hashing task failed: {err}")))?
            .map_err(|err| Error::internal(format!("password hashing failed: {err}")))?;
        Ok(PasswordDigest::new(digest))
    }

    async fn verify(password: &str, digest: PasswordDigest) -> Result<bool, Error> {
        let password = zeroize::Zeroizing::new(password.to_owned());
        tokio::task::spawn_blocking(move || bcrypt::verify(password.as_str(), digest.as_str()))
            .await
            .map_err(|err| Error::internal(format!("password verify task failed: {err}")))?
            .map_err(|err| Error::internal(format!("stored digest unreadable: {err}")))
    }

    async fn store_credential(&self, account: AccountId, password: &str) -> Result<(), Error> {
        let digest = self.hash(password).await?;
        self.credentials
            .insert(account, &digest)
            .await
            .map_err(Self::map_credential_error)
    }

    async fn remove_orphan(&self, account: AccountId) {
        if let Err(err) = self.accounts.delete(account).await {
            warn!(account_id = %account, error = %err, "failed to remove account after credential failure");
        }
    }

    fn rejected(reason: &str, email: &str) -> Error {
        debug!(email, reason, "login rejected");
        Error::unauthorized(INVALID_CREDENTIALS)
    }
}

#[async_trait]
impl<A, C> AccountService for CredentialService<A, C>
where
    A: AccountRepository,
    C: CredentialRepository,
{
    async fn register(&self, registration: Registration) -> Result<Account, Error> {
        let email = registration.account().email.as_str();
        if self
            .accounts
            .email_exists(email)
            .await
            .map_err(Self::map_account_error)?
        {
            return Err(Error::invalid_request("email already registered"));
        }

        let account = self
            .accounts
            .insert(registration.account())
            .await
            .map_err(Self::map_account_error)?;

        if let Err(err) = self.store_credential(account.id, registration.password()).await {
            self.remove_orphan(account.id).await;
            return Err(err);
        }
        Ok(account)
    }

    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Account, Error> {
        let email = credentials.email();
        let mut accounts = match self.accounts.find_by_email(email).await {
            Ok(accounts) => accounts,
            Err(err) => {
                warn!(error = %err, "account lookup failed during login");
                return Err(Self::rejected("account lookup failed", email));
            }
        };
        if accounts.len() != 1 {
            let reason = if accounts.is_empty() {
                "no such account"
            } else {
                "duplicate accounts"
            };
            return Err(Self::rejected(reason, email));
        }
        let account = accounts.remove(0);

        let mut digests = match self.credentials.find_by_account(account.id).await {
            Ok(digests) => digests,
            Err(err) => {
                warn!(error = %err, "credential lookup failed during login");
                return Err(Self::rejected("credential lookup failed", email));
            }
        };
        if digests.len() != 1 {
            return Err(Self::rejected("credential count is not one", email));
        }
        let digest = digests.remove(0);

        match Self::verify(credentials.password(), digest).await {
            Ok(true) => Ok(account),
            Ok(false) => Err(Self::rejected("password mismatch", email)),
            Err(err) => {
                warn!(error = %err, "password verification failed");
                Err(Self::rejected("verification error", email))
            }
        }
    }
}

#[cfg(test)]
#[path = "credentials_tests.rs"]
mod tests;
