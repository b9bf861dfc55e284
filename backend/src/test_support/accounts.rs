//! In-memory account and credential repositories.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use super::lock;
use crate::domain::ports::{
    AccountRepository, AccountRepositoryError, CredentialRepository, CredentialRepositoryError,
};
use crate::domain::{Account, AccountId, NewAccount, PasswordDigest};

/// Account repository operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountOp {
    Insert,
    Delete,
    FindByEmail,
    EmailExists,
}

#[derive(Default)]
struct AccountState {
    rows: Vec<Account>,
    last_id: i64,
    failing: HashSet<AccountOp>,
}

/// Account table with a unique email constraint.
#[derive(Default)]
pub struct InMemoryAccountRepository(Mutex<AccountState>);

impl InMemoryAccountRepository {
    /// Make every later call to `op` fail with a query error.
    pub fn fail_on(&self, op: AccountOp) {
        lock(&self.0).failing.insert(op);
    }

    /// Snapshot of stored accounts in insertion order.
    pub fn accounts(&self) -> Vec<Account> {
        lock(&self.0).rows.clone()
    }

    fn check(&self, op: AccountOp) -> Result<(), AccountRepositoryError> {
        if lock(&self.0).failing.contains(&op) {
            Err(AccountRepositoryError::query(format!("injected {op:?} failure")))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn insert(&self, account: &NewAccount) -> Result<Account, AccountRepositoryError> {
        self.check(AccountOp::Insert)?;
        let mut state = lock(&self.0);
        if state.rows.iter().any(|row| row.email == account.email) {
            return Err(AccountRepositoryError::duplicate_email(account.email.clone()));
        }
        state.last_id += 1;
        let stored = account.clone().into_account(AccountId::new(state.last_id));
        state.rows.push(stored.clone());
        Ok(stored)
    }

    async fn delete(&self, id: AccountId) -> Result<(), AccountRepositoryError> {
        self.check(AccountOp::Delete)?;
        lock(&self.0).rows.retain(|row| row.id != id);
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Vec<Account>, AccountRepositoryError> {
        self.check(AccountOp::FindByEmail)?;
        Ok(lock(&self.0)
            .rows
            .iter()
            .filter(|row| row.email == email)
            .cloned()
            .collect())
    }

    async fn email_exists(&self, email: &str) -> Result<bool, AccountRepositoryError> {
        self.check(AccountOp::EmailExists)?;
        Ok(lock(&self.0).rows.iter().any(|row| row.email == email))
    }
}

/// Credential table keyed by account; at most one digest each.
#[derive(Default)]
pub struct InMemoryCredentialRepository(Mutex<HashMap<AccountId, PasswordDigest>>);

impl InMemoryCredentialRepository {
    /// Digests stored for `account`.
    pub fn digests_for(&self, account: AccountId) -> Vec<PasswordDigest> {
        lock(&self.0).get(&account).cloned().into_iter().collect()
    }
}

#[async_trait]
impl CredentialRepository for InMemoryCredentialRepository {
    async fn insert(
        &self,
        account: AccountId,
        digest: &PasswordDigest,
    ) -> Result<(), CredentialRepositoryError> {
        match lock(&self.0).entry(account) {
            Entry::Occupied(_) => Err(CredentialRepositoryError::duplicate(account.get())),
            Entry::Vacant(slot) => {
                slot.insert(digest.clone());
                Ok(())
            }
        }
    }

    async fn find_by_account(
        &self,
        account: AccountId,
    ) -> Result<Vec<PasswordDigest>, CredentialRepositoryError> {
        Ok(self.digests_for(account))
    }
}
