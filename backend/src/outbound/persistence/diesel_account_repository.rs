//! PostgreSQL-backed account and credential repositories.

use async_trait::async_trait;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{
    AccountRepository, AccountRepositoryError, CredentialRepository, CredentialRepositoryError,
};
use crate::domain::{Account, AccountId, NewAccount, PasswordDigest};

use super::error_mapping::{is_unique_violation, map_diesel_error};
use super::models::{AccountRow, NewAccountRow, NewCredentialRow};
use super::pool::{DbPool, PoolError};
use super::schema::{user_meta, user_pass};

/// Diesel implementation of [`AccountRepository`] over `user_meta`.
#[derive(Clone)]
pub struct DieselAccountRepository {
    pool: DbPool,
}

impl DieselAccountRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn account_pool_error(error: PoolError) -> AccountRepositoryError {
    AccountRepositoryError::connection(error.into_message())
}

fn account_error(error: diesel::result::Error, operation: &'static str) -> AccountRepositoryError {
    map_diesel_error(
        error,
        operation,
        AccountRepositoryError::query,
        AccountRepositoryError::connection,
    )
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Self {
            id: AccountId::new(row.id),
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
        }
    }
}

#[async_trait]
impl AccountRepository for DieselAccountRepository {
    async fn insert(&self, account: &NewAccount) -> Result<Account, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(account_pool_error)?;
        let row = NewAccountRow {
            first_name: &account.first_name,
            last_name: &account.last_name,
            email: &account.email,
        };
        diesel::insert_into(user_meta::table)
            .values(&row)
            .returning(AccountRow::as_returning())
            .get_result::<AccountRow>(&mut conn)
            .await
            .map(Account::from)
            .map_err(|err| {
                if is_unique_violation(&err) {
                    AccountRepositoryError::duplicate_email(account.email.as_str())
                } else {
                    account_error(err, "insert account")
                }
            })
    }

    async fn delete(&self, id: AccountId) -> Result<(), AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(account_pool_error)?;
        diesel::delete(user_meta::table.find(id.get()))
            .execute(&mut conn)
            .await
            .map(drop)
            .map_err(|err| account_error(err, "delete account"))
    }

    async fn find_by_email(&self, email: &str) -> Result<Vec<Account>, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(account_pool_error)?;
        let rows = user_meta::table
            .filter(user_meta::email.eq(email))
            .select(AccountRow::as_select())
            .load::<AccountRow>(&mut conn)
            .await
            .map_err(|err| account_error(err, "find account by email"))?;
        Ok(rows.into_iter().map(Account::from).collect())
    }

    async fn email_exists(&self, email: &str) -> Result<bool, AccountRepositoryError> {
        let mut conn = self.pool.get().await.map_err(account_pool_error)?;
        diesel::select(exists(user_meta::table.filter(user_meta::email.eq(email))))
            .get_result::<bool>(&mut conn)
            .await
            .map_err(|err| account_error(err, "check email"))
    }
}

/// Diesel implementation of [`CredentialRepository`] over `user_pass`.
#[derive(Clone)]
pub struct DieselCredentialRepository {
    pool: DbPool,
}

impl DieselCredentialRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn credential_pool_error(error: PoolError) -> CredentialRepositoryError {
    CredentialRepositoryError::connection(error.into_message())
}

fn credential_error(
    error: diesel::result::Error,
    operation: &'static str,
) -> CredentialRepositoryError {
    map_diesel_error(
        error,
        operation,
        CredentialRepositoryError::query,
        CredentialRepositoryError::connection,
    )
}

fn credential_insert_error(
    error: diesel::result::Error,
    account: AccountId,
) -> CredentialRepositoryError {
    if is_unique_violation(&error) {
        CredentialRepositoryError::duplicate(account.get())
    } else {
        credential_error(error, "insert credential")
    }
}

#[async_trait]
impl CredentialRepository for DieselCredentialRepository {
    async fn insert(
        &self,
        account: AccountId,
        digest: &PasswordDigest,
    ) -> Result<(), CredentialRepositoryError> {
        let mut conn = self.pool.get().await.map_err(credential_pool_error)?;
        let row = NewCredentialRow {
            account_id: account.get(),
            digest: digest.as_str(),
        };
        diesel::insert_into(user_pass::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(drop)
            .map_err(|err| credential_insert_error(err, account))
    }

    async fn find_by_account(
        &self,
        account: AccountId,
    ) -> Result<Vec<PasswordDigest>, CredentialRepositoryError> {
        let mut conn = self.pool.get().await.map_err(credential_pool_error)?;
        let digests = user_pass::table
            .filter(user_pass::account_id.eq(account.get()))
            .select(user_pass::digest)
            .load::<String>(&mut conn)
            .await
            .map_err(|err| credential_error(err, "find credential"))?;
        Ok(digests.into_iter().map(PasswordDigest::new).collect())
    }
}
