//! Accounts and registration input.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// Store-assigned account identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(i64);

impl AccountId {
    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Raw identifier.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for AccountId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// Persisted account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: AccountId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Account fields prior to insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl NewAccount {
    /// Attach the store-assigned identifier.
    #[must_use]
    pub fn into_account(self, id: AccountId) -> Account {
        Account {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
        }
    }
}

/// Field that failed registration validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationValidationError {
    #[error("firstname must not be empty")]
    MissingFirstName,
    #[error("lastname must not be empty")]
    MissingLastName,
    #[error("email must not be empty")]
    MissingEmail,
    #[error("password must not be empty")]
    MissingPassword,
}

impl RegistrationValidationError {
    /// Form field name the error refers to.
    #[must_use]
    pub const fn field(self) -> &'static str {
        match self {
            Self::MissingFirstName => "firstname",
            Self::MissingLastName => "lastname",
            Self::MissingEmail => "email",
            Self::MissingPassword => "password",
        }
    }
}

/// Validated registration request.
///
/// ## Invariants
/// - Names and email are trimmed and non-empty.
/// - The password is non-empty and kept verbatim in zeroizing storage.
///
/// # Examples
/// ```
/// use pixbin::domain::Registration;
///
/// let reg = Registration::try_from_parts("Ada", "Lovelace", " ada@example.com ", "pw")
///     .expect("complete form");
/// assert_eq!(reg.account().email, "ada@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    account: NewAccount,
    password: Zeroizing<String>,
}

impl Registration {
    /// Validate raw form values.
    ///
    /// # Errors
    /// Returns the first missing field in form order.
    pub fn try_from_parts(
        first_name: &str,
        last_name: &str,
        email: &str,
        password: &str,
    ) -> Result<Self, RegistrationValidationError> {
        let first_name = required(first_name, RegistrationValidationError::MissingFirstName)?;
        let last_name = required(last_name, RegistrationValidationError::MissingLastName)?;
        let email = required(email, RegistrationValidationError::MissingEmail)?;
        if password.is_empty() {
            return Err(RegistrationValidationError::MissingPassword);
        }

        Ok(Self {
            account: NewAccount {
                first_name,
                last_name,
                email,
            },
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Account fields to insert.
    pub fn account(&self) -> &NewAccount {
        &self.account
    }

    /// Plaintext password.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

fn required(value: &str, missing: RegistrationValidationError) -> Result<String, RegistrationValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(missing)
    } else {
        Ok(trimmed.to_owned())
    }
}
