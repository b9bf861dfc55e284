//! Login credentials supplied over basic auth.
//!
//! Validation here only checks shape. Whether the pair matches a stored
//! credential is decided by [`CredentialService`](crate::domain::CredentialService).

use std::fmt;

use zeroize::Zeroizing;

/// Shape errors for a login attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Email was blank once trimmed.
    EmptyEmail,
    /// Password was empty.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Email and password pair.
///
/// The password is held in zeroizing storage and never trimmed.
///
/// # Examples
/// ```
/// use pixbin::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" ada@example.com", "pw").unwrap();
/// assert_eq!(creds.email(), "ada@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Validate raw inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(LoginValidationError::EmptyEmail);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            email: email.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Email used for the account lookup.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Plaintext password.
    pub fn password(&self) -> &str {
        &self.password
    }
}
