//! Driving port for bearer tokens.

use crate::domain::{AccountId, Claims, Error, IssuedToken};

/// Issues and validates signed session tokens.
#[cfg_attr(test, mockall::automock)]
pub trait TokenAuthority: Send + Sync {
    /// Sign a fresh token for `uid`.
    fn issue(&self, uid: AccountId, email: &str) -> Result<IssuedToken, Error>;

    /// Verify signature and expiry, returning the embedded claims.
    fn validate(&self, token: &str) -> Result<Claims, Error>;
}
