//! Signed bearer tokens.
//!
//! Tokens are HS256 JWTs carrying the account id and email. They live for
//! [`TOKEN_LIFETIME_MINUTES`] from issuance. Expiry is checked against the
//! injected clock rather than the system time so tests can move time.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use tracing::debug;
use zeroize::Zeroizing;

use super::ports::TokenAuthority;
use super::{AccountId, Error};

/// Lifetime of an issued token.
pub const TOKEN_LIFETIME_MINUTES: i64 = 30;

/// Claims embedded in every token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub uid: AccountId,
    pub email: String,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

/// Token string plus its expiry instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// HS256 token issuer and validator keyed by a shared secret.
pub struct JwtTokenService {
    secret: Zeroizing<Vec<u8>>,
    clock: Arc<dyn Clock>,
}

impl JwtTokenService {
    /// Build a service over `secret`.
    pub fn new(secret: &[u8], clock: Arc<dyn Clock>) -> Self {
        Self {
            secret: Zeroizing::new(secret.to_vec()),
            clock,
        }
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);
        validation
    }
}

impl TokenAuthority for JwtTokenService {
    fn issue(&self, uid: AccountId, email: &str) -> Result<IssuedToken, Error> {
        let issued_at = self.clock.utc();
        let expires_at = issued_at + TimeDelta::minutes(TOKEN_LIFETIME_MINUTES);
        let claims = Claims {
            uid,
            email: email.to_owned(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&self.secret),
        )
        .map_err(|err| {
            tracing::error!(error = %err, "failed to sign token");
            Error::internal("failed to issue token")
        })?;
        Ok(IssuedToken { token, expires_at })
    }

    fn validate(&self, token: &str) -> Result<Claims, Error> {
        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(&self.secret),
            &Self::validation(),
        )
        .map_err(|err| {
            debug!(error = %err, "rejected token");
            Error::unauthorized("invalid token")
        })?;

        let claims = decoded.claims;
        if self.clock.utc().timestamp() >= claims.exp {
            debug!(uid = %claims.uid, exp = claims.exp, "rejected expired token");
            return Err(Error::unauthorized("token expired"));
        }
        Ok(claims)
    }
}
