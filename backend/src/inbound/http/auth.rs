//! Caller authentication for HTTP handlers.
//!
//! Protected handlers take an [`AuthenticatedCaller`]. The token is read from
//! the `token` cookie first and the `Authorization: Bearer` header second;
//! when both are present the cookie wins, even if it is invalid.
//!
//! `/auth` uses HTTP basic auth instead, parsed by [`basic_credentials`].

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use futures_util::future::{Ready, ready};
use tracing::debug;

use super::state::HttpState;
use crate::domain::{AccountId, Error, LoginCredentials};

/// Cookie carrying the bearer token.
pub const TOKEN_COOKIE: &str = "token";

/// Caller resolved from a valid token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedCaller {
    pub id: AccountId,
    pub email: String,
}

/// Raw token presented by the request, cookie first.
fn presented_token(req: &HttpRequest) -> Option<String> {
    if let Some(cookie) = req.cookie(TOKEN_COOKIE) {
        return Some(cookie.value().to_owned());
    }
    let header = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = header.trim().split_once(' ')?;
    scheme
        .eq_ignore_ascii_case("bearer")
        .then(|| token.trim().to_owned())
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedCaller, Error> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("HTTP state not configured"))?;
    let token = presented_token(req)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            Error::unauthorized("missing token; sign in and send the token cookie or a bearer header")
        })?;
    let claims = state.tokens.validate(&token)?;
    Ok(AuthenticatedCaller {
        id: claims.uid,
        email: claims.email,
    })
}

impl FromRequest for AuthenticatedCaller {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

/// Credentials from an `Authorization: Basic` header.
///
/// # Errors
/// Every malformed or missing header is reported as unauthorized.
pub fn basic_credentials(req: &HttpRequest) -> Result<LoginCredentials, Error> {
    let rejected = |reason: &str| {
        debug!(reason, "basic auth rejected");
        Error::unauthorized("basic authentication required")
    };
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| rejected("missing header"))?
        .to_str()
        .map_err(|_| rejected("non-ascii header"))?;
    let (scheme, encoded) = header
        .trim()
        .split_once(' ')
        .ok_or_else(|| rejected("missing scheme"))?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return Err(rejected("wrong scheme"));
    }
    let decoded = STANDARD
        .decode(encoded.trim())
        .map_err(|_| rejected("invalid base64"))?;
    let decoded = zeroize::Zeroizing::new(
        String::from_utf8(decoded).map_err(|_| rejected("invalid utf-8"))?,
    );
    let (email, password) = decoded
        .split_once(':')
        .ok_or_else(|| rejected("missing separator"))?;
    LoginCredentials::try_from_parts(email, password).map_err(|_| rejected("empty field"))
}
