//! Account handlers.
//!
//! ```text
//! POST /register  multipart: firstname, lastname, email, password
//! GET  /auth      Authorization: Basic base64(email:password)
//! ```
//!
//! Both answer with a fresh token, set as the `token` cookie and echoed in
//! the body.

use actix_web::cookie::time::{Duration as CookieDuration, OffsetDateTime};
use actix_web::cookie::{Cookie, Expiration};
use actix_web::{HttpRequest, HttpResponse, get, post, web};
use serde_json::json;

use super::ApiResult;
use super::auth::{TOKEN_COOKIE, basic_credentials};
use super::multipart::parse_multipart;
use super::schemas::{ErrorSchema, RegisterForm, TokenResponse};
use super::state::HttpState;
use crate::domain::{
    AccountId, Error, Registration, RegistrationValidationError, TOKEN_LIFETIME_MINUTES,
};

fn map_registration_error(err: RegistrationValidationError) -> Error {
    Error::invalid_request(err.to_string()).with_details(json!({ "field": err.field() }))
}

/// Issue a token for `uid` and wrap it in the cookie plus JSON envelope.
fn token_response(state: &HttpState, uid: AccountId, email: &str) -> ApiResult<HttpResponse> {
    let issued = state.tokens.issue(uid, email)?;
    let expires = OffsetDateTime::from_unix_timestamp(issued.expires_at.timestamp())
        .map_or(Expiration::Session, Expiration::DateTime);
    let cookie = Cookie::build(TOKEN_COOKIE, issued.token.clone())
        .path("/")
        .http_only(true)
        .expires(expires)
        .max_age(CookieDuration::minutes(TOKEN_LIFETIME_MINUTES))
        .finish();
    Ok(HttpResponse::Ok()
        .cookie(cookie)
        .json(TokenResponse::from(&issued)))
}

/// Create an account and sign the new user in.
#[utoipa::path(
    post,
    path = "/register",
    request_body(content = RegisterForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Account created", body = TokenResponse,
            headers(("Set-Cookie" = String, description = "Token cookie"))),
        (status = 400, description = "Missing field or email already registered", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    req: HttpRequest,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let form = parse_multipart(&req, body).await?;
    let registration = Registration::try_from_parts(
        form.text("firstname"),
        form.text("lastname"),
        form.text("email"),
        form.text("password"),
    )
    .map_err(map_registration_error)?;
    let account = state.accounts.register(registration).await?;
    token_response(&state, account.id, &account.email)
}

/// Exchange basic-auth credentials for a token.
#[utoipa::path(
    get,
    path = "/auth",
    responses(
        (status = 200, description = "Signed in", body = TokenResponse,
            headers(("Set-Cookie" = String, description = "Token cookie"))),
        (status = 401, description = "Missing or invalid credentials", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "signIn",
    security(("basic" = []))
)]
#[get("/auth")]
pub async fn sign_in(state: web::Data<HttpState>, req: HttpRequest) -> ApiResult<HttpResponse> {
    let credentials = basic_credentials(&req)?;
    let account = state.accounts.authenticate(&credentials).await?;
    token_response(&state, account.id, &account.email)
}
