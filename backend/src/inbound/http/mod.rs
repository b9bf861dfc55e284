//! HTTP inbound adapter exposing REST endpoints.

pub mod accounts;
pub mod auth;
pub mod error;
pub mod health;
pub mod images;
pub mod multipart;
pub mod schemas;
pub mod state;

pub use error::ApiResult;

use actix_web::error::JsonPayloadError;
use actix_web::http::Method;
use actix_web::middleware::DefaultHeaders;
use actix_web::{HttpRequest, HttpResponse, web};
use tracing::debug;

use crate::domain::Error;

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

/// Permissive CORS headers added to every response.
pub fn cors_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("Access-Control-Allow-Origin", "*"))
        .add((
            "Access-Control-Allow-Methods",
            "POST, GET, OPTIONS, PUT, DELETE",
        ))
        .add((
            "Access-Control-Allow-Headers",
            "Accept, Content-Type, Content-Length, Accept-Encoding, X-CSRF-Token, Authorization",
        ))
}

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    debug!(error = %err, "rejected JSON body");
    Error::invalid_request(format!("invalid JSON body: {err}")).into()
}

/// Answer CORS preflight requests for any path; everything else is 404.
async fn preflight_or_not_found(req: HttpRequest) -> ApiResult<HttpResponse> {
    if req.method() == Method::OPTIONS {
        Ok(HttpResponse::Ok().finish())
    } else {
        Err(Error::not_found(format!("no route for {}", req.path())))
    }
}

/// Register the public API: body limits, JSON errors, and every handler.
///
/// Callers supply `web::Data<HttpState>` and wrap the app with tracing and
/// [`cors_headers`].
///
/// # Examples
/// ```ignore
/// let app = App::new()
///     .app_data(web::Data::new(state))
///     .wrap(cors_headers())
///     .configure(configure);
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::PayloadConfig::new(MAX_BODY_BYTES))
        .app_data(
            web::JsonConfig::default()
                .limit(MAX_BODY_BYTES)
                .error_handler(json_error),
        )
        .service(health::ping)
        .service(accounts::register)
        .service(accounts::sign_in)
        .service(images::upload_image)
        .service(images::list_image_meta)
        .service(images::get_image)
        .service(images::update_image)
        .service(images::delete_image)
        .default_service(web::route().to(preflight_or_not_found));
}
