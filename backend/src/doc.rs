//! OpenAPI document for the REST API.
//!
//! Paths come from the inbound handlers; wire schemas come from
//! [`crate::inbound::http::schemas`] so domain types stay free of `utoipa`.
//! Served by Swagger UI in debug builds and printed by `openapi-dump`.

use crate::inbound::http::health::Pong;
use crate::inbound::http::schemas::{
    ErrorCodeSchema, ErrorSchema, ImageMeta, ImagePage, RegisterForm, ShareableValue,
    TokenResponse, UpdateImageRequest, UploadForm,
};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Token security schemes: cookie, bearer header, and basic for `/auth`.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "TokenCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "token",
                "Token cookie set by POST /register and GET /auth.",
            ))),
        );
        components.add_security_scheme(
            "BearerToken",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        components.add_security_scheme(
            "basic",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Basic).build()),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "pixbin API",
        description = "Register, sign in, and store, search, and share PNG and JPEG images."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("TokenCookie" = []), ("BearerToken" = [])),
    paths(
        crate::inbound::http::accounts::register,
        crate::inbound::http::accounts::sign_in,
        crate::inbound::http::images::upload_image,
        crate::inbound::http::images::list_image_meta,
        crate::inbound::http::images::get_image,
        crate::inbound::http::images::update_image,
        crate::inbound::http::images::delete_image,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
        crate::inbound::http::health::ping,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        ImageMeta,
        ImagePage,
        TokenResponse,
        UpdateImageRequest,
        ShareableValue,
        RegisterForm,
        UploadForm,
        Pong
    )),
    tags(
        (name = "accounts", description = "Registration and sign-in"),
        (name = "images", description = "Image upload, retrieval, and search"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
