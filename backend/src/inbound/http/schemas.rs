//! Wire shapes for the HTTP adapter and their OpenAPI schemas.
//!
//! Domain types stay free of serde field naming and `ToSchema`. The JSON
//! field names here (`uid`, `ref`, `imageMeta`, ...) are the public contract.

use chrono::SecondsFormat;
use pagination::Page;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{IssuedToken, MediaPatch, MediaRecord};

use super::auth::TOKEN_COOKIE;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// Malformed input, unsupported media, or an owner mismatch.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Missing or invalid credentials, or an access-policy denial.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// The referenced image does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// Storage or infrastructure failure.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "owner mismatch; check the image reference")]
    message: String,
    /// Correlation identifier, also sent as the `trace-id` header.
    #[schema(example = "7b0c4d62-2a6e-4c1f-9d1e-0f4f6a4c2b11")]
    trace_id: Option<String>,
    /// Supplementary details such as the offending form field.
    details: Option<serde_json::Value>,
}

/// Image metadata as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ImageMeta {
    #[schema(example = 41)]
    pub id: i64,
    /// Owner account id.
    #[schema(example = 7)]
    pub uid: i64,
    #[schema(example = "holiday.png")]
    pub title: String,
    /// Public locator of the bytes.
    #[serde(rename = "ref")]
    #[schema(example = "localhost:8000/image/7/41.png")]
    pub reference: String,
    /// Size in bytes.
    pub size: u64,
    #[schema(example = "image/png")]
    pub encoding: String,
    pub shareable: bool,
}

impl From<MediaRecord> for ImageMeta {
    fn from(record: MediaRecord) -> Self {
        Self {
            id: record.id.get(),
            uid: record.owner.get(),
            title: record.title,
            reference: record.reference,
            size: record.size,
            encoding: record.media_type.mime().to_owned(),
            shareable: record.shareable,
        }
    }
}

/// One page of image metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImagePage {
    /// Zero-based page index.
    pub page: u32,
    /// Fixed server page size.
    #[schema(example = 50)]
    pub page_size: u32,
    /// Matches across all pages.
    pub total_results: u64,
    pub image_meta: Vec<ImageMeta>,
}

impl From<Page<MediaRecord>> for ImagePage {
    fn from(page: Page<MediaRecord>) -> Self {
        let page = page.map(ImageMeta::from);
        Self {
            page: page.page(),
            page_size: page.page_size(),
            total_results: page.total_results(),
            image_meta: page.into_items(),
        }
    }
}

/// Token envelope returned by `/register` and `/auth`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    /// Always `token`, the cookie name.
    #[schema(example = "token")]
    pub name: String,
    pub token: String,
    /// RFC 3339 expiry instant.
    #[schema(example = "2026-03-01T12:30:00Z")]
    pub expiration: String,
}

impl From<&IssuedToken> for TokenResponse {
    fn from(issued: &IssuedToken) -> Self {
        Self {
            name: TOKEN_COOKIE.to_owned(),
            token: issued.token.clone(),
            expiration: issued.expires_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

/// `shareable` as sent by clients: a JSON boolean or the strings
/// `"true"` / `"false"`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum ShareableValue {
    Flag(bool),
    Text(String),
}

impl ShareableValue {
    /// Interpreted flag; unrecognised text means "leave unchanged".
    #[must_use]
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(flag) => Some(*flag),
            Self::Text(text) => match text.as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
        }
    }
}

/// Body of `PUT /image/{ownerId}/{ref}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, ToSchema)]
pub struct UpdateImageRequest {
    /// New title; empty means unchanged. The extension is replaced by the
    /// stored encoding's.
    #[schema(example = "renamed")]
    pub title: Option<String>,
    pub shareable: Option<ShareableValue>,
}

impl From<UpdateImageRequest> for MediaPatch {
    fn from(request: UpdateImageRequest) -> Self {
        Self {
            title: request.title,
            shareable: request.shareable.as_ref().and_then(ShareableValue::as_flag),
        }
    }
}

/// Multipart fields of `POST /register`.
#[derive(ToSchema)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct RegisterForm {
    firstname: String,
    lastname: String,
    email: String,
    #[schema(format = Password)]
    password: String,
}

/// Multipart fields of `POST /image`.
#[derive(ToSchema)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct UploadForm {
    /// PNG or JPEG bytes; the type is detected from content.
    #[schema(value_type = String, format = Binary)]
    image: Vec<u8>,
    /// Display title; defaults to the uploaded file name.
    title: Option<String>,
    /// `true` to let every signed-in user read the image.
    shareable: Option<String>,
}
