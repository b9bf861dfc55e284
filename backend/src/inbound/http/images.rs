//! Image handlers.
//!
//! ```text
//! POST   /image                     multipart: image, title?, shareable?
//! GET    /image/{ownerId}/{ref}     raw bytes
//! PUT    /image/{ownerId}/{ref}     {"title": "...", "shareable": true}
//! DELETE /image/{ownerId}/{ref}
//! GET    /image/meta?uid=&title=&encoding=&shareable=&id=&page=
//! ```
//!
//! Every route needs a token. `{ref}` is the record id, optionally followed
//! by an extension (`41` or `41.png`).

use std::collections::HashMap;

use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};
use pagination::PageIndex;
use tracing::debug;

use super::ApiResult;
use super::auth::AuthenticatedCaller;
use super::multipart::parse_multipart;
use super::schemas::{ErrorSchema, ImageMeta, ImagePage, UpdateImageRequest, UploadForm};
use super::state::HttpState;
use crate::domain::ports::UploadRequest;
use crate::domain::{Error, MediaFilters, MediaLocator};

/// Path segments addressing one image.
#[derive(Debug, serde::Deserialize)]
pub struct ImagePath {
    owner_id: String,
    reference: String,
}

impl ImagePath {
    fn locator(&self) -> Result<MediaLocator, Error> {
        MediaLocator::parse(&self.owner_id, &self.reference).map_err(|err| {
            debug!(owner = %self.owner_id, reference = %self.reference, %err, "bad image path");
            Error::invalid_request(err.to_string())
        })
    }
}

/// Store an uploaded PNG or JPEG.
#[utoipa::path(
    post,
    path = "/image",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Stored image metadata", body = ImageMeta),
        (status = 400, description = "Missing image part or unsupported type", body = ErrorSchema),
        (status = 401, description = "Missing or invalid token", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["images"],
    operation_id = "uploadImage"
)]
#[post("/image")]
pub async fn upload_image(
    state: web::Data<HttpState>,
    caller: AuthenticatedCaller,
    req: HttpRequest,
    body: web::Bytes,
) -> ApiResult<web::Json<ImageMeta>> {
    let mut form = parse_multipart(&req, body).await?;
    let image = form
        .take_file("image")
        .ok_or_else(|| Error::invalid_request("missing image part"))?;
    let request = UploadRequest {
        owner: caller.id,
        bytes: image.bytes.to_vec(),
        title: form
            .optional_text("title")
            .filter(|title| !title.trim().is_empty())
            .map(str::to_owned),
        file_name: image.file_name,
        shareable: form.text("shareable") == "true",
    };
    let record = state.media.upload(request).await?;
    Ok(web::Json(ImageMeta::from(record)))
}

/// Image page listing.
///
/// Without filters only the caller's images are listed. With any filter,
/// matches owned by the caller or flagged shareable are listed.
#[utoipa::path(
    get,
    path = "/image/meta",
    params(
        ("id" = Option<i64>, Query, description = "Exact image id"),
        ("uid" = Option<i64>, Query, description = "Owner account id"),
        ("title" = Option<String>, Query, description = "Exact title"),
        ("encoding" = Option<String>, Query, description = "Exact MIME type"),
        ("shareable" = Option<bool>, Query, description = "Shareable flag"),
        ("page" = Option<u32>, Query, description = "Zero-based page; malformed values mean 0")
    ),
    responses(
        (status = 200, description = "Page of image metadata", body = ImagePage),
        (status = 400, description = "Malformed filter", body = ErrorSchema),
        (status = 401, description = "Missing or invalid token", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["images"],
    operation_id = "listImageMeta"
)]
#[get("/image/meta")]
pub async fn list_image_meta(
    state: web::Data<HttpState>,
    caller: AuthenticatedCaller,
    query: web::Query<HashMap<String, String>>,
) -> ApiResult<web::Json<ImagePage>> {
    let params = query.into_inner();
    let filters = MediaFilters::from_params(&params)?;
    let page = PageIndex::parse_lenient(params.get("page").map(String::as_str));
    let results = state.media_query.search(caller.id, filters, page).await?;
    Ok(web::Json(ImagePage::from(results)))
}

/// Raw image bytes.
#[utoipa::path(
    get,
    path = "/image/{owner_id}/{reference}",
    params(
        ("owner_id" = i64, Path, description = "Owner account id"),
        ("reference" = String, Path, description = "Image id with optional extension")
    ),
    responses(
        (status = 200, description = "Image bytes", content(
            (Vec<u8> = "image/png"),
            (Vec<u8> = "image/jpeg")
        )),
        (status = 400, description = "Malformed path or owner mismatch", body = ErrorSchema),
        (status = 401, description = "Private image or missing token", body = ErrorSchema),
        (status = 404, description = "No such image", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["images"],
    operation_id = "getImage"
)]
#[get("/image/{owner_id}/{reference}")]
pub async fn get_image(
    state: web::Data<HttpState>,
    caller: AuthenticatedCaller,
    path: web::Path<ImagePath>,
) -> ApiResult<HttpResponse> {
    let locator = path.locator()?;
    let content = state.media_query.fetch_content(caller.id, locator).await?;
    Ok(HttpResponse::Ok()
        .content_type(content.media_type.mime())
        .body(content.bytes))
}

/// Rename an image or change its shareable flag.
#[utoipa::path(
    put,
    path = "/image/{owner_id}/{reference}",
    params(
        ("owner_id" = i64, Path, description = "Owner account id"),
        ("reference" = String, Path, description = "Image id with optional extension")
    ),
    request_body = UpdateImageRequest,
    responses(
        (status = 200, description = "Updated metadata", body = ImageMeta),
        (status = 400, description = "Malformed path, body, or owner mismatch", body = ErrorSchema),
        (status = 401, description = "Not the owner or missing token", body = ErrorSchema),
        (status = 404, description = "No such image", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["images"],
    operation_id = "updateImage"
)]
#[put("/image/{owner_id}/{reference}")]
pub async fn update_image(
    state: web::Data<HttpState>,
    caller: AuthenticatedCaller,
    path: web::Path<ImagePath>,
    payload: web::Json<UpdateImageRequest>,
) -> ApiResult<web::Json<ImageMeta>> {
    let locator = path.locator()?;
    let record = state
        .media
        .update(caller.id, locator, payload.into_inner().into())
        .await?;
    Ok(web::Json(ImageMeta::from(record)))
}

/// Delete an image and its bytes.
#[utoipa::path(
    delete,
    path = "/image/{owner_id}/{reference}",
    params(
        ("owner_id" = i64, Path, description = "Owner account id"),
        ("reference" = String, Path, description = "Image id with optional extension")
    ),
    responses(
        (status = 200, description = "Deleted"),
        (status = 400, description = "Malformed path or owner mismatch", body = ErrorSchema),
        (status = 401, description = "Not the owner or missing token", body = ErrorSchema),
        (status = 404, description = "No such image", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["images"],
    operation_id = "deleteImage"
)]
#[delete("/image/{owner_id}/{reference}")]
pub async fn delete_image(
    state: web::Data<HttpState>,
    caller: AuthenticatedCaller,
    path: web::Path<ImagePath>,
) -> ApiResult<HttpResponse> {
    let locator = path.locator()?;
    state.media.delete(caller.id, locator).await?;
    Ok(HttpResponse::Ok().finish())
}

#[cfg(test)]
#[path = "images_tests.rs"]
mod tests;
