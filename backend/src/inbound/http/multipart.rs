//! `multipart/form-data` parsing over a collected request body.
//!
//! Actix buffers the body (bounded by the app's `PayloadConfig`), then
//! `multer` splits it into parts. Parts with a file name are kept as bytes;
//! the rest are decoded as UTF-8 text.

use std::collections::HashMap;

use actix_web::HttpRequest;
use actix_web::http::header::CONTENT_TYPE;
use bytes::Bytes;
use tracing::debug;

use crate::domain::Error;

/// Uploaded file part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Parsed form: text fields plus file parts, keyed by field name.
///
/// Repeated names keep the first occurrence.
#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, String>,
    files: HashMap<String, FilePart>,
}

impl MultipartForm {
    /// Text value of `name`, or an empty string when absent.
    pub fn text(&self, name: &str) -> &str {
        self.fields.get(name).map_or("", String::as_str)
    }

    /// Text value of `name`, if sent.
    pub fn optional_text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Remove and return the file sent under `name`.
    pub fn take_file(&mut self, name: &str) -> Option<FilePart> {
        self.files.remove(name)
    }
}

fn malformed(reason: impl std::fmt::Display) -> Error {
    debug!(%reason, "malformed multipart body");
    Error::invalid_request("expected a multipart/form-data body")
}

/// Parse `body` using the boundary from the request's `Content-Type`.
///
/// # Errors
/// Returns an invalid-request error when the content type is not multipart
/// or the body cannot be split into parts.
pub async fn parse_multipart(req: &HttpRequest, body: Bytes) -> Result<MultipartForm, Error> {
    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| malformed("missing content type"))?;
    let boundary = multer::parse_boundary(content_type).map_err(malformed)?;

    let mut multipart = multer::Multipart::new(
        futures::stream::once(async { Ok::<Bytes, multer::Error>(body) }),
        boundary,
    );

    let mut form = MultipartForm::default();
    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        if let Some(file_name) = field.file_name().map(str::to_owned) {
            let content_type = field.content_type().map(ToString::to_string);
            let bytes = field.bytes().await.map_err(malformed)?;
            form.files.entry(name).or_insert(FilePart {
                file_name: Some(file_name),
                content_type,
                bytes,
            });
        } else {
            let text = field.text().await.map_err(malformed)?;
            form.fields.entry(name).or_insert(text);
        }
    }
    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use actix_web::test::TestRequest;

    const BOUNDARY: &str = "XBOUNDARYX";

    fn body(parts: &[(&str, Option<&str>, &[u8])]) -> Bytes {
        let mut out = Vec::new();
        for (name, file_name, value) in parts {
            out.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match file_name {
                Some(file) => out.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                ),
                None => out.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                ),
            }
            out.extend_from_slice(value);
            out.extend_from_slice(b"\r\n");
        }
        out.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        Bytes::from(out)
    }

    fn multipart_request() -> HttpRequest {
        TestRequest::post()
            .insert_header((
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .to_http_request()
    }

    #[actix_web::test]
    async fn splits_text_and_file_parts() {
        let payload = body(&[
            ("title", None, &b"holiday"[..]),
            ("image", Some("a.bin"), &b"\x89PNG\r\n\x1a\n\x00\x01"[..]),
        ]);
        let mut form = parse_multipart(&multipart_request(), payload)
            .await
            .expect("parse");

        assert_eq!(form.text("title"), "holiday");
        assert_eq!(form.optional_text("shareable"), None);
        let file = form.take_file("image").expect("file part");
        assert_eq!(file.file_name.as_deref(), Some("a.bin"));
        assert_eq!(&file.bytes[..], b"\x89PNG\r\n\x1a\n\x00\x01");
        assert!(form.take_file("image").is_none());
    }

    #[actix_web::test]
    async fn non_multipart_content_type_is_invalid_request() {
        let req = TestRequest::post()
            .insert_header((CONTENT_TYPE, "application/json"))
            .to_http_request();
        let error = parse_multipart(&req, Bytes::from_static(b"{}"))
            .await
            .expect_err("not multipart");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }

    #[actix_web::test]
    async fn truncated_body_is_invalid_request() {
        let error = parse_multipart(
            &multipart_request(),
            Bytes::from_static(b"--XBOUNDARYX\r\nContent-Disposition: form-data; name=\"a\"\r\n\r\nunterminated"),
        )
        .await
        .expect_err("truncated");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }
}
