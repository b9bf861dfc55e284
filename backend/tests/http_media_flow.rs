//! End-to-end HTTP flow over in-memory adapters.
//!
//! Register, sign in, upload, list, fetch, share, update, and delete through the
//! full application: tracing middleware, CORS headers, and every handler.

use actix_http::Request;
use actix_web::body::BoxBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::http::header::{AUTHORIZATION, CONTENT_TYPE};
use actix_web::{App, test, web};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use pixbin::Trace;
use pixbin::domain::TRACE_ID_HEADER;
use pixbin::inbound::http::{configure, cors_headers};
use pixbin::test_support::{FakeBackend, JPEG_BYTES, MultipartBody, PNG_BYTES};
use rstest::{fixture, rstest};
use serde_json::{Value, json};

#[fixture]
fn backend() -> FakeBackend {
    FakeBackend::new()
}

async fn init_app(
    backend: &FakeBackend,
) -> impl Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error> {
    test::init_service(
        App::new()
            .app_data(web::Data::new(backend.http_state()))
            .wrap(cors_headers())
            .wrap(Trace)
            .configure(configure),
    )
    .await
}

async fn register(
    app: &impl Service<Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
    email: &str,
) -> String {
    let body = MultipartBody::new()
        .text("firstname", "Test")
        .text("lastname", "User")
        .text("email", email)
        .text("password", "hunter2")
        .finish();
    let req = test::TestRequest::post()
        .uri("/register")
        .insert_header((CONTENT_TYPE, MultipartBody::content_type()))
        .set_payload(body)
        .to_request();
    let res = test::call_service(app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    body["token"].as_str().expect("token string").to_owned()
}

fn bearer(token: &str) -> (actix_web::http::header::HeaderName, String) {
    (AUTHORIZATION, format!("Bearer {token}"))
}

#[rstest]
#[actix_web::test]
async fn owner_lifecycle(backend: FakeBackend) {
    let app = init_app(&backend).await;
    register(&app, "owner@example.com").await;

    let basic = format!("Basic {}", STANDARD.encode("owner@example.com:hunter2"));
    let req = test::TestRequest::get()
        .uri("/auth")
        .insert_header((AUTHORIZATION, basic))
        .to_request();
    let signed_in: Value = test::call_and_read_body_json(&app, req).await;
    let token = signed_in["token"].as_str().expect("token").to_owned();

    let upload = MultipartBody::new()
        .file("image", "cat.jpg", "image/jpeg", JPEG_BYTES)
        .text("title", "cat")
        .finish();
    let req = test::TestRequest::post()
        .uri("/image")
        .insert_header(bearer(&token))
        .insert_header((CONTENT_TYPE, MultipartBody::content_type()))
        .set_payload(upload)
        .to_request();
    let meta: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(meta["title"], "cat.jpeg");
    let uid = meta["uid"].as_i64().expect("uid");
    let id = meta["id"].as_i64().expect("id");
    let path = format!("/image/{uid}/{id}.jpeg");
    assert!(meta["ref"].as_str().is_some_and(|r| r.ends_with(&path)));

    let req = test::TestRequest::get()
        .uri("/image/meta")
        .insert_header(bearer(&token))
        .to_request();
    let page: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page["totalResults"], 1);
    assert_eq!(page["imageMeta"][0], meta);

    let req = test::TestRequest::get()
        .uri(&path)
        .insert_header(bearer(&token))
        .to_request();
    let bytes = test::call_and_read_body(&app, req).await;
    assert_eq!(bytes.as_ref(), JPEG_BYTES);

    let req = test::TestRequest::put()
        .uri(&path)
        .insert_header(bearer(&token))
        .set_json(json!({"shareable": true}))
        .to_request();
    let updated: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(updated["shareable"], true);
    assert_eq!(updated["title"], "cat.jpeg");

    let req = test::TestRequest::delete()
        .uri(&path)
        .insert_header(bearer(&token))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    assert!(backend.media.records().is_empty());
    assert!(backend.blobs.is_empty());
}

#[rstest]
#[actix_web::test]
async fn sharing_between_two_accounts(backend: FakeBackend) {
    let app = init_app(&backend).await;
    let alice = register(&app, "alice@example.com").await;
    let bob = register(&app, "bob@example.com").await;

    for shareable in ["true", "false"] {
        let upload = MultipartBody::new()
            .file("image", "pic.png", "image/png", PNG_BYTES)
            .text("shareable", shareable)
            .finish();
        let req = test::TestRequest::post()
            .uri("/image")
            .insert_header(bearer(&alice))
            .insert_header((CONTENT_TYPE, MultipartBody::content_type()))
            .set_payload(upload)
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }

    let req = test::TestRequest::get()
        .uri("/image/meta")
        .insert_header(bearer(&bob))
        .to_request();
    let own: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(own["totalResults"], 0);

    let req = test::TestRequest::get()
        .uri("/image/meta?encoding=image/png")
        .insert_header(bearer(&bob))
        .to_request();
    let visible: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(visible["totalResults"], 1);
    assert_eq!(visible["imageMeta"][0]["shareable"], true);
}

#[rstest]
#[actix_web::test]
async fn shared_upload_is_served_byte_for_byte_to_another_account(backend: FakeBackend) {
    let app = init_app(&backend).await;
    let alice = register(&app, "alice@example.com").await;
    let bob = register(&app, "bob@example.com").await;

    let payload: &[u8] = b"\x89PNG\r\n\x1a\n\x01\x02";
    let upload = MultipartBody::new()
        .file("image", "a.bin", "application/octet-stream", payload)
        .text("shareable", "true")
        .finish();
    let req = test::TestRequest::post()
        .uri("/image")
        .insert_header(bearer(&alice))
        .insert_header((CONTENT_TYPE, MultipartBody::content_type()))
        .set_payload(upload)
        .to_request();
    let meta: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(meta["title"], "a.png");
    assert_eq!(meta["encoding"], "image/png");
    assert_eq!(meta["size"], 10);

    let uid = meta["uid"].as_i64().expect("uid");
    let id = meta["id"].as_i64().expect("id");
    let req = test::TestRequest::get()
        .uri(&format!("/image/{uid}/{id}.png"))
        .insert_header(bearer(&bob))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers().get(CONTENT_TYPE).and_then(|v| v.to_str().ok()),
        Some("image/png")
    );
    let bytes = test::read_body(res).await;
    assert_eq!(bytes.as_ref(), payload);
}

#[rstest]
#[actix_web::test]
async fn errors_carry_trace_id_and_cors_headers(backend: FakeBackend) {
    let app = init_app(&backend).await;

    let req = test::TestRequest::get().uri("/image/meta").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        res.headers()
            .get("Access-Control-Allow-Origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
    let header = res
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .expect("trace id header");
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["code"], "unauthorized");
    assert_eq!(body["traceId"].as_str(), Some(header.as_str()));
}

#[rstest]
#[actix_web::test]
async fn expired_session_must_sign_in_again(backend: FakeBackend) {
    let app = init_app(&backend).await;
    let token = register(&app, "owner@example.com").await;
    backend.clock.advance_seconds(31 * 60);

    let req = test::TestRequest::get()
        .uri("/image/meta")
        .insert_header(bearer(&token))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );
}
