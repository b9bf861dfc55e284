//! Liveness, readiness, and ping probes.

use std::sync::atomic::{AtomicBool, Ordering};

use actix_web::http::header::{CacheControl, CacheDirective};
use actix_web::{HttpResponse, get, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Readiness flag flipped once the server is listening.
#[derive(Debug, Default)]
pub struct HealthState {
    ready: AtomicBool,
}

impl HealthState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }
}

fn no_store() -> CacheControl {
    CacheControl(vec![CacheDirective::NoStore])
}

/// Readiness probe.
#[utoipa::path(
    get,
    path = "/health/ready",
    responses(
        (status = 200, description = "Server is accepting requests"),
        (status = 503, description = "Server is still starting")
    ),
    tags = ["health"],
    operation_id = "ready",
    security([])
)]
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    let mut response = if state.is_ready() {
        HttpResponse::Ok()
    } else {
        HttpResponse::ServiceUnavailable()
    };
    response.insert_header(no_store()).finish()
}

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/health/live",
    responses((status = 200, description = "Process is alive")),
    tags = ["health"],
    operation_id = "live",
    security([])
)]
#[get("/health/live")]
pub async fn live() -> HttpResponse {
    HttpResponse::Ok().insert_header(no_store()).finish()
}

/// Body of `GET /ping`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Pong {
    #[schema(example = "pong")]
    pub message: String,
}

/// Unauthenticated connectivity check.
#[utoipa::path(
    get,
    path = "/ping",
    responses((status = 200, description = "Pong", body = Pong)),
    tags = ["health"],
    operation_id = "ping",
    security([])
)]
#[get("/ping")]
pub async fn ping() -> web::Json<Pong> {
    web::Json(Pong {
        message: "pong".to_owned(),
    })
}
