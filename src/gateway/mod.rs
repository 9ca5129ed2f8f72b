//! HTTP gateway (Axum) for question answering, ingestion and PDF upload.

pub mod error;
pub mod handler;
pub mod state;

#[cfg(test)]
mod handler_tests;

use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::constants::MAX_UPLOAD_BYTES;

pub use error::GatewayError;
pub use handler::{ask_handler, ingest_handler, upload_handler};
pub use state::AppState;

pub const GOVDOC_STATUS_HEADER: &str = "x-govdoc-status";
pub const GOVDOC_STATUS_OK: &str = "ok";
pub const GOVDOC_STATUS_ERROR: &str = "error";

const HSTS_VALUE: &str = "max-age=31536000; includeSubDomains; preload";

pub fn create_router_with_state(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health_handler))
        .route("/ask", post(ask_handler))
        .route("/ingest", post(ingest_handler))
        .route(
            "/upload",
            post(upload_handler).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .layer(SetResponseHeaderLayer::if_not_present(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static(HSTS_VALUE),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(GOVDOC_STATUS_HEADER, HeaderValue::from_static(GOVDOC_STATUS_OK));

    (
        StatusCode::OK,
        headers,
        Json(HealthResponse { status: "ok" }),
    )
        .into_response()
}
