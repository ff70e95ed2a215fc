//! HTTP handlers for travel-service.

pub mod bookings;
pub mod listings;
pub mod payments;
pub mod reviews;

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;

/// Health check endpoint for liveness probes.
pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "service": "travel-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// Readiness check endpoint.
pub async fn readiness_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ready" })))
}

/// Common pagination query parameters for list endpoints.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

pub(crate) fn default_limit() -> i64 {
    50
}
