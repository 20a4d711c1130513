//! Liveness probe.

use crate::api::dto::HealthResponse;
use axum::Json;

/// Reports that the server is accepting requests.
#[expect(clippy::unused_async, reason = "axum handlers are async functions")]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}
