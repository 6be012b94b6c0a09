use axum::{http::StatusCode, response::IntoResponse};

/// GET /health - Liveness check; does not touch the upstreams
pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
