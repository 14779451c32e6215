//! Health check handler

use axum::http::StatusCode;

#[utoipa::path(
    get,
    path = "/auth/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is running", body = String)
    )
)]
pub async fn health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, "Authentication Service is running")
}
