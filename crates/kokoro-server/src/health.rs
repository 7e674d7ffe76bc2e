use axum::response::IntoResponse;
use http::StatusCode;

/// Worker liveness handler
///
/// Reports that the job server is up; backend readiness is probed per job.
pub async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}
