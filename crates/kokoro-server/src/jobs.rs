use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::State,
    response::{IntoResponse, Response},
};
use http::StatusCode;
use kokoro_core::HttpError;
use tts::{Job, JobHandler, JobOutcome};

/// Run one job synchronously and return its outcome
///
/// Dropping the connection drops this future, which cancels the in-flight
/// backend request.
pub async fn run_sync(State(handler): State<Arc<JobHandler>>, body: Bytes) -> Response {
    let outcome = match Job::parse(&body) {
        Ok(job) => handler.run(job).await,
        Err(error) => {
            tracing::warn!("rejecting malformed job: {error}");

            JobOutcome {
                id: uuid::Uuid::new_v4().to_string(),
                result: Err(error.into()),
            }
        }
    };

    let status = match &outcome.result {
        Ok(_) => StatusCode::OK,
        Err(error) => error.status_code(),
    };

    (status, Json(outcome.response())).into_response()
}
