use http::StatusCode;

/// Domain errors that surface to job callers over HTTP
///
/// Feature crates implement this for their error types; the job server
/// turns them into responses, so domain code never depends on axum.
pub trait HttpError: std::error::Error {
    /// HTTP status code reported for a failed job
    fn status_code(&self) -> StatusCode;

    /// Machine-readable failure kind (e.g. `backend_unavailable`)
    fn error_kind(&self) -> &str;

    /// Message safe to expose to job callers
    fn client_message(&self) -> String {
        self.to_string()
    }
}
