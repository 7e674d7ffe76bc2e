use std::time::Duration;

use http::StatusCode;
use kokoro_core::HttpError;
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, JobError>;

/// Caller-supplied job input that cannot be forwarded to the backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Job wrapper or its `input` is not a JSON object
    #[error("{0}")]
    InvalidJob(String),

    /// Required field absent or empty
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Field present with an unusable type or value
    #[error("invalid field '{field}': {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// `stream: true` requested
    #[error("streaming is not supported, set 'stream' to false or omit it")]
    StreamingNotSupported,

    /// `speed` is zero, negative, or not finite
    #[error("invalid speed {0}: must be a positive number")]
    InvalidSpeed(String),

    /// `response_format` outside the supported set
    #[error("unsupported response_format '{0}'")]
    UnsupportedFormat(String),
}

/// Failure of the synthesis call itself
#[derive(Debug, Error)]
pub enum InvocationError {
    /// Backend answered with a non-success status
    #[error("backend rejected request ({status}): {body}")]
    BackendRejected { status: u16, body: String },

    /// Connection or transport failure
    #[error("backend unreachable: {0}")]
    BackendUnreachable(String),

    /// No complete response within the request timeout
    #[error("backend did not respond within {0:?}")]
    Timeout(Duration),
}

/// Terminal failure of a job
#[derive(Debug, Error)]
pub enum JobError {
    #[error("invalid job input: {0}")]
    Validation(#[from] ValidationError),

    #[error("backend did not become ready within {waited:?} ({attempts} probes)")]
    BackendUnavailable { waited: Duration, attempts: u32 },

    #[error("synthesis failed: {0}")]
    SynthesisFailed(#[from] InvocationError),
}

/// Failure category reported to job callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    BackendUnavailable,
    SynthesisFailed,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

impl JobError {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::BackendUnavailable { .. } => ErrorKind::BackendUnavailable,
            Self::SynthesisFailed(_) => ErrorKind::SynthesisFailed,
        }
    }

    /// Backend status code, when the backend rejected the request
    pub const fn backend_status(&self) -> Option<u16> {
        match self {
            Self::SynthesisFailed(InvocationError::BackendRejected { status, .. }) => Some(*status),
            _ => None,
        }
    }
}

impl HttpError for JobError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::BackendUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::SynthesisFailed(InvocationError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            Self::SynthesisFailed(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_kind(&self) -> &str {
        self.kind().as_str()
    }
}

/// Serializable form of a [`JobError`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructuredError {
    pub error_kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

impl From<&JobError> for StructuredError {
    fn from(error: &JobError) -> Self {
        Self {
            error_kind: error.kind(),
            message: error.client_message(),
            status_code: error.backend_status(),
        }
    }
}
