use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    error::{JobError, StructuredError, ValidationError},
    types::OutputEnvelope,
};

/// One unit of work as submitted by the queue
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Job {
    /// Caller-chosen identifier, generated when absent
    #[serde(default)]
    pub id: Option<String>,
    /// Untyped speech request payload
    #[serde(default)]
    pub input: Value,
}

impl Job {
    pub fn new(input: Value) -> Self {
        Self { id: None, input }
    }

    /// Parse a job from a raw request body
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidJob`] when the body is not a JSON
    /// object or `id` is not a string
    pub fn parse(body: &[u8]) -> Result<Self, ValidationError> {
        serde_json::from_slice(body).map_err(|e| ValidationError::InvalidJob(format!("malformed job: {e}")))
    }
}

/// Terminal result of one job
#[derive(Debug)]
pub struct JobOutcome {
    pub id: String,
    pub result: Result<OutputEnvelope, JobError>,
}

impl JobOutcome {
    pub const fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// Serializable view, `COMPLETED` with `output` or `FAILED` with `error`
    pub fn response(&self) -> JobResponse<'_> {
        let status = match &self.result {
            Ok(output) => JobStatus::Completed { output },
            Err(error) => JobStatus::Failed {
                error: StructuredError::from(error),
            },
        };

        JobResponse { id: &self.id, status }
    }
}

#[derive(Debug, Serialize)]
pub struct JobResponse<'a> {
    pub id: &'a str,
    #[serde(flatten)]
    pub status: JobStatus<'a>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus<'a> {
    Completed { output: &'a OutputEnvelope },
    Failed { error: StructuredError },
}
