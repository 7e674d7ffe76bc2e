#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

use anyhow::Context;

mod encoder;
mod error;
mod handler;
mod http_client;
mod job;
mod provider;
mod readiness;
mod translate;
mod types;

pub use encoder::encode;
pub use error::{ErrorKind, InvocationError, JobError, Result, StructuredError, ValidationError};
pub use handler::JobHandler;
pub use job::{Job, JobOutcome, JobResponse, JobStatus};
pub use provider::{TtsBackend, kokoro::KokoroBackend};
pub use readiness::{Readiness, ReadinessProber};
pub use translate::{DEFAULT_SPEED, Translator};
pub use types::{OutputEnvelope, ResponseFormat, SpeechRequest, SynthesisResult};

/// Build the job handler from configuration
pub fn build_handler(config: &kokoro_config::Config) -> anyhow::Result<std::sync::Arc<JobHandler>> {
    let handler = JobHandler::from_config(config).context("failed to initialize job handler")?;
    Ok(std::sync::Arc::new(handler))
}
