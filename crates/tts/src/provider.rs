pub mod kokoro;

use async_trait::async_trait;

use crate::{
    error::InvocationError,
    types::{SpeechRequest, SynthesisResult},
};

/// Local TTS service the worker forwards jobs to
#[async_trait]
pub trait TtsBackend: Send + Sync {
    /// Probe readiness once
    ///
    /// `Err` carries a human-readable reason and means "not ready yet".
    async fn check_ready(&self) -> Result<(), String>;

    /// Issue one synthesis call, never retried
    async fn synthesize(&self, request: &SpeechRequest) -> Result<SynthesisResult, InvocationError>;
}
