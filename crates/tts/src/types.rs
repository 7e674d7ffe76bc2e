use serde::Serialize;
use serde_json::{Map, Value};

/// Audio container produced by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display, strum::EnumString, strum::AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ResponseFormat {
    Mp3,
    Opus,
    Aac,
    Flac,
    Wav,
    Pcm,
}

/// Validated speech synthesis request
///
/// Only constructed by the translator, so every instance is non-streaming,
/// has non-empty `model`/`input`/`voice` and a positive finite `speed`.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechRequest {
    /// Model identifier (e.g. `kokoro`)
    pub model: String,
    /// Text to synthesize
    pub input: String,
    /// Voice identifier (e.g. `af_bella`)
    pub voice: String,
    /// Requested audio format
    pub response_format: ResponseFormat,
    /// Speech speed multiplier
    pub speed: f64,
    /// Backend-specific fields forwarded verbatim (e.g. `lang_code`)
    pub extra: Map<String, Value>,
}

/// Raw audio and metadata returned by the backend for one request
#[derive(Debug)]
pub struct SynthesisResult {
    pub audio: Vec<u8>,
    pub mime_type: String,
    pub format: String,
    pub sample_rate: u32,
}

/// Successful job output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputEnvelope {
    pub audio_base64: String,
    pub mime_type: String,
    pub format: String,
    pub sample_rate: u32,
}
