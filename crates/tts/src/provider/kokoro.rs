use std::time::Duration;

use async_trait::async_trait;
use http::HeaderMap;
use kokoro_config::{BackendConfig, SampleRateConfig, SampleRateSource, SynthesisConfig};
use reqwest::Client;
use serde_json::{Map, Value};

use crate::{
    error::InvocationError,
    http_client::http_client,
    types::{SpeechRequest, SynthesisResult},
};

use super::TtsBackend;

const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// Kokoro-FastAPI backend speaking the OpenAI-compatible speech API
pub struct KokoroBackend {
    client: Client,
    health_url: String,
    speech_url: String,
    probe_timeout: Duration,
    request_timeout: Duration,
    format_header: Option<String>,
    sample_rate: SampleRateConfig,
    body_snippet_limit: usize,
}

impl KokoroBackend {
    /// Create a backend client from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built
    pub fn new(backend: &BackendConfig, synthesis: &SynthesisConfig) -> reqwest::Result<Self> {
        Ok(Self {
            client: http_client()?,
            health_url: backend.health_url(),
            speech_url: backend.speech_url(),
            probe_timeout: backend.probe_timeout,
            request_timeout: backend.request_timeout,
            format_header: synthesis.format_header.clone(),
            sample_rate: synthesis.sample_rate.clone(),
            body_snippet_limit: synthesis.body_snippet_limit,
        })
    }

    fn resolve_sample_rate(&self, headers: &HeaderMap, model: &str) -> u32 {
        let configured = self.sample_rate.for_model(model);

        match self.sample_rate.source {
            SampleRateSource::Configured => configured,
            SampleRateSource::Header => header_str(headers, &self.sample_rate.header)
                .and_then(|value| value.parse::<u32>().ok())
                .filter(|rate| *rate > 0)
                .unwrap_or(configured),
        }
    }

    fn resolve_format(&self, headers: &HeaderMap, request: &SpeechRequest) -> String {
        self.format_header
            .as_deref()
            .and_then(|name| header_str(headers, name))
            .filter(|value| !value.is_empty())
            .map_or_else(|| request.response_format.to_string(), str::to_lowercase)
    }

    fn map_transport_error(&self, error: &reqwest::Error) -> InvocationError {
        if error.is_timeout() {
            InvocationError::Timeout(self.request_timeout)
        } else {
            InvocationError::BackendUnreachable(error.to_string())
        }
    }
}

/// Outbound body, always non-streaming
#[derive(serde::Serialize)]
struct KokoroSpeechBody<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    response_format: &'a str,
    speed: f64,
    stream: bool,
    #[serde(flatten)]
    extra: &'a Map<String, Value>,
}

#[async_trait]
impl TtsBackend for KokoroBackend {
    async fn check_ready(&self) -> Result<(), String> {
        let response = self
            .client
            .get(&self.health_url)
            .timeout(self.probe_timeout)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();

        if status.is_success() {
            Ok(())
        } else {
            Err(format!("health endpoint returned {status}"))
        }
    }

    async fn synthesize(&self, request: &SpeechRequest) -> Result<SynthesisResult, InvocationError> {
        tracing::debug!(
            model = %request.model,
            voice = %request.voice,
            format = %request.response_format,
            input_len = request.input.len(),
            "sending synthesis request to backend",
        );

        let body = KokoroSpeechBody {
            model: &request.model,
            input: &request.input,
            voice: &request.voice,
            response_format: request.response_format.as_ref(),
            speed: request.speed,
            stream: false,
            extra: &request.extra,
        };

        let response = self
            .client
            .post(&self.speech_url)
            .timeout(self.request_timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("backend synthesis request failed: {e}");
                self.map_transport_error(&e)
            })?;

        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            let body = snippet(&text, self.body_snippet_limit);

            tracing::error!(status = status.as_u16(), "backend rejected synthesis request: {body}");

            return Err(InvocationError::BackendRejected {
                status: status.as_u16(),
                body,
            });
        }

        let headers = response.headers().clone();

        let mime_type = header_str(&headers, http::header::CONTENT_TYPE.as_str())
            .unwrap_or(FALLBACK_MIME_TYPE)
            .to_string();

        let audio = response.bytes().await.map_err(|e| {
            tracing::error!("failed to read backend response body: {e}");
            self.map_transport_error(&e)
        })?;

        tracing::debug!(bytes = audio.len(), %mime_type, "backend synthesis complete");

        Ok(SynthesisResult {
            audio: audio.to_vec(),
            format: self.resolve_format(&headers, request),
            sample_rate: self.resolve_sample_rate(&headers, &request.model),
            mime_type,
        })
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok()).map(str::trim)
}

/// First `limit` characters of a backend error body
fn snippet(body: &str, limit: usize) -> String {
    let body = body.trim();

    match body.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
