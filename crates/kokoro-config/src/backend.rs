use std::time::Duration;

use serde::Deserialize;

/// Local TTS backend the worker forwards jobs to
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackendConfig {
    /// Base URL of the backend (e.g. `http://127.0.0.1:8880`)
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Readiness path, answers 2xx once synthesis requests are accepted
    #[serde(default = "default_health_path")]
    pub health_path: String,
    /// OpenAI-compatible speech synthesis path
    #[serde(default = "default_speech_path")]
    pub speech_path: String,
    /// Upper bound on waiting for the backend to become ready
    #[serde(default = "default_ready_timeout", with = "crate::duration")]
    pub ready_timeout: Duration,
    /// Delay between readiness probes
    #[serde(default = "default_poll_interval", with = "crate::duration")]
    pub poll_interval: Duration,
    /// Timeout of a single readiness probe
    #[serde(default = "default_probe_timeout", with = "crate::duration")]
    pub probe_timeout: Duration,
    /// Timeout of the synthesis call
    #[serde(default = "default_request_timeout", with = "crate::duration")]
    pub request_timeout: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            health_path: default_health_path(),
            speech_path: default_speech_path(),
            ready_timeout: default_ready_timeout(),
            poll_interval: default_poll_interval(),
            probe_timeout: default_probe_timeout(),
            request_timeout: default_request_timeout(),
        }
    }
}

impl BackendConfig {
    /// Full URL of the readiness endpoint
    pub fn health_url(&self) -> String {
        self.endpoint(&self.health_path)
    }

    /// Full URL of the synthesis endpoint
    pub fn speech_url(&self) -> String {
        self.endpoint(&self.speech_path)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8880".to_string()
}

fn default_health_path() -> String {
    "/health".to_string()
}

fn default_speech_path() -> String {
    "/v1/audio/speech".to_string()
}

const fn default_ready_timeout() -> Duration {
    Duration::from_secs(120)
}

const fn default_poll_interval() -> Duration {
    Duration::from_millis(500)
}

const fn default_probe_timeout() -> Duration {
    Duration::from_secs(1)
}

const fn default_request_timeout() -> Duration {
    Duration::from_secs(300)
}
