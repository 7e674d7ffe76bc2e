//! Kokoro backend double built on wiremock

use std::time::Duration;

use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

pub const HEALTH_PATH: &str = "/health";
pub const SPEECH_PATH: &str = "/v1/audio/speech";

/// Wiremock server speaking the backend's health and speech endpoints
pub struct MockBackend {
    server: MockServer,
}

impl MockBackend {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn base_url(&self) -> String {
        self.server.uri()
    }

    /// Health endpoint answers 200
    pub async fn healthy(&self) -> &Self {
        Mock::given(method("GET"))
            .and(path(HEALTH_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "status": "healthy" })))
            .mount(&self.server)
            .await;
        self
    }

    /// Health endpoint answers 503 for the first `failures` probes, then 200
    pub async fn ready_after(&self, failures: u64) -> &Self {
        Mock::given(method("GET"))
            .and(path(HEALTH_PATH))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(failures)
            .with_priority(1)
            .mount(&self.server)
            .await;

        Mock::given(method("GET"))
            .and(path(HEALTH_PATH))
            .respond_with(ResponseTemplate::new(200))
            .with_priority(2)
            .mount(&self.server)
            .await;
        self
    }

    /// Health endpoint always answers 503
    pub async fn never_ready(&self) -> &Self {
        Mock::given(method("GET"))
            .and(path(HEALTH_PATH))
            .respond_with(ResponseTemplate::new(503))
            .mount(&self.server)
            .await;
        self
    }

    /// Speech endpoint returns `audio` with the given content type
    pub async fn speech_returns(&self, content_type: &str, audio: &[u8]) -> &Self {
        self.speech_responds(
            ResponseTemplate::new(200)
                .insert_header("content-type", content_type)
                .set_body_bytes(audio.to_vec()),
        )
        .await
    }

    /// Speech endpoint responds with a custom template
    pub async fn speech_responds(&self, template: ResponseTemplate) -> &Self {
        Mock::given(method("POST"))
            .and(path(SPEECH_PATH))
            .respond_with(template)
            .mount(&self.server)
            .await;
        self
    }

    /// Speech endpoint stalls longer than any test timeout
    pub async fn speech_stalls(&self) -> &Self {
        self.speech_responds(ResponseTemplate::new(200).set_delay(Duration::from_secs(30)))
            .await
    }

    /// Number of requests received on `request_path`
    pub async fn request_count(&self, request_path: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|request| request.url.path() == request_path)
            .count()
    }

    /// JSON bodies of all synthesis requests
    pub async fn speech_bodies(&self) -> Vec<serde_json::Value> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|request| request.url.path() == SPEECH_PATH)
            .filter_map(|request| serde_json::from_slice(&request.body).ok())
            .collect()
    }
}
