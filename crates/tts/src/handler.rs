use std::{sync::Arc, time::Instant};

use kokoro_config::Config;
use kokoro_telemetry::WorkerMetrics;
use serde_json::Value;
use tracing::Instrument;

use crate::{
    encoder::encode,
    error::{JobError, Result},
    job::{Job, JobOutcome},
    provider::{TtsBackend, kokoro::KokoroBackend},
    readiness::{Readiness, ReadinessProber},
    translate::Translator,
    types::OutputEnvelope,
};

/// Runs one job at a time through translate, readiness, synthesis and encoding
///
/// Holds only configuration and the backend client. Concurrent calls are
/// independent and share nothing but the backend.
pub struct JobHandler {
    backend: Arc<dyn TtsBackend>,
    translator: Translator,
    prober: ReadinessProber,
    metrics: WorkerMetrics,
}

impl JobHandler {
    pub fn new(backend: Arc<dyn TtsBackend>, translator: Translator, prober: ReadinessProber) -> Self {
        Self {
            backend,
            translator,
            prober,
            metrics: WorkerMetrics::new(),
        }
    }

    /// Build a handler talking to the configured Kokoro backend
    ///
    /// # Errors
    ///
    /// Returns an error if the default response format is unsupported or
    /// the HTTP client cannot be built
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let translator = Translator::from_format_name(&config.synthesis.default_response_format)
            .map_err(|e| anyhow::anyhow!("invalid synthesis.default_response_format: {e}"))?;

        let backend = KokoroBackend::new(&config.backend, &config.synthesis)
            .map_err(|e| anyhow::anyhow!("failed to build backend HTTP client: {e}"))?;

        let prober = ReadinessProber::new(config.backend.ready_timeout, config.backend.poll_interval);

        tracing::debug!(
            speech_url = %config.backend.speech_url(),
            health_url = %config.backend.health_url(),
            "job handler initialized"
        );

        Ok(Self::new(Arc::new(backend), translator, prober))
    }

    /// Process one job input
    ///
    /// Validation happens before any network call; readiness is confirmed
    /// before synthesis. The first failure ends the job.
    ///
    /// # Errors
    ///
    /// Returns the [`JobError`] of the first failing stage
    pub async fn handle(&self, input: &Value) -> Result<OutputEnvelope> {
        let request = self.translator.translate(input)?;

        match self.prober.wait_until_ready(self.backend.as_ref()).await {
            Readiness::Ready { waited, .. } => {
                self.metrics.record_readiness_wait(waited, true);
            }
            Readiness::TimedOut { attempts, waited } => {
                self.metrics.record_readiness_wait(waited, false);
                return Err(JobError::BackendUnavailable { waited, attempts });
            }
        }

        let result = self.backend.synthesize(&request).await?;

        Ok(encode(result))
    }

    /// Process a job and attach its identifier
    pub async fn run(&self, job: Job) -> JobOutcome {
        let Job { id, input } = job;
        let id = id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let span = tracing::info_span!("job", job_id = %id);
        let start = Instant::now();

        let result = async {
            tracing::info!("job received");

            let result = self.handle(&input).await;

            match &result {
                Ok(envelope) => tracing::info!(
                    mime_type = %envelope.mime_type,
                    format = %envelope.format,
                    sample_rate = envelope.sample_rate,
                    elapsed = ?start.elapsed(),
                    "job completed"
                ),
                Err(error) => tracing::warn!(
                    error_kind = error.kind().as_str(),
                    elapsed = ?start.elapsed(),
                    "job failed: {error}"
                ),
            }

            result
        }
        .instrument(span)
        .await;

        let outcome = result.as_ref().map_or_else(|e| e.kind().as_str(), |_| "completed");
        self.metrics.record_job(outcome, start);

        JobOutcome { id, result }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::atomic::{AtomicU32, Ordering},
        time::Duration,
    };

    use async_trait::async_trait;
    use base64::{Engine, engine::general_purpose::STANDARD};
    use serde_json::json;

    use super::*;
    use crate::{
        error::{ErrorKind, InvocationError, ValidationError},
        types::{ResponseFormat, SpeechRequest, SynthesisResult},
    };

    /// In-process backend double that counts calls
    #[derive(Default)]
    struct FakeBackend {
        never_ready: bool,
        rejection: Option<(u16, &'static str)>,
        probes: AtomicU32,
        synth_calls: AtomicU32,
    }

    #[async_trait]
    impl TtsBackend for FakeBackend {
        async fn check_ready(&self) -> std::result::Result<(), String> {
            self.probes.fetch_add(1, Ordering::SeqCst);
            if self.never_ready {
                Err("connection refused".to_string())
            } else {
                Ok(())
            }
        }

        async fn synthesize(
            &self,
            request: &SpeechRequest,
        ) -> std::result::Result<SynthesisResult, InvocationError> {
            self.synth_calls.fetch_add(1, Ordering::SeqCst);

            if let Some((status, body)) = self.rejection {
                return Err(InvocationError::BackendRejected {
                    status,
                    body: body.to_string(),
                });
            }

            Ok(SynthesisResult {
                audio: b"ID3\x04\x00\x00fake-mp3".to_vec(),
                mime_type: "audio/mpeg".to_string(),
                format: request.response_format.to_string(),
                sample_rate: 24_000,
            })
        }
    }

    fn handler(backend: &Arc<FakeBackend>) -> JobHandler {
        JobHandler::new(
            Arc::clone(backend) as Arc<dyn TtsBackend>,
            Translator::new(ResponseFormat::Mp3),
            ReadinessProber::new(Duration::from_secs(2), Duration::from_millis(500)),
        )
    }

    fn scenario_input() -> Value {
        json!({
            "model": "kokoro",
            "input": "Hello world!",
            "voice": "af_bella",
            "response_format": "mp3",
            "speed": 1.0,
            "stream": false
        })
    }

    #[tokio::test(start_paused = true)]
    async fn healthy_backend_produces_envelope() {
        let backend = Arc::new(FakeBackend::default());

        let envelope = handler(&backend).handle(&scenario_input()).await.unwrap();

        assert_eq!(STANDARD.decode(&envelope.audio_base64).unwrap(), b"ID3\x04\x00\x00fake-mp3");
        assert_eq!(envelope.mime_type, "audio/mpeg");
        assert_eq!(envelope.format, "mp3");
        assert_eq!(envelope.sample_rate, 24_000);
        assert_eq!(backend.synth_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn every_job_probes_readiness_again() {
        let backend = Arc::new(FakeBackend::default());
        let handler = handler(&backend);

        handler.handle(&scenario_input()).await.unwrap();
        handler.handle(&scenario_input()).await.unwrap();

        assert_eq!(backend.probes.load(Ordering::SeqCst), 2);
        assert_eq!(backend.synth_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn streaming_request_makes_no_backend_calls() {
        let backend = Arc::new(FakeBackend::default());
        let mut input = scenario_input();
        input["stream"] = json!(true);

        let err = handler(&backend).handle(&input).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(matches!(err, JobError::Validation(ValidationError::StreamingNotSupported)));
        assert_eq!(backend.probes.load(Ordering::SeqCst), 0);
        assert_eq!(backend.synth_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn unready_backend_is_unavailable() {
        let backend = Arc::new(FakeBackend {
            never_ready: true,
            ..FakeBackend::default()
        });

        let err = handler(&backend).handle(&scenario_input()).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::BackendUnavailable);
        assert!(backend.probes.load(Ordering::SeqCst) > 1);
        assert_eq!(backend.synth_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn rejection_is_synthesis_failure_with_detail() {
        let backend = Arc::new(FakeBackend {
            rejection: Some((500, "model overloaded")),
            ..FakeBackend::default()
        });

        let err = handler(&backend).handle(&scenario_input()).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::SynthesisFailed);
        assert_eq!(err.backend_status(), Some(500));
        assert!(err.to_string().contains("model overloaded"));
        assert_eq!(backend.synth_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn run_generates_id_when_missing() {
        let backend = Arc::new(FakeBackend::default());

        let outcome = handler(&backend).run(Job::new(scenario_input())).await;

        assert!(outcome.is_success());
        assert!(uuid::Uuid::parse_str(&outcome.id).is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn run_keeps_caller_id() {
        let backend = Arc::new(FakeBackend::default());
        let job = Job {
            id: Some("job-42".to_string()),
            input: Value::Null,
        };

        let outcome = handler(&backend).run(job).await;

        assert_eq!(outcome.id, "job-42");
        assert!(matches!(
            outcome.result,
            Err(JobError::Validation(ValidationError::InvalidJob(_)))
        ));
    }

    #[test]
    fn from_config_rejects_unknown_default_format() {
        let mut config = Config::default();
        config.synthesis.default_response_format = "midi".to_string();

        let err = JobHandler::from_config(&config).err().unwrap();
        assert!(err.to_string().contains("default_response_format"));
    }

    #[test]
    fn build_handler_keeps_error_chain() {
        let mut config = Config::default();
        config.synthesis.default_response_format = "midi".to_string();

        let err = crate::build_handler(&config).err().unwrap();
        let chain: Vec<String> = err.chain().map(ToString::to_string).collect();

        assert_eq!(chain[0], "failed to initialize job handler");
        assert!(chain[1].contains("default_response_format"), "{chain:?}");
    }
}
