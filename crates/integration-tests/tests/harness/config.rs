//! Programmatic configuration builder for integration tests

use std::{net::SocketAddr, time::Duration};

use kokoro_config::{BackendConfig, Config, SampleRateSource};

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Worker pointed at `base_url` with short timeouts
    pub fn new(base_url: &str) -> Self {
        let mut config = Config::default();

        config.server.listen_address = Some(SocketAddr::from(([127, 0, 0, 1], 0)));
        config.backend = BackendConfig {
            base_url: base_url.to_owned(),
            ready_timeout: Duration::from_millis(400),
            poll_interval: Duration::from_millis(50),
            probe_timeout: Duration::from_millis(200),
            request_timeout: Duration::from_secs(2),
            ..BackendConfig::default()
        };

        Self { config }
    }

    pub fn with_ready_timeout(mut self, timeout: Duration) -> Self {
        self.config.backend.ready_timeout = timeout;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.config.backend.request_timeout = timeout;
        self
    }

    /// Ignore backend sample rate headers and use the configured rate
    pub fn with_configured_sample_rate(mut self, model: &str, rate: u32) -> Self {
        self.config.synthesis.sample_rate.source = SampleRateSource::Configured;
        self.config.synthesis.sample_rate.models.insert(model.to_owned(), rate);
        self
    }

    /// Disable the worker's own health endpoint
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
