use std::path::Path;

use crate::{BASE_URL_ENV, Config, RESPONSE_FORMATS};

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, applies the
    /// `KOKORO_BASE_URL` override, then deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::from_toml(&raw)
    }

    /// Load configuration from a file if it exists, otherwise use defaults
    ///
    /// # Errors
    ///
    /// Same as [`Config::load`] for an existing file; validation errors for
    /// the defaults (e.g. an invalid `KOKORO_BASE_URL`)
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            return Self::load(path);
        }

        tracing::debug!(path = %path.display(), "config file not found, using defaults");

        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if expansion, parsing, or validation fails
    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let mut config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(base_url) = std::env::var(BASE_URL_ENV)
            && !base_url.trim().is_empty()
        {
            self.backend.base_url = base_url.trim().to_string();
        }

        let trimmed = self.backend.base_url.trim_end_matches('/').len();
        self.backend.base_url.truncate(trimmed);
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error if the backend URL, paths, durations, or sample
    /// rate settings are unusable
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_backend()?;
        self.validate_synthesis()?;
        self.validate_server()?;
        Ok(())
    }

    fn validate_backend(&self) -> anyhow::Result<()> {
        let backend = &self.backend;

        let url = url::Url::parse(&backend.base_url)
            .map_err(|e| anyhow::anyhow!("invalid backend.base_url '{}': {e}", backend.base_url))?;

        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!("backend.base_url must use http or https, got '{}'", url.scheme());
        }

        for (name, path) in [("health_path", &backend.health_path), ("speech_path", &backend.speech_path)] {
            if !path.starts_with('/') {
                anyhow::bail!("backend.{name} must start with '/', got '{path}'");
            }
        }

        let durations = [
            ("ready_timeout", backend.ready_timeout),
            ("poll_interval", backend.poll_interval),
            ("probe_timeout", backend.probe_timeout),
            ("request_timeout", backend.request_timeout),
        ];

        for (name, duration) in durations {
            if duration.is_zero() {
                anyhow::bail!("backend.{name} must be greater than 0");
            }
        }

        if backend.poll_interval > backend.ready_timeout {
            anyhow::bail!("backend.poll_interval must not exceed backend.ready_timeout");
        }

        Ok(())
    }

    fn validate_synthesis(&self) -> anyhow::Result<()> {
        let synthesis = &self.synthesis;

        let format = synthesis.default_response_format.trim();
        if !RESPONSE_FORMATS.iter().any(|supported| supported.eq_ignore_ascii_case(format)) {
            anyhow::bail!(
                "synthesis.default_response_format must be one of {}, got '{format}'",
                RESPONSE_FORMATS.join(", ")
            );
        }

        if synthesis.body_snippet_limit == 0 {
            anyhow::bail!("synthesis.body_snippet_limit must be greater than 0");
        }

        if synthesis.sample_rate.default == 0 {
            anyhow::bail!("synthesis.sample_rate.default must be greater than 0");
        }

        if let Some((model, _)) = synthesis.sample_rate.models.iter().find(|(_, rate)| **rate == 0) {
            anyhow::bail!("synthesis.sample_rate.models.{model} must be greater than 0");
        }

        Ok(())
    }

    fn validate_server(&self) -> anyhow::Result<()> {
        let health = &self.server.health;

        if health.enabled && !health.path.starts_with('/') {
            anyhow::bail!("server.health.path must start with '/', got '{}'", health.path);
        }

        Ok(())
    }
}
