use indexmap::IndexMap;
use serde::Deserialize;

/// Audio formats the backend can produce
pub const RESPONSE_FORMATS: [&str; 6] = ["mp3", "opus", "aac", "flac", "wav", "pcm"];

/// Request defaults and response metadata policy
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SynthesisConfig {
    /// Format used when a job omits `response_format`
    #[serde(default = "default_response_format")]
    pub default_response_format: String,
    /// Maximum number of characters of a backend error body kept in job errors
    #[serde(default = "default_body_snippet_limit")]
    pub body_snippet_limit: usize,
    /// Response header through which the backend may override the reported format
    #[serde(default)]
    pub format_header: Option<String>,
    /// Sample rate resolution
    #[serde(default)]
    pub sample_rate: SampleRateConfig,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            default_response_format: default_response_format(),
            body_snippet_limit: default_body_snippet_limit(),
            format_header: None,
            sample_rate: SampleRateConfig::default(),
        }
    }
}

/// How the reported sample rate is determined
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SampleRateConfig {
    /// Precedence between the backend header and configured rates
    #[serde(default)]
    pub source: SampleRateSource,
    /// Response header carrying the sample rate in Hz
    #[serde(default = "default_sample_rate_header")]
    pub header: String,
    /// Rate used when no model-specific rate is configured
    #[serde(default = "default_sample_rate")]
    pub default: u32,
    /// Per-model rates keyed by model name
    #[serde(default)]
    pub models: IndexMap<String, u32>,
}

impl Default for SampleRateConfig {
    fn default() -> Self {
        Self {
            source: SampleRateSource::default(),
            header: default_sample_rate_header(),
            default: default_sample_rate(),
            models: IndexMap::new(),
        }
    }
}

impl SampleRateConfig {
    /// Configured rate for a model, falling back to the default
    pub fn for_model(&self, model: &str) -> u32 {
        self.models.get(model).copied().unwrap_or(self.default)
    }
}

/// Sample rate precedence
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleRateSource {
    /// A valid backend header wins, otherwise the configured rate
    #[default]
    Header,
    /// Always the configured rate
    Configured,
}

fn default_response_format() -> String {
    "mp3".to_string()
}

const fn default_body_snippet_limit() -> usize {
    512
}

fn default_sample_rate_header() -> String {
    "x-sample-rate".to_string()
}

const fn default_sample_rate() -> u32 {
    24_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_rate_overrides_default() {
        let config: SampleRateConfig = toml::from_str(indoc::indoc! {r#"
            source = "configured"
            default = 22050

            [models]
            kokoro = 24000
        "#})
        .unwrap();

        assert_eq!(config.source, SampleRateSource::Configured);
        assert_eq!(config.for_model("kokoro"), 24_000);
        assert_eq!(config.for_model("other"), 22_050);
    }
}
