#![allow(clippy::must_use_candidate)]

pub mod backend;
mod duration;
mod env;
pub mod health;
mod loader;
pub mod server;
pub mod synthesis;
pub mod telemetry;

use serde::Deserialize;

pub use backend::*;
pub use health::*;
pub use server::*;
pub use synthesis::*;
pub use telemetry::TelemetryConfig;

/// Environment variable that overrides `backend.base_url`
pub const BASE_URL_ENV: &str = "KOKORO_BASE_URL";

/// Top-level worker configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Job server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Local TTS backend configuration
    #[serde(default)]
    pub backend: BackendConfig,
    /// Request defaults and response metadata policy
    #[serde(default)]
    pub synthesis: SynthesisConfig,
    /// Telemetry configuration
    #[serde(default)]
    pub telemetry: Option<TelemetryConfig>,
}
