use std::{net::SocketAddr, path::PathBuf};

use clap::{Parser, Subcommand, ValueEnum};

/// Default config file, optional when not given explicitly
pub const DEFAULT_CONFIG_PATH: &str = "kokoro-worker.toml";

/// Kokoro TTS job worker
#[derive(Debug, Parser)]
#[command(
    name = "kokoro-worker",
    about = "Forward speech synthesis jobs to a local Kokoro TTS backend"
)]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, global = true, env = "KOKORO_WORKER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log filter used when `RUST_LOG` is unset
    #[arg(long, global = true, default_value = "info")]
    pub log_filter: String,

    /// Log line format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text, env = "KOKORO_WORKER_LOG_FORMAT")]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve jobs over HTTP (default)
    Serve {
        /// Override the listen address
        #[arg(long, env = "KOKORO_WORKER_LISTEN")]
        listen: Option<SocketAddr>,
    },
    /// Run a single job in process and write the audio to disk
    Invoke {
        /// Job JSON file (`{"input": {...}}`), `-` for stdin; a sample job when omitted
        #[arg(long)]
        job: Option<PathBuf>,

        /// Audio output path, `output.<format>` when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

impl From<LogFormat> for kokoro_telemetry::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Text => Self::Text,
            LogFormat::Json => Self::Json,
        }
    }
}
