use std::path::{Path, PathBuf};

use base64::{Engine, engine::general_purpose::STANDARD};
use kokoro_config::Config;
use serde::Serialize;
use serde_json::json;
use tokio::io::AsyncReadExt;
use tts::{Job, JobHandler, OutputEnvelope};

/// Printed after a successful local invocation
#[derive(Debug, Serialize)]
struct Summary<'a> {
    mime_type: &'a str,
    format: &'a str,
    sample_rate: u32,
    bytes: usize,
    output: &'a Path,
}

/// Job used when no job file is given
pub fn sample_job() -> Job {
    Job::new(json!({
        "model": "kokoro",
        "input": "Hello world!",
        "voice": "af_bella",
        "response_format": "mp3",
        "speed": 1.0,
        "stream": false
    }))
}

/// Run one job in process, writing audio to disk and a JSON line to stdout
///
/// Returns `false` when the job ended in a structured error.
pub async fn run(config: &Config, job_path: Option<&Path>, output: Option<PathBuf>) -> anyhow::Result<bool> {
    let job = match job_path {
        Some(path) => read_job(path).await?,
        None => sample_job(),
    };

    let handler = JobHandler::from_config(config)?;
    let outcome = handler.run(job).await;

    let envelope = match &outcome.result {
        Ok(envelope) => envelope,
        Err(_) => {
            println!("{}", serde_json::to_string(&outcome.response())?);
            return Ok(false);
        }
    };

    let output = output.unwrap_or_else(|| default_output(envelope));
    let bytes = write_audio(envelope, &output).await?;

    let summary = Summary {
        mime_type: &envelope.mime_type,
        format: &envelope.format,
        sample_rate: envelope.sample_rate,
        bytes,
        output: &output,
    };
    println!("{}", serde_json::to_string(&summary)?);

    Ok(true)
}

async fn read_job(path: &Path) -> anyhow::Result<Job> {
    let raw = if path == Path::new("-") {
        let mut raw = Vec::new();
        tokio::io::stdin().read_to_end(&mut raw).await?;
        raw
    } else {
        tokio::fs::read(path)
            .await
            .map_err(|e| anyhow::anyhow!("failed to read job file {}: {e}", path.display()))?
    };

    Job::parse(&raw).map_err(|e| anyhow::anyhow!("{e}"))
}

fn default_output(envelope: &OutputEnvelope) -> PathBuf {
    PathBuf::from(format!("output.{}", envelope.format))
}

async fn write_audio(envelope: &OutputEnvelope, path: &Path) -> anyhow::Result<usize> {
    let audio = STANDARD
        .decode(&envelope.audio_base64)
        .map_err(|e| anyhow::anyhow!("job returned invalid base64 audio: {e}"))?;

    tokio::fs::write(path, &audio)
        .await
        .map_err(|e| anyhow::anyhow!("failed to write audio to {}: {e}", path.display()))?;

    Ok(audio.len())
}
