#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod args;
mod invoke;

use std::{path::Path, process::ExitCode};

use args::{Args, Command, DEFAULT_CONFIG_PATH};
use clap::Parser;
use kokoro_config::Config;
use kokoro_server::Server;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default(Path::new(DEFAULT_CONFIG_PATH))?,
    };

    let _telemetry_guard = kokoro_telemetry::init(config.telemetry.as_ref(), &args.log_filter, args.log_format.into())?;

    match args.command {
        None => serve(config, None).await?,
        Some(Command::Serve { listen }) => serve(config, listen).await?,
        Some(Command::Invoke { job, output }) => {
            if !invoke::run(&config, job.as_deref(), output).await? {
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

async fn serve(mut config: Config, listen: Option<std::net::SocketAddr>) -> anyhow::Result<()> {
    if let Some(listen) = listen {
        config.server.listen_address = Some(listen);
    }

    tracing::info!(backend = %config.backend.base_url, "starting kokoro-worker");

    let server = Server::new(&config)?;

    let shutdown = CancellationToken::new();
    let shutdown_clone = shutdown.clone();

    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown_clone.cancel();
    });

    server.serve(shutdown).await?;

    tracing::info!("kokoro-worker stopped");
    Ok(())
}

/// Wait for a shutdown signal (`SIGINT` or `SIGTERM`)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    tracing::info!("shutdown signal received");
}
