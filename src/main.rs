use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::EnvFilter;
use warden::config::WardenConfig;
use warden::process::ProcessSupervisor;

/// Keep a service process alive: health polling, restart with backoff,
/// circuit breaking, memory-pressure mitigation, keep-warm pinging.
#[derive(Debug, Parser)]
#[command(name = "warden", version, about)]
struct Cli {
    /// Path to a TOML or JSON configuration file. Without one, the
    /// configuration is read from WARDEN_* environment variables.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = match cli.config {
        Some(ref path) => WardenConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => WardenConfig::from_env().context("Failed to build config from environment")?,
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                return;
            }
        };

        tokio::select! {
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down"),
            result = tokio::signal::ctrl_c() => match result {
                Ok(()) => info!("Received interrupt, shutting down"),
                Err(e) => tracing::error!(error = %e, "Failed to listen for interrupt"),
            },
        }

        let _ = shutdown_tx.send(true);
    });

    let supervisor = ProcessSupervisor::new(config, shutdown_rx);
    supervisor.run().await?;

    Ok(())
}
