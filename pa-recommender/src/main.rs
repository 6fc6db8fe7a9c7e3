//! pa-recommender - PA Recommender Engine HTTP service
//!
//! Loads the artist and venue identifier sequences, the factor model and the
//! interaction matrix once, then serves:
//! - `GET /`
//! - `GET /recommend-venues/:paid`
//! - `GET /recommend-artists/:paid`
//! - `GET /health`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use pa_common::config::{CliOverrides, ServiceConfig};
use pa_recommender::{build_router, AppState, ArtifactStore};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for pa-recommender
#[derive(Parser, Debug)]
#[command(name = "pa-recommender")]
#[command(about = "Artist/venue recommendation service")]
#[command(version)]
struct Args {
    /// TOML config file (default: ~/.config/pa-recommender/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Folder containing the serialized artifacts
    #[arg(short, long)]
    artifact_folder: Option<PathBuf>,

    /// Address to bind
    #[arg(short, long)]
    bind_address: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,
}

impl From<Args> for CliOverrides {
    fn from(args: Args) -> Self {
        Self {
            config_file: args.config,
            artifact_folder: args.artifact_folder,
            bind_address: args.bind_address,
            port: args.port,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = ServiceConfig::resolve(&args.into()).context("Failed to resolve configuration")?;

    // RUST_LOG wins over the configured level
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting PA Recommender Engine (pa-recommender) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    match &config.config_file {
        Some(path) => info!("Config file: {}", path.display()),
        None => warn!("No config file found, using environment and defaults"),
    }
    info!("Artifact folder: {}", config.artifact_folder.display());

    // Nothing is served unless every artifact loads
    let store = match ArtifactStore::load(&config.artifacts) {
        Ok(store) => {
            info!("✓ Artifacts loaded");
            store
        }
        Err(e) => {
            error!("Failed to load artifacts: {}", e);
            return Err(e).context("Failed to load artifacts");
        }
    };

    let app = build_router(AppState::new(store));

    let addr = config.listen_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("pa-recommender listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
