pub mod api;
pub mod config;
pub mod downloader;
pub mod logging;

use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};

use api::AppState;
use config::Config;
use downloader::extractors::build_engine;
use downloader::{DownloadOrchestrator, TransientStorage};

/// Build the engine, bind, and serve until Ctrl+C
pub async fn run(config: Config) -> anyhow::Result<()> {
    let settings = config.service_settings();
    let engine = build_engine(config.engine_config()).context("selecting extraction engine")?;

    info!(
        engine = engine.name(),
        container = %settings.container,
        scratch = %settings.scratch_root.display(),
        "Engine ready"
    );

    let orchestrator = DownloadOrchestrator::new(
        engine,
        TransientStorage::new(settings.scratch_root),
        settings.container,
    );
    let state = AppState {
        orchestrator: Arc::new(orchestrator),
        default_resolution: settings.default_resolution,
    };

    let addr = config
        .bind_addr()
        .with_context(|| format!("invalid host '{}'", config.host))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding to {}", addr))?;
    info!(%addr, "Listening");

    axum::serve(listener, api::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("running HTTP server")?;

    info!("Shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        warn!(error = %err, "Failed to install Ctrl+C handler");
    }
}
