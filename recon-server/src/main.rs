//! Recon server entry point.

use anyhow::Context;
use recon_core::AppConfig;
use recon_server::{init_tracing, router, AppState};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    info!("Starting Recon v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load_with_env().context("failed to load configuration")?;
    let bind_addr = config.server.bind_addr.clone();

    let shutdown = CancellationToken::new();
    let state = AppState::from_config(Arc::new(config), shutdown.clone())
        .context("failed to build scan pipeline")?;

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

/// Resolve on Ctrl+C, cancelling every in-flight scan.
async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested, cancelling in-flight scans");
    shutdown.cancel();
}
