//! Provisioning trigger server.

use std::net::SocketAddr;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use provisioner_dispatcher::CancellationToken;
use provisioner_server::{create_router, AppState, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("provisioner=info".parse()?))
        .with_target(true)
        .init();

    let addr: SocketAddr = config.bind_addr.parse()?;
    tokio::fs::create_dir_all(&config.log_dir).await.map_err(|e| {
        format!(
            "Failed to create log directory '{}': {}",
            config.log_dir.display(),
            e
        )
    })?;

    info!(
        addr = %addr,
        log_dir = %config.log_dir.display(),
        cors_origin = %config.cors_origin,
        timeout_secs = config.request_timeout_secs,
        "Starting provisioning server"
    );

    let state = AppState::new(config)?;
    let shutdown = state.shutdown.clone();
    let router = create_router(state);

    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    info!("Provisioning server stopped");
    Ok(())
}

/// Resolve on Ctrl-C, cancelling every run in flight.
async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested, cancelling active runs");
    shutdown.cancel();
}
