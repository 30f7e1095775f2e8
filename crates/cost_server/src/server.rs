//! Listener setup and the serve loop

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::api::build_router;
use crate::config::ServerConfig;
use crate::service::PredictionService;

/// Load artifacts, bind, and serve until Ctrl-C
pub async fn start_server(config: &ServerConfig) -> Result<()> {
    // fail before binding if the artifact pair is unusable
    let service = PredictionService::load(&config.artifacts)
        .with_context(|| format!("failed to load artifacts from {}", config.artifacts.display()))?;
    let app = build_router(Arc::new(service));

    let addr = config.socket_addr();
    let listener = bind_listener(&addr).await?;
    let local = listener.local_addr().context("listener has no local address")?;
    info!("prediction server listening on http://{local}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("prediction server terminated unexpectedly")
}

pub async fn bind_listener(addr: &str) -> Result<TcpListener> {
    if let Ok(socket_addr) = addr.parse::<SocketAddr>() {
        TcpListener::bind(socket_addr)
            .await
            .with_context(|| format!("failed to bind listener on {socket_addr}"))
    } else {
        TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind listener on {addr}"))
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("received shutdown signal"),
        Err(err) => error!("unable to listen for shutdown signal: {err}"),
    }
}
