//! HTTP server module
//!
//! Provides the Axum-based HTTP server exposing the latest collected snapshot.

pub mod handlers;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{routing::get, Router};
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::metrics::InternalMetrics;
use crate::publisher::MemorySink;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<Config>,
    /// Latest published values
    pub sink: Arc<MemorySink>,
    /// Exporter self metrics
    pub metrics: InternalMetrics,
}

/// Build the router for `state`
pub fn router(state: AppState) -> Router {
    let metrics_path = state.config.server.path.clone();

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route(&metrics_path, get(handlers::metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the HTTP server until `shutdown` resolves
///
/// # Arguments
/// * `state` - Shared handler state
/// * `port` - Server port to bind to (overrides config.server.port)
///
/// # Errors
/// Returns an error if the bind address is invalid or the server fails to start
pub async fn run<F>(state: AppState, port: u16, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let bind_address = state.config.server.bind_address.clone();
    let metrics_path = state.config.server.path.clone();

    // "localhost" is accepted besides plain IP addresses
    let bind_addr: std::net::IpAddr = if bind_address == "localhost" {
        std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST)
    } else {
        bind_address
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid bind_address '{}': {}. Use an IP address (e.g., '0.0.0.0', '127.0.0.1') or 'localhost'.", bind_address, e))?
    };
    let addr = SocketAddr::from((bind_addr, port));
    info!(address = %addr, metrics_path = %metrics_path, "Server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
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
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        }
    }
}
