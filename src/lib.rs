//! rSolr-Exporter library
//!
//! This crate polls Solr admin endpoints (cores status, ping, mbeans, system),
//! flattens the returned stat blocks into dotted metric names and hands them to
//! a metric sink.

pub mod cli;
pub mod collector;
pub mod config;
pub mod error;
pub mod metrics;
pub mod publisher;
pub mod scheduler;
pub mod server;

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the logging subsystem
///
/// # Arguments
/// * `level` - Log level string (trace, debug, info, warn, error)
///
/// # Errors
/// Returns an error if the logging system fails to initialize
pub fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}
