//! HTTP request handlers
//!
//! Contains handlers for all HTTP endpoints.

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
    Json,
};
use serde::Serialize;
use tracing::{debug, instrument};

use super::AppState;
use crate::publisher::PlaintextFormatter;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    /// Health status
    status: String,
    /// Application version
    version: String,
    /// Completed collection cycles
    cycles: u64,
    /// Metrics currently held in the snapshot
    metrics: usize,
}

/// Root endpoint - version, Solr targets and links
pub async fn root(State(state): State<AppState>) -> Html<String> {
    let solr = &state.config.solr;
    let targets = if solr.instances.is_empty() {
        format!("<li>{}:{}</li>", solr.host, solr.port)
    } else {
        solr.instances
            .iter()
            .map(|i| format!("<li>{}</li>", i))
            .collect::<String>()
    };
    let stats: Vec<&str> = solr.stats.iter().map(|s| s.as_str()).collect();

    Html(format!(
        r#"<!DOCTYPE html>
<html>
<head><title>rSolr-Exporter</title></head>
<body>
    <h1>rSolr-Exporter {version}</h1>
    <h2>Solr instances (context /{context})</h2>
    <ul>{targets}</ul>
    <p>Stats: {stats}</p>
    <p><a href="/health">Health</a> | <a href="{path}">Metrics</a></p>
</body>
</html>"#,
        version = env!("CARGO_PKG_VERSION"),
        context = solr.context,
        targets = targets,
        stats = stats.join(", "),
        path = state.config.server.path,
    ))
}

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        cycles: state.metrics.cycles(),
        metrics: state.sink.len(),
    })
}

/// Metrics endpoint - latest snapshot plus exporter self metrics, Graphite plaintext
#[instrument(skip(state), name = "metrics_handler")]
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.sink.snapshot();

    let mut formatter = PlaintextFormatter::new();
    if let Some(prefix) = &state.config.collector.prefix {
        formatter = formatter.with_prefix(prefix.as_str());
    }

    let mut output = formatter.format(&snapshot);
    output.push_str(&PlaintextFormatter::new().format(&state.metrics.to_records()));

    debug!(metrics_count = snapshot.len(), "Serving metrics snapshot");

    (
        StatusCode::OK,
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; charset=utf-8",
        )],
        output,
    )
}
