//! rSolr-Exporter - Solr admin API metrics collector
//!
//! Polls Solr admin endpoints on an interval and serves the flattened
//! metrics as Graphite plaintext.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tokio::sync::watch;
use tracing::info;

use rsolr_exporter::cli::{Cli, OutputFormat};
use rsolr_exporter::collector::SolrCollector;
use rsolr_exporter::config::Config;
use rsolr_exporter::metrics::InternalMetrics;
use rsolr_exporter::publisher::{LogSink, MemorySink, MetricSink, PlaintextFormatter};
use rsolr_exporter::{scheduler, server};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging
    rsolr_exporter::init_logging(&cli.log_level.to_string())?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting rSolr-Exporter"
    );

    // Load configuration, CLI overrides win
    let mut config = if cli.validate {
        Config::load(&cli.config)?
    } else {
        Config::load_or_default(&cli.config)?
    };
    cli.apply_overrides(&mut config);
    config.validate()?;

    if cli.validate {
        print_config(&config, cli.output_format)?;
        return Ok(());
    }

    let collector = Arc::new(SolrCollector::new(&config.solr)?);
    let sink = Arc::new(MemorySink::new());

    info!(
        instances = collector.registry().len(),
        stats = ?collector.stats(),
        "Collector ready"
    );

    if cli.once {
        collector.collect_once(sink.as_ref()).await;
        let mut formatter = PlaintextFormatter::new();
        if let Some(prefix) = &config.collector.prefix {
            formatter = formatter.with_prefix(prefix.as_str());
        }
        print!("{}", formatter.format(&sink.snapshot()));
        return Ok(());
    }

    let metrics = InternalMetrics::new();
    let interval = Duration::from_secs(config.collector.interval_secs);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Without the HTTP server nothing reads the snapshot, so metrics go to the log
    let cycle_sink: Arc<dyn MetricSink> = if config.server.enabled {
        sink.clone()
    } else {
        Arc::new(LogSink)
    };

    let scheduler_handle = tokio::spawn(scheduler::run(
        Arc::clone(&collector),
        cycle_sink,
        metrics.clone(),
        interval,
        wait_for_shutdown(shutdown_rx.clone()),
    ));

    let signal_task = tokio::spawn(async move {
        server::shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    if config.server.enabled {
        let port = config.server.port;
        let state = server::AppState {
            config: Arc::new(config),
            sink,
            metrics,
        };
        server::run(state, port, wait_for_shutdown(shutdown_rx)).await?;
    } else {
        wait_for_shutdown(shutdown_rx).await;
    }

    scheduler_handle.await?;
    signal_task.abort();

    Ok(())
}

async fn wait_for_shutdown(mut rx: watch::Receiver<bool>) {
    // a dropped sender also ends the wait
    let _ = rx.wait_for(|stopped| *stopped).await;
}

fn print_config(config: &Config, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(config)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(config)?),
        OutputFormat::Text => {
            println!("Configuration is valid");
            if config.solr.instances.is_empty() {
                println!("  instance: {}:{}", config.solr.host, config.solr.port);
            } else {
                for instance in &config.solr.instances {
                    println!("  instance: {}", instance);
                }
            }
            println!("  context: {}", config.solr.context);
            println!(
                "  core: {}",
                config.solr.core_filter().unwrap_or("(all loaded cores)")
            );
            let stats: Vec<String> = config.solr.stats.iter().map(|s| s.to_string()).collect();
            println!("  stats: {}", stats.join(", "));
            println!("  interval: {}s", config.collector.interval_secs);
        }
    }
    Ok(())
}
