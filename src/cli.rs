//! CLI argument parsing for rSolr-Exporter
//!
//! This module provides the command-line interface using clap derive macros.
//!
//! # Options
//!
//! - `--config` / `-c`: Configuration file path (default: config.yaml, env: RSOLR_CONFIG)
//! - `--port` / `-p`: HTTP server port (overrides config file, env: RSOLR_PORT)
//! - `--bind-address`: Server bind address (env: RSOLR_BIND_ADDRESS)
//! - `--metrics-path`: Metrics endpoint path (env: RSOLR_METRICS_PATH)
//! - `--solr-host` / `--solr-port`: Default Solr endpoint (env: RSOLR_SOLR_HOST, RSOLR_SOLR_PORT)
//! - `--context`: Solr web application context (env: RSOLR_CONTEXT)
//! - `--instance`: Instance descriptor, repeatable (env: RSOLR_INSTANCES, comma separated)
//! - `--core`: Restrict collection to one core (env: RSOLR_CORE)
//! - `--stats`: Enabled stat categories, comma separated (env: RSOLR_STATS)
//! - `--interval`: Seconds between cycles (env: RSOLR_INTERVAL)
//! - `--timeout`: Admin request timeout in milliseconds (env: RSOLR_TIMEOUT)
//! - `--validate`: Validate configuration and exit
//! - `--once`: Run a single collection cycle, print the metrics and exit
//! - `--log-level` / `-l`: Log level (trace/debug/info/warn/error, env: RSOLR_LOG_LEVEL)
//! - `--output-format`: Output format for --validate (text/json/yaml)
//!
//! # Precedence
//!
//! Configuration values are resolved in the following order (highest to lowest priority):
//! 1. CLI arguments
//! 2. Environment variables
//! 3. Configuration file
//! 4. Default values

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::collector::StatCategory;
use crate::config::Config;

/// rSolr-Exporter - Solr admin API metrics collector written in Rust
///
/// Periodically polls Solr admin endpoints and republishes query latency,
/// cache, update handler and JVM memory statistics as flat dotted metrics.
#[derive(Parser, Debug)]
#[command(name = "rsolr-exporter")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "config.yaml",
        env = "RSOLR_CONFIG"
    )]
    pub config: PathBuf,

    /// HTTP server port (overrides config file)
    #[arg(short, long, value_name = "PORT", env = "RSOLR_PORT")]
    pub port: Option<u16>,

    /// Server bind address (overrides config file)
    #[arg(long, value_name = "ADDRESS", env = "RSOLR_BIND_ADDRESS")]
    pub bind_address: Option<String>,

    /// Metrics endpoint path (overrides config file)
    #[arg(long, value_name = "PATH", env = "RSOLR_METRICS_PATH")]
    pub metrics_path: Option<String>,

    /// Solr host used when no instances are configured
    #[arg(long, value_name = "HOST", env = "RSOLR_SOLR_HOST")]
    pub solr_host: Option<String>,

    /// Solr port used when no instances are configured, and the fallback port
    #[arg(long, value_name = "PORT", env = "RSOLR_SOLR_PORT")]
    pub solr_port: Option<u16>,

    /// Solr web application context
    #[arg(long, value_name = "CONTEXT", env = "RSOLR_CONTEXT")]
    pub context: Option<String>,

    /// Instance descriptor `[alias@]host[:port]` (repeatable, replaces config file list)
    #[arg(
        long = "instance",
        value_name = "DESCRIPTOR",
        env = "RSOLR_INSTANCES",
        value_delimiter = ','
    )]
    pub instances: Vec<String>,

    /// Restrict collection to one core
    #[arg(long, value_name = "CORE", env = "RSOLR_CORE")]
    pub core: Option<String>,

    /// Enabled stat categories (comma separated)
    #[arg(long, value_name = "STATS", env = "RSOLR_STATS", value_delimiter = ',')]
    pub stats: Vec<StatCategory>,

    /// Seconds between collection cycles
    #[arg(long, value_name = "SECS", env = "RSOLR_INTERVAL")]
    pub interval: Option<u64>,

    /// Admin request timeout in milliseconds
    #[arg(long, value_name = "MS", env = "RSOLR_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Validate configuration and exit
    #[arg(long)]
    pub validate: bool,

    /// Run one collection cycle, print the metrics and exit
    #[arg(long, conflicts_with = "validate")]
    pub once: bool,

    /// Log level
    #[arg(
        short,
        long,
        value_enum,
        default_value = "info",
        env = "RSOLR_LOG_LEVEL"
    )]
    pub log_level: LogLevel,

    /// Output format for --validate
    #[arg(long, value_enum, default_value = "text")]
    pub output_format: OutputFormat,
}

impl Cli {
    /// Apply CLI overrides on top of a loaded configuration
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(ref bind_address) = self.bind_address {
            config.server.bind_address = bind_address.clone();
        }
        if let Some(ref path) = self.metrics_path {
            config.server.path = path.clone();
        }
        if let Some(ref host) = self.solr_host {
            config.solr.host = host.clone();
        }
        if let Some(port) = self.solr_port {
            config.solr.port = port;
        }
        if let Some(ref context) = self.context {
            config.solr.context = context.clone();
        }
        if !self.instances.is_empty() {
            config.solr.instances = self.instances.clone();
        }
        if let Some(ref core) = self.core {
            config.solr.core = Some(core.clone());
        }
        if !self.stats.is_empty() {
            config.solr.stats = self.stats.clone();
        }
        if let Some(interval) = self.interval {
            config.collector.interval_secs = interval;
        }
        if let Some(timeout) = self.timeout {
            config.solr.timeout_ms = timeout;
        }
    }
}

/// Log level options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// Trace level - most verbose
    Trace,
    /// Debug level
    Debug,
    /// Info level - default
    Info,
    /// Warn level
    Warn,
    /// Error level - least verbose
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Output format options for validate mode
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Yaml => write!(f, "yaml"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_display() {
        assert_eq!(LogLevel::Trace.to_string(), "trace");
        assert_eq!(LogLevel::Info.to_string(), "info");
        assert_eq!(LogLevel::Error.to_string(), "error");
    }

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(tracing::Level::from(LogLevel::Debug), tracing::Level::DEBUG);
        assert_eq!(tracing::Level::from(LogLevel::Warn), tracing::Level::WARN);
    }

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["rsolr-exporter"]);
        assert_eq!(cli.config, PathBuf::from("config.yaml"));
        assert_eq!(cli.port, None);
        assert!(cli.instances.is_empty());
        assert!(cli.stats.is_empty());
        assert_eq!(cli.core, None);
        assert!(!cli.validate);
        assert!(!cli.once);
        assert_eq!(cli.log_level, LogLevel::Info);
        assert_eq!(cli.output_format, OutputFormat::Text);
    }

    #[test]
    fn test_cli_solr_options() {
        let cli = Cli::parse_from([
            "rsolr-exporter",
            "--instance",
            "web1@solr1:8983",
            "--instance",
            "solr2",
            "--stats",
            "response,jvm",
            "--core",
            "products",
            "--context",
            "search",
            "--timeout",
            "250",
        ]);
        assert_eq!(cli.instances, vec!["web1@solr1:8983", "solr2"]);
        assert_eq!(cli.stats, vec![StatCategory::Response, StatCategory::Jvm]);
        assert_eq!(cli.core.as_deref(), Some("products"));
        assert_eq!(cli.context.as_deref(), Some("search"));
        assert_eq!(cli.timeout, Some(250));
    }

    #[test]
    fn test_cli_rejects_unknown_stat() {
        assert!(Cli::try_parse_from(["rsolr-exporter", "--stats", "disk"]).is_err());
    }

    #[test]
    fn test_once_conflicts_with_validate() {
        assert!(Cli::try_parse_from(["rsolr-exporter", "--once", "--validate"]).is_err());
    }

    #[test]
    fn test_apply_overrides() {
        let cli = Cli::parse_from([
            "rsolr-exporter",
            "-p",
            "9999",
            "--solr-host",
            "search.internal",
            "--interval",
            "5",
            "--stats",
            "cache",
        ]);
        let mut config = Config::default();
        cli.apply_overrides(&mut config);

        assert_eq!(config.server.port, 9999);
        assert_eq!(config.solr.host, "search.internal");
        assert_eq!(config.collector.interval_secs, 5);
        assert_eq!(config.solr.stats, vec![StatCategory::Cache]);
        // untouched values keep their defaults
        assert_eq!(config.solr.port, 8983);
        assert_eq!(config.solr.context, "solr");
    }
}
