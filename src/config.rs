//! Configuration management for rSolr-Exporter
//!
//! Handles loading and validating configuration from YAML files.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::collector::{InstanceRegistry, StatCategory};

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Error reading the configuration file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Error parsing the configuration file
    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// Configuration validation error
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Solr target configuration
    #[serde(default)]
    pub solr: SolrConfig,

    /// Collection schedule configuration
    #[serde(default)]
    pub collector: CollectorConfig,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
}

/// Solr target configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolrConfig {
    /// Host used when `instances` is empty
    #[serde(default = "default_solr_host")]
    pub host: String,

    /// Port used when `instances` is empty, and the fallback port for
    /// descriptors without one
    #[serde(default = "default_solr_port")]
    pub port: u16,

    /// Web application context path segment
    #[serde(default = "default_context")]
    pub context: String,

    /// Instance descriptors (`alias@host:port`, `alias@host`, `host:port`, `host`)
    #[serde(default)]
    pub instances: Vec<String>,

    /// Restrict collection to a single core
    #[serde(default)]
    pub core: Option<String>,

    /// Enabled stat categories
    #[serde(default = "default_stats")]
    pub stats: Vec<StatCategory>,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,
}

/// Collection schedule configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// Seconds between two collection cycles
    #[serde(default = "default_interval")]
    pub interval_secs: u64,

    /// Optional prefix prepended to every exposed metric name
    #[serde(default)]
    pub prefix: Option<String>,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Serve the latest snapshot over HTTP
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Metrics endpoint path
    #[serde(default = "default_metrics_path")]
    pub path: String,

    /// Server bind address
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

// Default value functions
fn default_solr_host() -> String {
    "localhost".to_string()
}

fn default_solr_port() -> u16 {
    8983
}

fn default_context() -> String {
    "solr".to_string()
}

fn default_stats() -> Vec<StatCategory> {
    StatCategory::ALL.to_vec()
}

fn default_timeout() -> u64 {
    5000
}

fn default_interval() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

fn default_port() -> u16 {
    9231
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

impl Default for SolrConfig {
    fn default() -> Self {
        Self {
            host: default_solr_host(),
            port: default_solr_port(),
            context: default_context(),
            instances: Vec::new(),
            core: None,
            stats: default_stats(),
            timeout_ms: default_timeout(),
        }
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
            prefix: None,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            port: default_port(),
            path: default_metrics_path(),
            bind_address: default_bind_address(),
        }
    }
}

impl SolrConfig {
    /// The configured core, with an empty string treated as unset
    pub fn core_filter(&self) -> Option<&str> {
        self.core.as_deref().filter(|c| !c.is_empty())
    }
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed or validated.
    /// Use `Config::load_or_default()` if you want fallback to defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file, falling back to defaults if not found
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::warn!(
                path = %path.display(),
                "Config file not found, using defaults"
            );
            return Ok(Self::default());
        }

        Self::load(path)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        if !self.server.path.starts_with('/') {
            return Err(ConfigError::ValidationError(
                "Metrics path must start with '/'".to_string(),
            ));
        }

        if self.server.path == "/" || self.server.path == "/health" {
            return Err(ConfigError::ValidationError(format!(
                "Metrics path '{}' conflicts with a built-in route",
                self.server.path
            )));
        }

        if self.solr.port == 0 {
            return Err(ConfigError::ValidationError(
                "Solr port must be greater than 0".to_string(),
            ));
        }

        if self.solr.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "Solr timeout must be greater than 0".to_string(),
            ));
        }

        if self.collector.interval_secs == 0 {
            return Err(ConfigError::ValidationError(
                "Collection interval must be greater than 0".to_string(),
            ));
        }

        if self.solr.stats.is_empty() {
            return Err(ConfigError::ValidationError(
                "At least one stat category must be enabled".to_string(),
            ));
        }

        InstanceRegistry::from_config(&self.solr)
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.solr.host, "localhost");
        assert_eq!(config.solr.port, 8983);
        assert_eq!(config.solr.context, "solr");
        assert!(config.solr.instances.is_empty());
        assert_eq!(config.solr.stats.len(), 6);
        assert_eq!(config.server.path, "/metrics");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.collector.interval_secs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.server.path = "/health".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_instance_rejected() {
        let mut config = Config::default();
        config.solr.instances = vec!["web1@solr1:notaport".to_string()];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("web1@solr1:notaport"));
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
solr:
  context: search
  instances:
    - web1@solr1:8984
    - solr2
  core: products
  stats: [response, cache]
collector:
  interval_secs: 10
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.solr.context, "search");
        assert_eq!(config.solr.instances.len(), 2);
        assert_eq!(config.solr.core_filter(), Some("products"));
        assert_eq!(
            config.solr.stats,
            vec![StatCategory::Response, StatCategory::Cache]
        );
        assert_eq!(config.collector.interval_secs, 10);
        assert_eq!(config.server.port, 9231);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_stat_rejected() {
        let yaml = "solr:\n  stats: [response, bogus]\n";
        assert!(serde_yaml::from_str::<Config>(yaml).is_err());
    }

    #[test]
    fn test_empty_core_is_unset() {
        let mut config = SolrConfig::default();
        config.core = Some(String::new());
        assert_eq!(config.core_filter(), None);
    }
}
