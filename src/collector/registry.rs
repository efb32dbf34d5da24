//! Instance registry
//!
//! 설정의 instance descriptor 목록을 alias → (host, port) 매핑으로 변환합니다.

use std::collections::BTreeMap;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::config::SolrConfig;
use crate::error::RegistryError;

/// Alias used when a descriptor doesn't carry one
pub const DEFAULT_ALIAS: &str = "default";

/// `[alias@]host[:port]`
static DESCRIPTOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(?P<alias>[^@]*)@)?(?P<host>[^:@]*)(?::(?P<port>[^:@]*))?$")
        .expect("descriptor regex is valid")
});

/// One addressable Solr endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceDescriptor {
    /// Registry key
    pub alias: String,
    /// Host name or address
    pub host: String,
    /// HTTP port
    pub port: u16,
    /// Synthesized from the default host/port because no instances were configured
    pub implicit: bool,
}

impl InstanceDescriptor {
    /// Parse a single descriptor string
    ///
    /// Missing alias falls back to [`DEFAULT_ALIAS`], missing port to `default_port`.
    pub fn parse(descriptor: &str, default_port: u16) -> Result<Self, RegistryError> {
        let invalid = |reason: &str| RegistryError::InvalidDescriptor {
            descriptor: descriptor.to_string(),
            reason: reason.to_string(),
        };

        let caps = DESCRIPTOR_RE
            .captures(descriptor.trim())
            .ok_or_else(|| invalid("expected [alias@]host[:port]"))?;

        let alias = caps
            .name("alias")
            .map(|m| m.as_str())
            .filter(|a| !a.is_empty())
            .unwrap_or(DEFAULT_ALIAS);

        let host = caps.name("host").map(|m| m.as_str()).unwrap_or_default();
        if host.is_empty() {
            return Err(invalid("host is empty"));
        }

        let port = match caps.name("port") {
            Some(p) => p
                .as_str()
                .parse::<u16>()
                .ok()
                .filter(|p| *p > 0)
                .ok_or_else(|| invalid("port must be an integer between 1 and 65535"))?,
            None => default_port,
        };

        Ok(Self {
            alias: alias.to_string(),
            host: host.to_string(),
            port,
            implicit: false,
        })
    }

    /// Alias used as the metric name prefix
    ///
    /// The implicit instance publishes without an alias segment.
    pub fn naming_alias(&self) -> &str {
        if self.implicit {
            ""
        } else {
            &self.alias
        }
    }
}

impl fmt::Display for InstanceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}", self.alias, self.host, self.port)
    }
}

/// Immutable alias → instance mapping, iterated in alias order
#[derive(Debug, Clone, Default)]
pub struct InstanceRegistry {
    instances: BTreeMap<String, InstanceDescriptor>,
}

impl InstanceRegistry {
    /// Build the registry from descriptor strings
    ///
    /// An empty list yields a single implicit instance on `default_host:default_port`.
    /// Duplicate aliases keep the last entry.
    pub fn parse<S: AsRef<str>>(
        descriptors: &[S],
        default_host: &str,
        default_port: u16,
    ) -> Result<Self, RegistryError> {
        let mut instances = BTreeMap::new();

        if descriptors.is_empty() {
            let mut implicit = InstanceDescriptor::parse(
                &format!("@{}:{}", default_host, default_port),
                default_port,
            )?;
            implicit.implicit = true;
            instances.insert(implicit.alias.clone(), implicit);
            return Ok(Self { instances });
        }

        for raw in descriptors {
            let instance = InstanceDescriptor::parse(raw.as_ref(), default_port)?;
            if let Some(previous) = instances.insert(instance.alias.clone(), instance) {
                debug!(alias = %previous.alias, replaced = %previous, "Duplicate instance alias, last entry wins");
            }
        }

        Ok(Self { instances })
    }

    /// Build the registry from the `solr` config section
    pub fn from_config(config: &SolrConfig) -> Result<Self, RegistryError> {
        Self::parse(&config.instances, &config.host, config.port)
    }

    /// Look up an instance by alias
    pub fn get(&self, alias: &str) -> Option<&InstanceDescriptor> {
        self.instances.get(alias)
    }

    /// Instances in lexicographic alias order
    pub fn iter(&self) -> impl Iterator<Item = &InstanceDescriptor> {
        self.instances.values()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}
