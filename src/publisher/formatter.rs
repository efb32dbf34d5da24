//! Graphite plaintext output
//!
//! ```text
//! <metric_name> <value> <unix_timestamp>
//! ```

use std::time::{SystemTime, UNIX_EPOCH};

/// Graphite plaintext protocol formatter
///
/// # Example
///
/// ```ignore
/// use rsolr_exporter::publisher::PlaintextFormatter;
///
/// let formatter = PlaintextFormatter::new().with_prefix("solr");
/// let output = formatter.format(&[("web1.core.numDocs".to_string(), 42.0)]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PlaintextFormatter {
    /// Prefix joined to every name with a dot
    prefix: Option<String>,
    /// Fixed timestamp instead of the current time
    timestamp: Option<u64>,
}

impl PlaintextFormatter {
    /// Create a new formatter
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend `prefix.` to every metric name; an empty prefix is ignored
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let prefix = prefix.trim_matches('.');
        self.prefix = (!prefix.is_empty()).then(|| prefix.to_string());
        self
    }

    /// Use a fixed timestamp (seconds since the epoch)
    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Format `(name, value)` pairs, one line each
    pub fn format(&self, metrics: &[(String, f64)]) -> String {
        if metrics.is_empty() {
            return String::new();
        }

        let timestamp = self.timestamp.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0)
        });

        let mut output = String::with_capacity(metrics.len() * 64);
        for (name, value) in metrics {
            output.push_str(&self.format_line(name, *value, timestamp));
            output.push('\n');
        }
        output
    }

    fn format_line(&self, name: &str, value: f64, timestamp: u64) -> String {
        let name = sanitize_name(name);
        match &self.prefix {
            Some(prefix) => format!("{}.{} {} {}", prefix, name, format_value(value), timestamp),
            None => format!("{} {} {}", name, format_value(value), timestamp),
        }
    }
}

/// Whitespace would split the plaintext line, so it becomes `_`
fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect()
}

fn format_value(value: f64) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else if value.is_infinite() {
        if value.is_sign_positive() {
            "inf".to_string()
        } else {
            "-inf".to_string()
        }
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_lines() {
        let formatter = PlaintextFormatter::new().with_timestamp(1_700_000_000);
        let output = formatter.format(&[
            ("web1.core.numDocs".to_string(), 42.0),
            ("web1.cache.filterCache.hitratio".to_string(), 0.75),
        ]);
        assert_eq!(
            output,
            "web1.core.numDocs 42 1700000000\nweb1.cache.filterCache.hitratio 0.75 1700000000\n"
        );
    }

    #[test]
    fn test_prefix() {
        let formatter = PlaintextFormatter::new()
            .with_prefix("servers.solr.")
            .with_timestamp(1);
        assert_eq!(
            formatter.format(&[("response.Status".to_string(), 0.0)]),
            "servers.solr.response.Status 0 1\n"
        );

        let formatter = PlaintextFormatter::new().with_prefix("").with_timestamp(1);
        assert_eq!(formatter.format(&[("a".to_string(), 1.0)]), "a 1 1\n");
    }

    #[test]
    fn test_whitespace_in_name() {
        let formatter = PlaintextFormatter::new().with_timestamp(1);
        assert_eq!(
            formatter.format(&[("my core.core.numDocs".to_string(), 1.0)]),
            "my_core.core.numDocs 1 1\n"
        );
    }

    #[test]
    fn test_empty() {
        assert!(PlaintextFormatter::new().format(&[]).is_empty());
    }

    #[test]
    fn test_special_values() {
        assert_eq!(format_value(f64::NAN), "nan");
        assert_eq!(format_value(f64::NEG_INFINITY), "-inf");
        assert_eq!(format_value(1.5), "1.5");
    }
}
