//! Internal observability metrics for rSolr-Exporter
//!
//! # Metrics
//!
//! ## Per-instance metrics
//! - `rsolr_exporter.<alias>.cycles_total` - Collection cycles that visited the instance
//! - `rsolr_exporter.<alias>.cores_aborted_total` - Cores whose extraction stopped early
//! - `rsolr_exporter.<alias>.published_total` - Metrics handed to the sink
//! - `rsolr_exporter.<alias>.last_published` - Metrics published by the last cycle
//!
//! ## Global metrics
//! - `rsolr_exporter.cycles_total` - Completed collection cycles
//! - `rsolr_exporter.last_cycle_duration_seconds` - Wall time of the last cycle
//! - `rsolr_exporter.last_cycle_timestamp` - Unix time the last cycle finished

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::collector::CycleReport;

/// Name prefix of every self metric
pub const METRIC_PREFIX: &str = "rsolr_exporter";

/// Thread-safe counter using atomic operations
#[derive(Debug, Default)]
pub struct Counter {
    value: AtomicU64,
}

impl Counter {
    /// Create a new counter initialized to 0
    pub fn new() -> Self {
        Self {
            value: AtomicU64::new(0),
        }
    }

    /// Increment the counter by 1
    pub fn inc(&self) {
        self.value.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment the counter by a specific amount
    pub fn inc_by(&self, n: u64) {
        self.value.fetch_add(n, Ordering::Relaxed);
    }

    /// Get the current value
    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

/// Thread-safe gauge using atomic operations
#[derive(Debug, Default)]
pub struct Gauge {
    /// Stored as bits of f64 for atomic operations
    value: AtomicU64,
}

impl Gauge {
    /// Create a new gauge initialized to 0
    pub fn new() -> Self {
        Self {
            value: AtomicU64::new(0.0_f64.to_bits()),
        }
    }

    /// Set the gauge to a specific value
    pub fn set(&self, v: f64) {
        self.value.store(v.to_bits(), Ordering::Relaxed);
    }

    /// Get the current value
    pub fn get(&self) -> f64 {
        f64::from_bits(self.value.load(Ordering::Relaxed))
    }

    /// Set the gauge to the current Unix timestamp
    pub fn set_to_current_time(&self) {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0);
        self.set(timestamp);
    }
}

/// Per-instance metrics
#[derive(Debug, Default)]
pub struct InstanceMetrics {
    pub cycles_total: Counter,
    pub cores_aborted_total: Counter,
    pub published_total: Counter,
    pub last_published: Gauge,
}

/// Internal metrics registry
///
/// Thread-safe; shared between the scheduler and the HTTP handlers.
#[derive(Debug, Clone, Default)]
pub struct InternalMetrics {
    /// Per-instance metrics, keyed by alias
    instances: Arc<RwLock<BTreeMap<String, Arc<InstanceMetrics>>>>,
    cycles_total: Arc<Counter>,
    last_cycle_duration_seconds: Arc<Gauge>,
    last_cycle_timestamp: Arc<Gauge>,
}

impl InternalMetrics {
    /// Create a new internal metrics registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create metrics for an instance
    pub fn instance(&self, alias: &str) -> Arc<InstanceMetrics> {
        {
            let instances = self.instances.read().expect("RwLock poisoned");
            if let Some(metrics) = instances.get(alias) {
                return Arc::clone(metrics);
            }
        }

        let mut instances = self.instances.write().expect("RwLock poisoned");
        Arc::clone(instances.entry(alias.to_string()).or_default())
    }

    /// Record the outcome of one collection cycle
    pub fn record_cycle(&self, report: &CycleReport) {
        for instance in &report.instances {
            let metrics = self.instance(&instance.alias);
            metrics.cycles_total.inc();
            metrics.cores_aborted_total.inc_by(instance.cores_aborted as u64);
            metrics.published_total.inc_by(instance.published as u64);
            metrics.last_published.set(instance.published as f64);
        }

        self.cycles_total.inc();
        self.last_cycle_duration_seconds
            .set(report.duration.as_secs_f64());
        self.last_cycle_timestamp.set_to_current_time();
    }

    /// Completed collection cycles
    pub fn cycles(&self) -> u64 {
        self.cycles_total.get()
    }

    /// All self metrics as `(name, value)` pairs, ordered by name
    pub fn to_records(&self) -> Vec<(String, f64)> {
        let mut records = vec![
            (
                format!("{}.cycles_total", METRIC_PREFIX),
                self.cycles_total.get() as f64,
            ),
            (
                format!("{}.last_cycle_duration_seconds", METRIC_PREFIX),
                self.last_cycle_duration_seconds.get(),
            ),
            (
                format!("{}.last_cycle_timestamp", METRIC_PREFIX),
                self.last_cycle_timestamp.get(),
            ),
        ];

        let instances = self.instances.read().expect("RwLock poisoned");
        for (alias, metrics) in instances.iter() {
            let name = |field: &str| format!("{}.{}.{}", METRIC_PREFIX, alias, field);
            records.push((name("cycles_total"), metrics.cycles_total.get() as f64));
            records.push((
                name("cores_aborted_total"),
                metrics.cores_aborted_total.get() as f64,
            ));
            records.push((
                name("published_total"),
                metrics.published_total.get() as f64,
            ));
            records.push((name("last_published"), metrics.last_published.get()));
        }

        records
    }
}
