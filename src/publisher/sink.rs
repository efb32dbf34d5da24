//! Built-in metric sinks

use std::collections::BTreeMap;
use std::sync::{Mutex, RwLock};

use tracing::info;

use super::MetricSink;

/// Keeps the values of the last completed collection cycle
///
/// Backs the HTTP exposition and `--once` output. Values published inside a
/// cycle are staged and replace the whole snapshot when the cycle ends, so
/// series that were not published again disappear. An abandoned cycle leaves
/// the previous snapshot in place. Outside a cycle, values are written
/// straight into the snapshot.
#[derive(Debug, Default)]
pub struct MemorySink {
    values: RwLock<BTreeMap<String, f64>>,
    pending: Mutex<Option<BTreeMap<String, f64>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest value of `name`
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values
            .read()
            .expect("RwLock poisoned")
            .get(name)
            .copied()
    }

    /// All values, ordered by name
    pub fn snapshot(&self) -> Vec<(String, f64)> {
        self.values
            .read()
            .expect("RwLock poisoned")
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.values.read().expect("RwLock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MetricSink for MemorySink {
    fn publish(&self, name: &str, value: f64) {
        {
            let mut pending = self.pending.lock().expect("Mutex poisoned");
            if let Some(cycle) = pending.as_mut() {
                cycle.insert(name.to_string(), value);
                return;
            }
        }

        self.values
            .write()
            .expect("RwLock poisoned")
            .insert(name.to_string(), value);
    }

    fn begin_cycle(&self) {
        *self.pending.lock().expect("Mutex poisoned") = Some(BTreeMap::new());
    }

    fn end_cycle(&self) {
        let staged = self.pending.lock().expect("Mutex poisoned").take();
        if let Some(values) = staged {
            *self.values.write().expect("RwLock poisoned") = values;
        }
    }
}

/// Emits every metric as an info event
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl MetricSink for LogSink {
    fn publish(&self, name: &str, value: f64) {
        info!(metric = %name, value, "metric");
    }
}
