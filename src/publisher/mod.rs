//! Metric key builder & publisher adapter
//!
//! Turns a core's [`MetricSet`] into fully qualified metric names and hands
//! each numeric value to a [`MetricSink`].

pub mod formatter;
pub mod sink;

use tracing::debug;

use crate::collector::{MetricSet, MetricValue};

pub use formatter::PlaintextFormatter;
pub use sink::{LogSink, MemorySink};

/// Receiver of published metrics
///
/// Implementations are expected not to block; failures are theirs to handle,
/// nothing is retried by the caller.
pub trait MetricSink: Send + Sync {
    /// Accept one `(name, value)` pair
    fn publish(&self, name: &str, value: f64);

    /// A collection cycle is about to publish
    fn begin_cycle(&self) {}

    /// The cycle started by [`MetricSink::begin_cycle`] completed
    fn end_cycle(&self) {}
}

impl<T: MetricSink + ?Sized> MetricSink for std::sync::Arc<T> {
    fn publish(&self, name: &str, value: f64) {
        (**self).publish(name, value)
    }

    fn begin_cycle(&self) {
        (**self).begin_cycle()
    }

    fn end_cycle(&self) {
        (**self).end_cycle()
    }
}

/// `"<core>."` for a named core, `""` otherwise
pub fn core_prefix(core: &str) -> String {
    if core.is_empty() {
        String::new()
    } else {
        format!("{}.", core)
    }
}

/// Fully qualified metric name
///
/// `<alias>.<core_prefix><suffix>`, or `<core_prefix><suffix>` without alias.
pub fn metric_name(alias: &str, core_prefix: &str, suffix: &str) -> String {
    if alias.is_empty() {
        format!("{}{}", core_prefix, suffix)
    } else {
        format!("{}.{}{}", alias, core_prefix, suffix)
    }
}

/// Counts of one `publish_all` call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishOutcome {
    /// Values handed to the sink
    pub published: usize,
    /// Values still non-numeric after coercion
    pub dropped: usize,
}

/// Adapter between extracted metric sets and a sink
pub struct Publisher<'a> {
    sink: &'a dyn MetricSink,
}

impl<'a> Publisher<'a> {
    pub fn new(sink: &'a dyn MetricSink) -> Self {
        Self { sink }
    }

    /// Publish every metric of one core exactly once
    ///
    /// Text values get one more numeric coercion; the literal `NaN` is
    /// published as NaN, any other text that still isn't a number is dropped.
    pub fn publish_all(&self, alias: &str, core_prefix: &str, metrics: &MetricSet) -> PublishOutcome {
        let mut outcome = PublishOutcome::default();

        for (suffix, value) in metrics {
            let name = metric_name(alias, core_prefix, suffix);
            let numeric = match value {
                MetricValue::Text(text) if text.trim() == "NaN" => Some(f64::NAN),
                MetricValue::Text(text) => MetricValue::coerce(text).as_f64(),
                other => other.as_f64(),
            };

            match numeric {
                Some(v) => {
                    self.sink.publish(&name, v);
                    outcome.published += 1;
                }
                None => {
                    debug!(metric = %name, value = %value, "Dropping non-numeric metric");
                    outcome.dropped += 1;
                }
            }
        }

        outcome
    }
}
