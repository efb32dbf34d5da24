//! Periodic collection driver
//!
//! Calls [`SolrCollector::collect_once`] on a fixed interval until shutdown.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::info;

use crate::collector::SolrCollector;
use crate::metrics::InternalMetrics;
use crate::publisher::MetricSink;

/// Run collection cycles until `shutdown` resolves
///
/// The first cycle starts immediately. A cycle still running when shutdown
/// arrives is abandoned as a whole; slow cycles delay the next tick instead
/// of bursting.
pub async fn run<F>(
    collector: Arc<SolrCollector>,
    sink: Arc<dyn MetricSink>,
    metrics: InternalMetrics,
    interval: Duration,
    shutdown: F,
) where
    F: Future<Output = ()>,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    info!(interval_secs = interval.as_secs_f64(), "Scheduler started");

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = ticker.tick() => {
                tokio::select! {
                    report = collector.collect_once(sink.as_ref()) => {
                        metrics.record_cycle(&report);
                    }
                    _ = &mut shutdown => {
                        info!("Shutdown during collection, abandoning cycle");
                        break;
                    }
                }
            }
        }
    }

    info!(cycles = metrics.cycles(), "Scheduler stopped");
}
