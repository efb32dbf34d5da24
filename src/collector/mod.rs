//! Solr admin API 메트릭 수집 모듈
//!
//! 인스턴스별로 core를 찾고, core별로 활성화된 stat category를 추출하여
//! 평탄화된 메트릭을 sink로 전달합니다.
//!
//! # Example
//!
//! ```ignore
//! use rsolr_exporter::collector::SolrCollector;
//! use rsolr_exporter::publisher::MemorySink;
//!
//! let collector = SolrCollector::new(&config.solr)?;
//! let sink = MemorySink::new();
//! let report = collector.collect_once(&sink).await;
//! ```

mod client;
mod discovery;
mod extractor;
mod metric_set;
mod parser;
mod registry;

pub use client::{normalize_path, AdminClient, CollectResult};
pub use discovery::{discover_cores, loaded_cores, CORES_STATUS_PATH};
pub use extractor::{
    extract_jvm, extract_mbeans_category, extract_response, CoreExtraction, Endpoint,
    StatCategory, StatExtractor,
};
pub use metric_set::MetricSet;
pub use parser::{mbean_categories, LookupResult, MetricValue, Section};
pub use registry::{InstanceDescriptor, InstanceRegistry, DEFAULT_ALIAS};

use std::time::{Duration, Instant};

use tracing::{debug, info, instrument};

use crate::config::SolrConfig;
use crate::error::AppResult;
use crate::publisher::{core_prefix, MetricSink, Publisher};

/// 인스턴스별 수집 결과
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstanceReport {
    /// Registry alias
    pub alias: String,
    /// Cores selected for collection
    pub cores: usize,
    /// Cores whose extraction stopped on a failed fetch
    pub cores_aborted: usize,
    /// Metrics handed to the sink
    pub published: usize,
    /// Non-numeric values that were not published
    pub dropped: usize,
}

/// 한 번의 수집 사이클 결과
#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    /// One entry per instance, in alias order
    pub instances: Vec<InstanceReport>,
    /// Wall time of the cycle
    pub duration: Duration,
}

impl CycleReport {
    pub fn total_published(&self) -> usize {
        self.instances.iter().map(|i| i.published).sum()
    }

    pub fn instance(&self, alias: &str) -> Option<&InstanceReport> {
        self.instances.iter().find(|i| i.alias == alias)
    }
}

/// Collector - 설정 기반 수집 엔트리 포인트
///
/// Immutable once built; every cycle reads the same registry and settings.
pub struct SolrCollector {
    client: AdminClient,
    registry: InstanceRegistry,
    core: Option<String>,
    stats: Vec<StatCategory>,
}

impl SolrCollector {
    /// Build a collector from the `solr` config section
    pub fn new(config: &SolrConfig) -> AppResult<Self> {
        let client = AdminClient::new(&config.context, config.timeout_ms)?;
        let registry = InstanceRegistry::from_config(config)?;
        Ok(Self::from_parts(
            client,
            registry,
            config.core_filter().map(str::to_string),
            &config.stats,
        ))
    }

    /// Build a collector from already constructed parts
    ///
    /// `stats` is deduplicated and put in processing order.
    pub fn from_parts(
        client: AdminClient,
        registry: InstanceRegistry,
        core: Option<String>,
        stats: &[StatCategory],
    ) -> Self {
        let stats = StatCategory::ALL
            .into_iter()
            .filter(|c| stats.contains(c))
            .collect();
        Self {
            client,
            registry,
            core,
            stats,
        }
    }

    pub fn registry(&self) -> &InstanceRegistry {
        &self.registry
    }

    pub fn stats(&self) -> &[StatCategory] {
        &self.stats
    }

    /// 한 번의 수집 사이클 실행
    ///
    /// Instances run one after another in alias order. Failures stay inside the
    /// endpoint, category or core where they happened; the cycle always completes.
    /// The sink is told where the cycle starts and ends.
    pub async fn collect_once(&self, sink: &dyn MetricSink) -> CycleReport {
        let start = Instant::now();
        let publisher = Publisher::new(sink);

        sink.begin_cycle();
        let mut instances = Vec::with_capacity(self.registry.len());
        for instance in self.registry.iter() {
            instances.push(self.collect_instance(instance, &publisher).await);
        }
        sink.end_cycle();

        let report = CycleReport {
            instances,
            duration: start.elapsed(),
        };

        info!(
            instances = report.instances.len(),
            published = report.total_published(),
            duration_ms = report.duration.as_millis() as u64,
            "Collection cycle complete"
        );

        report
    }

    #[instrument(skip(self, instance, publisher), fields(instance = %instance.alias))]
    async fn collect_instance(
        &self,
        instance: &InstanceDescriptor,
        publisher: &Publisher<'_>,
    ) -> InstanceReport {
        let cores = discover_cores(&self.client, instance, self.core.as_deref()).await;
        let extractor = StatExtractor::new(&self.client);

        let mut report = InstanceReport {
            alias: instance.alias.clone(),
            cores: cores.len(),
            ..Default::default()
        };

        for core in &cores {
            let extraction = extractor
                .extract(&instance.host, instance.port, core, &self.stats)
                .await;

            if extraction.aborted.is_some() {
                report.cores_aborted += 1;
            }

            let outcome = publisher.publish_all(
                instance.naming_alias(),
                &core_prefix(core),
                &extraction.metrics,
            );
            report.published += outcome.published;
            report.dropped += outcome.dropped;

            debug!(
                core = %core,
                published = outcome.published,
                aborted = ?extraction.aborted,
                failed_categories = ?extraction.failed_categories,
                "Core collected"
            );
        }

        report
    }
}
