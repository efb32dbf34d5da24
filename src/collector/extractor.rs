//! Stat extractor
//!
//! Fetches the admin endpoints of one core and flattens the nested stat
//! blocks into a [`MetricSet`] keyed by metric suffix.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::client::AdminClient;
use super::metric_set::MetricSet;
use super::parser::{mbean_categories, LookupResult, MetricValue, Section};
use crate::error::LookupError;

/// Fields of the standard and update query handlers
pub const QUERY_HANDLER_FIELDS: &[&str] = &[
    "requests",
    "errors",
    "timeouts",
    "totalTime",
    "avgTimePerRequest",
    "avgRequestsPerSecond",
];

/// Fields of the `updateHandler` bean
pub const UPDATE_HANDLER_FIELDS: &[&str] = &[
    "commits",
    "autocommits",
    "optimizes",
    "rollbacks",
    "docsPending",
    "adds",
    "errors",
    "cumulative_adds",
    "cumulative_errors",
];

/// Fields of the searcher bean
pub const CORE_SEARCHER_FIELDS: &[&str] = &["maxDoc", "numDocs", "warmupTime"];

/// Cache beans collected when present
pub const CACHE_TYPES: &[&str] = &[
    "fieldValueCache",
    "filterCache",
    "documentCache",
    "queryResultCache",
];

/// Fields of every cache bean
pub const CACHE_FIELDS: &[&str] = &[
    "lookups",
    "hits",
    "hitratio",
    "inserts",
    "evictions",
    "size",
    "warmupTime",
    "cumulative_lookups",
    "cumulative_hits",
    "cumulative_hitratio",
    "cumulative_inserts",
    "cumulative_evictions",
];

/// Fields of the `jvm.memory` block
pub const JVM_MEMORY_FIELDS: &[&str] = &["free", "total", "max", "used"];

/// Named group of related metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatCategory {
    /// Ping response header
    Response,
    /// Searcher document counts
    Core,
    /// Standard and update query handlers
    Query,
    /// Update handler throughput
    Update,
    /// fieldValue, filter, document & queryResult caches
    Cache,
    /// JVM memory
    Jvm,
}

impl StatCategory {
    /// All categories in processing order
    pub const ALL: [StatCategory; 6] = [
        StatCategory::Response,
        StatCategory::Core,
        StatCategory::Query,
        StatCategory::Update,
        StatCategory::Cache,
        StatCategory::Jvm,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StatCategory::Response => "response",
            StatCategory::Core => "core",
            StatCategory::Query => "query",
            StatCategory::Update => "update",
            StatCategory::Cache => "cache",
            StatCategory::Jvm => "jvm",
        }
    }

    /// Whether this category is backed by the shared mbeans fetch
    pub fn uses_mbeans(&self) -> bool {
        matches!(
            self,
            StatCategory::Core | StatCategory::Query | StatCategory::Update | StatCategory::Cache
        )
    }
}

impl fmt::Display for StatCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StatCategory::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "unknown stat category '{}' (expected one of: response, core, query, update, cache, jvm)",
                    s
                )
            })
    }
}

/// Admin endpoint that stopped a core's extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Ping,
    MBeans,
    System,
}

impl Endpoint {
    /// Request path relative to the context, before normalization
    pub fn path(&self, core: &str) -> String {
        match self {
            Endpoint::Ping => format!("/{}/admin/ping?wt=json", core),
            Endpoint::MBeans => format!("/{}/admin/mbeans?stats=true&wt=json", core),
            Endpoint::System => format!("/{}/admin/system?stats=true&wt=json", core),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Endpoint::Ping => "ping",
            Endpoint::MBeans => "mbeans",
            Endpoint::System => "system",
        })
    }
}

/// Result of extracting one core
#[derive(Debug, Clone, Default)]
pub struct CoreExtraction {
    /// Metrics of every category that completed
    pub metrics: MetricSet,
    /// Endpoint whose failure stopped the remaining categories
    pub aborted: Option<Endpoint>,
    /// Categories discarded because of a lookup failure
    pub failed_categories: Vec<StatCategory>,
}

/// Per-core stat extractor
pub struct StatExtractor<'a> {
    client: &'a AdminClient,
}

impl<'a> StatExtractor<'a> {
    pub fn new(client: &'a AdminClient) -> Self {
        Self { client }
    }

    /// Extract every enabled category of `core`, in declaration order
    ///
    /// A failed ping, mbeans or system fetch stops the categories still
    /// pending; categories already extracted are kept. A lookup failure only
    /// discards its own category.
    pub async fn extract(
        &self,
        host: &str,
        port: u16,
        core: &str,
        enabled: &[StatCategory],
    ) -> CoreExtraction {
        let is_enabled = |c: StatCategory| enabled.contains(&c);
        let mut out = CoreExtraction::default();

        if is_enabled(StatCategory::Response) {
            let Some(ping) = self.client.fetch(host, port, &Endpoint::Ping.path(core)).await else {
                return out.abort(core, Endpoint::Ping);
            };
            out.apply(core, StatCategory::Response, extract_response(&ping));
        }

        if StatCategory::ALL
            .iter()
            .any(|c| c.uses_mbeans() && is_enabled(*c))
        {
            let Some(mbeans) = self
                .client
                .fetch(host, port, &Endpoint::MBeans.path(core))
                .await
            else {
                return out.abort(core, Endpoint::MBeans);
            };

            match mbean_categories(&mbeans) {
                Ok(beans) => {
                    for category in StatCategory::ALL
                        .into_iter()
                        .filter(|c| c.uses_mbeans() && is_enabled(*c))
                    {
                        out.apply(core, category, extract_mbeans_category(category, &beans));
                    }
                }
                Err(e) => {
                    warn!(core = %core, error = %e, "Unusable mbeans response");
                    out.failed_categories.extend(
                        StatCategory::ALL
                            .into_iter()
                            .filter(|c| c.uses_mbeans() && is_enabled(*c)),
                    );
                }
            }
        }

        if is_enabled(StatCategory::Jvm) {
            let Some(system) = self
                .client
                .fetch(host, port, &Endpoint::System.path(core))
                .await
            else {
                return out.abort(core, Endpoint::System);
            };
            out.apply(core, StatCategory::Jvm, extract_jvm(&system));
        }

        out
    }
}

impl CoreExtraction {
    fn apply(&mut self, core: &str, category: StatCategory, result: LookupResult<MetricSet>) {
        match result {
            Ok(metrics) => {
                self.metrics.merge(metrics);
            }
            Err(e) => {
                warn!(core = %core, category = %category, error = %e, "Discarding stat category");
                self.failed_categories.push(category);
            }
        }
    }

    fn abort(mut self, core: &str, endpoint: Endpoint) -> Self {
        debug!(core = %core, endpoint = %endpoint, kept = self.metrics.len(), "Stopping core extraction");
        self.aborted = Some(endpoint);
        self
    }
}

/// `response.QueryTime` / `response.Status` from a ping response
pub fn extract_response(ping: &Value) -> LookupResult<MetricSet> {
    let header = Section::root(ping)?.section(&["responseHeader"])?;
    let mut set = MetricSet::new();
    set.insert("response.QueryTime", header.scalar("QTime")?);
    set.insert("response.Status", header.scalar("status")?);
    Ok(set)
}

/// One mbeans-backed category from the paired `solr-mbeans` map
pub fn extract_mbeans_category(
    category: StatCategory,
    beans: &Map<String, Value>,
) -> LookupResult<MetricSet> {
    let beans = Section::new(beans, "solr-mbeans");
    match category {
        StatCategory::Core => extract_core(&beans),
        StatCategory::Query => extract_query(&beans),
        StatCategory::Update => extract_update(&beans),
        StatCategory::Cache => extract_cache(&beans),
        StatCategory::Response | StatCategory::Jvm => Ok(MetricSet::new()),
    }
}

fn extract_core(beans: &Section<'_>) -> LookupResult<MetricSet> {
    let searcher = beans.section(&["CORE", "searcher", "stats"])?;
    CORE_SEARCHER_FIELDS
        .iter()
        .map(|field| Ok((format!("core.{}", field), searcher.scalar(field)?)))
        .collect()
}

fn extract_query(beans: &Section<'_>) -> LookupResult<MetricSet> {
    let handlers = beans.section(&["QUERYHANDLER"])?;
    // Solr 4.x renamed the standard handler to /select
    let standard_key = if handlers.contains("standard") {
        "standard"
    } else {
        "/select"
    };
    let standard = handlers.section(&[standard_key, "stats"])?;
    let update = handlers.section(&["/update", "stats"])?;

    let mut set = MetricSet::new();
    for field in QUERY_HANDLER_FIELDS {
        set.insert(
            format!("queryhandler.standard.{}", field),
            standard.scalar(field)?,
        );
    }
    for field in QUERY_HANDLER_FIELDS {
        match update.scalar(field)? {
            MetricValue::Text(t) if t == "NaN" => continue,
            value => {
                set.insert(format!("queryhandler.update.{}", field), value);
            }
        }
    }
    Ok(set)
}

fn extract_update(beans: &Section<'_>) -> LookupResult<MetricSet> {
    let handler = beans.section(&["UPDATEHANDLER", "updateHandler", "stats"])?;
    UPDATE_HANDLER_FIELDS
        .iter()
        .map(|field| Ok((format!("updatehandler.{}", field), handler.scalar(field)?)))
        .collect()
}

fn extract_cache(beans: &Section<'_>) -> LookupResult<MetricSet> {
    let caches = beans.section(&["CACHE"])?;
    let mut set = MetricSet::new();

    for cache_type in CACHE_TYPES.iter().filter(|t| caches.contains(t)) {
        let stats = match caches.section(&[*cache_type, "stats"]) {
            Ok(stats) => stats,
            Err(e) => {
                debug!(cache = %cache_type, error = %e, "Skipping cache without stats");
                continue;
            }
        };

        for field in CACHE_FIELDS {
            match stats.get(field).ok().and_then(MetricValue::try_convert) {
                Some(value) => {
                    set.insert(format!("cache.{}.{}", cache_type, field), value);
                }
                None => debug!(cache = %cache_type, field = %field, "Skipping cache field"),
            }
        }
    }

    Ok(set)
}

/// `jvm.mem.*` from a system info response
///
/// String values look like `"512.0 MB"`; only the first token is kept.
pub fn extract_jvm(system: &Value) -> LookupResult<MetricSet> {
    let memory = Section::root(system)?.section(&["jvm", "memory"])?;
    let mut set = MetricSet::new();

    for field in JVM_MEMORY_FIELDS {
        let value = match memory.get(field)? {
            Value::String(s) => MetricValue::coerce(s.split_whitespace().next().unwrap_or_default()),
            other => MetricValue::from_scalar(other).ok_or_else(|| LookupError::NotScalar {
                path: format!("{}.{}", memory.path(), field),
            })?,
        };
        set.insert(format!("jvm.mem.{}", field), value);
    }

    Ok(set)
}
