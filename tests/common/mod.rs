//! Mock Solr fixtures shared by the integration tests

#![allow(dead_code)]

use std::time::Duration;

use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Metrics one healthy core yields with every category enabled:
/// response 2 + core 3 + query 6/4 + update 9 + cache 2x12 + jvm 4
pub const FULL_CORE_METRICS: usize = 52;

pub fn cores_status(cores: &[(&str, Option<&str>)]) -> Value {
    let status: serde_json::Map<String, Value> = cores
        .iter()
        .map(|(name, loaded)| {
            let entry = match loaded {
                Some(flag) => json!({"name": name, "isLoaded": flag}),
                None => json!({"name": name}),
            };
            (name.to_string(), entry)
        })
        .collect();
    json!({"responseHeader": {"status": 0, "QTime": 0}, "status": status})
}

pub fn ping_body() -> Value {
    json!({
        "responseHeader": {"status": 0, "QTime": 3, "params": {"wt": "json"}},
        "status": "OK"
    })
}

fn cache_stats(lookups: i64, hits: i64, hitratio: &str) -> Value {
    json!({
        "class": "org.apache.solr.search.LRUCache",
        "stats": {
            "lookups": lookups,
            "hits": hits,
            "hitratio": hitratio,
            "inserts": 4,
            "evictions": 0,
            "size": 4,
            "warmupTime": 0,
            "cumulative_lookups": lookups * 10,
            "cumulative_hits": hits * 10,
            "cumulative_hitratio": hitratio,
            "cumulative_inserts": 40,
            "cumulative_evictions": 1
        }
    })
}

/// mbeans response in the classic list form, standard handler named `standard_key`
pub fn mbeans_body(standard_key: &str) -> Value {
    let mut handlers = serde_json::Map::new();
    handlers.insert(
        standard_key.to_string(),
        json!({"stats": {
            "requests": 42,
            "errors": 1,
            "timeouts": 0,
            "totalTime": 420.5,
            "avgTimePerRequest": 10.0125,
            "avgRequestsPerSecond": 0.25
        }}),
    );
    handlers.insert(
        "/update".to_string(),
        json!({"stats": {
            "requests": 7,
            "errors": 0,
            "timeouts": 0,
            "totalTime": 70,
            "avgTimePerRequest": "NaN",
            "avgRequestsPerSecond": "NaN"
        }}),
    );

    json!({
        "responseHeader": {"status": 0, "QTime": 1},
        "solr-mbeans": [
            "CORE", {"searcher": {"stats": {"maxDoc": 120, "numDocs": 100, "warmupTime": 4}}},
            "QUERYHANDLER", handlers,
            "UPDATEHANDLER", {"updateHandler": {"stats": {
                "commits": 5,
                "autocommits": 2,
                "optimizes": 0,
                "rollbacks": 0,
                "docsPending": 3,
                "adds": 17,
                "errors": 0,
                "cumulative_adds": 170,
                "cumulative_errors": 0
            }}},
            "CACHE", {
                "filterCache": cache_stats(10, 5, "0.50"),
                "queryResultCache": cache_stats(20, 15, "0.75")
            }
        ]
    })
}

pub fn system_body() -> Value {
    json!({
        "jvm": {
            "version": "1.8.0_292",
            "memory": {
                "free": "512.0 MB",
                "total": "1024.0 MB",
                "max": "2 GB",
                "used": "512.0 MB"
            }
        }
    })
}

/// `/<context>/<core>/admin/<endpoint>` with an empty core collapsed
pub fn admin_path(core: &str, endpoint: &str) -> String {
    if core.is_empty() {
        format!("/solr/admin/{}", endpoint)
    } else {
        format!("/solr/{}/admin/{}", core, endpoint)
    }
}

pub async fn mount_cores(server: &MockServer, body: Value) {
    Mock::given(method("GET"))
        .and(path("/solr/admin/cores"))
        .and(query_param("action", "STATUS"))
        .and(query_param("wt", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

pub async fn mount_endpoint(server: &MockServer, core: &str, endpoint: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(admin_path(core, endpoint)))
        .and(query_param("wt", "json"))
        .respond_with(response)
        .mount(server)
        .await;
}

/// A mock Solr serving one healthy core on every endpoint
pub async fn healthy_core(server: &MockServer, core: &str) {
    mount_endpoint(server, core, "ping", ResponseTemplate::new(200).set_body_json(ping_body())).await;
    mount_endpoint(
        server,
        core,
        "mbeans",
        ResponseTemplate::new(200).set_body_json(mbeans_body("/select")),
    )
    .await;
    mount_endpoint(server, core, "system", ResponseTemplate::new(200).set_body_json(system_body())).await;
}

/// A response slower than any client timeout used in the tests
pub fn stalled() -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_json(ping_body())
        .set_delay(Duration::from_secs(5))
}

pub fn port_of(server: &MockServer) -> u16 {
    server.address().port()
}
