//! Core discovery
//!
//! Decides which cores of an instance are inspected during a collection pass.

use serde_json::Value;
use tracing::{debug, warn};

use super::client::AdminClient;
use super::registry::InstanceDescriptor;

/// Cores-status endpoint
pub const CORES_STATUS_PATH: &str = "/admin/cores?action=STATUS&wt=json";

/// Cores of `instance` to collect, in status-map order
///
/// A configured core short-circuits discovery without a request. An
/// unavailable or malformed status response yields no cores.
pub async fn discover_cores(
    client: &AdminClient,
    instance: &InstanceDescriptor,
    configured_core: Option<&str>,
) -> Vec<String> {
    if let Some(core) = configured_core {
        return vec![core.to_string()];
    }

    let Some(status) = client
        .fetch(&instance.host, instance.port, CORES_STATUS_PATH)
        .await
    else {
        return Vec::new();
    };

    let cores = loaded_cores(&status);
    debug!(instance = %instance.alias, cores = ?cores, "Discovered cores");
    cores
}

/// Loaded core names from a cores-status response
///
/// A core without `isLoaded` is included; otherwise only `"true"` (or a JSON
/// `true`) counts as loaded, so transient unloaded cores are never pinged.
pub fn loaded_cores(status: &Value) -> Vec<String> {
    let Some(entries) = status.get("status").and_then(Value::as_object) else {
        warn!("Cores status response has no 'status' object");
        return Vec::new();
    };

    entries
        .iter()
        .filter(|(name, entry)| {
            let loaded = match entry.get("isLoaded") {
                None => true,
                Some(Value::String(s)) => s == "true",
                Some(Value::Bool(b)) => *b,
                Some(_) => false,
            };
            if !loaded {
                debug!(core = %name, "Skipping core that is not loaded");
            }
            loaded
        })
        .map(|(name, _)| name.clone())
        .collect()
}
