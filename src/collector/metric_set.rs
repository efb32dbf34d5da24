//! Flat metric mapping with an explicit merge policy

use std::collections::btree_map::{self, BTreeMap};

use tracing::trace;

use super::parser::MetricValue;

/// Metric suffix → value, e.g. `cache.filterCache.hits`
///
/// Writing an existing suffix replaces the previous value (last writer wins).
/// Overwrites are traced, never rejected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricSet {
    entries: BTreeMap<String, MetricValue>,
}

impl MetricSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, returning the one it replaced
    pub fn insert(&mut self, suffix: impl Into<String>, value: MetricValue) -> Option<MetricValue> {
        let suffix = suffix.into();
        let previous = self.entries.insert(suffix.clone(), value);
        if let Some(ref old) = previous {
            trace!(metric = %suffix, replaced = %old, "Metric overwritten");
        }
        previous
    }

    /// Merge `other` into `self` in its iteration order
    ///
    /// Returns the number of suffixes that already existed and were replaced.
    pub fn merge(&mut self, other: MetricSet) -> usize {
        other
            .entries
            .into_iter()
            .filter_map(|(suffix, value)| self.insert(suffix, value))
            .count()
    }

    pub fn get(&self, suffix: &str) -> Option<&MetricValue> {
        self.entries.get(suffix)
    }

    pub fn contains(&self, suffix: &str) -> bool {
        self.entries.contains_key(suffix)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, MetricValue> {
        self.entries.iter()
    }
}

impl IntoIterator for MetricSet {
    type Item = (String, MetricValue);
    type IntoIter = btree_map::IntoIter<String, MetricValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a MetricSet {
    type Item = (&'a String, &'a MetricValue);
    type IntoIter = btree_map::Iter<'a, String, MetricValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<K: Into<String>> FromIterator<(K, MetricValue)> for MetricSet {
    fn from_iter<I: IntoIterator<Item = (K, MetricValue)>>(iter: I) -> Self {
        let mut set = MetricSet::new();
        for (k, v) in iter {
            set.insert(k, v);
        }
        set
    }
}
