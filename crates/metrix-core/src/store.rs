//! Concurrent name -> value store, one instance per metric kind.
//!
//! Backed by `DashMap` so independent names never contend on one global lock.
//! Each operation holds a shard lock only for the in-memory step; callers must
//! never perform I/O while holding a reference into the map.

use std::collections::BTreeMap;
use std::fmt;

use dashmap::DashMap;

use crate::metric::MetricValue;

/// Store contract shared by every metric kind.
pub trait MetricStore<V: MetricValue>: Send + Sync {
    /// Drop all entries. Only meaningful at startup.
    fn init(&self);

    /// Unconditionally replace the value stored under `name`.
    fn set(&self, name: &str, value: V);

    /// Current value, or `None` when the name was never written.
    fn get(&self, name: &str) -> Option<V>;

    /// Owned copy of every entry, ordered by name.
    fn get_all(&self) -> BTreeMap<String, V>;

    /// Merge `incoming` into the stored value and return the result.
    ///
    /// Read and write happen under one entry lock, so concurrent updates to
    /// the same name never lose each other.
    fn update(&self, name: &str, incoming: V) -> V;

    /// `"name: value"` lines, newline-joined.
    fn render(&self) -> String {
        self.get_all()
            .iter()
            .map(|(name, value)| format!("{name}: {value}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// In-memory store.
pub struct MemStore<V> {
    map: DashMap<String, V>,
}

impl<V: MetricValue> MemStore<V> {
    pub fn new() -> Self {
        Self { map: DashMap::new() }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl<V: MetricValue> Default for MemStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: MetricValue> MetricStore<V> for MemStore<V> {
    fn init(&self) {
        self.map.clear();
    }

    fn set(&self, name: &str, value: V) {
        self.map.insert(name.to_owned(), value);
    }

    fn get(&self, name: &str) -> Option<V> {
        self.map.get(name).map(|r| *r.value())
    }

    fn get_all(&self) -> BTreeMap<String, V> {
        self.map
            .iter()
            .map(|r| (r.key().clone(), *r.value()))
            .collect()
    }

    fn update(&self, name: &str, incoming: V) -> V {
        let entry = self
            .map
            .entry(name.to_owned())
            .and_modify(|v| *v = v.merge(incoming))
            .or_insert(incoming);
        *entry
    }
}

impl<V: MetricValue> fmt::Display for MemStore<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
