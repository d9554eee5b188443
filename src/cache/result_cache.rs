//! In-memory result cache
//!
//! Maps normalized query keys to the JSON payload the backend returned.
//! Lives exactly as long as the widget that owns it.

use std::collections::HashMap;

use serde_json::Value;

use super::key::CacheKey;

/// Store of payloads keyed by [`CacheKey`]
#[derive(Debug, Default)]
pub struct ResultCache {
    entries: HashMap<CacheKey, Value>,
    /// Bumped once per wholesale reset
    generation: u64,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &CacheKey) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Cached payload for `key`, but only if it is worth serving.
    ///
    /// `null`, empty arrays and blank strings count as a miss so the
    /// query is fetched again.
    pub fn get_present(&self, key: &CacheKey) -> Option<&Value> {
        self.get(key).filter(|payload| is_present(payload))
    }

    pub fn put(&mut self, key: CacheKey, payload: Value) {
        self.entries.insert(key, payload);
    }

    /// Remove one entry. No-op if absent.
    pub fn evict(&mut self, key: &CacheKey) {
        if self.entries.remove(key).is_some() {
            #[cfg(debug_assertions)]
            log::debug!("Evicted cache entry {}", key);
        }
    }

    /// Drop every entry by replacing the whole store
    pub fn clear(&mut self) {
        self.entries = HashMap::new();
        self.generation = self.generation.wrapping_add(1);
        #[cfg(debug_assertions)]
        log::debug!("Cache reset (generation {})", self.generation);
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of wholesale resets so far
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

fn is_present(payload: &Value) -> bool {
    match payload {
        Value::Null => false,
        Value::Array(items) => !items.is_empty(),
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    }
}

#[cfg(test)]
#[path = "result_cache_tests.rs"]
mod result_cache_tests;
