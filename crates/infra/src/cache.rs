//! Dashboard stats cache.
//!
//! An explicit cache object owned by the service layer, with a defined
//! invalidation API. Write paths call `clear()` after a committed change.

use std::collections::HashMap;
use std::sync::RwLock;

use serde_json::Value as JsonValue;

/// Key/value cache for computed report payloads.
#[derive(Debug, Default)]
pub struct StatsCache {
    inner: RwLock<HashMap<String, JsonValue>>,
}

impl StatsCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<JsonValue> {
        let map = self.inner.read().ok()?;
        map.get(key).cloned()
    }

    pub fn insert(&self, key: impl Into<String>, value: JsonValue) {
        if let Ok(mut map) = self.inner.write() {
            map.insert(key.into(), value);
        }
    }

    /// Drop everything. Safe to call on every write; reports recompute lazily.
    pub fn clear(&self) {
        if let Ok(mut map) = self.inner.write() {
            map.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
