//! Row payload caching
//!
//! Backs the prefetcher: payloads fetched ahead of navigation land here so
//! that stepping to an already-covered row never touches the network.

use std::sync::Arc;
use parking_lot::RwLock;
use ahash::AHashMap;

use rb_core::client::{RowId, RowPayload};

/// Bounded cache of full row payloads keyed by row id
pub struct RowCache {
    entries: Arc<RwLock<AHashMap<RowId, RowPayload>>>,
    /// Maximum number of payloads to keep
    max_entries: usize,
}

impl RowCache {
    /// Create a cache holding at most `max_entries` payloads
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: Arc::new(RwLock::new(AHashMap::new())),
            max_entries: max_entries.max(1),
        }
    }

    /// Get a payload from cache
    pub fn get(&self, row_id: &str) -> Option<RowPayload> {
        self.entries.read().get(row_id).cloned()
    }

    /// Put a payload in cache
    pub fn put(&self, row_id: RowId, payload: RowPayload) {
        let mut entries = self.entries.write();

        // Evict an arbitrary entry when at capacity
        if entries.len() >= self.max_entries && !entries.contains_key(&row_id) {
            if let Some(key) = entries.keys().next().cloned() {
                entries.remove(&key);
            }
        }

        entries.insert(row_id, payload);
    }

    /// Number of cached payloads
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Clear the cache
    pub fn clear(&self) {
        self.entries.write().clear();
    }
}
