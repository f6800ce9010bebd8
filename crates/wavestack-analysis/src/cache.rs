//! LRU memory cache for reduced buffers.

use crate::lttb::ReducedBuffer;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;
use wavestack_core::Result;

/// Cache key: `(buffer id, threshold)`.
pub type ReductionKey = (u64, usize);

pub struct ReductionCache {
    entries: LruCache<ReductionKey, Arc<ReducedBuffer>>,
}

impl ReductionCache {
    pub fn new(max_entries: usize) -> Self {
        let capacity =
            NonZeroUsize::new(max_entries.max(1)).expect("BUG: max(1) should always be non-zero");
        Self {
            entries: LruCache::new(capacity),
        }
    }

    /// Returns the cached entry, or stores and returns the result of `compute`.
    ///
    /// A failed computation leaves the cache unchanged.
    pub fn get_or_compute<F>(&mut self, key: ReductionKey, compute: F) -> Result<Arc<ReducedBuffer>>
    where
        F: FnOnce() -> Result<ReducedBuffer>,
    {
        if let Some(hit) = self.entries.get(&key) {
            tracing::trace!(buffer = key.0, threshold = key.1, "reduction cache hit");
            return Ok(Arc::clone(hit));
        }

        tracing::debug!(buffer = key.0, threshold = key.1, "reduction cache miss");
        let reduced = Arc::new(compute()?);
        self.entries.put(key, Arc::clone(&reduced));
        Ok(reduced)
    }

    pub fn get(&mut self, key: ReductionKey) -> Option<Arc<ReducedBuffer>> {
        self.entries.get(&key).cloned()
    }

    pub fn put(&mut self, key: ReductionKey, reduced: ReducedBuffer) {
        self.entries.put(key, Arc::new(reduced));
    }

    /// Drop every entry derived from `buffer_id`.
    pub fn remove(&mut self, buffer_id: u64) {
        let stale: Vec<ReductionKey> = self
            .entries
            .iter()
            .map(|(key, _)| *key)
            .filter(|(id, _)| *id == buffer_id)
            .collect();
        for key in stale {
            self.entries.pop(&key);
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for ReductionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReductionCache")
            .field("len", &self.entries.len())
            .field("capacity", &self.entries.cap())
            .finish()
    }
}
