//! Query embedding cache trait and statistics

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

/// Counters for the query embedding cache
///
/// Observability only; they never influence cache content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryCacheStats {
    /// Lookups performed while the cache was enabled
    pub total_queries: u64,
    /// Lookups that returned a fresh entry
    pub hits: u64,
    /// Lookups that found nothing or an expired entry
    pub misses: u64,
    /// Entries removed by TTL or capacity eviction
    pub evictions: u64,
    /// Entries currently held
    pub size: usize,
}

impl QueryCacheStats {
    /// Calculate hit rate
    pub fn hit_rate(&self) -> f64 {
        if self.total_queries == 0 {
            return 0.0;
        }

        self.hits as f64 / self.total_queries as f64
    }
}

/// Short-lived cache from normalized query text to its embedding
///
/// Every operation is fail-safe: internal problems degrade to a miss on
/// read or a no-op on write, and are logged by the implementation.
pub trait QueryEmbeddingCache: Send + Sync + Debug {
    /// Fresh vector for the key, or `None`; expired entries are removed
    fn get(&self, normalized_query: &str) -> Option<Vec<f32>>;

    /// Stores the vector, evicting expired and then oldest entries at capacity
    fn put(&self, normalized_query: &str, vector: Vec<f32>);

    /// Removes every expired entry, returns how many were removed
    fn evict_expired(&self) -> usize;

    /// Current counters
    fn stats(&self) -> QueryCacheStats;

    /// Number of entries held, stale ones included
    fn size(&self) -> usize;

    /// Drops all entries and resets counters
    fn clear(&self);
}
