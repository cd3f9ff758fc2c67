//! In-memory query embedding cache

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::{debug, info, warn};

use crate::domain::clock::{Clock, SystemClock};
use crate::domain::query_cache::{
    is_expired, CacheEntry, QueryCacheStats, QueryEmbeddingCache, QueryEmbeddingCacheConfig,
};
use crate::infrastructure::observability::{
    record_query_cache_evictions, record_query_cache_lookup,
};

/// Concurrent in-memory query embedding cache
///
/// Backed by a sharded map so reads and writes need no external locking.
/// Single-key operations are atomic; sweeps and oldest-entry eviction scan
/// a live map and tolerate entries appearing or disappearing mid-scan, so
/// capacity eviction is approximate under concurrent writers.
#[derive(Debug)]
pub struct InMemoryQueryEmbeddingCache {
    entries: DashMap<String, CacheEntry>,
    config: QueryEmbeddingCacheConfig,
    clock: Arc<dyn Clock>,
    total_queries: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl InMemoryQueryEmbeddingCache {
    /// Create a cache driven by the wall clock
    pub fn new(config: QueryEmbeddingCacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a cache driven by the given clock
    pub fn with_clock(config: QueryEmbeddingCacheConfig, clock: Arc<dyn Clock>) -> Self {
        info!(
            enabled = config.enabled,
            ttl_minutes = config.ttl_minutes,
            max_entries = config.max_entries,
            "Query embedding cache initialized"
        );

        Self {
            entries: DashMap::new(),
            config,
            clock,
            total_queries: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &QueryEmbeddingCacheConfig {
        &self.config
    }

    fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
        record_query_cache_lookup(false);
    }

    fn sweep_expired(&self, now: DateTime<Utc>) -> usize {
        let ttl = self.config.ttl();
        let mut removed = 0usize;

        self.entries.retain(|key, entry| {
            let expired = is_expired(entry, ttl, now);
            if expired {
                debug!(key = %key, "Expired query embedding removed");
                removed += 1;
            }
            !expired
        });

        if removed > 0 {
            self.evictions.fetch_add(removed as u64, Ordering::Relaxed);
            record_query_cache_evictions("ttl", removed);
            info!(
                removed,
                remaining = self.entries.len(),
                "Query embedding cache sweep completed"
            );
        }

        removed
    }

    /// Removes the entry with the oldest `created_at`
    ///
    /// The scan and the removal are separate steps; the removal only
    /// happens if the entry was not replaced in between.
    fn evict_oldest(&self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|entry| entry.value().created_at())
            .map(|entry| (entry.key().clone(), entry.value().created_at()));

        let Some((key, created_at)) = oldest else {
            return;
        };

        let removed = self
            .entries
            .remove_if(&key, |_, entry| entry.created_at() == created_at)
            .is_some();

        if removed {
            self.evictions.fetch_add(1, Ordering::Relaxed);
            record_query_cache_evictions("capacity", 1);
            debug!(key = %key, "Oldest query embedding evicted at capacity");
        }
    }
}

impl QueryEmbeddingCache for InMemoryQueryEmbeddingCache {
    fn get(&self, normalized_query: &str) -> Option<Vec<f32>> {
        if !self.config.enabled {
            return None;
        }

        self.total_queries.fetch_add(1, Ordering::Relaxed);

        let now = self.clock.now();
        let ttl = self.config.ttl();

        // Resolve under the shard read guard, then drop it before removing
        let lookup = self
            .entries
            .get(normalized_query)
            .map(|entry| (is_expired(&entry, ttl, now), entry.vector().to_vec()));

        match lookup {
            None => {
                self.record_miss();
                info!(key = %normalized_query, "Query embedding cache MISS");
                None
            }
            Some((true, _)) => {
                let removed = self
                    .entries
                    .remove_if(normalized_query, |_, entry| is_expired(entry, ttl, now))
                    .is_some();

                if removed {
                    self.evictions.fetch_add(1, Ordering::Relaxed);
                    record_query_cache_evictions("ttl", 1);
                }

                self.record_miss();
                info!(key = %normalized_query, "Query embedding cache EXPIRED");
                None
            }
            Some((false, vector)) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                record_query_cache_lookup(true);
                info!(key = %normalized_query, "Query embedding cache HIT");
                Some(vector)
            }
        }
    }

    fn put(&self, normalized_query: &str, vector: Vec<f32>) {
        if !self.config.enabled {
            return;
        }

        if normalized_query.is_empty() || vector.is_empty() {
            warn!(
                key = %normalized_query,
                dimension = vector.len(),
                "Ignoring invalid query embedding cache write"
            );
            return;
        }

        if self.config.max_entries == 0 {
            return;
        }

        let now = self.clock.now();

        // Replacing an existing key never grows the map
        if !self.entries.contains_key(normalized_query)
            && self.entries.len() >= self.config.max_entries
        {
            self.sweep_expired(now);

            while self.entries.len() >= self.config.max_entries {
                let before = self.entries.len();
                self.evict_oldest();
                if self.entries.len() >= before {
                    break;
                }
            }
        }

        self.entries.insert(
            normalized_query.to_string(),
            CacheEntry::new(normalized_query, vector, now),
        );

        debug!(
            key = %normalized_query,
            size = self.entries.len(),
            "Query embedding cached"
        );
    }

    fn evict_expired(&self) -> usize {
        if !self.config.enabled {
            return 0;
        }

        self.sweep_expired(self.clock.now())
    }

    fn stats(&self) -> QueryCacheStats {
        QueryCacheStats {
            total_queries: self.total_queries.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            size: self.entries.len(),
        }
    }

    fn size(&self) -> usize {
        self.entries.len()
    }

    fn clear(&self) {
        self.entries.clear();
        self.total_queries.store(0, Ordering::Relaxed);
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.evictions.store(0, Ordering::Relaxed);
        info!("Query embedding cache cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clock::ManualClock;
    use chrono::Duration;

    fn cache_with(config: QueryEmbeddingCacheConfig) -> (InMemoryQueryEmbeddingCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::starting_now());
        let cache = InMemoryQueryEmbeddingCache::with_clock(config, clock.clone());
        (cache, clock)
    }

    #[test]
    fn test_put_and_get() {
        let (cache, _) = cache_with(QueryEmbeddingCacheConfig::default());

        cache.put("pix limite", vec![0.1, 0.2, 0.3]);

        assert_eq!(cache.get("pix limite"), Some(vec![0.1, 0.2, 0.3]));
        assert_eq!(cache.size(), 1);
    }

    #[test]
    fn test_miss_on_unknown_key() {
        let (cache, _) = cache_with(QueryEmbeddingCacheConfig::default());

        assert_eq!(cache.get("unknown"), None);

        let stats = cache.stats();
        assert_eq!(stats.total_queries, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 0);
    }

    #[test]
    fn test_ttl_hit_then_expired_miss_shrinks_cache() {
        let (cache, clock) = cache_with(QueryEmbeddingCacheConfig::new().with_ttl_minutes(1));

        cache.put("q", vec![1.0, 0.0]);

        clock.advance(Duration::seconds(30));
        assert_eq!(cache.get("q"), Some(vec![1.0, 0.0]));
        assert_eq!(cache.size(), 1);

        clock.advance(Duration::seconds(31));
        assert_eq!(cache.get("q"), None);
        assert_eq!(cache.size(), 0);

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.evictions, 1);
    }

    #[test]
    fn test_read_does_not_refresh_ttl() {
        let (cache, clock) = cache_with(QueryEmbeddingCacheConfig::new().with_ttl_minutes(1));

        cache.put("q", vec![1.0]);

        clock.advance(Duration::seconds(50));
        assert!(cache.get("q").is_some());

        clock.advance(Duration::seconds(20));
        assert!(cache.get("q").is_none());
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let (cache, clock) = cache_with(QueryEmbeddingCacheConfig::new().with_max_entries(2));

        cache.put("q1", vec![1.0]);
        clock.advance(Duration::seconds(1));
        cache.put("q2", vec![2.0]);
        clock.advance(Duration::seconds(1));
        cache.put("q3", vec![3.0]);

        assert_eq!(cache.size(), 2);
        assert!(cache.get("q1").is_none());
        assert_eq!(cache.get("q2"), Some(vec![2.0]));
        assert_eq!(cache.get("q3"), Some(vec![3.0]));
    }

    #[test]
    fn test_capacity_prefers_expired_entries() {
        let (cache, clock) = cache_with(
            QueryEmbeddingCacheConfig::new()
                .with_max_entries(2)
                .with_ttl_minutes(1),
        );

        cache.put("old", vec![1.0]);
        clock.advance(Duration::seconds(59));
        cache.put("recent", vec![2.0]);
        clock.advance(Duration::seconds(2));

        // "old" has expired, "recent" has not
        cache.put("new", vec![3.0]);

        assert_eq!(cache.size(), 2);
        assert!(cache.get("recent").is_some());
        assert!(cache.get("new").is_some());
    }

    #[test]
    fn test_replacing_key_at_capacity_keeps_others() {
        let (cache, clock) = cache_with(QueryEmbeddingCacheConfig::new().with_max_entries(2));

        cache.put("q1", vec![1.0]);
        clock.advance(Duration::seconds(1));
        cache.put("q2", vec![2.0]);
        clock.advance(Duration::seconds(1));
        cache.put("q1", vec![9.0]);

        assert_eq!(cache.size(), 2);
        assert_eq!(cache.get("q1"), Some(vec![9.0]));
        assert_eq!(cache.get("q2"), Some(vec![2.0]));
    }

    #[test]
    fn test_disabled_cache_never_stores() {
        let (cache, _) = cache_with(QueryEmbeddingCacheConfig::new().with_enabled(false));

        for i in 0..50 {
            let key = format!("q{}", i);
            cache.put(&key, vec![i as f32]);
            assert!(cache.get(&key).is_none());
        }

        assert_eq!(cache.size(), 0);
        assert_eq!(cache.evict_expired(), 0);
        assert_eq!(cache.stats().total_queries, 0);
    }

    #[test]
    fn test_zero_capacity_stores_nothing() {
        let (cache, _) = cache_with(QueryEmbeddingCacheConfig::new().with_max_entries(0));

        cache.put("q", vec![1.0]);

        assert_eq!(cache.size(), 0);
    }

    #[test]
    fn test_invalid_writes_ignored() {
        let (cache, _) = cache_with(QueryEmbeddingCacheConfig::default());

        cache.put("", vec![1.0]);
        cache.put("q", vec![]);

        assert_eq!(cache.size(), 0);
    }

    #[test]
    fn test_evict_expired_sweeps_all() {
        let (cache, clock) = cache_with(QueryEmbeddingCacheConfig::new().with_ttl_minutes(1));

        cache.put("a", vec![1.0]);
        cache.put("b", vec![2.0]);
        clock.advance(Duration::seconds(45));
        cache.put("c", vec![3.0]);
        clock.advance(Duration::seconds(30));

        assert_eq!(cache.evict_expired(), 2);
        assert_eq!(cache.size(), 1);
        assert!(cache.get("c").is_some());
    }

    #[test]
    fn test_hit_rate_and_clear() {
        let (cache, _) = cache_with(QueryEmbeddingCacheConfig::default());

        cache.put("q", vec![1.0]);
        cache.get("q");
        cache.get("q");
        cache.get("q");
        cache.get("other");

        let stats = cache.stats();
        assert_eq!(stats.total_queries, 4);
        assert!((stats.hit_rate() - 0.75).abs() < 1e-9);

        cache.clear();

        assert_eq!(cache.size(), 0);
        assert_eq!(cache.stats(), QueryCacheStats::default());
    }

    #[test]
    fn test_concurrent_access_respects_capacity() {
        let cache = Arc::new(InMemoryQueryEmbeddingCache::new(
            QueryEmbeddingCacheConfig::new().with_max_entries(64),
        ));

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = cache.clone();
                std::thread::spawn(move || {
                    for i in 0..200 {
                        let key = format!("t{}-q{}", t, i);
                        cache.put(&key, vec![t as f32, i as f32]);
                        cache.get(&key);
                        if i % 50 == 0 {
                            cache.evict_expired();
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        // Approximate under contention: at most one extra slot per writer
        assert!(cache.size() <= 64 + 8);
        assert_eq!(cache.stats().total_queries, 8 * 200);
    }
}
