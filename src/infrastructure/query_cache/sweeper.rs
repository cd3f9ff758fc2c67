//! Periodic expiry sweep for the query embedding cache

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::domain::query_cache::QueryEmbeddingCache;

/// Spawn a background task calling `evict_expired` every `interval`
///
/// The task runs until the returned handle is aborted or the runtime shuts
/// down. Lookups already drop expired entries lazily, so the sweep only
/// bounds how long unread entries linger.
pub fn spawn_expiry_sweeper(
    cache: Arc<dyn QueryEmbeddingCache>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // The first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let removed = cache.evict_expired();
            debug!(removed, "Query embedding cache sweep tick");
        }
    })
}
