//! Vector store trait and result types

use async_trait::async_trait;
use serde::Serialize;
use std::fmt::Debug;

use super::{RuleId, SimilarityMatch};

/// How a `save` call was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveOutcome {
    /// Written to the backing store, then to memory
    Persisted,
    /// Held in memory only (no backing store, or the durable write failed)
    CacheOnly,
    /// Invalid input, nothing was written
    Rejected,
}

/// Summary of a startup hydration pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HydrationReport {
    /// Rows decoded into memory
    pub loaded: usize,
    /// Rows skipped because they failed to decode
    pub corrupt: usize,
    /// Rows skipped because another provider produced them
    pub stale: usize,
}

impl HydrationReport {
    pub fn skipped(&self) -> usize {
        self.corrupt + self.stale
    }

    pub fn total(&self) -> usize {
        self.loaded + self.skipped()
    }
}

/// Durable-plus-cached mapping from rule id to embedding
///
/// No operation surfaces an error: persistence and decode failures are
/// logged and degrade to cache-only or "not found" results.
#[async_trait]
pub trait VectorStore: Send + Sync + Debug {
    /// Writes through to the backing store (if any), then updates memory
    async fn save(&self, rule_id: &RuleId, vector: Vec<f32>) -> SaveOutcome;

    /// Like `save`, recording `provider_tag` instead of the store's own tag
    async fn save_with_provider(
        &self,
        rule_id: &RuleId,
        vector: Vec<f32>,
        provider_tag: &str,
    ) -> SaveOutcome;

    /// Memory first, then a single backing-store load on miss
    async fn get_embedding(&self, rule_id: &RuleId) -> Option<Vec<f32>>;

    /// Memory first, then the backing store
    async fn has_embedding(&self, rule_id: &RuleId) -> bool;

    /// Rows held by the backing store, 0 when unavailable
    async fn persisted_count(&self) -> usize;

    /// At most `k` matches at or above the similarity threshold, best first
    fn find_top_k(&self, query: &[f32], k: usize) -> Vec<SimilarityMatch>;

    /// Empties memory only; durable rows are untouched
    fn clear(&self);

    /// Number of vectors held in memory
    fn size(&self) -> usize;
}
