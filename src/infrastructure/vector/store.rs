//! Write-through rule vector store

use std::fmt::Debug;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::{debug, error, info, warn};

use crate::domain::clock::{Clock, SystemClock};
use crate::domain::embedding::{
    cosine_similarity, decode_vector, encode_vector, DEFAULT_SIMILARITY_THRESHOLD,
};
use crate::domain::vector::{
    EmbeddingRepository, HydrationReport, RuleId, SaveOutcome, SimilarityMatch, StoredEmbedding,
    VectorEntry, VectorStore,
};
use crate::domain::DomainError;
use crate::infrastructure::observability::{record_hydration, record_search, record_vector_save};

/// Rule vector store backed by a concurrent map
///
/// The map is a cache of the backing store (when one is configured) and can
/// always be rebuilt with [`RuleVectorStore::hydrate`]. Without a backing
/// store the instance runs cache-only.
pub struct RuleVectorStore {
    entries: DashMap<RuleId, VectorEntry>,
    backing: Option<Arc<dyn EmbeddingRepository>>,
    provider_tag: String,
    expected_dimension: Option<usize>,
    similarity_threshold: f32,
    clock: Arc<dyn Clock>,
}

impl Debug for RuleVectorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleVectorStore")
            .field("size", &self.entries.len())
            .field("persistent", &self.backing.is_some())
            .field("provider_tag", &self.provider_tag)
            .field("expected_dimension", &self.expected_dimension)
            .field("similarity_threshold", &self.similarity_threshold)
            .finish()
    }
}

impl RuleVectorStore {
    /// Creates an empty cache-only store for vectors produced by `provider_tag`
    pub fn new(provider_tag: impl Into<String>) -> Self {
        Self {
            entries: DashMap::new(),
            backing: None,
            provider_tag: provider_tag.into(),
            expected_dimension: None,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_backing_store(mut self, backing: Arc<dyn EmbeddingRepository>) -> Self {
        self.backing = Some(backing);
        self
    }

    /// Reject vectors whose length differs from `dimension`
    pub fn with_expected_dimension(mut self, dimension: usize) -> Self {
        self.expected_dimension = Some(dimension);
        self
    }

    pub fn with_similarity_threshold(mut self, threshold: f32) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn provider_tag(&self) -> &str {
        &self.provider_tag
    }

    pub fn similarity_threshold(&self) -> f32 {
        self.similarity_threshold
    }

    pub fn is_persistent(&self) -> bool {
        self.backing.is_some()
    }

    /// Loads every persisted row produced by the configured provider
    ///
    /// Rows that cannot be read or decoded are skipped and counted as corrupt, rows
    /// from another provider are counted as stale. A failing backing store
    /// leaves the store empty and cache-only for reads.
    pub async fn hydrate(&self) -> HydrationReport {
        let mut report = HydrationReport::default();

        let Some(backing) = &self.backing else {
            debug!("No backing store configured, skipping vector hydration");
            return report;
        };

        let rows = match backing.find_all().await {
            Ok(rows) => rows,
            Err(e) => {
                error!(error = %e, "Failed to load persisted rule embeddings");
                record_hydration(&report);
                return report;
            }
        };

        for row in rows {
            let row = match row {
                Ok(row) => row,
                Err(e) => {
                    error!(error = %e, "Skipping unreadable rule embedding row");
                    report.corrupt += 1;
                    continue;
                }
            };

            if row.provider != self.provider_tag {
                debug!(
                    rule_id = %row.rule_id,
                    provider = %row.provider,
                    expected = %self.provider_tag,
                    "Skipping embedding from another provider"
                );
                report.stale += 1;
                continue;
            }

            match self.decode_row(row) {
                Ok(entry) => {
                    self.entries.insert(entry.rule_id().clone(), entry);
                    report.loaded += 1;
                }
                Err((rule_id, e)) => {
                    error!(rule_id = %rule_id, error = %e, "Skipping corrupt rule embedding");
                    report.corrupt += 1;
                }
            }
        }

        record_hydration(&report);
        info!(
            loaded = report.loaded,
            corrupt = report.corrupt,
            stale = report.stale,
            provider = %self.provider_tag,
            "Rule vector store hydrated"
        );

        report
    }

    fn decode_row(&self, row: StoredEmbedding) -> Result<VectorEntry, (RuleId, DomainError)> {
        if row.dimension == 0 {
            return Err((row.rule_id, DomainError::corrupt_data("zero-dimension embedding")));
        }

        if let Some(expected) = self.expected_dimension {
            if row.dimension != expected {
                return Err((
                    row.rule_id,
                    DomainError::dimension_mismatch(expected, row.dimension),
                ));
            }
        }

        match decode_vector(&row.embedding, row.dimension) {
            Ok(vector) => Ok(VectorEntry::new(
                row.rule_id,
                vector,
                row.provider,
                row.created_at,
            )),
            Err(e) => Err((row.rule_id, e)),
        }
    }

    fn validate(&self, rule_id: &RuleId, vector: &[f32]) -> Result<(), DomainError> {
        if vector.is_empty() {
            return Err(DomainError::validation(format!(
                "Empty embedding for rule '{}'",
                rule_id
            )));
        }

        if let Some(expected) = self.expected_dimension {
            if vector.len() != expected {
                return Err(DomainError::dimension_mismatch(expected, vector.len()));
            }
        }

        if vector.iter().any(|v| !v.is_finite()) {
            return Err(DomainError::validation(format!(
                "Non-finite component in embedding for rule '{}'",
                rule_id
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl VectorStore for RuleVectorStore {
    async fn save(&self, rule_id: &RuleId, vector: Vec<f32>) -> SaveOutcome {
        let provider_tag = self.provider_tag.clone();
        self.save_with_provider(rule_id, vector, &provider_tag).await
    }

    async fn save_with_provider(
        &self,
        rule_id: &RuleId,
        vector: Vec<f32>,
        provider_tag: &str,
    ) -> SaveOutcome {
        if let Err(e) = self.validate(rule_id, &vector) {
            warn!(rule_id = %rule_id, error = %e, "Rejected rule embedding");
            record_vector_save(SaveOutcome::Rejected);
            return SaveOutcome::Rejected;
        }

        let created_at = self.clock.now();
        let mut outcome = SaveOutcome::CacheOnly;

        if let Some(backing) = &self.backing {
            let row = StoredEmbedding {
                rule_id: rule_id.clone(),
                dimension: vector.len(),
                provider: provider_tag.to_string(),
                embedding: encode_vector(&vector),
                created_at,
            };

            match backing.save(row).await {
                Ok(()) => outcome = SaveOutcome::Persisted,
                Err(e) => {
                    error!(
                        rule_id = %rule_id,
                        error = %e,
                        "Failed to persist rule embedding, keeping it in memory only"
                    );
                }
            }
        }

        let dimension = vector.len();
        self.entries.insert(
            rule_id.clone(),
            VectorEntry::new(rule_id.clone(), vector, provider_tag.to_string(), created_at),
        );

        record_vector_save(outcome);
        debug!(rule_id = %rule_id, dimension, ?outcome, "Rule embedding saved");

        outcome
    }

    async fn get_embedding(&self, rule_id: &RuleId) -> Option<Vec<f32>> {
        if let Some(entry) = self.entries.get(rule_id) {
            return Some(entry.vector().to_vec());
        }

        let backing = self.backing.as_ref()?;

        let row = match backing.find_by_id(rule_id).await {
            Ok(Some(row)) => row,
            Ok(None) => return None,
            Err(e) => {
                error!(rule_id = %rule_id, error = %e, "Failed to load rule embedding");
                return None;
            }
        };

        if row.provider != self.provider_tag {
            debug!(
                rule_id = %rule_id,
                provider = %row.provider,
                "Persisted embedding belongs to another provider"
            );
            return None;
        }

        match self.decode_row(row) {
            Ok(entry) => {
                let vector = entry.vector().to_vec();
                self.entries.insert(rule_id.clone(), entry);
                Some(vector)
            }
            Err((_, e)) => {
                error!(rule_id = %rule_id, error = %e, "Persisted rule embedding is corrupt");
                None
            }
        }
    }

    async fn has_embedding(&self, rule_id: &RuleId) -> bool {
        // Rows from another provider or with corrupt bytes do not count
        self.get_embedding(rule_id).await.is_some()
    }

    async fn persisted_count(&self) -> usize {
        let Some(backing) = &self.backing else {
            return 0;
        };

        match backing.count().await {
            Ok(count) => count,
            Err(e) => {
                error!(error = %e, "Failed to count persisted rule embeddings");
                0
            }
        }
    }

    fn find_top_k(&self, query: &[f32], k: usize) -> Vec<SimilarityMatch> {
        if query.is_empty() || k == 0 {
            return Vec::new();
        }

        let started = Instant::now();
        let mut candidates = 0usize;
        let mut mismatched = 0usize;

        let mut matches: Vec<SimilarityMatch> = self
            .entries
            .iter()
            .filter_map(|entry| {
                candidates += 1;

                if entry.dimension() != query.len() {
                    mismatched += 1;
                    return None;
                }

                let similarity = cosine_similarity(query, entry.vector());
                (similarity >= self.similarity_threshold)
                    .then(|| SimilarityMatch::new(entry.rule_id().clone(), similarity))
            })
            .collect();

        if mismatched > 0 {
            warn!(
                mismatched,
                query_dimension = query.len(),
                "Skipped stored vectors with a different dimension"
            );
        }

        matches.sort_by(|a, b| {
            b.similarity
                .total_cmp(&a.similarity)
                .then_with(|| a.rule_id.cmp(&b.rule_id))
        });
        matches.truncate(k);

        record_search(candidates, matches.len(), started.elapsed());
        debug!(
            candidates,
            returned = matches.len(),
            k,
            "Top-K similarity search completed"
        );

        matches
    }

    fn clear(&self) {
        self.entries.clear();
        info!("Rule vector store memory cleared");
    }

    fn size(&self) -> usize {
        self.entries.len()
    }
}
