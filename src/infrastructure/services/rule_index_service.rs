//! Business rule embedding index service

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::domain::embedding::EmbeddingProvider;
use crate::domain::rule::RuleDocument;
use crate::domain::vector::{SaveOutcome, VectorStore};
use crate::domain::DomainError;

/// Counts from an indexing pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IndexReport {
    /// Rules embedded and saved
    pub indexed: usize,
    /// Rules that already had an embedding
    pub skipped: usize,
    /// Rules whose embedding could not be produced or saved
    pub failed: usize,
    /// Indexed rules written to the backing store
    pub persisted: usize,
}

impl IndexReport {
    pub fn total(&self) -> usize {
        self.indexed + self.skipped + self.failed
    }
}

/// Embeds business rules and keeps the vector store populated
#[derive(Debug)]
pub struct RuleIndexService {
    provider: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
}

impl RuleIndexService {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, store: Arc<dyn VectorStore>) -> Self {
        Self { provider, store }
    }

    /// Embeds and saves a single rule, replacing any existing vector
    pub async fn index_rule(&self, rule: &RuleDocument) -> Result<SaveOutcome, DomainError> {
        let text = rule.embedding_text();
        let vector = self.provider.embed(&text).await?;

        if vector.is_empty() {
            return Err(DomainError::provider(
                self.provider.provider_tag(),
                format!("Empty embedding for rule '{}'", rule.id),
            ));
        }

        // Read after embedding so a fallback switch during this call is reflected
        let provider_tag = self.provider.provider_tag().to_string();
        let dimension = vector.len();
        let outcome = self
            .store
            .save_with_provider(&rule.id, vector, &provider_tag)
            .await;

        if outcome == SaveOutcome::Rejected {
            return Err(DomainError::validation(format!(
                "Embedding for rule '{}' was rejected by the vector store",
                rule.id
            )));
        }

        info!(
            rule_id = %rule.id,
            name = %rule.name,
            dimension,
            ?outcome,
            "Indexed business rule"
        );

        Ok(outcome)
    }

    /// Indexes every rule that has no embedding yet
    ///
    /// A failing rule is logged and counted; the pass continues.
    pub async fn index_all(&self, rules: &[RuleDocument]) -> IndexReport {
        if rules.is_empty() {
            warn!("No business rules to index");
            return IndexReport::default();
        }

        let mut report = IndexReport::default();

        for rule in rules {
            if self.store.has_embedding(&rule.id).await {
                debug!(rule_id = %rule.id, "Embedding already present, skipping");
                report.skipped += 1;
                continue;
            }

            self.index_into(rule, &mut report).await;
        }

        self.log_report("Rule indexing completed", &report);
        report
    }

    /// Clears memory and re-embeds every rule
    ///
    /// Durable rows are overwritten rule by rule, never deleted.
    pub async fn reindex_all(&self, rules: &[RuleDocument]) -> IndexReport {
        self.store.clear();

        let mut report = IndexReport::default();

        for rule in rules {
            self.index_into(rule, &mut report).await;
        }

        self.log_report("Rule reindexing completed", &report);
        report
    }

    async fn index_into(&self, rule: &RuleDocument, report: &mut IndexReport) {
        match self.index_rule(rule).await {
            Ok(outcome) => {
                report.indexed += 1;
                if outcome == SaveOutcome::Persisted {
                    report.persisted += 1;
                }
            }
            Err(e) => {
                error!(rule_id = %rule.id, error = %e, "Failed to index business rule");
                report.failed += 1;
            }
        }
    }

    fn log_report(&self, message: &str, report: &IndexReport) {
        info!(
            indexed = report.indexed,
            skipped = report.skipped,
            failed = report.failed,
            persisted = report.persisted,
            store_size = self.store.size(),
            dimension = self.provider.dimension(),
            "{}",
            message
        );
    }
}
