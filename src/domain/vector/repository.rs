//! Backing store contract for rule embeddings

use async_trait::async_trait;

use super::{RuleId, StoredEmbedding};
use crate::domain::DomainError;

/// A persisted row, or the reason it could not be read
pub type RowResult = Result<StoredEmbedding, DomainError>;

#[cfg(test)]
use mockall::automock;

/// Durable persistence for encoded rule vectors
///
/// Saving an existing `rule_id` overwrites the previous row.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait EmbeddingRepository: Send + Sync {
    /// Inserts or replaces the row for `row.rule_id`
    async fn save(&self, row: StoredEmbedding) -> Result<(), DomainError>;

    /// Returns every persisted row
    ///
    /// The outer error means the listing itself failed. A row that was
    /// fetched but cannot be mapped is returned as an inner error so the
    /// caller can skip it and keep the rest.
    async fn find_all(&self) -> Result<Vec<RowResult>, DomainError>;

    /// Returns the row for a single rule
    async fn find_by_id(&self, rule_id: &RuleId) -> Result<Option<StoredEmbedding>, DomainError>;

    /// Checks whether a row exists for the rule
    async fn exists_by_id(&self, rule_id: &RuleId) -> Result<bool, DomainError>;

    /// Number of persisted rows
    async fn count(&self) -> Result<usize, DomainError>;
}
