//! In-process embedding repository

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::vector::{EmbeddingRepository, RowResult, RuleId, StoredEmbedding};
use crate::domain::DomainError;

/// Thread-safe in-memory embedding repository
///
/// Useful for testing and development. Rows are lost when the process terminates.
#[derive(Debug, Default)]
pub struct InMemoryEmbeddingRepository {
    rows: RwLock<HashMap<RuleId, StoredEmbedding>>,
}

impl InMemoryEmbeddingRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EmbeddingRepository for InMemoryEmbeddingRepository {
    async fn save(&self, row: StoredEmbedding) -> Result<(), DomainError> {
        let mut rows = self.rows.write().map_err(|e| {
            DomainError::storage(format!("Failed to acquire write lock: {}", e))
        })?;

        rows.insert(row.rule_id.clone(), row);
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<RowResult>, DomainError> {
        let rows = self.rows.read().map_err(|e| {
            DomainError::storage(format!("Failed to acquire read lock: {}", e))
        })?;

        let mut all: Vec<StoredEmbedding> = rows.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(all.into_iter().map(Ok).collect())
    }

    async fn find_by_id(&self, rule_id: &RuleId) -> Result<Option<StoredEmbedding>, DomainError> {
        let rows = self.rows.read().map_err(|e| {
            DomainError::storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(rows.get(rule_id).cloned())
    }

    async fn exists_by_id(&self, rule_id: &RuleId) -> Result<bool, DomainError> {
        let rows = self.rows.read().map_err(|e| {
            DomainError::storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(rows.contains_key(rule_id))
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let rows = self.rows.read().map_err(|e| {
            DomainError::storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn row(id: &str, bytes: Vec<u8>) -> StoredEmbedding {
        StoredEmbedding {
            rule_id: RuleId::new(id).unwrap(),
            dimension: bytes.len() / 4,
            provider: "HASH".to_string(),
            embedding: bytes,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_save_and_find() {
        let repository = InMemoryEmbeddingRepository::new();
        let id = RuleId::new("rule-1").unwrap();

        repository.save(row("rule-1", vec![0; 8])).await.unwrap();

        let found = repository.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(found.dimension, 2);
        assert!(repository.exists_by_id(&id).await.unwrap());
        assert_eq!(repository.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_save_overwrites() {
        let repository = InMemoryEmbeddingRepository::new();

        repository.save(row("rule-1", vec![0; 4])).await.unwrap();
        repository.save(row("rule-1", vec![1; 8])).await.unwrap();

        let all = repository.find_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].as_ref().unwrap().embedding, vec![1; 8]);
    }

    #[tokio::test]
    async fn test_missing_row() {
        let repository = InMemoryEmbeddingRepository::new();
        let id = RuleId::new("nope").unwrap();

        assert!(repository.find_by_id(&id).await.unwrap().is_none());
        assert!(!repository.exists_by_id(&id).await.unwrap());
        assert_eq!(repository.count().await.unwrap(), 0);
    }
}
