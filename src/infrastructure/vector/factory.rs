//! Vector store factory for startup backend selection

use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::search::SearchConfig;
use crate::domain::vector::{EmbeddingRepository, HydrationReport};
use crate::domain::DomainError;

use super::postgres::{PostgresConfig, PostgresEmbeddingRepository};
use super::store::RuleVectorStore;

/// Supported vector store backends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VectorStoreType {
    /// Memory only, nothing survives a restart
    #[default]
    Memory,
    /// Memory backed by a PostgreSQL table
    Postgres,
}

impl FromStr for VectorStoreType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" | "inmemory" | "in-memory" | "in_memory" => Ok(Self::Memory),
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            other => Err(DomainError::configuration(format!(
                "Unknown vector store type: {}",
                other
            ))),
        }
    }
}

/// Vector store configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorStoreConfig {
    #[serde(default)]
    pub store_type: VectorStoreType,

    /// Write through to the backing store; `false` runs cache-only
    #[serde(default = "default_persist")]
    pub persist: bool,

    #[serde(default)]
    pub postgres: PostgresConfig,
}

fn default_persist() -> bool {
    true
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            store_type: VectorStoreType::default(),
            persist: default_persist(),
            postgres: PostgresConfig::default(),
        }
    }
}

impl VectorStoreConfig {
    pub fn memory() -> Self {
        Self::default()
    }

    pub fn postgres(config: PostgresConfig) -> Self {
        Self {
            store_type: VectorStoreType::Postgres,
            persist: true,
            postgres: config,
        }
    }

    pub fn with_persist(mut self, persist: bool) -> Self {
        self.persist = persist;
        self
    }

    /// Whether a backing store will be wired
    pub fn is_persistent(&self) -> bool {
        self.persist && self.store_type != VectorStoreType::Memory
    }
}

/// Factory for the single rule vector store of a process
#[derive(Debug)]
pub struct VectorStoreFactory;

impl VectorStoreFactory {
    /// Builds the backing store (if any), then constructs and hydrates the store
    pub async fn create(
        config: &VectorStoreConfig,
        search: &SearchConfig,
        provider_tag: &str,
        dimension: usize,
    ) -> Result<(Arc<RuleVectorStore>, HydrationReport), DomainError> {
        let backing = Self::create_backing_store(config).await?;

        let mut store = RuleVectorStore::new(provider_tag)
            .with_expected_dimension(dimension)
            .with_similarity_threshold(search.similarity_threshold);

        if let Some(backing) = backing {
            store = store.with_backing_store(backing);
        }

        let report = store.hydrate().await;

        info!(
            store_type = ?config.store_type,
            persistent = store.is_persistent(),
            provider = provider_tag,
            dimension,
            "Rule vector store ready"
        );

        Ok((Arc::new(store), report))
    }

    /// Returns `None` when the configuration asks for cache-only operation
    pub async fn create_backing_store(
        config: &VectorStoreConfig,
    ) -> Result<Option<Arc<dyn EmbeddingRepository>>, DomainError> {
        if !config.is_persistent() {
            return Ok(None);
        }

        match config.store_type {
            VectorStoreType::Memory => Ok(None),
            VectorStoreType::Postgres => {
                let repository = PostgresEmbeddingRepository::connect(&config.postgres).await?;
                repository.ensure_table().await?;
                Ok(Some(Arc::new(repository)))
            }
        }
    }
}
