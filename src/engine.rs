//! Retrieval engine bootstrap
//!
//! Builds every collaborator exactly once from configuration and wires
//! them together. Nothing here is process-global; callers own the engine.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::info;

use crate::config::RagConfig;
use crate::domain::embedding::EmbeddingProvider;
use crate::domain::query_cache::QueryEmbeddingCache;
use crate::domain::vector::{HydrationReport, VectorStore};
use crate::domain::DomainError;
use crate::infrastructure::embedding::EmbeddingProviderFactory;
use crate::infrastructure::query_cache::{spawn_expiry_sweeper, InMemoryQueryEmbeddingCache};
use crate::infrastructure::services::{RuleIndexService, SemanticSearchService};
use crate::infrastructure::vector::VectorStoreFactory;

/// Fully wired retrieval core
#[derive(Debug)]
pub struct RetrievalEngine {
    pub provider: Arc<dyn EmbeddingProvider>,
    pub query_cache: Arc<dyn QueryEmbeddingCache>,
    pub vector_store: Arc<dyn VectorStore>,
    pub search: SemanticSearchService,
    pub indexer: RuleIndexService,
    pub hydration: HydrationReport,
    sweeper: Option<JoinHandle<()>>,
}

impl RetrievalEngine {
    /// Builds provider, caches, store and services from configuration
    pub async fn bootstrap(config: &RagConfig) -> Result<Self, DomainError> {
        let provider = EmbeddingProviderFactory::create(&config.embedding).await?;
        Self::with_provider(config, provider).await
    }

    /// Same as [`RetrievalEngine::bootstrap`] with an already built provider
    pub async fn with_provider(
        config: &RagConfig,
        provider: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self, DomainError> {
        let query_cache: Arc<dyn QueryEmbeddingCache> = Arc::new(
            InMemoryQueryEmbeddingCache::new(config.query_embedding_cache.clone()),
        );

        let (store, hydration) = VectorStoreFactory::create(
            &config.vector_store,
            &config.search,
            provider.provider_tag(),
            provider.dimension(),
        )
        .await?;
        let vector_store: Arc<dyn VectorStore> = store;

        let sweeper = match config.query_embedding_cache.sweep_interval() {
            Some(interval) if config.query_embedding_cache.enabled => {
                Some(spawn_expiry_sweeper(query_cache.clone(), interval))
            }
            _ => None,
        };

        let search = SemanticSearchService::with_config(
            provider.clone(),
            query_cache.clone(),
            vector_store.clone(),
            config.search.clone(),
        );
        let indexer = RuleIndexService::new(provider.clone(), vector_store.clone());

        info!(
            provider = %provider.provider_tag(),
            dimension = provider.dimension(),
            hydrated = hydration.loaded,
            sweeper = sweeper.is_some(),
            "Retrieval engine ready"
        );

        Ok(Self {
            provider,
            query_cache,
            vector_store,
            search,
            indexer,
            hydration,
            sweeper,
        })
    }

    /// Stops the background expiry sweeper, if running
    pub fn shutdown(&mut self) {
        if let Some(handle) = self.sweeper.take() {
            handle.abort();
        }
    }
}

impl Drop for RetrievalEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}
