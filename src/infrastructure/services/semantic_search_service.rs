//! Semantic rule search service
//!
//! Turns free-text queries into ranked rule matches: look up the query
//! embedding cache by normalized key, embed the original text on miss, then
//! rank against the vector store.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::embedding::EmbeddingProvider;
use crate::domain::query_cache::QueryEmbeddingCache;
use crate::domain::search::{normalize_query, SearchConfig};
use crate::domain::vector::{SimilarityMatch, VectorStore};
use crate::domain::DomainError;

/// Semantic search over indexed business rules
#[derive(Debug)]
pub struct SemanticSearchService {
    provider: Arc<dyn EmbeddingProvider>,
    cache: Arc<dyn QueryEmbeddingCache>,
    store: Arc<dyn VectorStore>,
    config: SearchConfig,
}

impl SemanticSearchService {
    pub fn new(
        provider: Arc<dyn EmbeddingProvider>,
        cache: Arc<dyn QueryEmbeddingCache>,
        store: Arc<dyn VectorStore>,
    ) -> Self {
        Self::with_config(provider, cache, store, SearchConfig::default())
    }

    pub fn with_config(
        provider: Arc<dyn EmbeddingProvider>,
        cache: Arc<dyn QueryEmbeddingCache>,
        store: Arc<dyn VectorStore>,
        config: SearchConfig,
    ) -> Self {
        Self {
            provider,
            cache,
            store,
            config,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Embedding for a query, served from the cache when fresh
    ///
    /// The normalized form only keys the cache; the provider sees the
    /// trimmed original text. Returns `None` for queries that normalize to
    /// nothing.
    pub async fn embed_query(&self, query: &str) -> Result<Option<Vec<f32>>, DomainError> {
        let normalized = normalize_query(query);

        if normalized.is_empty() {
            return Ok(None);
        }

        if let Some(vector) = self.cache.get(&normalized) {
            return Ok(Some(vector));
        }

        let vector = self.provider.embed(query.trim()).await?;

        if vector.len() == self.provider.dimension() {
            self.cache.put(&normalized, vector.clone());
        } else {
            warn!(
                expected = self.provider.dimension(),
                actual = vector.len(),
                "Query embedding has unexpected dimension, not caching"
            );
        }

        Ok(Some(vector))
    }

    /// Top `k` rules for the query (default from configuration)
    pub async fn search(
        &self,
        query: &str,
        k: Option<usize>,
    ) -> Result<Vec<SimilarityMatch>, DomainError> {
        let k = k.unwrap_or(self.config.default_top_k);

        let Some(vector) = self.embed_query(query).await? else {
            debug!("Query is empty after normalization");
            return Ok(Vec::new());
        };

        let matches = self.store.find_top_k(&vector, k);

        debug!(k, returned = matches.len(), "Semantic rule search completed");

        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clock::ManualClock;
    use crate::domain::embedding::MockEmbeddingProvider;
    use crate::domain::query_cache::QueryEmbeddingCacheConfig;
    use crate::domain::vector::RuleId;
    use crate::infrastructure::query_cache::InMemoryQueryEmbeddingCache;
    use crate::infrastructure::vector::RuleVectorStore;

    struct Fixture {
        provider: Arc<MockEmbeddingProvider>,
        cache: Arc<InMemoryQueryEmbeddingCache>,
        store: Arc<RuleVectorStore>,
        service: SemanticSearchService,
    }

    fn fixture(
        provider: MockEmbeddingProvider,
        cache_config: QueryEmbeddingCacheConfig,
    ) -> Fixture {
        let provider = Arc::new(provider);
        let cache = Arc::new(InMemoryQueryEmbeddingCache::with_clock(
            cache_config,
            Arc::new(ManualClock::starting_now()),
        ));
        let store = Arc::new(RuleVectorStore::new("MOCK"));
        let service = SemanticSearchService::new(provider.clone(), cache.clone(), store.clone());

        Fixture {
            provider,
            cache,
            store,
            service,
        }
    }

    fn rule(id: &str) -> RuleId {
        RuleId::new(id).unwrap()
    }

    #[tokio::test]
    async fn test_search_ranks_rules() {
        let f = fixture(
            MockEmbeddingProvider::new("MOCK", 3).with_vector("Limite PIX", vec![1.0, 0.0, 0.0]),
            QueryEmbeddingCacheConfig::default(),
        );
        f.store.save(&rule("pix-limit"), vec![1.0, 0.1, 0.0]).await;
        f.store.save(&rule("cpf-check"), vec![0.0, 0.0, 1.0]).await;

        let matches = f.service.search("  Limite PIX ", None).await.unwrap();

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].rule_id, rule("pix-limit"));
    }

    #[tokio::test]
    async fn test_equivalent_queries_share_one_embedding() {
        let f = fixture(
            MockEmbeddingProvider::new("MOCK", 2).with_vector("Validação CPF", vec![0.0, 1.0]),
            QueryEmbeddingCacheConfig::default(),
        );

        f.service.search("Validação CPF", Some(3)).await.unwrap();
        f.service.search("validacao   cpf", Some(3)).await.unwrap();

        assert_eq!(f.provider.calls(), 1);
        assert_eq!(f.cache.size(), 1);
        assert_eq!(f.cache.stats().hits, 1);
    }

    #[tokio::test]
    async fn test_provider_receives_original_text() {
        let f = fixture(
            MockEmbeddingProvider::new("MOCK", 2)
                .with_vector("Validação de CPF", vec![1.0, 0.0]),
            QueryEmbeddingCacheConfig::default(),
        );

        let vector = f.service.embed_query("  Validação de CPF ").await.unwrap();

        assert_eq!(vector, Some(vec![1.0, 0.0]));
        assert_eq!(f.cache.get("validacao de cpf"), Some(vec![1.0, 0.0]));
    }

    #[tokio::test]
    async fn test_disabled_cache_always_embeds() {
        let f = fixture(
            MockEmbeddingProvider::new("MOCK", 2),
            QueryEmbeddingCacheConfig::new().with_enabled(false),
        );

        f.service.search("pagamento", None).await.unwrap();
        f.service.search("pagamento", None).await.unwrap();

        assert_eq!(f.provider.calls(), 2);
        assert_eq!(f.cache.size(), 0);
    }

    #[tokio::test]
    async fn test_empty_query_returns_nothing() {
        let f = fixture(
            MockEmbeddingProvider::new("MOCK", 2),
            QueryEmbeddingCacheConfig::default(),
        );

        let matches = f.service.search("   \t ", None).await.unwrap();

        assert!(matches.is_empty());
        assert_eq!(f.provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_provider_failure_surfaces() {
        let f = fixture(
            MockEmbeddingProvider::new("MOCK", 2).with_error("service down"),
            QueryEmbeddingCacheConfig::default(),
        );

        let result = f.service.search("pix", None).await;

        assert!(matches!(result, Err(DomainError::Provider { .. })));
        assert_eq!(f.cache.size(), 0);
    }

    #[tokio::test]
    async fn test_default_top_k_applies() {
        let provider =
            Arc::new(MockEmbeddingProvider::new("MOCK", 2).with_vector("q", vec![1.0, 0.0]));
        let cache = Arc::new(InMemoryQueryEmbeddingCache::new(
            QueryEmbeddingCacheConfig::default(),
        ));
        let store = Arc::new(RuleVectorStore::new("MOCK"));
        let service = SemanticSearchService::with_config(
            provider,
            cache,
            store.clone(),
            SearchConfig::new().with_default_top_k(2),
        );

        for i in 0..5 {
            store.save(&rule(&format!("r{}", i)), vec![1.0, i as f32 * 0.01]).await;
        }

        assert_eq!(service.search("q", None).await.unwrap().len(), 2);
        assert_eq!(service.search("q", Some(4)).await.unwrap().len(), 4);
    }
}
