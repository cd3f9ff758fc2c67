//! Runtime fallback from a remote provider to hash embeddings

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use super::hash::HashEmbeddingProvider;
use crate::domain::embedding::EmbeddingProvider;
use crate::domain::DomainError;

/// Suffix appended to the primary's tag once hash embeddings are in use
pub const FALLBACK_TAG_SUFFIX: &str = "+HASH_FALLBACK";

/// Wraps a primary provider and switches to hash embeddings after its first failure
///
/// The switch is permanent for the life of the process. The hash provider
/// keeps the primary's dimension, but reports its own tag so vectors saved
/// after the switch are treated as stale once the primary is back.
#[derive(Debug)]
pub struct FallbackEmbeddingProvider {
    primary: Arc<dyn EmbeddingProvider>,
    fallback: HashEmbeddingProvider,
    primary_failed: AtomicBool,
}

impl FallbackEmbeddingProvider {
    pub fn new(primary: Arc<dyn EmbeddingProvider>) -> Self {
        let fallback = HashEmbeddingProvider::with_dimension(primary.dimension())
            .with_tag(format!("{}{}", primary.provider_tag(), FALLBACK_TAG_SUFFIX));

        Self {
            primary,
            fallback,
            primary_failed: AtomicBool::new(false),
        }
    }

    /// Whether the primary has failed and the hash provider is in use
    pub fn is_degraded(&self) -> bool {
        self.primary_failed.load(Ordering::Acquire)
    }
}

#[async_trait]
impl EmbeddingProvider for FallbackEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        if self.is_degraded() {
            return self.fallback.embed(text).await;
        }

        match self.primary.embed(text).await {
            Ok(vector) => Ok(vector),
            Err(e) => {
                if !self.primary_failed.swap(true, Ordering::AcqRel) {
                    warn!(
                        provider = %self.primary.provider_tag(),
                        error = %e,
                        "Embedding provider failed, switching to hash embeddings"
                    );
                }
                self.fallback.embed(text).await
            }
        }
    }

    fn dimension(&self) -> usize {
        self.primary.dimension()
    }

    fn provider_tag(&self) -> &str {
        if self.is_degraded() {
            self.fallback.provider_tag()
        } else {
            self.primary.provider_tag()
        }
    }
}
