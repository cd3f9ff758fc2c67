//! Deterministic hash-based embedding provider

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::domain::embedding::{normalize, EmbeddingProvider};
use crate::domain::DomainError;

/// Default dimension of hash embeddings
pub const DEFAULT_HASH_DIMENSION: usize = 128;

/// Tag persisted alongside hash embeddings
pub const HASH_PROVIDER_TAG: &str = "HASH";

/// Embedding provider deriving vectors from a SHA-256 digest of the text
///
/// Needs no network and is fully deterministic, so it backs development
/// setups and stands in when a remote provider is unavailable. Identical
/// text (case and surrounding whitespace aside) maps to identical vectors;
/// otherwise there is no semantic signal.
#[derive(Debug, Clone)]
pub struct HashEmbeddingProvider {
    dimension: usize,
    tag: String,
}

impl Default for HashEmbeddingProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl HashEmbeddingProvider {
    pub fn new() -> Self {
        Self::with_dimension(DEFAULT_HASH_DIMENSION)
    }

    /// Produce vectors of `dimension` components (at least one)
    pub fn with_dimension(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
            tag: HASH_PROVIDER_TAG.to_string(),
        }
    }

    /// Report `tag` instead of the hash tag
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Synchronous embedding, shared by the async trait method
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let text = text.trim().to_lowercase();

        if text.is_empty() {
            return vec![0.0; self.dimension];
        }

        let digest = Sha256::digest(text.as_bytes());
        let len = digest.len();

        let mut vector: Vec<f32> = (0..self.dimension)
            .map(|i| {
                let index = (i * len / self.dimension) % len;
                f32::from(digest[index]) / 255.0
            })
            .collect();

        normalize(&mut vector);
        vector
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        Ok(self.embed_text(text))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn provider_tag(&self) -> &str {
        &self.tag
    }
}
