//! Embedding provider trait definition

use async_trait::async_trait;
use std::fmt::Debug;

use crate::domain::DomainError;

/// Trait for embedding providers (hash, sentence-transformer, OpenAI, ...)
///
/// Implementations must be deterministic for identical text within a
/// provider version, and every vector they return must have exactly
/// `dimension()` components.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync + Debug {
    /// Generate an embedding for the given text
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError>;

    /// Length of every vector produced by this provider
    fn dimension(&self) -> usize;

    /// Tag persisted next to each vector, identifies the producing provider
    fn provider_tag(&self) -> &str;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Provider returning canned vectors and counting calls
    #[derive(Debug)]
    pub struct MockEmbeddingProvider {
        tag: String,
        dimension: usize,
        vectors: HashMap<String, Vec<f32>>,
        error: Option<String>,
        calls: AtomicUsize,
    }

    impl MockEmbeddingProvider {
        pub fn new(tag: impl Into<String>, dimension: usize) -> Self {
            Self {
                tag: tag.into(),
                dimension,
                vectors: HashMap::new(),
                error: None,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn with_vector(mut self, text: impl Into<String>, vector: Vec<f32>) -> Self {
            self.vectors.insert(text.into(), vector);
            self
        }

        pub fn with_error(mut self, error: impl Into<String>) -> Self {
            self.error = Some(error.into());
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl EmbeddingProvider for MockEmbeddingProvider {
        async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            if let Some(ref error) = self.error {
                return Err(DomainError::provider(self.tag.clone(), error));
            }

            if let Some(vector) = self.vectors.get(text) {
                return Ok(vector.clone());
            }

            // Deterministic filler derived from the text bytes
            let hash = text.bytes().fold(0u64, |acc, b| acc.wrapping_add(b as u64));
            Ok((0..self.dimension)
                .map(|i| ((hash.wrapping_add(i as u64) % 1000) as f32 / 1000.0) - 0.5)
                .collect())
        }

        fn dimension(&self) -> usize {
            self.dimension
        }

        fn provider_tag(&self) -> &str {
            &self.tag
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn test_mock_provider_canned_vector() {
            let provider = MockEmbeddingProvider::new("MOCK", 4)
                .with_vector("pix", vec![1.0, 0.0, 0.0, 0.0]);

            let vector = provider.embed("pix").await.unwrap();

            assert_eq!(vector, vec![1.0, 0.0, 0.0, 0.0]);
            assert_eq!(provider.calls(), 1);
        }

        #[tokio::test]
        async fn test_mock_provider_deterministic_filler() {
            let provider = MockEmbeddingProvider::new("MOCK", 16);

            let first = provider.embed("Hello").await.unwrap();
            let second = provider.embed("Hello").await.unwrap();

            assert_eq!(first.len(), 16);
            assert_eq!(first, second);
        }

        #[tokio::test]
        async fn test_mock_provider_error() {
            let provider = MockEmbeddingProvider::new("MOCK", 4).with_error("API error");

            assert!(provider.embed("Hello").await.is_err());
        }
    }
}
