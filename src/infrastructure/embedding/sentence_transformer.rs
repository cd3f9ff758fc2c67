//! Sentence-transformer embedding service client

use async_trait::async_trait;
use serde::Deserialize;

use super::HttpClientTrait;
use crate::domain::embedding::EmbeddingProvider;
use crate::domain::DomainError;

pub const DEFAULT_SENTENCE_TRANSFORMER_URL: &str = "http://localhost:8000/embed";
pub const DEFAULT_SENTENCE_TRANSFORMER_DIMENSION: usize = 384;
pub const SENTENCE_TRANSFORMER_PROVIDER_TAG: &str = "SENTENCE_TRANSFORMER";

/// Provider calling a local sentence-transformer HTTP service
///
/// Request body is `{"text": "..."}`, the service answers with
/// `{"embedding": [..]}`.
#[derive(Debug)]
pub struct SentenceTransformerEmbeddingProvider<C: HttpClientTrait> {
    client: C,
    url: String,
    dimension: usize,
}

impl<C: HttpClientTrait> SentenceTransformerEmbeddingProvider<C> {
    pub fn new(client: C) -> Self {
        Self::with_url(client, DEFAULT_SENTENCE_TRANSFORMER_URL)
    }

    pub fn with_url(client: C, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            dimension: DEFAULT_SENTENCE_TRANSFORMER_DIMENSION,
        }
    }

    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl<C: HttpClientTrait> EmbeddingProvider for SentenceTransformerEmbeddingProvider<C> {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        if text.trim().is_empty() {
            return Ok(vec![0.0; self.dimension]);
        }

        let body = serde_json::json!({ "text": text });
        let headers = vec![("Content-Type", "application/json")];

        let response = self
            .client
            .post_json(&self.url, headers, &body)
            .await
            .map_err(|e| DomainError::provider(SENTENCE_TRANSFORMER_PROVIDER_TAG, e.to_string()))?;

        let parsed: EmbedResponse = serde_json::from_value(response).map_err(|e| {
            DomainError::provider(
                SENTENCE_TRANSFORMER_PROVIDER_TAG,
                format!("Failed to parse embedding response: {}", e),
            )
        })?;

        if parsed.embedding.len() != self.dimension {
            return Err(DomainError::provider(
                SENTENCE_TRANSFORMER_PROVIDER_TAG,
                DomainError::dimension_mismatch(self.dimension, parsed.embedding.len()).to_string(),
            ));
        }

        Ok(parsed.embedding)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn provider_tag(&self) -> &str {
        SENTENCE_TRANSFORMER_PROVIDER_TAG
    }
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}
