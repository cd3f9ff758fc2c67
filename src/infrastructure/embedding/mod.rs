//! Embedding provider implementations

mod factory;
mod fallback;
mod hash;
mod http_client;
mod openai;
mod sentence_transformer;

pub use factory::{EmbeddingConfig, EmbeddingProviderFactory, EmbeddingProviderType};
pub use fallback::{FallbackEmbeddingProvider, FALLBACK_TAG_SUFFIX};
pub use hash::{HashEmbeddingProvider, DEFAULT_HASH_DIMENSION, HASH_PROVIDER_TAG};
pub use http_client::{HttpClient, HttpClientTrait};
pub use openai::{model_dimension, OpenAiEmbeddingProvider, OPENAI_PROVIDER_TAG};
pub use sentence_transformer::{
    SentenceTransformerEmbeddingProvider, SENTENCE_TRANSFORMER_PROVIDER_TAG,
};

#[cfg(test)]
pub use http_client::mock::MockHttpClient;
