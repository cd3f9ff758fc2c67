//! Embedding provider factory for startup provider selection

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use super::fallback::FallbackEmbeddingProvider;
use super::hash::HashEmbeddingProvider;
use super::http_client::{HttpClient, HttpClientTrait};
use super::openai::{OpenAiEmbeddingProvider, DEFAULT_OPENAI_BASE_URL, DEFAULT_OPENAI_MODEL};
use super::sentence_transformer::{
    SentenceTransformerEmbeddingProvider, DEFAULT_SENTENCE_TRANSFORMER_URL,
};
use crate::domain::embedding::EmbeddingProvider;
use crate::domain::DomainError;

/// Text embedded once at startup to check the configured provider
const PROBE_TEXT: &str = "teste de inicialização";

/// Supported embedding providers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingProviderType {
    /// Deterministic SHA-256 vectors, no network
    #[default]
    #[serde(alias = "dummy")]
    Hash,
    /// Local sentence-transformer HTTP service
    SentenceTransformer,
    /// OpenAI embeddings API
    #[serde(alias = "open_ai")]
    Openai,
}

impl FromStr for EmbeddingProviderType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "hash" | "dummy" => Ok(Self::Hash),
            "sentence_transformer" | "sentence_transformers" => Ok(Self::SentenceTransformer),
            "openai" | "open_ai" => Ok(Self::Openai),
            other => Err(DomainError::configuration(format!(
                "Unknown embedding provider: {}",
                other
            ))),
        }
    }
}

/// Embedding provider configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default)]
    pub provider: EmbeddingProviderType,

    /// Falls back to the `OPENAI_API_KEY` environment variable
    #[serde(default)]
    pub openai_api_key: Option<String>,

    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,

    #[serde(default = "default_openai_model")]
    pub openai_model: String,

    #[serde(default = "default_sentence_transformer_url")]
    pub sentence_transformer_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Use hash embeddings when the configured provider is unavailable
    #[serde(default = "default_enable_fallback")]
    pub enable_fallback: bool,
}

fn default_openai_base_url() -> String {
    DEFAULT_OPENAI_BASE_URL.to_string()
}

fn default_openai_model() -> String {
    DEFAULT_OPENAI_MODEL.to_string()
}

fn default_sentence_transformer_url() -> String {
    DEFAULT_SENTENCE_TRANSFORMER_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_enable_fallback() -> bool {
    true
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProviderType::default(),
            openai_api_key: None,
            openai_base_url: default_openai_base_url(),
            openai_model: default_openai_model(),
            sentence_transformer_url: default_sentence_transformer_url(),
            timeout_secs: default_timeout_secs(),
            enable_fallback: default_enable_fallback(),
        }
    }
}

impl EmbeddingConfig {
    pub fn new(provider: EmbeddingProviderType) -> Self {
        Self {
            provider,
            ..Default::default()
        }
    }

    pub fn with_openai_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.openai_api_key = Some(api_key.into());
        self
    }

    pub fn with_enable_fallback(mut self, enabled: bool) -> Self {
        self.enable_fallback = enabled;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Configured key, or `OPENAI_API_KEY` from the environment
    pub fn resolve_openai_api_key(&self) -> Option<String> {
        self.openai_api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .filter(|key| !key.trim().is_empty())
    }
}

/// Factory building the single embedding provider of a process
#[derive(Debug)]
pub struct EmbeddingProviderFactory;

impl EmbeddingProviderFactory {
    /// Builds and probes the configured provider using a reqwest client
    pub async fn create(
        config: &EmbeddingConfig,
    ) -> Result<Arc<dyn EmbeddingProvider>, DomainError> {
        let client = HttpClient::with_timeout(config.timeout())?;
        Self::create_with_client(config, client).await
    }

    /// Builds and probes the configured provider over the given HTTP client
    ///
    /// A provider that cannot be built or fails its probe is replaced by
    /// hash embeddings when fallback is enabled. Otherwise the failure is
    /// returned as a configuration error.
    pub async fn create_with_client<C>(
        config: &EmbeddingConfig,
        client: C,
    ) -> Result<Arc<dyn EmbeddingProvider>, DomainError>
    where
        C: HttpClientTrait + 'static,
    {
        info!(provider = ?config.provider, "Initializing embedding provider");

        let primary = match Self::build(config, client) {
            Ok(provider) => provider,
            Err(e) => return Self::handle_failure(config, e),
        };

        if config.provider == EmbeddingProviderType::Hash {
            return Ok(primary);
        }

        if let Err(e) = Self::probe(primary.as_ref()).await {
            return Self::handle_failure(config, e);
        }

        info!(
            provider = %primary.provider_tag(),
            dimension = primary.dimension(),
            "Embedding provider initialized"
        );

        if config.enable_fallback {
            Ok(Arc::new(FallbackEmbeddingProvider::new(primary)))
        } else {
            Ok(primary)
        }
    }

    fn build<C>(
        config: &EmbeddingConfig,
        client: C,
    ) -> Result<Arc<dyn EmbeddingProvider>, DomainError>
    where
        C: HttpClientTrait + 'static,
    {
        match config.provider {
            EmbeddingProviderType::Hash => Ok(Arc::new(HashEmbeddingProvider::new())),
            EmbeddingProviderType::SentenceTransformer => Ok(Arc::new(
                SentenceTransformerEmbeddingProvider::with_url(
                    client,
                    config.sentence_transformer_url.clone(),
                ),
            )),
            EmbeddingProviderType::Openai => {
                let api_key = config.resolve_openai_api_key().ok_or_else(|| {
                    DomainError::configuration(
                        "OPENAI_API_KEY is not configured for the openai embedding provider",
                    )
                })?;

                let provider =
                    OpenAiEmbeddingProvider::with_base_url(client, api_key, &config.openai_base_url)
                        .with_model(config.openai_model.clone(), None)?;

                Ok(Arc::new(provider))
            }
        }
    }

    async fn probe(provider: &dyn EmbeddingProvider) -> Result<(), DomainError> {
        let vector = provider.embed(PROBE_TEXT).await?;

        if vector.is_empty() {
            return Err(DomainError::provider(
                provider.provider_tag(),
                "Provider returned an empty embedding",
            ));
        }

        if vector.len() != provider.dimension() {
            return Err(DomainError::dimension_mismatch(
                provider.dimension(),
                vector.len(),
            ));
        }

        Ok(())
    }

    fn handle_failure(
        config: &EmbeddingConfig,
        error: DomainError,
    ) -> Result<Arc<dyn EmbeddingProvider>, DomainError> {
        if !config.enable_fallback {
            error!(
                provider = ?config.provider,
                error = %error,
                "Failed to create embedding provider and fallback is disabled"
            );
            return Err(DomainError::configuration(format!(
                "Failed to create embedding provider {:?}: {}",
                config.provider, error
            )));
        }

        warn!(
            provider = ?config.provider,
            error = %error,
            "Failed to create embedding provider, falling back to hash embeddings"
        );

        Ok(Arc::new(HashEmbeddingProvider::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::embedding::MockHttpClient;

    const OPENAI_URL: &str = "https://api.openai.com/v1/embeddings";

    fn openai_response(dimension: usize) -> serde_json::Value {
        serde_json::json!({
            "data": [{ "index": 0, "embedding": vec![0.01f32; dimension] }]
        })
    }

    #[test]
    fn test_provider_type_from_str() {
        assert_eq!(
            "dummy".parse::<EmbeddingProviderType>().unwrap(),
            EmbeddingProviderType::Hash
        );
        assert_eq!(
            "sentence-transformer".parse::<EmbeddingProviderType>().unwrap(),
            EmbeddingProviderType::SentenceTransformer
        );
        assert_eq!(
            "OpenAI".parse::<EmbeddingProviderType>().unwrap(),
            EmbeddingProviderType::Openai
        );
        assert!("cohere".parse::<EmbeddingProviderType>().is_err());
    }

    #[test]
    fn test_config_defaults() {
        let config: EmbeddingConfig = serde_json::from_str("{}").unwrap();

        assert_eq!(config.provider, EmbeddingProviderType::Hash);
        assert_eq!(config.timeout_secs, 10);
        assert!(config.enable_fallback);
        assert_eq!(config.openai_model, "text-embedding-3-small");
        assert_eq!(config.sentence_transformer_url, "http://localhost:8000/embed");
    }

    #[tokio::test]
    async fn test_hash_provider() {
        let config = EmbeddingConfig::default();

        let provider = EmbeddingProviderFactory::create_with_client(&config, MockHttpClient::new())
            .await
            .unwrap();

        assert_eq!(provider.provider_tag(), "HASH");
        assert_eq!(provider.dimension(), 128);
    }

    #[tokio::test]
    async fn test_openai_provider_wrapped_with_fallback() {
        let config =
            EmbeddingConfig::new(EmbeddingProviderType::Openai).with_openai_api_key("sk-test");
        let client = MockHttpClient::new().with_response(OPENAI_URL, openai_response(1536));

        let provider = EmbeddingProviderFactory::create_with_client(&config, client)
            .await
            .unwrap();

        assert_eq!(provider.provider_tag(), "OPENAI");
        assert_eq!(provider.dimension(), 1536);
        assert_eq!(provider.embed("outra consulta").await.unwrap().len(), 1536);
    }

    #[tokio::test]
    async fn test_failed_probe_falls_back_to_hash() {
        let config = EmbeddingConfig::new(EmbeddingProviderType::SentenceTransformer);
        let client = MockHttpClient::new()
            .with_error(DEFAULT_SENTENCE_TRANSFORMER_URL, "connection refused");

        let provider = EmbeddingProviderFactory::create_with_client(&config, client)
            .await
            .unwrap();

        assert_eq!(provider.provider_tag(), "HASH");
        assert_eq!(provider.dimension(), 128);
    }

    #[tokio::test]
    async fn test_failed_probe_without_fallback_is_error() {
        let config = EmbeddingConfig::new(EmbeddingProviderType::SentenceTransformer)
            .with_enable_fallback(false);
        let client = MockHttpClient::new()
            .with_error(DEFAULT_SENTENCE_TRANSFORMER_URL, "connection refused");

        let result = EmbeddingProviderFactory::create_with_client(&config, client).await;

        assert!(matches!(result, Err(DomainError::Configuration { .. })));
    }

    #[tokio::test]
    async fn test_probe_rejects_wrong_dimension() {
        let config = EmbeddingConfig::new(EmbeddingProviderType::Openai)
            .with_openai_api_key("sk-test")
            .with_enable_fallback(false);
        let client = MockHttpClient::new().with_response(OPENAI_URL, openai_response(8));

        let result = EmbeddingProviderFactory::create_with_client(&config, client).await;

        assert!(result.is_err());
    }
}
