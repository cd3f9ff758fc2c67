use serde::Deserialize;

use crate::domain::query_cache::QueryEmbeddingCacheConfig;
use crate::domain::search::SearchConfig;
use crate::infrastructure::embedding::EmbeddingConfig;
use crate::infrastructure::vector::VectorStoreConfig;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub rag: RagConfig,
}

/// Retrieval core configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RagConfig {
    #[serde(default)]
    pub query_embedding_cache: QueryEmbeddingCacheConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub vector_store: VectorStoreConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::builder()?.try_deserialize()
    }

    fn builder() -> Result<config::Config, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
    }
}
