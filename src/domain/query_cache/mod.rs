//! Query embedding cache domain models and traits
//!
//! Caches embeddings of normalized query text so repeated searches skip
//! the embedding provider. Holds no authoritative data.

mod config;
mod entry;
mod repository;

pub use config::QueryEmbeddingCacheConfig;
pub use entry::{is_expired, CacheEntry};
pub use repository::{QueryCacheStats, QueryEmbeddingCache};
