//! Domain layer - Core retrieval types, traits and pure functions

pub mod clock;
pub mod embedding;
pub mod error;
pub mod query_cache;
pub mod rule;
pub mod search;
pub mod vector;

pub use clock::{Clock, ManualClock, SystemClock};
pub use embedding::{cosine_similarity, decode_vector, encode_vector, EmbeddingProvider};
pub use error::DomainError;
pub use query_cache::{
    is_expired, CacheEntry, QueryCacheStats, QueryEmbeddingCache, QueryEmbeddingCacheConfig,
};
pub use rule::RuleDocument;
pub use search::{normalize_query, SearchConfig};
pub use vector::{
    EmbeddingRepository, HydrationReport, RuleId, SaveOutcome, SimilarityMatch, StoredEmbedding,
    VectorEntry, VectorStore,
};
