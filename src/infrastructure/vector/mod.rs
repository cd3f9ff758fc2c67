//! Rule vector store and its backing stores

mod factory;
mod in_memory;
mod postgres;
mod store;

pub use factory::{VectorStoreConfig, VectorStoreFactory, VectorStoreType};
pub use in_memory::InMemoryEmbeddingRepository;
pub use postgres::{PostgresConfig, PostgresEmbeddingRepository, DEFAULT_EMBEDDING_TABLE};
pub use store::RuleVectorStore;
