//! Query embedding cache implementations

mod in_memory;
mod sweeper;

pub use in_memory::InMemoryQueryEmbeddingCache;
pub use sweeper::spawn_expiry_sweeper;
