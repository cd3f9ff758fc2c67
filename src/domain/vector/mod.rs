//! Rule vector store domain models and traits

mod entry;
mod repository;
mod store;

pub use entry::{RuleId, SimilarityMatch, StoredEmbedding, VectorEntry, MAX_RULE_ID_LENGTH};
pub use repository::{EmbeddingRepository, RowResult};
pub use store::{HydrationReport, SaveOutcome, VectorStore};

#[cfg(test)]
pub use repository::MockEmbeddingRepository;
