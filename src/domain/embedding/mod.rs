//! Embedding domain: provider contract, similarity and vector codec

mod codec;
mod provider;
mod similarity;

pub use codec::{decode_vector, encode_vector, BYTES_PER_COMPONENT};
pub use provider::EmbeddingProvider;
pub use similarity::{cosine_similarity, normalize, DEFAULT_SIMILARITY_THRESHOLD, NORM_EPSILON};

#[cfg(test)]
pub use provider::mock::MockEmbeddingProvider;
