//! Semantic search parameters and query normalization

mod config;
mod query;

pub use config::SearchConfig;
pub use query::normalize_query;
