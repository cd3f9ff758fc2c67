//! PR risk retrieval core
//!
//! Semantic search over business rules for pull-request risk analysis:
//! - Embedding providers (hash, sentence-transformer, OpenAI) with fallback
//! - Write-through rule vector store with startup hydration
//! - TTL-bounded query embedding cache

pub mod cli;
pub mod config;
pub mod domain;
pub mod engine;
pub mod infrastructure;

pub use config::{AppConfig, RagConfig};
pub use engine::RetrievalEngine;
