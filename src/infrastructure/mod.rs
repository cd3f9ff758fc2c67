//! Infrastructure layer - Provider, store and cache implementations

pub mod embedding;
pub mod logging;
pub mod observability;
pub mod query_cache;
pub mod services;
pub mod vector;
