//! Observability infrastructure - Metrics

mod metrics;

pub use self::metrics::{
    record_hydration, record_query_cache_evictions, record_query_cache_lookup, record_search,
    record_vector_save,
};
