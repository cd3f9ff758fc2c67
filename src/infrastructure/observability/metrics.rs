//! Retrieval metrics
//!
//! Emitted through the `metrics` facade; nothing is recorded until the
//! host process installs a recorder.

use std::time::Duration;

use metrics::{counter, gauge, histogram};

use crate::domain::vector::{HydrationReport, SaveOutcome};

/// Record a query embedding cache lookup
pub fn record_query_cache_lookup(hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    counter!("rag_query_cache_lookups_total", "result" => result).increment(1);
}

/// Record entries removed from the query cache
pub fn record_query_cache_evictions(reason: &'static str, count: usize) {
    if count == 0 {
        return;
    }

    counter!("rag_query_cache_evictions_total", "reason" => reason).increment(count as u64);
}

/// Record a vector store save
pub fn record_vector_save(outcome: SaveOutcome) {
    counter!("rag_vector_store_saves_total", "outcome" => outcome_label(outcome)).increment(1);
}

/// Record the result of a hydration pass
pub fn record_hydration(report: &HydrationReport) {
    gauge!("rag_vector_store_hydrated_entries").set(report.loaded as f64);
    counter!("rag_vector_store_hydration_skipped_total", "reason" => "corrupt")
        .increment(report.corrupt as u64);
    counter!("rag_vector_store_hydration_skipped_total", "reason" => "stale")
        .increment(report.stale as u64);
}

/// Record a top-K search
pub fn record_search(candidates: usize, returned: usize, duration: Duration) {
    histogram!("rag_vector_search_duration_seconds").record(duration.as_secs_f64());
    histogram!("rag_vector_search_candidates").record(candidates as f64);
    histogram!("rag_vector_search_results").record(returned as f64);
}

fn outcome_label(outcome: SaveOutcome) -> &'static str {
    match outcome {
        SaveOutcome::Persisted => "persisted",
        SaveOutcome::CacheOnly => "cache_only",
        SaveOutcome::Rejected => "rejected",
    }
}
