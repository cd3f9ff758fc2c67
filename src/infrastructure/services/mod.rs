//! Infrastructure services

mod rule_index_service;
mod semantic_search_service;

pub use rule_index_service::{IndexReport, RuleIndexService};
pub use semantic_search_service::SemanticSearchService;
