//! Search configuration

use serde::{Deserialize, Serialize};

use crate::domain::embedding::DEFAULT_SIMILARITY_THRESHOLD;

/// Ranking parameters shared by every vector-store search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Matches scoring below this are dropped
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f32,

    /// Result count used when the caller does not pass one
    #[serde(default = "default_top_k")]
    pub default_top_k: usize,
}

fn default_similarity_threshold() -> f32 {
    DEFAULT_SIMILARITY_THRESHOLD
}

fn default_top_k() -> usize {
    5
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: default_similarity_threshold(),
            default_top_k: default_top_k(),
        }
    }
}

impl SearchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the similarity threshold, clamped to the cosine range
    pub fn with_similarity_threshold(mut self, threshold: f32) -> Self {
        self.similarity_threshold = threshold.clamp(-1.0, 1.0);
        self
    }

    pub fn with_default_top_k(mut self, top_k: usize) -> Self {
        self.default_top_k = top_k;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SearchConfig::default();

        assert!((config.similarity_threshold - 0.1).abs() < f32::EPSILON);
        assert_eq!(config.default_top_k, 5);
    }

    #[test]
    fn test_threshold_clamped() {
        let config = SearchConfig::new().with_similarity_threshold(1.5);
        assert_eq!(config.similarity_threshold, 1.0);

        let config = SearchConfig::new().with_similarity_threshold(-3.0);
        assert_eq!(config.similarity_threshold, -1.0);
    }
}
