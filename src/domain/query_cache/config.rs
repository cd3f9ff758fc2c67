//! Query embedding cache configuration

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Configuration for the query embedding cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryEmbeddingCacheConfig {
    /// Whether caching is enabled; when false every lookup misses
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Time-to-live for cached entries in minutes
    #[serde(default = "default_ttl_minutes")]
    pub ttl_minutes: u64,

    /// Maximum number of entries held at once
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    /// Period of the background expiry sweep in seconds (0 disables it)
    #[serde(default)]
    pub sweep_interval_secs: u64,
}

fn default_enabled() -> bool {
    true
}

fn default_ttl_minutes() -> u64 {
    30
}

fn default_max_entries() -> usize {
    1000
}

impl Default for QueryEmbeddingCacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            ttl_minutes: default_ttl_minutes(),
            max_entries: default_max_entries(),
            sweep_interval_secs: 0,
        }
    }
}

impl QueryEmbeddingCacheConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Get TTL as a chrono Duration
    pub fn ttl(&self) -> Duration {
        let minutes = i64::try_from(self.ttl_minutes).unwrap_or(i64::MAX);
        Duration::try_minutes(minutes).unwrap_or(Duration::MAX)
    }

    /// Period of the background sweep, if enabled
    pub fn sweep_interval(&self) -> Option<std::time::Duration> {
        (self.sweep_interval_secs > 0)
            .then(|| std::time::Duration::from_secs(self.sweep_interval_secs))
    }

    /// Set whether caching is enabled
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the TTL in minutes
    pub fn with_ttl_minutes(mut self, minutes: u64) -> Self {
        self.ttl_minutes = minutes;
        self
    }

    /// Set the maximum number of entries
    pub fn with_max_entries(mut self, max: usize) -> Self {
        self.max_entries = max;
        self
    }

    /// Set the background sweep period in seconds
    pub fn with_sweep_interval_secs(mut self, secs: u64) -> Self {
        self.sweep_interval_secs = secs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = QueryEmbeddingCacheConfig::default();

        assert!(config.enabled);
        assert_eq!(config.ttl_minutes, 30);
        assert_eq!(config.ttl(), Duration::minutes(30));
        assert_eq!(config.max_entries, 1000);
        assert_eq!(config.sweep_interval(), None);
    }

    #[test]
    fn test_config_builder() {
        let config = QueryEmbeddingCacheConfig::new()
            .with_enabled(false)
            .with_ttl_minutes(5)
            .with_max_entries(2)
            .with_sweep_interval_secs(60);

        assert!(!config.enabled);
        assert_eq!(config.ttl(), Duration::minutes(5));
        assert_eq!(config.max_entries, 2);
        assert_eq!(
            config.sweep_interval(),
            Some(std::time::Duration::from_secs(60))
        );
    }

    #[test]
    fn test_huge_ttl_saturates() {
        let config = QueryEmbeddingCacheConfig::new().with_ttl_minutes(u64::MAX);
        assert_eq!(config.ttl(), Duration::MAX);
    }

    #[test]
    fn test_deserialize_partial() {
        let config: QueryEmbeddingCacheConfig =
            serde_json::from_str(r#"{"ttl_minutes": 1}"#).unwrap();

        assert!(config.enabled);
        assert_eq!(config.ttl_minutes, 1);
        assert_eq!(config.max_entries, 1000);
    }
}
