//! Query cache entry and expiry rule

use chrono::{DateTime, Duration, Utc};

/// A cached query embedding
///
/// Entries are replaced on write and never mutated. Reading an entry does
/// not extend its lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    key: String,
    vector: Vec<f32>,
    created_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(key: impl Into<String>, vector: Vec<f32>, created_at: DateTime<Utc>) -> Self {
        Self {
            key: key.into(),
            vector,
            created_at,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn vector(&self) -> &[f32] {
        &self.vector
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Age of the entry at `now`
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now.signed_duration_since(self.created_at)
    }
}

/// An entry is valid while `now - created_at < ttl`
pub fn is_expired(entry: &CacheEntry, ttl: Duration, now: DateTime<Utc>) -> bool {
    entry.age(now) >= ttl
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_at(created_at: DateTime<Utc>) -> CacheEntry {
        CacheEntry::new("pix limite diario", vec![0.5, 0.5], created_at)
    }

    #[test]
    fn test_fresh_entry_not_expired() {
        let t0 = Utc::now();
        let entry = entry_at(t0);

        assert!(!is_expired(&entry, Duration::minutes(1), t0));
        assert!(!is_expired(&entry, Duration::minutes(1), t0 + Duration::seconds(30)));
    }

    #[test]
    fn test_entry_expires_at_ttl_boundary() {
        let t0 = Utc::now();
        let entry = entry_at(t0);

        assert!(!is_expired(&entry, Duration::minutes(1), t0 + Duration::seconds(59)));
        assert!(is_expired(&entry, Duration::minutes(1), t0 + Duration::seconds(60)));
        assert!(is_expired(&entry, Duration::minutes(1), t0 + Duration::seconds(61)));
    }

    #[test]
    fn test_clock_skew_does_not_expire() {
        let t0 = Utc::now();
        let entry = entry_at(t0);

        assert!(!is_expired(&entry, Duration::minutes(1), t0 - Duration::hours(1)));
    }

    #[test]
    fn test_zero_ttl_expires_immediately() {
        let t0 = Utc::now();
        assert!(is_expired(&entry_at(t0), Duration::zero(), t0));
    }
}
