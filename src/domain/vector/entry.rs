//! Vector store entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Maximum length for rule IDs (matches the persisted column width)
pub const MAX_RULE_ID_LENGTH: usize = 255;

/// Business rule identifier - opaque, non-blank, max 255 characters
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RuleId(String);

impl RuleId {
    /// Create a new RuleId after validation
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();

        if id.trim().is_empty() {
            return Err(DomainError::validation("Rule ID cannot be empty"));
        }

        if id.len() > MAX_RULE_ID_LENGTH {
            return Err(DomainError::validation(format!(
                "Rule ID too long: {} characters (max {})",
                id.len(),
                MAX_RULE_ID_LENGTH
            )));
        }

        Ok(Self(id))
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RuleId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RuleId> for String {
    fn from(id: RuleId) -> Self {
        id.0
    }
}

impl std::fmt::Display for RuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// In-memory vector for one rule
///
/// `dimension` always equals `vector.len()`. Entries are replaced whole on
/// re-indexing, never merged.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorEntry {
    rule_id: RuleId,
    vector: Vec<f32>,
    dimension: usize,
    provider_tag: String,
    created_at: DateTime<Utc>,
}

impl VectorEntry {
    pub fn new(
        rule_id: RuleId,
        vector: Vec<f32>,
        provider_tag: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let dimension = vector.len();

        Self {
            rule_id,
            vector,
            dimension,
            provider_tag: provider_tag.into(),
            created_at,
        }
    }

    pub fn rule_id(&self) -> &RuleId {
        &self.rule_id
    }

    pub fn vector(&self) -> &[f32] {
        &self.vector
    }

    pub fn into_vector(self) -> Vec<f32> {
        self.vector
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn provider_tag(&self) -> &str {
        &self.provider_tag
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Row shape exchanged with the backing store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEmbedding {
    pub rule_id: RuleId,
    pub dimension: usize,
    pub provider: String,
    /// Output of [`crate::domain::embedding::encode_vector`]
    pub embedding: Vec<u8>,
    pub created_at: DateTime<Utc>,
}

/// A single ranked search hit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityMatch {
    pub rule_id: RuleId,
    pub similarity: f32,
}

impl SimilarityMatch {
    pub fn new(rule_id: RuleId, similarity: f32) -> Self {
        Self {
            rule_id,
            similarity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_id_valid() {
        let id = RuleId::new("4f1c2a7e-0b7d-4c55-9d0e-2d3f1b6a9c10").unwrap();
        assert_eq!(id.as_str(), "4f1c2a7e-0b7d-4c55-9d0e-2d3f1b6a9c10");
        assert_eq!(id.to_string(), "4f1c2a7e-0b7d-4c55-9d0e-2d3f1b6a9c10");
    }

    #[test]
    fn test_rule_id_blank_rejected() {
        assert!(RuleId::new("").is_err());
        assert!(RuleId::new("   ").is_err());
    }

    #[test]
    fn test_rule_id_too_long_rejected() {
        assert!(RuleId::new("r".repeat(MAX_RULE_ID_LENGTH)).is_ok());
        assert!(RuleId::new("r".repeat(MAX_RULE_ID_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_rule_id_serde() {
        let id: RuleId = serde_json::from_str(r#""rule-7""#).unwrap();
        assert_eq!(id.as_str(), "rule-7");
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""rule-7""#);

        let blank: Result<RuleId, _> = serde_json::from_str(r#""""#);
        assert!(blank.is_err());
    }

    #[test]
    fn test_vector_entry_dimension_follows_vector() {
        let entry = VectorEntry::new(
            RuleId::new("r-1").unwrap(),
            vec![0.1, 0.2, 0.3],
            "HASH",
            Utc::now(),
        );

        assert_eq!(entry.dimension(), 3);
        assert_eq!(entry.vector().len(), entry.dimension());
        assert_eq!(entry.provider_tag(), "HASH");
    }
}
