//! Business rule documents as seen by the indexer

use serde::{Deserialize, Serialize};

use crate::domain::vector::RuleId;

/// The parts of a business rule that feed its embedding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDocument {
    pub id: RuleId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub criticality: Option<String>,
}

impl RuleDocument {
    pub fn new(id: RuleId, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
            domain: None,
            criticality: None,
        }
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_criticality(mut self, criticality: impl Into<String>) -> Self {
        self.criticality = Some(criticality.into());
        self
    }

    /// Text sent to the embedding provider
    ///
    /// Never empty: rules without any content get a placeholder derived
    /// from their id.
    pub fn embedding_text(&self) -> String {
        let mut parts: Vec<String> = Vec::with_capacity(4);

        for field in [&self.name, &self.description] {
            let trimmed = field.trim();
            if !trimmed.is_empty() {
                parts.push(format!("{}.", trimmed.trim_end_matches('.')));
            }
        }

        if let Some(domain) = self.domain.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
            parts.push(format!("Domain: {}.", domain));
        }

        if let Some(criticality) = self
            .criticality
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
        {
            parts.push(format!("Criticality: {}.", criticality));
        }

        if parts.is_empty() {
            return format!("RULE_WITHOUT_DESCRIPTION_{}", self.id);
        }

        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(id: &str) -> RuleDocument {
        RuleDocument::new(RuleId::new(id).unwrap(), "", "")
    }

    #[test]
    fn test_embedding_text_all_fields() {
        let doc = RuleDocument::new(
            RuleId::new("r-1").unwrap(),
            "PIX daily limit",
            "Transfers above the daily limit require approval.",
        )
        .with_domain("PAYMENT")
        .with_criticality("HIGH");

        assert_eq!(
            doc.embedding_text(),
            "PIX daily limit. Transfers above the daily limit require approval. Domain: PAYMENT. Criticality: HIGH."
        );
    }

    #[test]
    fn test_embedding_text_skips_blank_fields() {
        let mut doc = rule("r-2");
        doc.description = "  Validate CPF on signup  ".to_string();
        doc.domain = Some("   ".to_string());

        assert_eq!(doc.embedding_text(), "Validate CPF on signup.");
    }

    #[test]
    fn test_embedding_text_placeholder() {
        assert_eq!(rule("r-3").embedding_text(), "RULE_WITHOUT_DESCRIPTION_r-3");
    }

    #[test]
    fn test_deserialize_minimal() {
        let doc: RuleDocument = serde_json::from_str(r#"{"id": "r-4", "name": "Tax"}"#).unwrap();

        assert_eq!(doc.id.as_str(), "r-4");
        assert_eq!(doc.name, "Tax");
        assert!(doc.description.is_empty());
        assert!(doc.domain.is_none());
    }
}
