//! DocumentRecord — the flat, enriched input this engine ingests.
//!
//! Produced by the upstream enrichment pipeline (text extraction, title and
//! summary generation, date heuristics). Read-only here: one record per unit
//! of work, never mutated.

use serde::{Deserialize, Serialize};

/// Declared kind of a legislative-origin reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegislationKind {
    Primary,
    Secondary,
    /// Anything the upstream classifier could not place.
    Other,
}

/// A reference to the legislation a document was issued under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegislationRef {
    /// Natural key: the reference URL.
    pub url: String,
    pub kind: LegislationKind,
}

/// A named date extracted by upstream heuristics.
///
/// `value` is a loosely formatted date string; parsing happens during
/// transformation and unparseable values are dropped, not rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedDate {
    /// Attribute name the date maps to, e.g. `"issuedDate"`.
    pub name: String,
    pub value: String,
}

/// The flat document record handed to the ingestion engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Stable identifier assigned by the upstream pipeline.
    pub document_id: String,
    pub title: String,
    pub summary: String,
    /// Workflow status, e.g. `"draft"`, `"published"`, `"archived"`.
    pub status: String,
    pub regulator_id: String,
    /// Identity of the uploading user.
    pub user_id: String,
    pub document_type: String,
    pub regulatory_topic: String,
    /// Serialized min-hash signature (`;`-joined decimal values) produced
    /// upstream. May be empty when `text` is supplied instead.
    #[serde(default)]
    pub fingerprint: String,
    /// Normalized source text, when the caller wants the signature computed
    /// during ingestion rather than upstream.
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub dates: Vec<NamedDate>,
    #[serde(default)]
    pub legislation: Vec<LegislationRef>,
}

impl DocumentRecord {
    /// Names of the mandatory fields missing from this record.
    ///
    /// These fields feed the node-identifier digests; a record missing any
    /// of them cannot be transformed and is aborted per the malformed-input
    /// policy (logged, left unacknowledged).
    pub fn missing_identity_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.status.is_empty() {
            missing.push("status");
        }
        if self.regulator_id.is_empty() {
            missing.push("regulator_id");
        }
        if self.user_id.is_empty() {
            missing.push("user_id");
        }
        if self.document_type.is_empty() {
            missing.push("document_type");
        }
        if self.fingerprint.is_empty() && self.text.is_none() {
            missing.push("fingerprint");
        }
        missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_record() -> DocumentRecord {
        DocumentRecord {
            document_id: "doc-001".to_string(),
            title: "Guidance on market conduct".to_string(),
            summary: "Annual guidance for regulated firms.".to_string(),
            status: "published".to_string(),
            regulator_id: "reg-fca".to_string(),
            user_id: "user-42".to_string(),
            document_type: "guidance".to_string(),
            regulatory_topic: "market-conduct".to_string(),
            fingerprint: "1;2;3;4".to_string(),
            text: None,
            keywords: vec!["conduct".to_string(), "markets".to_string()],
            dates: vec![NamedDate {
                name: "issuedDate".to_string(),
                value: "2024-01-15".to_string(),
            }],
            legislation: vec![LegislationRef {
                url: "https://legislation.example/act/2000/8".to_string(),
                kind: LegislationKind::Primary,
            }],
        }
    }

    #[test]
    fn test_complete_record_has_no_missing_fields() {
        assert!(complete_record().missing_identity_fields().is_empty());
    }

    #[test]
    fn test_missing_status_and_regulator_reported() {
        let record = DocumentRecord {
            status: String::new(),
            regulator_id: String::new(),
            ..complete_record()
        };
        assert_eq!(
            record.missing_identity_fields(),
            vec!["status", "regulator_id"]
        );
    }

    #[test]
    fn test_text_substitutes_for_fingerprint() {
        let record = DocumentRecord {
            fingerprint: String::new(),
            text: Some("raw document text".to_string()),
            ..complete_record()
        };
        assert!(record.missing_identity_fields().is_empty());

        let record = DocumentRecord {
            fingerprint: String::new(),
            text: None,
            ..complete_record()
        };
        assert_eq!(record.missing_identity_fields(), vec!["fingerprint"]);
    }

    #[test]
    fn test_record_serde_roundtrip() {
        let record = complete_record();
        let json = serde_json::to_string(&record).expect("serialize record");
        let restored: DocumentRecord = serde_json::from_str(&json).expect("deserialize record");
        assert_eq!(record, restored);
    }

    #[test]
    fn test_record_deserializes_without_optional_fields() {
        let raw = serde_json::json!({
            "document_id": "doc-min",
            "title": "t",
            "summary": "s",
            "status": "draft",
            "regulator_id": "reg-1",
            "user_id": "user-1",
            "document_type": "notice",
            "regulatory_topic": "prudential",
            "fingerprint": "9;8;7"
        });
        let record: DocumentRecord =
            serde_json::from_value(raw).expect("deserialize minimal record");
        assert!(record.keywords.is_empty());
        assert!(record.dates.is_empty());
        assert!(record.legislation.is_empty());
        assert!(record.text.is_none());
    }

    #[test]
    fn test_legislation_kind_serde_lowercase() {
        let json = serde_json::to_string(&LegislationKind::Primary).expect("serialize kind");
        assert_eq!(json, "\"primary\"");
        let kind: LegislationKind =
            serde_json::from_str("\"secondary\"").expect("deserialize kind");
        assert_eq!(kind, LegislationKind::Secondary);
    }
}
