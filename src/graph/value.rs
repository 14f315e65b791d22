//! Attribute values, tagged with their schema value kind.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::schema::AttributeKind;
use crate::utils::truncate_to_seconds;

/// A typed attribute value.
///
/// The variant tag is the schema value kind; `TextList` is the multi-valued
/// text form used for attributes like keyword lists (one ownership per
/// element on insert).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum AttributeValue {
    Text(String),
    Integer(i64),
    Real(f64),
    Boolean(bool),
    Timestamp(DateTime<Utc>),
    TextList(Vec<String>),
}

impl AttributeValue {
    /// The declared value kind this variant corresponds to.
    pub fn kind(&self) -> AttributeKind {
        match self {
            Self::Text(_) | Self::TextList(_) => AttributeKind::Text,
            Self::Integer(_) => AttributeKind::Integer,
            Self::Real(_) => AttributeKind::Real,
            Self::Boolean(_) => AttributeKind::Boolean,
            Self::Timestamp(_) => AttributeKind::Timestamp,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Self::TextList(_))
    }

    /// Type-aware equality for the incremental diff.
    ///
    /// Timestamps are normalized to UTC second precision before comparison.
    /// List values always compare equal: multi-valued attributes are never
    /// diffed — a documented limitation, reconciliation semantics for them
    /// are an open question.
    pub fn merge_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Timestamp(a), Self::Timestamp(b)) => {
                truncate_to_seconds(a) == truncate_to_seconds(b)
            }
            (Self::TextList(_), Self::TextList(_)) => true,
            (a, b) => a == b,
        }
    }

    /// Canonical string form used for endpoint signatures and store keys.
    pub fn canonical_string(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Integer(i) => i.to_string(),
            Self::Real(r) => format!("{r:?}"),
            Self::Boolean(b) => b.to_string(),
            Self::Timestamp(dt) => crate::utils::format_store_timestamp(dt),
            Self::TextList(items) => items.join(","),
        }
    }
}
