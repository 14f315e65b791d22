//! GraphEntity — a typed entity proposal with deterministic identity.

use serde::{Deserialize, Serialize};

use super::value::AttributeValue;
use super::NODE_ID_ATTR;

/// A named, typed attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: AttributeValue,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: AttributeValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// Convenience constructor for text attributes, by far the most common.
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, AttributeValue::Text(value.into()))
    }
}

/// Canonical `name=value` key string over a slice of identifying attributes.
pub(crate) fn key_string(attributes: &[Attribute]) -> String {
    attributes
        .iter()
        .map(|a| format!("{}={}", a.name, a.value.canonical_string()))
        .collect::<Vec<_>>()
        .join(";")
}

/// A typed entity: (type, identifying attributes, attribute list).
///
/// Derived per ingestion attempt and transient — compared against and merged
/// into store state, never stored itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEntity {
    pub type_name: String,
    /// Identifying attributes; match-clauses bind through these.
    pub keys: Vec<Attribute>,
    /// Non-identifying attributes.
    pub attributes: Vec<Attribute>,
}

impl GraphEntity {
    /// A new entity identified by its node-id attribute.
    pub fn new(type_name: impl Into<String>, node_id: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            keys: vec![Attribute::text(NODE_ID_ATTR, node_id)],
            attributes: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn with_attributes(mut self, attributes: Vec<Attribute>) -> Self {
        self.attributes = attributes;
        self
    }

    /// The node identifier, when this entity is keyed the standard way.
    pub fn node_id(&self) -> Option<&str> {
        self.keys.iter().find(|a| a.name == NODE_ID_ATTR).and_then(
            |a| match &a.value {
                AttributeValue::Text(s) => Some(s.as_str()),
                _ => None,
            },
        )
    }

    pub(crate) fn key_string(&self) -> String {
        key_string(&self.keys)
    }
}
