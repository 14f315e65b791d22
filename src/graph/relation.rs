//! GraphRelation — a typed relation proposal over identified endpoints.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::entity::{key_string, Attribute};

/// One endpoint of a relation: (entity type, identifying attributes, role).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RolePlayer {
    pub role: String,
    pub entity_type: String,
    pub keys: Vec<Attribute>,
}

/// A typed relation: (type, endpoint list, attribute list).
///
/// Endpoints are matched by identifying attributes at commit time, so every
/// referenced entity must already exist when the relation statement runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphRelation {
    pub type_name: String,
    pub players: Vec<RolePlayer>,
    pub attributes: Vec<Attribute>,
}

impl GraphRelation {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            players: Vec::new(),
            attributes: Vec::new(),
        }
    }

    /// Add an endpoint keyed by its node identifier.
    pub fn with_player(
        mut self,
        role: impl Into<String>,
        entity_type: impl Into<String>,
        node_id: impl Into<String>,
    ) -> Self {
        self.players.push(RolePlayer {
            role: role.into(),
            entity_type: entity_type.into(),
            keys: vec![Attribute::text(super::NODE_ID_ATTR, node_id)],
        });
        self
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Order-insensitive signature of the full endpoint set, used for
    /// idempotency existence checks.
    pub fn endpoint_signature(&self) -> BTreeSet<String> {
        self.players
            .iter()
            .map(|p| format!("{}|{}|{}", p.role, p.entity_type, key_string(&p.keys)))
            .collect()
    }
}
