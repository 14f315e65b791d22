//! Schema catalog — the store's declared entity/relation/attribute typing.
//!
//! Loaded once per process (from the driver or a static JSON description)
//! and read-only afterwards. Every component that formats or compares
//! attributes consults the same immutable catalog instead of carrying its
//! own type-coercion logic.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::Result;
use crate::graph::{self, Attribute, NODE_ID_ATTR};

/// Value kind declared for an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeKind {
    Text,
    Integer,
    Real,
    Boolean,
    Timestamp,
}

/// One declared attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeDef {
    pub name: String,
    pub kind: AttributeKind,
}

/// One declared entity type and the attributes it owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDef {
    pub name: String,
    pub owns: Vec<String>,
}

/// One declared relation type: its participant roles and whether inserts
/// are guarded by an existence check on the full endpoint set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationDef {
    pub name: String,
    pub roles: Vec<String>,
    #[serde(default)]
    pub idempotency_checked: bool,
}

/// The serializable schema description a store (or static config) exposes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDef {
    pub attributes: Vec<AttributeDef>,
    pub entities: Vec<EntityDef>,
    pub relations: Vec<RelationDef>,
}

impl SchemaDef {
    /// The document-repository schema: the typing this engine writes against.
    pub fn document_repository() -> Self {
        fn attr(name: &str, kind: AttributeKind) -> AttributeDef {
            AttributeDef {
                name: name.to_string(),
                kind,
            }
        }
        fn entity(name: &str, owns: &[&str]) -> EntityDef {
            EntityDef {
                name: name.to_string(),
                owns: owns.iter().map(|s| (*s).to_string()).collect(),
            }
        }

        let document_owns = [
            NODE_ID_ATTR,
            "title",
            "summary",
            "status",
            "documentType",
            "regulatoryTopic",
            "fingerprint",
            "keyword",
            "issuedDate",
            "effectiveDate",
            "uploadedDate",
        ];
        let legislation_owns = [NODE_ID_ATTR, "url"];

        Self {
            attributes: vec![
                attr(NODE_ID_ATTR, AttributeKind::Text),
                attr("title", AttributeKind::Text),
                attr("summary", AttributeKind::Text),
                attr("status", AttributeKind::Text),
                attr("documentType", AttributeKind::Text),
                attr("regulatoryTopic", AttributeKind::Text),
                attr("fingerprint", AttributeKind::Text),
                attr("keyword", AttributeKind::Text),
                attr("issuedDate", AttributeKind::Timestamp),
                attr("effectiveDate", AttributeKind::Timestamp),
                attr("uploadedDate", AttributeKind::Timestamp),
                attr("regulatorId", AttributeKind::Text),
                attr("userId", AttributeKind::Text),
                attr("url", AttributeKind::Text),
            ],
            entities: vec![
                entity(graph::DOCUMENT, &document_owns),
                entity(graph::REGULATOR, &[NODE_ID_ATTR, "regulatorId"]),
                entity(graph::AGENT, &[NODE_ID_ATTR, "userId"]),
                entity(graph::LEGISLATION, &legislation_owns),
                entity(graph::PRIMARY_LEGISLATION, &legislation_owns),
                entity(graph::SECONDARY_LEGISLATION, &legislation_owns),
            ],
            relations: vec![
                RelationDef {
                    name: graph::PUBLICATION.to_string(),
                    roles: vec![
                        "issued".to_string(),
                        "issuedBy".to_string(),
                        "uploader".to_string(),
                        "issuedFor".to_string(),
                    ],
                    idempotency_checked: true,
                },
                RelationDef {
                    name: graph::PART_OF.to_string(),
                    roles: vec!["agent".to_string(), "agency".to_string()],
                    idempotency_checked: true,
                },
            ],
        }
    }
}

/// Immutable lookup view over a [`SchemaDef`].
#[derive(Debug, Clone)]
pub struct SchemaCatalog {
    kinds: HashMap<String, AttributeKind>,
    ownership: HashMap<String, HashSet<String>>,
    relations: HashMap<String, RelationDef>,
}

impl SchemaCatalog {
    pub fn new(def: SchemaDef) -> Self {
        let kinds = def
            .attributes
            .into_iter()
            .map(|a| (a.name, a.kind))
            .collect();
        let ownership = def
            .entities
            .into_iter()
            .map(|e| (e.name, e.owns.into_iter().collect()))
            .collect();
        let relations = def
            .relations
            .into_iter()
            .map(|r| (r.name.clone(), r))
            .collect();
        Self {
            kinds,
            ownership,
            relations,
        }
    }

    /// Load a catalog from a static JSON schema description.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let def: SchemaDef = serde_json::from_str(json)?;
        Ok(Self::new(def))
    }

    /// Declared value kind of an attribute, if declared at all.
    pub fn kind_of(&self, attribute: &str) -> Option<AttributeKind> {
        self.kinds.get(attribute).copied()
    }

    /// Whether `entity_type` declares ownership of `attribute`.
    pub fn owns(&self, entity_type: &str, attribute: &str) -> bool {
        self.ownership
            .get(entity_type)
            .is_some_and(|owned| owned.contains(attribute))
    }

    pub fn relation(&self, name: &str) -> Option<&RelationDef> {
        self.relations.get(name)
    }

    /// Whether inserts of this relation type are guarded by an existence
    /// check on the full endpoint set.
    pub fn is_idempotency_checked(&self, relation: &str) -> bool {
        self.relations
            .get(relation)
            .is_some_and(|r| r.idempotency_checked)
    }

    /// Keep only the attributes declared for `entity_type`.
    ///
    /// Undeclared attributes are dropped silently (schema mismatch is never
    /// an error), with a debug log per drop.
    pub fn filter_attributes(
        &self,
        entity_type: &str,
        attributes: Vec<Attribute>,
    ) -> Vec<Attribute> {
        attributes
            .into_iter()
            .filter(|a| {
                let declared = self.owns(entity_type, &a.name);
                if !declared {
                    debug!(
                        entity_type,
                        attribute = %a.name,
                        "dropping attribute undeclared for entity type"
                    );
                }
                declared
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::AttributeValue;

    fn catalog() -> SchemaCatalog {
        SchemaCatalog::new(SchemaDef::document_repository())
    }

    #[test]
    fn test_attribute_kinds() {
        let catalog = catalog();
        assert_eq!(catalog.kind_of("status"), Some(AttributeKind::Text));
        assert_eq!(catalog.kind_of("issuedDate"), Some(AttributeKind::Timestamp));
        assert_eq!(catalog.kind_of("nonexistent"), None);
    }

    #[test]
    fn test_ownership_lookup() {
        let catalog = catalog();
        assert!(catalog.owns("document", "status"));
        assert!(catalog.owns("regulator", "regulatorId"));
        assert!(!catalog.owns("regulator", "status"));
        assert!(!catalog.owns("unknownType", "status"));
    }

    #[test]
    fn test_relation_roles() {
        let catalog = catalog();
        let publication = catalog.relation("publication").expect("declared");
        assert!(publication.roles.contains(&"issuedFor".to_string()));
        assert!(catalog.is_idempotency_checked("publication"));
        assert!(catalog.is_idempotency_checked("partOf"));
        assert!(!catalog.is_idempotency_checked("unknown"));
    }

    #[test]
    fn test_filter_drops_undeclared_attributes() {
        let catalog = catalog();
        let filtered = catalog.filter_attributes(
            "document",
            vec![
                Attribute::text("status", "draft"),
                Attribute::text("internalScore", "0.9"),
            ],
        );
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "status");
    }

    #[test]
    fn test_filter_on_unknown_type_drops_everything() {
        let catalog = catalog();
        let filtered = catalog.filter_attributes(
            "mysteryType",
            vec![Attribute::new(
                "status",
                AttributeValue::Text("draft".to_string()),
            )],
        );
        assert!(filtered.is_empty());
    }

    #[test]
    fn test_from_json_str() {
        let json = serde_json::to_string(&SchemaDef::document_repository())
            .expect("serialize schema");
        let catalog = SchemaCatalog::from_json_str(&json).expect("parse schema");
        assert!(catalog.owns("document", "fingerprint"));
    }

    #[test]
    fn test_from_json_str_rejects_garbage() {
        assert!(SchemaCatalog::from_json_str("not json").is_err());
    }
}
