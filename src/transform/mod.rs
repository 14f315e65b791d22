//! Record-to-graph transformation.
//!
//! Maps one flat [`DocumentRecord`] into the typed entity/relation fragment
//! to be merged into the store. Runs only on the NEW and VERSION paths;
//! duplicates never reach it.

use tracing::warn;

use crate::errors::{LexGraphError, Result};
use crate::fingerprint::Fingerprint;
use crate::graph::{
    node_id, Attribute, AttributeValue, GraphEntity, GraphRelation, AGENT, DOCUMENT, LEGISLATION,
    PART_OF, PRIMARY_LEGISLATION, PUBLICATION, REGULATOR, SECONDARY_LEGISLATION,
};
use crate::record::{DocumentRecord, LegislationKind};
use crate::schema::SchemaCatalog;
use crate::utils::parse_flexible_datetime;

/// The full entity/relation fragment derived from one record.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphFragment {
    pub entities: Vec<GraphEntity>,
    pub relations: Vec<GraphRelation>,
}

impl GraphFragment {
    /// First entity of the given type, if any. Test and inspection helper.
    pub fn entity(&self, type_name: &str) -> Option<&GraphEntity> {
        self.entities.iter().find(|e| e.type_name == type_name)
    }
}

/// Builds graph fragments, filtering every attribute list against the
/// schema catalog's declared ownership.
pub struct RecordTransformer<'a> {
    catalog: &'a SchemaCatalog,
}

impl<'a> RecordTransformer<'a> {
    pub fn new(catalog: &'a SchemaCatalog) -> Self {
        Self { catalog }
    }

    /// Transform one record.
    ///
    /// `fingerprint` is the signature computed (or parsed) for this record;
    /// its encoded form becomes the document's fingerprint attribute and
    /// part of its identity digest. `merge_target` carries the existing
    /// document's node identifier on the VERSION path, so the merge binds
    /// to the stored entity instead of minting a new one.
    pub fn transform(
        &self,
        record: &DocumentRecord,
        fingerprint: &Fingerprint,
        merge_target: Option<&str>,
    ) -> Result<GraphFragment> {
        let missing = record.missing_identity_fields();
        if !missing.is_empty() {
            return Err(LexGraphError::MalformedRecord {
                document_id: record.document_id.clone(),
                missing: missing.join(", "),
            });
        }

        let encoded = fingerprint.encode();
        let document_id = match merge_target {
            Some(existing) => existing.to_string(),
            None => node_id(&[
                &record.status,
                &record.regulator_id,
                &record.document_type,
                &encoded,
            ]),
        };
        let regulator_id = node_id(&[&record.regulator_id]);
        let agent_id = node_id(&[&record.user_id]);

        let document = GraphEntity::new(DOCUMENT, document_id.clone()).with_attributes(
            self.catalog
                .filter_attributes(DOCUMENT, self.document_attributes(record, encoded)),
        );
        let regulator = GraphEntity::new(REGULATOR, regulator_id.clone()).with_attributes(
            self.catalog.filter_attributes(
                REGULATOR,
                vec![Attribute::text("regulatorId", record.regulator_id.clone())],
            ),
        );
        let agent = GraphEntity::new(AGENT, agent_id.clone()).with_attributes(
            self.catalog.filter_attributes(
                AGENT,
                vec![Attribute::text("userId", record.user_id.clone())],
            ),
        );

        let mut entities = vec![document, regulator, agent];

        let mut publication = GraphRelation::new(PUBLICATION)
            .with_player("issued", DOCUMENT, document_id)
            .with_player("issuedBy", REGULATOR, regulator_id.clone())
            .with_player("uploader", AGENT, agent_id.clone());

        for reference in &record.legislation {
            let type_name = legislation_type(reference.kind);
            let legislation_id = node_id(&[&reference.url]);
            entities.push(
                GraphEntity::new(type_name, legislation_id.clone()).with_attributes(
                    self.catalog.filter_attributes(
                        type_name,
                        vec![Attribute::text("url", reference.url.clone())],
                    ),
                ),
            );
            publication = publication.with_player("issuedFor", type_name, legislation_id);
        }

        let part_of = GraphRelation::new(PART_OF)
            .with_player("agent", AGENT, agent_id)
            .with_player("agency", REGULATOR, regulator_id);

        Ok(GraphFragment {
            entities,
            relations: vec![publication, part_of],
        })
    }

    fn document_attributes(&self, record: &DocumentRecord, encoded: String) -> Vec<Attribute> {
        let mut attrs = vec![
            Attribute::text("title", record.title.clone()),
            Attribute::text("summary", record.summary.clone()),
            Attribute::text("status", record.status.clone()),
            Attribute::text("documentType", record.document_type.clone()),
            Attribute::text("regulatoryTopic", record.regulatory_topic.clone()),
            Attribute::text("fingerprint", encoded),
        ];
        if !record.keywords.is_empty() {
            attrs.push(Attribute::new(
                "keyword",
                AttributeValue::TextList(record.keywords.clone()),
            ));
        }
        for date in &record.dates {
            match parse_flexible_datetime(&date.value) {
                Some(dt) => attrs.push(Attribute::new(
                    date.name.clone(),
                    AttributeValue::Timestamp(dt),
                )),
                None => warn!(
                    document_id = %record.document_id,
                    date = %date.name,
                    value = %date.value,
                    "dropping unparseable date"
                ),
            }
        }
        attrs
    }
}

fn legislation_type(kind: LegislationKind) -> &'static str {
    match kind {
        LegislationKind::Primary => PRIMARY_LEGISLATION,
        LegislationKind::Secondary => SECONDARY_LEGISLATION,
        LegislationKind::Other => LEGISLATION,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::{FingerprintGenerator, MinHashConfig};
    use crate::record::{LegislationRef, NamedDate};
    use crate::schema::SchemaDef;

    fn catalog() -> SchemaCatalog {
        SchemaCatalog::new(SchemaDef::document_repository())
    }

    fn record() -> DocumentRecord {
        DocumentRecord {
            document_id: "doc-001".to_string(),
            title: "Guidance on market conduct".to_string(),
            summary: "Annual guidance.".to_string(),
            status: "published".to_string(),
            regulator_id: "reg-fca".to_string(),
            user_id: "user-42".to_string(),
            document_type: "guidance".to_string(),
            regulatory_topic: "market-conduct".to_string(),
            fingerprint: String::new(),
            text: Some("guidance on the conduct of regulated firms".to_string()),
            keywords: vec!["conduct".to_string()],
            dates: vec![
                NamedDate {
                    name: "issuedDate".to_string(),
                    value: "2024-01-15".to_string(),
                },
                NamedDate {
                    name: "issuedDate".to_string(),
                    value: "not a date".to_string(),
                },
            ],
            legislation: vec![
                LegislationRef {
                    url: "https://legislation.example/act/2000/8".to_string(),
                    kind: LegislationKind::Primary,
                },
                LegislationRef {
                    url: "https://legislation.example/si/2012/3".to_string(),
                    kind: LegislationKind::Other,
                },
            ],
        }
    }

    fn fingerprint() -> Fingerprint {
        FingerprintGenerator::new(MinHashConfig {
            signature_len: 16,
            shingle_len: 5,
            seed: 1,
        })
        .generate("guidance on the conduct of regulated firms")
    }

    #[test]
    fn test_fragment_has_expected_entities() {
        let catalog = catalog();
        let fragment = RecordTransformer::new(&catalog)
            .transform(&record(), &fingerprint(), None)
            .expect("transform");

        // document + regulator + agent + two legislation entities
        assert_eq!(fragment.entities.len(), 5);
        assert!(fragment.entity(DOCUMENT).is_some());
        assert!(fragment.entity(REGULATOR).is_some());
        assert!(fragment.entity(AGENT).is_some());
        assert!(fragment.entity(PRIMARY_LEGISLATION).is_some());
        assert!(fragment.entity(LEGISLATION).is_some());
    }

    #[test]
    fn test_document_node_id_is_deterministic() {
        let catalog = catalog();
        let transformer = RecordTransformer::new(&catalog);
        let a = transformer
            .transform(&record(), &fingerprint(), None)
            .expect("transform");
        let b = transformer
            .transform(&record(), &fingerprint(), None)
            .expect("transform");
        assert_eq!(
            a.entity(DOCUMENT).and_then(GraphEntity::node_id),
            b.entity(DOCUMENT).and_then(GraphEntity::node_id)
        );
    }

    #[test]
    fn test_merge_target_overrides_document_identity() {
        let catalog = catalog();
        let fragment = RecordTransformer::new(&catalog)
            .transform(&record(), &fingerprint(), Some("existing-node-id"))
            .expect("transform");
        assert_eq!(
            fragment.entity(DOCUMENT).and_then(GraphEntity::node_id),
            Some("existing-node-id")
        );
        // Relations bind to the merge target too.
        let publication = &fragment.relations[0];
        assert!(publication
            .endpoint_signature()
            .iter()
            .any(|s| s.contains("existing-node-id")));
    }

    #[test]
    fn test_publication_relation_roles() {
        let catalog = catalog();
        let fragment = RecordTransformer::new(&catalog)
            .transform(&record(), &fingerprint(), None)
            .expect("transform");

        let publication = fragment
            .relations
            .iter()
            .find(|r| r.type_name == PUBLICATION)
            .expect("publication relation");
        let roles: Vec<&str> = publication.players.iter().map(|p| p.role.as_str()).collect();
        // One issuedFor edge per legislative-origin reference.
        assert_eq!(
            roles,
            vec!["issued", "issuedBy", "uploader", "issuedFor", "issuedFor"]
        );

        let part_of = fragment
            .relations
            .iter()
            .find(|r| r.type_name == PART_OF)
            .expect("partOf relation");
        let roles: Vec<&str> = part_of.players.iter().map(|p| p.role.as_str()).collect();
        assert_eq!(roles, vec!["agent", "agency"]);
    }

    #[test]
    fn test_unparseable_date_is_dropped() {
        let catalog = catalog();
        let fragment = RecordTransformer::new(&catalog)
            .transform(&record(), &fingerprint(), None)
            .expect("transform");
        let document = fragment.entity(DOCUMENT).expect("document");
        let issued_dates = document
            .attributes
            .iter()
            .filter(|a| a.name == "issuedDate")
            .count();
        assert_eq!(issued_dates, 1);
    }

    #[test]
    fn test_undeclared_attribute_names_are_filtered() {
        let catalog = catalog();
        let mut input = record();
        input.dates.push(NamedDate {
            name: "reviewDeadline".to_string(), // not in the catalog
            value: "2025-06-01".to_string(),
        });
        let fragment = RecordTransformer::new(&catalog)
            .transform(&input, &fingerprint(), None)
            .expect("transform");
        let document = fragment.entity(DOCUMENT).expect("document");
        assert!(!document.attributes.iter().any(|a| a.name == "reviewDeadline"));
    }

    #[test]
    fn test_keywords_become_one_list_attribute() {
        let catalog = catalog();
        let fragment = RecordTransformer::new(&catalog)
            .transform(&record(), &fingerprint(), None)
            .expect("transform");
        let document = fragment.entity(DOCUMENT).expect("document");
        let keyword = document
            .attributes
            .iter()
            .find(|a| a.name == "keyword")
            .expect("keyword attribute");
        assert!(keyword.value.is_list());
    }

    #[test]
    fn test_missing_mandatory_field_aborts() {
        let catalog = catalog();
        let mut input = record();
        input.status = String::new();
        let err = RecordTransformer::new(&catalog)
            .transform(&input, &fingerprint(), None)
            .expect_err("must abort");
        match err {
            LexGraphError::MalformedRecord {
                document_id,
                missing,
            } => {
                assert_eq!(document_id, "doc-001");
                assert!(missing.contains("status"));
            }
            other => panic!("expected MalformedRecord, got {other:?}"),
        }
    }
}
