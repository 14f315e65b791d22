//! In-memory reference driver.
//!
//! Applies typed statements to process-local state, enforcing the same
//! binding rules a remote store would: match-clauses must bind through
//! previously inserted identifying attributes, relation endpoints must
//! exist before the relation commits, and each batch applies atomically.
//!
//! Retrieval order for candidate documents is node-id key order, which is
//! deterministic — tests that exercise the classifier tie-break rely on it.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Mutex;

use tracing::warn;

use crate::errors::{Result, StoreError};
use crate::fingerprint::Fingerprint;
use crate::graph::{Attribute, AttributeValue, GraphRelation, NODE_ID_ATTR};
use crate::schema::SchemaDef;
use crate::statement::{render_batch, Statement};

use super::{CandidateDocument, GraphDriver, ARCHIVED_STATUS};

/// (entity type, canonical key string) — the identity a match-clause binds.
type EntityKey = (String, String);

#[derive(Default)]
struct State {
    entities: BTreeMap<EntityKey, HashMap<String, AttributeValue>>,
    relations: Vec<(String, BTreeSet<String>)>,
    /// Rendered mutation text per committed batch, oldest first.
    mutations: Vec<String>,
    /// Number of upcoming `execute_batch` calls forced to fail.
    fail_next: usize,
}

/// Process-local [`GraphDriver`] implementation.
pub struct InMemoryDriver {
    schema: SchemaDef,
    state: Mutex<State>,
}

impl InMemoryDriver {
    pub fn new(schema: SchemaDef) -> Self {
        Self {
            schema,
            state: Mutex::new(State::default()),
        }
    }

    /// Rendered mutation text of every committed batch, oldest first.
    pub fn mutation_log(&self) -> Vec<String> {
        self.lock().mutations.clone()
    }

    pub fn entity_count(&self) -> usize {
        self.lock().entities.len()
    }

    pub fn relation_count(&self) -> usize {
        self.lock().relations.len()
    }

    /// Force the next `n` batches to fail with a transaction error.
    pub fn fail_next_batches(&self, n: usize) {
        self.lock().fail_next = n;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        // A poisoned lock means a panicked test thread; propagate the data.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn key_of(type_name: &str, keys: &[Attribute]) -> EntityKey {
        (
            type_name.to_string(),
            crate::graph::entity::key_string(keys),
        )
    }

    /// First pass of a batch: verify every statement binds.
    fn check_batch(state: &State, batch: &[Statement]) -> std::result::Result<(), StoreError> {
        for statement in batch {
            match statement {
                Statement::InsertEntity(_) => {}
                Statement::UpdateAttributes {
                    type_name, keys, ..
                } => {
                    let key = Self::key_of(type_name, keys);
                    if !state.entities.contains_key(&key) {
                        return Err(StoreError::Transaction(format!(
                            "match bound no {type_name} entity for {}",
                            key.1
                        )));
                    }
                }
                Statement::InsertRelation(relation) => {
                    for player in &relation.players {
                        let key = Self::key_of(&player.entity_type, &player.keys);
                        if !state.entities.contains_key(&key) {
                            return Err(StoreError::Transaction(format!(
                                "relation endpoint did not bind: {} {}",
                                player.entity_type, key.1
                            )));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Second pass: apply, infallibly, after `check_batch` accepted.
    fn apply_batch(state: &mut State, batch: &[Statement]) {
        for statement in batch {
            match statement {
                Statement::InsertEntity(entity) => {
                    let key = Self::key_of(&entity.type_name, &entity.keys);
                    let stored = state.entities.entry(key).or_default();
                    for attr in entity.keys.iter().chain(&entity.attributes) {
                        stored.insert(attr.name.clone(), attr.value.clone());
                    }
                }
                Statement::UpdateAttributes {
                    type_name,
                    keys,
                    changed,
                } => {
                    let key = Self::key_of(type_name, keys);
                    if let Some(stored) = state.entities.get_mut(&key) {
                        for attr in changed {
                            stored.insert(attr.name.clone(), attr.value.clone());
                        }
                    }
                }
                Statement::InsertRelation(relation) => {
                    state
                        .relations
                        .push((relation.type_name.clone(), relation.endpoint_signature()));
                }
            }
        }
    }
}

impl GraphDriver for InMemoryDriver {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }

    async fn fetch_schema(&self) -> Result<SchemaDef> {
        Ok(self.schema.clone())
    }

    async fn candidate_documents(
        &self,
        signature_len: usize,
    ) -> Result<Vec<CandidateDocument>> {
        let state = self.lock();
        let mut candidates = Vec::new();
        for ((type_name, _), attrs) in &state.entities {
            if type_name != crate::graph::DOCUMENT {
                continue;
            }
            let status = match attrs.get("status") {
                Some(AttributeValue::Text(s)) => s.clone(),
                _ => continue,
            };
            if status == ARCHIVED_STATUS {
                continue;
            }
            let encoded = match attrs.get("fingerprint") {
                Some(AttributeValue::Text(s)) => s,
                _ => continue,
            };
            let fingerprint = match Fingerprint::parse(encoded) {
                Ok(fp) => fp,
                Err(e) => {
                    warn!(error = %e, "skipping candidate with unparseable fingerprint");
                    continue;
                }
            };
            if fingerprint.len() != signature_len {
                continue;
            }
            let node_id = match attrs.get(NODE_ID_ATTR) {
                Some(AttributeValue::Text(s)) => s.clone(),
                _ => continue,
            };
            let text_of = |name: &str| match attrs.get(name) {
                Some(AttributeValue::Text(s)) => s.clone(),
                _ => String::new(),
            };
            candidates.push(CandidateDocument {
                node_id,
                fingerprint,
                status,
                document_type: text_of("documentType"),
                regulatory_topic: text_of("regulatoryTopic"),
            });
        }
        Ok(candidates)
    }

    async fn entity_attributes(
        &self,
        type_name: &str,
        keys: &[Attribute],
    ) -> Result<Option<Vec<Attribute>>> {
        let state = self.lock();
        let key = Self::key_of(type_name, keys);
        Ok(state.entities.get(&key).map(|attrs| {
            attrs
                .iter()
                .map(|(name, value)| Attribute::new(name.clone(), value.clone()))
                .collect()
        }))
    }

    async fn relation_exists(&self, relation: &GraphRelation) -> Result<bool> {
        let state = self.lock();
        let signature = relation.endpoint_signature();
        Ok(state
            .relations
            .iter()
            .any(|(type_name, stored)| type_name == &relation.type_name && stored == &signature))
    }

    async fn execute_batch(&self, batch: &[Statement]) -> Result<()> {
        let mut state = self.lock();
        if state.fail_next > 0 {
            state.fail_next -= 1;
            return Err(StoreError::Transaction("injected batch failure".to_string()).into());
        }
        Self::check_batch(&state, batch)?;
        Self::apply_batch(&mut state, batch);
        state.mutations.push(render_batch(batch));
        Ok(())
    }
}
