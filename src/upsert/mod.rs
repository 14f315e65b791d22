//! Incremental upsert planning.
//!
//! Diffs a proposed [`GraphFragment`] against store state and emits only
//! the statements that change something. Re-planning an unchanged fragment
//! emits nothing — idempotence at the statement level.

use tracing::debug;

use crate::driver::GraphDriver;
use crate::errors::Result;
use crate::graph::Attribute;
use crate::schema::SchemaCatalog;
use crate::statement::Statement;
use crate::transform::GraphFragment;

/// Plans insert/update statements from proposed graph fragments.
pub struct UpsertEngine<'a, D> {
    driver: &'a D,
    catalog: &'a SchemaCatalog,
}

impl<'a, D: GraphDriver> UpsertEngine<'a, D> {
    pub fn new(driver: &'a D, catalog: &'a SchemaCatalog) -> Self {
        Self { driver, catalog }
    }

    /// Plan the statements that merge `fragment` into the store.
    ///
    /// Output ordering contract: every entity statement precedes every
    /// relation statement, because relation statements match their
    /// endpoints by identifying attributes and fail to bind against
    /// entities that do not exist yet.
    pub async fn plan(&self, fragment: &GraphFragment) -> Result<Vec<Statement>> {
        let mut statements = Vec::new();

        for entity in &fragment.entities {
            match self
                .driver
                .entity_attributes(&entity.type_name, &entity.keys)
                .await?
            {
                None => statements.push(Statement::InsertEntity(entity.clone())),
                Some(stored) => {
                    let changed = diff_attributes(&entity.attributes, &stored);
                    if changed.is_empty() {
                        debug!(
                            entity_type = %entity.type_name,
                            "entity unchanged, no statement emitted"
                        );
                    } else {
                        statements.push(Statement::UpdateAttributes {
                            type_name: entity.type_name.clone(),
                            keys: entity.keys.clone(),
                            changed,
                        });
                    }
                }
            }
        }

        for relation in &fragment.relations {
            if self.catalog.is_idempotency_checked(&relation.type_name)
                && self.driver.relation_exists(relation).await?
            {
                debug!(
                    relation_type = %relation.type_name,
                    "relation already present, skipping insert"
                );
                continue;
            }
            statements.push(Statement::InsertRelation(relation.clone()));
        }

        Ok(statements)
    }
}

/// Attributes whose proposed value differs from the stored one.
///
/// Uses type-aware equality (timestamps at UTC second precision). List
/// values are never diffed: once a list-valued attribute exists on the
/// stored entity, proposed list changes are ignored. A proposed attribute
/// absent from the store counts as changed.
fn diff_attributes(proposed: &[Attribute], stored: &[Attribute]) -> Vec<Attribute> {
    proposed
        .iter()
        .filter(|attr| match stored.iter().find(|s| s.name == attr.name) {
            None => true,
            Some(existing) => {
                if attr.value.is_list() {
                    return false;
                }
                !attr.value.merge_eq(&existing.value)
            }
        })
        .cloned()
        .collect()
}
