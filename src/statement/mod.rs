//! Typed statement builder for the store's match/insert language.
//!
//! Components never concatenate query text ad hoc: all value formatting and
//! string escaping lives here. Match-clauses bind entities through their
//! identifying attributes; insert-clauses declare new entities, relations,
//! or attribute ownership.

use serde::{Deserialize, Serialize};

use crate::graph::{Attribute, AttributeValue, GraphEntity, GraphRelation};

/// One mutation statement, ready to render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    /// Insert a new entity with all of its attributes.
    InsertEntity(GraphEntity),
    /// Match an existing entity by its identifying attributes and insert
    /// ownership of the changed attributes only (additive merge).
    UpdateAttributes {
        type_name: String,
        keys: Vec<Attribute>,
        changed: Vec<Attribute>,
    },
    /// Insert a relation, matching every endpoint by its identifying
    /// attributes. Fails to bind if an endpoint does not exist yet.
    InsertRelation(GraphRelation),
}

impl Statement {
    /// Entity statements must commit before relation statements that
    /// reference them; the upsert engine orders its output accordingly.
    pub fn is_entity_statement(&self) -> bool {
        !matches!(self, Self::InsertRelation(_))
    }

    /// Render to the store's declarative text form.
    pub fn render(&self) -> String {
        match self {
            Self::InsertEntity(entity) => {
                let mut out = format!("insert $e isa {}", entity.type_name);
                push_has_clauses(&mut out, entity.keys.iter());
                push_has_clauses(&mut out, entity.attributes.iter());
                out.push(';');
                out
            }
            Self::UpdateAttributes {
                type_name,
                keys,
                changed,
            } => {
                let mut out = format!("match $e isa {type_name}");
                push_has_clauses(&mut out, keys.iter());
                out.push_str("; insert $e");
                let mut first = true;
                for attr in changed {
                    for value in scalar_values(&attr.value) {
                        if !first {
                            out.push(',');
                        }
                        first = false;
                        out.push_str(&format!(" has {} {}", attr.name, value));
                    }
                }
                out.push(';');
                out
            }
            Self::InsertRelation(relation) => {
                let mut out = String::from("match");
                for (i, player) in relation.players.iter().enumerate() {
                    out.push_str(&format!(" $p{i} isa {}", player.entity_type));
                    push_has_clauses(&mut out, player.keys.iter());
                    out.push(';');
                }
                out.push_str(" insert (");
                for (i, player) in relation.players.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    out.push_str(&format!("{}: $p{i}", player.role));
                }
                out.push_str(&format!(") isa {}", relation.type_name));
                push_has_clauses(&mut out, relation.attributes.iter());
                out.push(';');
                out
            }
        }
    }
}

/// Concatenate a batch into the single mutation text a write transaction
/// executes.
pub fn render_batch(batch: &[Statement]) -> String {
    batch
        .iter()
        .map(Statement::render)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Escape a text value for embedding in a quoted literal.
///
/// Escapes backslashes and double quotes; everything else passes through.
pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            _ => out.push(c),
        }
    }
    out
}

/// Expand a value into its statement literals: one per list element, or a
/// single literal for scalar kinds.
fn scalar_values(value: &AttributeValue) -> Vec<String> {
    match value {
        AttributeValue::Text(s) => vec![format!("\"{}\"", escape_text(s))],
        AttributeValue::Integer(i) => vec![i.to_string()],
        AttributeValue::Real(r) => vec![format!("{r:?}")],
        AttributeValue::Boolean(b) => vec![b.to_string()],
        AttributeValue::Timestamp(dt) => vec![crate::utils::format_store_timestamp(dt)],
        AttributeValue::TextList(items) => items
            .iter()
            .map(|item| format!("\"{}\"", escape_text(item)))
            .collect(),
    }
}

fn push_has_clauses<'a>(out: &mut String, attrs: impl Iterator<Item = &'a Attribute>) {
    for attr in attrs {
        for value in scalar_values(&attr.value) {
            out.push_str(&format!(", has {} {}", attr.name, value));
        }
    }
}
