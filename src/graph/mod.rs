//! Typed graph elements derived from a record during one ingestion attempt.
//!
//! [`GraphEntity`] and [`GraphRelation`] are transient proposals — they exist
//! to be diffed against, and merged into, persistent store state. Identity is
//! a deterministic content-derived digest, so re-deriving the same logical
//! entity always yields the same node identifier.

pub mod entity;
pub mod relation;
pub mod value;

pub use entity::{Attribute, GraphEntity};
pub use relation::{GraphRelation, RolePlayer};
pub use value::AttributeValue;

use md5::{Digest, Md5};

/// Entity type names.
pub const DOCUMENT: &str = "document";
pub const REGULATOR: &str = "regulator";
pub const AGENT: &str = "agent";
pub const LEGISLATION: &str = "legislation";
pub const PRIMARY_LEGISLATION: &str = "primaryLegislation";
pub const SECONDARY_LEGISLATION: &str = "secondaryLegislation";

/// Relation type names.
pub const PUBLICATION: &str = "publication";
pub const PART_OF: &str = "partOf";

/// Identifying attribute carried by every entity type.
pub const NODE_ID_ATTR: &str = "nodeId";

/// Derive a deterministic node identifier from identity material.
///
/// 16-byte digest, hex-encoded, over the `|`-joined parts in the order
/// given. Order preservation matters: the parts form a canonical key, not a
/// set.
pub fn node_id(parts: &[&str]) -> String {
    let mut hasher = Md5::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            hasher.update([b'|']);
        }
        hasher.update(part.as_bytes());
    }
    format!("{:x}", hasher.finalize())
}
