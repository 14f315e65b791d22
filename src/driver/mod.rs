//! Graph store driver abstraction.
//!
//! Defines the [`GraphDriver`] trait every backend must satisfy, plus the
//! in-memory reference implementation used by tests. The engine only emits
//! statements and typed read requests through this seam; the store's query
//! execution and persistence internals stay on the other side of it.

pub mod memory;

use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::fingerprint::Fingerprint;
use crate::graph::{Attribute, GraphRelation};
use crate::schema::SchemaDef;
use crate::statement::Statement;

/// Status value excluded from duplicate candidate retrieval.
pub const ARCHIVED_STATUS: &str = "archived";

/// A stored document surfaced as a near-duplicate candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateDocument {
    pub node_id: String,
    pub fingerprint: Fingerprint,
    pub status: String,
    pub document_type: String,
    pub regulatory_topic: String,
}

/// Trait representing a graph store backend.
///
/// Read methods execute inside one read-only transaction per call;
/// [`GraphDriver::execute_batch`] applies a whole batch as one atomic write
/// transaction. Implementations rely on the store's own concurrency control
/// — the engine adds no locking of its own.
#[allow(async_fn_in_trait)]
pub trait GraphDriver: Send + Sync {
    /// Health check — verify connectivity to the store.
    async fn ping(&self) -> Result<()>;

    /// Close the connection pool / session.
    async fn close(&self) -> Result<()>;

    /// Load the store's declared schema. Called once at process start.
    async fn fetch_schema(&self) -> Result<SchemaDef>;

    /// Retrieve duplicate candidates: non-archived documents whose stored
    /// fingerprint has `signature_len` values. Retrieval order is the
    /// store's result order and is what the classifier's tie-break sees.
    async fn candidate_documents(&self, signature_len: usize)
        -> Result<Vec<CandidateDocument>>;

    /// Fetch the stored attributes of the entity matching `keys`, or `None`
    /// when no such entity exists.
    async fn entity_attributes(
        &self,
        type_name: &str,
        keys: &[Attribute],
    ) -> Result<Option<Vec<Attribute>>>;

    /// Whether a relation of this type with exactly this endpoint set exists.
    async fn relation_exists(&self, relation: &GraphRelation) -> Result<bool>;

    /// Execute one batch of statements as a single write transaction.
    /// Either the whole batch commits or none of it does.
    async fn execute_batch(&self, batch: &[Statement]) -> Result<()>;
}
