//! # lexgraph-rs
//!
//! Deduplicating, incremental graph-ingestion engine for a shared document
//! repository knowledge graph.
//!
//! ## Architecture
//!
//! - **Min-hash fingerprints**: fixed-length near-duplicate signatures over
//!   character shingles of normalized text, deterministic by construction
//! - **Similarity classification**: incoming records route as new /
//!   exact-duplicate / metadata-conflict / version against store state
//! - **Schema-filtered transformation**: flat records become typed entities
//!   and relations with content-derived node identifiers
//! - **Incremental upserts**: attribute-level diffs emit additive merges;
//!   unchanged state emits nothing
//! - **Batched commits**: per-batch transactions across a fixed worker
//!   pool, failed batches dropped without blocking the rest
//!
//! The graph store itself sits behind the [`driver::GraphDriver`] seam:
//! this crate emits match/insert statements and typed read requests, never
//! the store's execution semantics.

pub mod errors;
pub mod graph;
pub mod record;
pub mod schema;
pub mod types;

pub mod driver;
pub mod fingerprint;
pub mod statement;

pub mod commit;
pub mod dedup;
pub mod notify;
pub mod queue;
pub mod transform;
pub mod upsert;

pub mod pipeline;
pub mod utils;

pub use errors::{LexGraphError, Result, StoreError};
pub use pipeline::{DrainReport, IngestOutcome, Ingestor};
pub use types::LexGraphConfig;
