//! Duplicate/version classification.
//!
//! Scores an incoming fingerprint against stored candidates and routes the
//! record: NEW, EXACT_DUPLICATE, METADATA_CONFLICT (same routing bucket,
//! plus the differing fields for reporting), or VERSION. This is a
//! similarity heuristic over min-hash signatures, not exact-duplicate proof
//! — a score of 1.0 means identical signatures, which near-certainly but
//! not provably means identical text.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::driver::{CandidateDocument, GraphDriver};
use crate::errors::Result;
use crate::fingerprint::Fingerprint;
use crate::record::DocumentRecord;
use crate::utils::cosine_similarity;

/// Default minimum similarity for duplicate/version routing.
pub const DEFAULT_DUPLICATE_THRESHOLD: f64 = 0.95;

/// The metadata subset compared when two signatures match exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomingMetadata {
    pub status: String,
    pub document_type: String,
    pub regulatory_topic: String,
}

impl IncomingMetadata {
    pub fn of_record(record: &DocumentRecord) -> Self {
        Self {
            status: record.status.clone(),
            document_type: record.document_type.clone(),
            regulatory_topic: record.regulatory_topic.clone(),
        }
    }
}

/// Classification outcome. Every variant is a defined result, never an error.
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    /// No candidate reached the threshold: ingest as a new document.
    New,
    /// Identical signature, identical metadata subset: discard and notify.
    ExactDuplicate { existing: CandidateDocument },
    /// Identical signature but differing metadata: routed like an exact
    /// duplicate, carrying the differing field names for reporting.
    MetadataConflict {
        existing: CandidateDocument,
        differing_fields: Vec<String>,
    },
    /// Above-threshold but non-identical signature: merge into the
    /// existing document downstream.
    Version {
        existing_node_id: String,
        score: f64,
    },
}

impl Classification {
    /// Whether the record is discarded (duplicate routing bucket).
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::ExactDuplicate { .. } | Self::MetadataConflict { .. })
    }
}

/// Compare two fingerprints as integer vectors.
///
/// Identical signatures score exactly 1.0; incompatible (different-length)
/// signatures score 0.0.
pub fn signature_similarity(a: &Fingerprint, b: &Fingerprint) -> f64 {
    cosine_similarity(a.values(), b.values())
}

/// Classifies incoming records against store state.
pub struct DuplicateClassifier<'a, D> {
    driver: &'a D,
    threshold: f64,
}

impl<'a, D: GraphDriver> DuplicateClassifier<'a, D> {
    pub fn new(driver: &'a D) -> Self {
        Self {
            driver,
            threshold: DEFAULT_DUPLICATE_THRESHOLD,
        }
    }

    /// Override the duplicate threshold (default `0.95`).
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Classify one incoming record.
    ///
    /// Retrieves compatible, non-archived candidates in one read
    /// transaction and selects the maximum similarity score. Ties go to the
    /// first candidate in retrieval order; they are not otherwise
    /// disambiguated.
    pub async fn classify(
        &self,
        fingerprint: &Fingerprint,
        metadata: &IncomingMetadata,
    ) -> Result<Classification> {
        let candidates = self.driver.candidate_documents(fingerprint.len()).await?;

        let mut best: Option<(usize, f64)> = None;
        for (index, candidate) in candidates.iter().enumerate() {
            let score = signature_similarity(fingerprint, &candidate.fingerprint);
            // Strictly-greater comparison keeps the earliest max.
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((index, score));
            }
        }

        let Some((index, score)) = best else {
            debug!("no duplicate candidates in store");
            return Ok(Classification::New);
        };
        if score < self.threshold {
            debug!(score, threshold = self.threshold, "below duplicate threshold");
            return Ok(Classification::New);
        }

        let existing = candidates[index].clone();
        if score == 1.0 {
            let differing = differing_fields(metadata, &existing);
            if differing.is_empty() {
                debug!(node_id = %existing.node_id, "exact duplicate");
                Ok(Classification::ExactDuplicate { existing })
            } else {
                debug!(node_id = %existing.node_id, ?differing, "metadata conflict");
                Ok(Classification::MetadataConflict {
                    existing,
                    differing_fields: differing,
                })
            }
        } else {
            debug!(node_id = %existing.node_id, score, "version of existing document");
            Ok(Classification::Version {
                existing_node_id: existing.node_id,
                score,
            })
        }
    }
}

/// Field-by-field comparison of the classification metadata subset.
fn differing_fields(incoming: &IncomingMetadata, candidate: &CandidateDocument) -> Vec<String> {
    let mut differing = Vec::new();
    if incoming.status != candidate.status {
        differing.push("status".to_string());
    }
    if incoming.document_type != candidate.document_type {
        differing.push("document_type".to_string());
    }
    if incoming.regulatory_topic != candidate.regulatory_topic {
        differing.push("regulatory_topic".to_string());
    }
    differing
}
