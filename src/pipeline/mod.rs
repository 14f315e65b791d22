//! End-to-end ingestion orchestration.
//!
//! One record at a time flows through classification and transformation —
//! each decision depends on a fresh read of store state, so this stage is
//! deliberately not parallelized. Only the final commit fans out across the
//! committer's worker pool.
//!
//! Queue acknowledgment and batch commit use different atomicity
//! boundaries: a record is deleted from its queue once processed, whether
//! or not every derived batch committed. Delivery is therefore
//! at-least-once per record but best-effort per batch.

use tracing::{error, info, warn};

use crate::commit::{BatchCommitter, CommitReport, CommitterConfig};
use crate::dedup::{Classification, DuplicateClassifier, IncomingMetadata};
use crate::driver::GraphDriver;
use crate::errors::{LexGraphError, Result};
use crate::fingerprint::{Fingerprint, FingerprintGenerator};
use crate::notify::{DuplicateNotice, DuplicateNotifier};
use crate::queue::RecordQueue;
use crate::record::DocumentRecord;
use crate::schema::SchemaCatalog;
use crate::transform::RecordTransformer;
use crate::types::LexGraphConfig;
use crate::upsert::UpsertEngine;

/// Result of processing one record.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    /// New document: a full set of entity/relation inserts was committed.
    Created {
        statements: usize,
        report: CommitReport,
    },
    /// Version of an existing document: changed attributes were merged.
    Merged {
        existing_node_id: String,
        score: f64,
        statements: usize,
        report: CommitReport,
    },
    /// Duplicate: discarded with zero graph writes, uploader notified.
    Discarded { conflicting_fields: Vec<String> },
}

/// Counters from draining a queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrainReport {
    pub ingested: usize,
    pub discarded: usize,
    pub failed: usize,
}

/// Wires fingerprinting, classification, transformation, upsert planning
/// and batched commit into one ingestion engine.
pub struct Ingestor<D, N> {
    driver: D,
    notifier: N,
    catalog: SchemaCatalog,
    generator: FingerprintGenerator,
    threshold: f64,
    committer: CommitterConfig,
}

impl<D: GraphDriver, N: DuplicateNotifier> Ingestor<D, N> {
    /// Construct an ingestor, loading the schema catalog from the driver
    /// once. The catalog is read-only for the process lifetime.
    pub async fn connect(driver: D, notifier: N, config: &LexGraphConfig) -> Result<Self> {
        let catalog = SchemaCatalog::new(driver.fetch_schema().await?);
        Ok(Self {
            driver,
            notifier,
            catalog,
            generator: FingerprintGenerator::new(config.minhash()),
            threshold: config.duplicate_threshold,
            committer: config.committer(),
        })
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn catalog(&self) -> &SchemaCatalog {
        &self.catalog
    }

    /// Process one record end-to-end.
    ///
    /// Classification reads run strictly before any write for the record.
    /// Duplicates are discarded with zero writes; new documents and
    /// versions are transformed, diffed and committed.
    pub async fn process(&self, record: &DocumentRecord) -> Result<IngestOutcome> {
        let missing = record.missing_identity_fields();
        if !missing.is_empty() {
            return Err(LexGraphError::MalformedRecord {
                document_id: record.document_id.clone(),
                missing: missing.join(", "),
            });
        }

        let fingerprint = self.fingerprint_of(record)?;
        let classification = DuplicateClassifier::new(&self.driver)
            .with_threshold(self.threshold)
            .classify(&fingerprint, &IncomingMetadata::of_record(record))
            .await?;

        match classification {
            Classification::ExactDuplicate { existing } => {
                self.discard(record, existing, Vec::new()).await
            }
            Classification::MetadataConflict {
                existing,
                differing_fields,
            } => self.discard(record, existing, differing_fields).await,
            Classification::New => {
                let (statements, report) = self.merge(record, &fingerprint, None).await?;
                info!(
                    document_id = %record.document_id,
                    statements,
                    "ingested new document"
                );
                Ok(IngestOutcome::Created { statements, report })
            }
            Classification::Version {
                existing_node_id,
                score,
            } => {
                let (statements, report) = self
                    .merge(record, &fingerprint, Some(&existing_node_id))
                    .await?;
                info!(
                    document_id = %record.document_id,
                    existing = %existing_node_id,
                    score,
                    statements,
                    "merged document version"
                );
                Ok(IngestOutcome::Merged {
                    existing_node_id,
                    score,
                    statements,
                    report,
                })
            }
        }
    }

    /// Drain the queue until it is empty.
    ///
    /// Successfully processed records (including discarded duplicates) are
    /// acknowledged. A failed record is logged and left unacknowledged —
    /// eligible for reprocessing — and does not affect any other record.
    pub async fn drain<Q: RecordQueue>(&self, queue: &Q) -> Result<DrainReport> {
        let mut report = DrainReport::default();
        while let Some(inbound) = queue.receive().await? {
            match self.process(&inbound.record).await {
                Ok(outcome) => {
                    queue.delete(&inbound.receipt).await?;
                    match outcome {
                        IngestOutcome::Discarded { .. } => report.discarded += 1,
                        _ => report.ingested += 1,
                    }
                }
                Err(LexGraphError::MalformedRecord {
                    document_id,
                    missing,
                }) => {
                    warn!(%document_id, %missing, "malformed record left unacknowledged");
                    report.failed += 1;
                }
                Err(e) => {
                    error!(
                        document_id = %inbound.record.document_id,
                        error = %e,
                        "record processing failed, left unacknowledged"
                    );
                    report.failed += 1;
                }
            }
        }
        Ok(report)
    }

    /// The record's signature: computed from text when present, otherwise
    /// parsed from the upstream-serialized form.
    fn fingerprint_of(&self, record: &DocumentRecord) -> Result<Fingerprint> {
        match &record.text {
            Some(text) => Ok(self.generator.generate(text)),
            None => Fingerprint::parse(&record.fingerprint),
        }
    }

    async fn discard(
        &self,
        record: &DocumentRecord,
        existing: crate::driver::CandidateDocument,
        conflicting_fields: Vec<String>,
    ) -> Result<IngestOutcome> {
        let notice = DuplicateNotice {
            uploader: record.user_id.clone(),
            existing,
            conflicting_fields: conflicting_fields.clone(),
        };
        self.notifier.notify(&notice).await?;
        info!(
            document_id = %record.document_id,
            existing = %notice.existing.node_id,
            "duplicate discarded, uploader notified"
        );
        Ok(IngestOutcome::Discarded { conflicting_fields })
    }

    async fn merge(
        &self,
        record: &DocumentRecord,
        fingerprint: &Fingerprint,
        merge_target: Option<&str>,
    ) -> Result<(usize, CommitReport)> {
        let fragment = RecordTransformer::new(&self.catalog).transform(
            record,
            fingerprint,
            merge_target,
        )?;
        let statements = UpsertEngine::new(&self.driver, &self.catalog)
            .plan(&fragment)
            .await?;
        let count = statements.len();
        let report = BatchCommitter::with_config(&self.driver, self.committer)
            .commit(statements)
            .await;
        Ok((count, report))
    }
}
