//! Batched transactional commit.
//!
//! Partitions an ordered statement list into contiguous batches and
//! dispatches them across a fixed pool of workers. Each worker owns one
//! write transaction per batch — no transaction is shared — and a failed
//! batch is logged and dropped without blocking or rolling back the others.
//! There is no automatic retry.

use futures::future::join_all;
use tracing::{debug, error};

use crate::driver::GraphDriver;
use crate::statement::Statement;

/// Default statements per batch.
pub const DEFAULT_BATCH_SIZE: usize = 200;

/// Default worker pool size.
pub const DEFAULT_WORKERS: usize = 4;

/// Committer tuning parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitterConfig {
    pub batch_size: usize,
    pub workers: usize,
}

impl Default for CommitterConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            workers: DEFAULT_WORKERS,
        }
    }
}

/// Outcome of one commit run, for operator visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommitReport {
    pub batches: usize,
    pub committed: usize,
    pub failed: usize,
}

impl CommitReport {
    pub fn all_committed(&self) -> bool {
        self.failed == 0
    }
}

/// Partition `statements` into `ceil(N/B)` contiguous batches.
///
/// Original order is preserved within and across batches: concatenating
/// the batches reproduces the input exactly. A zero batch size is clamped
/// to one.
pub fn partition(statements: Vec<Statement>, batch_size: usize) -> Vec<Vec<Statement>> {
    let batch_size = batch_size.max(1);
    let mut batches = Vec::with_capacity(statements.len().div_ceil(batch_size));
    let mut iter = statements.into_iter();
    loop {
        let batch: Vec<Statement> = iter.by_ref().take(batch_size).collect();
        if batch.is_empty() {
            break;
        }
        batches.push(batch);
    }
    batches
}

/// Commits statement lists through a [`GraphDriver`].
pub struct BatchCommitter<'a, D> {
    driver: &'a D,
    config: CommitterConfig,
}

impl<'a, D: GraphDriver> BatchCommitter<'a, D> {
    pub fn new(driver: &'a D) -> Self {
        Self {
            driver,
            config: CommitterConfig::default(),
        }
    }

    pub fn with_config(driver: &'a D, config: CommitterConfig) -> Self {
        Self { driver, config }
    }

    /// Commit `statements` as per-batch transactions across the worker pool.
    ///
    /// Batches are assigned to workers round-robin up front (a static
    /// partition, not a work-stealing queue), so the full batch set is
    /// known before the first transaction opens. Batch failures are logged
    /// and dropped; cross-batch independence means the rest proceed.
    pub async fn commit(&self, statements: Vec<Statement>) -> CommitReport {
        let batches = partition(statements, self.config.batch_size);
        let total = batches.len();
        if total == 0 {
            return CommitReport::default();
        }

        let workers = self.config.workers.max(1);
        let mut lanes: Vec<Vec<(usize, Vec<Statement>)>> = (0..workers).map(|_| Vec::new()).collect();
        for (index, batch) in batches.into_iter().enumerate() {
            lanes[index % workers].push((index, batch));
        }

        let worker_runs = lanes.into_iter().filter(|lane| !lane.is_empty()).map(|lane| async move {
            let mut committed = 0_usize;
            let mut failed = 0_usize;
            for (index, batch) in lane {
                match self.driver.execute_batch(&batch).await {
                    Ok(()) => {
                        debug!(batch = index, statements = batch.len(), "batch committed");
                        committed += 1;
                    }
                    Err(e) => {
                        error!(batch = index, error = %e, "batch failed, dropping");
                        failed += 1;
                    }
                }
            }
            (committed, failed)
        });

        let mut report = CommitReport {
            batches: total,
            ..CommitReport::default()
        };
        for (committed, failed) in join_all(worker_runs).await {
            report.committed += committed;
            report.failed += failed;
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::memory::InMemoryDriver;
    use crate::graph::{GraphEntity, DOCUMENT};
    use crate::schema::SchemaDef;

    fn statements(n: usize) -> Vec<Statement> {
        (0..n)
            .map(|i| Statement::InsertEntity(GraphEntity::new(DOCUMENT, format!("d{i}"))))
            .collect()
    }

    #[test]
    fn test_partition_counts() {
        assert_eq!(partition(statements(10), 3).len(), 4); // ceil(10/3)
        assert_eq!(partition(statements(9), 3).len(), 3);
        assert_eq!(partition(statements(1), 500).len(), 1);
        assert!(partition(statements(0), 3).is_empty());
    }

    #[test]
    fn test_partition_preserves_order_exactly() {
        let original = statements(10);
        let batches = partition(original.clone(), 3);
        assert!(batches.iter().all(|b| !b.is_empty()));
        let flattened: Vec<Statement> = batches.into_iter().flatten().collect();
        assert_eq!(flattened, original);
    }

    #[test]
    fn test_partition_clamps_zero_batch_size() {
        let batches = partition(statements(4), 0);
        assert_eq!(batches.len(), 4);
    }

    #[tokio::test]
    async fn test_commit_reports_all_batches() {
        let driver = InMemoryDriver::new(SchemaDef::document_repository());
        let committer = BatchCommitter::with_config(
            &driver,
            CommitterConfig {
                batch_size: 3,
                workers: 2,
            },
        );
        let report = committer.commit(statements(10)).await;
        assert_eq!(report.batches, 4);
        assert_eq!(report.committed, 4);
        assert_eq!(report.failed, 0);
        assert!(report.all_committed());
        assert_eq!(driver.entity_count(), 10);
    }

    #[tokio::test]
    async fn test_failed_batch_is_dropped_others_proceed() {
        let driver = InMemoryDriver::new(SchemaDef::document_repository());
        driver.fail_next_batches(1);
        let committer = BatchCommitter::with_config(
            &driver,
            CommitterConfig {
                batch_size: 2,
                workers: 1,
            },
        );
        let report = committer.commit(statements(6)).await;
        assert_eq!(report.batches, 3);
        assert_eq!(report.committed, 2);
        assert_eq!(report.failed, 1);
        assert!(!report.all_committed());
        // The two surviving batches landed.
        assert_eq!(driver.entity_count(), 4);
    }

    #[tokio::test]
    async fn test_empty_commit_is_a_noop() {
        let driver = InMemoryDriver::new(SchemaDef::document_repository());
        let report = BatchCommitter::new(&driver).commit(Vec::new()).await;
        assert_eq!(report, CommitReport::default());
        assert!(driver.mutation_log().is_empty());
    }

    #[tokio::test]
    async fn test_more_workers_than_batches() {
        let driver = InMemoryDriver::new(SchemaDef::document_repository());
        let committer = BatchCommitter::with_config(
            &driver,
            CommitterConfig {
                batch_size: 1,
                workers: 8,
            },
        );
        let report = committer.commit(statements(2)).await;
        assert_eq!(report.batches, 2);
        assert_eq!(report.committed, 2);
    }
}
