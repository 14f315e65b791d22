//! Inbound record queue abstraction.
//!
//! Delivery is at-least-once with caller-controlled acknowledgment: a
//! received record stays in flight until explicitly deleted, so a crash
//! before deletion makes it eligible for redelivery. Record acknowledgment
//! and batch commit use different atomicity boundaries — deleting a record
//! does not imply every derived batch committed.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use uuid::Uuid;

use crate::errors::{LexGraphError, Result};
use crate::record::DocumentRecord;

/// Opaque acknowledgment handle for one delivery.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Receipt(Uuid);

/// One delivered unit of work.
#[derive(Debug, Clone)]
pub struct InboundRecord {
    pub receipt: Receipt,
    pub record: DocumentRecord,
}

/// Message-queue seam with receive/delete semantics.
#[allow(async_fn_in_trait)]
pub trait RecordQueue: Send + Sync {
    /// Take the next record, moving it in flight. `None` when the queue is
    /// currently empty.
    async fn receive(&self) -> Result<Option<InboundRecord>>;

    /// Acknowledge a delivery, removing the record permanently.
    async fn delete(&self, receipt: &Receipt) -> Result<()>;
}

#[derive(Default)]
struct QueueState {
    pending: VecDeque<DocumentRecord>,
    inflight: HashMap<Receipt, DocumentRecord>,
}

/// Process-local [`RecordQueue`] implementation.
#[derive(Default)]
pub struct InMemoryQueue {
    state: Mutex<QueueState>,
}

impl InMemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a record for delivery.
    pub fn push(&self, record: DocumentRecord) {
        self.lock().pending.push_back(record);
    }

    pub fn pending_len(&self) -> usize {
        self.lock().pending.len()
    }

    pub fn inflight_len(&self) -> usize {
        self.lock().inflight.len()
    }

    /// Return every in-flight record to the pending queue (redelivery).
    pub fn requeue_inflight(&self) {
        let mut state = self.lock();
        let inflight: Vec<DocumentRecord> = state.inflight.drain().map(|(_, r)| r).collect();
        for record in inflight {
            state.pending.push_back(record);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl RecordQueue for InMemoryQueue {
    async fn receive(&self) -> Result<Option<InboundRecord>> {
        let mut state = self.lock();
        let Some(record) = state.pending.pop_front() else {
            return Ok(None);
        };
        let receipt = Receipt(Uuid::new_v4());
        state.inflight.insert(receipt.clone(), record.clone());
        Ok(Some(InboundRecord { receipt, record }))
    }

    async fn delete(&self, receipt: &Receipt) -> Result<()> {
        let mut state = self.lock();
        state
            .inflight
            .remove(receipt)
            .map(|_| ())
            .ok_or_else(|| LexGraphError::Queue("unknown or expired receipt".to_string()))
    }
}
