//! Outbound duplicate notification seam.
//!
//! On an exact duplicate or metadata conflict, the uploader is handed the
//! existing record's metadata. Payload format and delivery (email etc.) are
//! an external collaborator's concern; this module only defines the seam.
//! Internal ingestion failures are never user-visible — operators see them
//! in logs only.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::driver::CandidateDocument;
use crate::errors::Result;

/// Payload handed to the notification collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateNotice {
    /// Identity of the uploading user.
    pub uploader: String,
    /// Metadata of the already-stored document.
    pub existing: CandidateDocument,
    /// Differing metadata fields, empty for an exact duplicate.
    pub conflicting_fields: Vec<String>,
}

/// Notification collaborator seam.
#[allow(async_fn_in_trait)]
pub trait DuplicateNotifier: Send + Sync {
    async fn notify(&self, notice: &DuplicateNotice) -> Result<()>;
}

/// Log-only notifier: records the notice at info level and succeeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl DuplicateNotifier for LogNotifier {
    async fn notify(&self, notice: &DuplicateNotice) -> Result<()> {
        info!(
            uploader = %notice.uploader,
            existing = %notice.existing.node_id,
            conflicting = ?notice.conflicting_fields,
            "duplicate upload notice"
        );
        Ok(())
    }
}
