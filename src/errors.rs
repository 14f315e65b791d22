//! Error types for lexgraph-rs.

/// Alias for Results returning [`LexGraphError`].
pub type Result<T> = std::result::Result<T, LexGraphError>;

/// Top-level error type for lexgraph-rs.
#[derive(Debug, thiserror::Error)]
pub enum LexGraphError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A record is missing a field required to derive its node identifier.
    /// Processing of that record aborts; no other record is affected.
    #[error("Malformed record {document_id}: missing {missing}")]
    MalformedRecord {
        document_id: String,
        missing: String,
    },

    #[error("Fingerprint error: {0}")]
    Fingerprint(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Queue error: {0}")]
    Queue(String),

    #[error("Notification error: {0}")]
    Notification(String),
}

/// Store-specific errors.
///
/// Callers bound transaction duration themselves; a [`StoreError::Timeout`]
/// is retryable, a malformed query is not.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("transaction timed out")]
    Timeout,

    #[error("connection lost: {0}")]
    Connection(String),

    #[error("malformed query: {0}")]
    InvalidQuery(String),

    #[error("transaction failed: {0}")]
    Transaction(String),
}

impl StoreError {
    /// Whether a caller may safely retry the failed operation.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout | Self::Connection(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_is_retryable() {
        assert!(StoreError::Timeout.is_retryable());
        assert!(StoreError::Connection("reset by peer".to_string()).is_retryable());
    }

    #[test]
    fn test_query_malformation_is_permanent() {
        assert!(!StoreError::InvalidQuery("unbound variable $x".to_string()).is_retryable());
        assert!(!StoreError::Transaction("write conflict".to_string()).is_retryable());
    }

    #[test]
    fn test_store_error_wraps_into_top_level() {
        let err: LexGraphError = StoreError::Timeout.into();
        assert!(matches!(err, LexGraphError::Store(StoreError::Timeout)));
    }

    #[test]
    fn test_malformed_record_display() {
        let err = LexGraphError::MalformedRecord {
            document_id: "doc-1".to_string(),
            missing: "status, regulator_id".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("doc-1"));
        assert!(msg.contains("status"));
    }
}
