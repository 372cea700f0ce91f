/// Errors from the audit logger.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    /// Filesystem error while appending or streaming a partition.
    #[error("audit io error: {0}")]
    Io(#[from] std::io::Error),

    /// An event could not be serialized or a log line could not be parsed.
    #[error("audit serialization error: {0}")]
    Serialization(String),

    /// Chain verification found an event whose `previous_hash` does not
    /// match the preceding event.
    #[error("audit chain broken at event {event_id}")]
    ChainBroken {
        /// The event whose back-link failed to verify.
        event_id: String,
    },

    /// Storage error (lock poisoned).
    #[error("audit store error: {0}")]
    Storage(String),
}

/// Result type for audit operations.
pub type AuditResult<T> = Result<T, AuditError>;
