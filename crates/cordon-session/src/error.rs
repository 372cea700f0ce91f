use crate::phase::WorkflowPhase;

/// Errors from the workflow state tracker.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// A phase change was requested out of order. The session remains in
    /// its prior phase; the attempt is logged as an anomaly.
    #[error("invalid transition {from} -> {to}")]
    InvalidTransition {
        /// Phase the session was in.
        from: WorkflowPhase,
        /// Phase that was requested.
        to: WorkflowPhase,
    },

    /// The session exceeded its inactivity window or error budget and can
    /// no longer resume; a fresh session must be started.
    #[error("session is stale: {reason}")]
    Stale {
        /// Why the session can no longer resume.
        reason: String,
    },

    /// No session exists for the given id.
    #[error("unknown session {session_id}")]
    UnknownSession {
        /// The id that was looked up.
        session_id: String,
    },

    /// Storage backend error (lock poisoned).
    #[error("session store error: {0}")]
    Storage(String),
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;
