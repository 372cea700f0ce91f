/// Errors from the approval gate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApprovalError {
    /// A token was requested for a session that is not awaiting approval.
    #[error("session {session_id} is not in PENDING_APPROVAL")]
    NotPendingApproval {
        /// The session the request was made for.
        session_id: String,
    },

    /// No live token exists for the session.
    #[error("no outstanding token for session {session_id}")]
    UnknownToken {
        /// The session the consumption was attempted for.
        session_id: String,
    },

    /// The presented token id does not match the outstanding token.
    ///
    /// This also covers tokens invalidated by a newer issuance for the
    /// same session.
    #[error("token {token_id} is not the outstanding token for its session")]
    TokenSuperseded {
        /// The presented token id.
        token_id: String,
    },

    /// The token was already consumed; consumption is one-time.
    #[error("token {token_id} was already consumed")]
    AlreadyConsumed {
        /// The token id.
        token_id: String,
    },

    /// The token expired before it was consumed.
    #[error("token {token_id} expired")]
    Expired {
        /// The token id.
        token_id: String,
    },

    /// The token's scope does not cover the attempted operation. Treated
    /// by the caller as if no token were presented at all.
    #[error("token scope '{scope}' does not match operation '{attempt}'")]
    ScopeMismatch {
        /// The scope stored on the token.
        scope: String,
        /// The scope of the execution attempt.
        attempt: String,
    },

    /// An explicit scope pattern failed to compile.
    #[error("invalid scope pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Why it failed to compile.
        reason: String,
    },

    /// Storage backend error (lock poisoned).
    #[error("approval store error: {0}")]
    Storage(String),
}

/// Result type for approval operations.
pub type ApprovalResult<T> = Result<T, ApprovalError>;
