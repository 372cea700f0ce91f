use cordon_approval::ApprovalError;
use cordon_audit::AuditError;
use cordon_session::SessionError;

/// Errors from the gate engine.
///
/// These are infrastructure failures, not decisions: a refused command is a
/// [`Decision::Deny`](cordon_core::Decision), never an error. Callers must
/// treat any error here as fail-closed.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    /// Session store failure.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Approval gate failure.
    #[error(transparent)]
    Approval(#[from] ApprovalError),

    /// Audit log failure.
    #[error(transparent)]
    Audit(#[from] AuditError),

    /// The request is malformed (e.g. an approval recorded for a session
    /// with nothing pending).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Result type for gate operations.
pub type GateResult<T> = Result<T, GateError>;
