/// Errors for core type construction and parsing.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A content hash string could not be parsed.
    #[error("invalid content hash: {0}")]
    InvalidHash(String),
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
