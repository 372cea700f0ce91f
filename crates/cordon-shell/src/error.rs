/// Errors produced while decomposing a raw command string.
///
/// Every variant is a fail-closed condition: the caller must treat an
/// unparseable command as the most restrictive case, never guess.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShellError {
    /// A quote was opened but never closed.
    #[error("unbalanced {quote} quote")]
    UnbalancedQuote {
        /// The offending quote character.
        quote: char,
    },

    /// A backslash at the end of input escapes nothing.
    #[error("trailing escape character")]
    TrailingEscape,

    /// An operator the gate refuses to reason about (background `&`,
    /// command or process substitution).
    #[error("unsupported shell operator '{operator}'")]
    UnsupportedOperator {
        /// The operator as written.
        operator: String,
    },

    /// An operator with nothing on one side (`ls &&`, `| grep x`, `;;`).
    #[error("empty command segment around operator '{operator}'")]
    EmptySegment {
        /// The operator adjacent to the empty segment.
        operator: String,
    },

    /// A redirection operator with no target word.
    #[error("redirection '{operator}' is missing a target")]
    MissingRedirectionTarget {
        /// The redirection operator as written.
        operator: String,
    },

    /// The whole command was empty or whitespace.
    #[error("empty command")]
    EmptyCommand,
}

/// Result type for parser operations.
pub type ShellResult<T> = Result<T, ShellError>;
