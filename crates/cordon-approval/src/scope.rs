//! Approval scopes - what operation a token is bound to.

use globset::Glob;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ApprovalError, ApprovalResult};

/// The operation description an approval token is bound to.
///
/// Comparison is exact-string or an explicitly declared glob pattern,
/// never fuzzy - a broad "yes, proceed" must not be replayable against an
/// unrelated later operation in the same session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ApprovalScope {
    /// Matches exactly one operation string.
    Exact {
        /// The operation string, typically the rendered worst sub-command.
        value: String,
    },
    /// Matches operations under an explicitly declared glob pattern
    /// (e.g. `"terraform apply -target=module.x*"`).
    Pattern {
        /// The declared glob pattern.
        pattern: String,
    },
}

impl ApprovalScope {
    /// An exact scope.
    #[must_use]
    pub fn exact(value: impl Into<String>) -> Self {
        Self::Exact {
            value: value.into(),
        }
    }

    /// An explicit pattern scope. The pattern is validated up front so a
    /// bad pattern fails at declaration, not silently at consumption.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalError::InvalidPattern`] if the glob fails to
    /// compile.
    pub fn pattern(pattern: impl Into<String>) -> ApprovalResult<Self> {
        let pattern = pattern.into();
        Glob::new(&pattern).map_err(|e| ApprovalError::InvalidPattern {
            pattern: pattern.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self::Pattern { pattern })
    }

    /// Check this scope against the scope string of an execution attempt.
    #[must_use]
    pub fn matches(&self, attempt: &str) -> bool {
        match self {
            Self::Exact { value } => value == attempt,
            Self::Pattern { pattern } => Glob::new(pattern)
                .ok()
                .is_some_and(|g| g.compile_matcher().is_match(attempt)),
        }
    }

    /// The scope as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Exact { value } => value,
            Self::Pattern { pattern } => pattern,
        }
    }
}

impl fmt::Display for ApprovalScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact { value } => write!(f, "{value}"),
            Self::Pattern { pattern } => write!(f, "pattern:{pattern}"),
        }
    }
}
