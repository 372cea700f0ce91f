//! Audit event types.
//!
//! Every classification decision and its outcome is recorded as an
//! immutable event. Events are chain-linked per session - each carries the
//! hash of the previous one - so any mutation of history is detectable.
//! Outcome information is recorded by appending a second event that
//! references the first, never by mutating the original record.

use cordon_core::{ContentHash, Decision, EventId, SessionId, Tier, Timestamp, TokenId};
use serde::{Deserialize, Serialize};

use crate::error::{AuditError, AuditResult};

/// A single audit event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unique event identifier.
    pub id: EventId,
    /// When the event was recorded.
    pub timestamp: Timestamp,
    /// Session the event belongs to.
    pub session_id: SessionId,
    /// What happened.
    pub kind: AuditKind,
    /// Hash of the previous event in this session's chain
    /// ([`ContentHash::zero`] for the chain root).
    pub previous_hash: ContentHash,
}

impl AuditEvent {
    /// Create a new event linked to the given chain head.
    #[must_use]
    pub fn create(session_id: SessionId, kind: AuditKind, previous_hash: ContentHash) -> Self {
        Self {
            id: EventId::new(),
            timestamp: Timestamp::now(),
            session_id,
            kind,
            previous_hash,
        }
    }

    /// Compute the content hash of this event (over its canonical JSON).
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the event cannot be encoded.
    pub fn content_hash(&self) -> AuditResult<ContentHash> {
        let bytes =
            serde_json::to_vec(self).map_err(|e| AuditError::Serialization(e.to_string()))?;
        Ok(ContentHash::hash(&bytes))
    }

    /// Check if this event follows another in the chain.
    #[must_use]
    pub fn follows(&self, previous: &AuditEvent) -> bool {
        previous
            .content_hash()
            .is_ok_and(|h| h == self.previous_hash)
    }
}

/// Outcome of an executed command, reported by the completion callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EventOutcome {
    /// The command succeeded.
    Success {
        /// Optional details.
        details: Option<String>,
    },
    /// The command failed.
    Failure {
        /// Error message.
        error: String,
    },
}

impl EventOutcome {
    /// A success outcome.
    #[must_use]
    pub fn success() -> Self {
        Self::Success { details: None }
    }

    /// A failure outcome.
    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        Self::Failure {
            error: error.into(),
        }
    }

    /// Check if this outcome is a success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// The audited occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditKind {
    /// A tool-invocation request was classified and decided.
    CommandEvaluated {
        /// Declared name of the invoking tool.
        tool: String,
        /// The raw command string as received.
        raw_command: String,
        /// Rendered sub-commands, in order (empty on parse failure).
        sub_commands: Vec<String>,
        /// Final tier (absent when parsing failed before classification).
        tier: Option<Tier>,
        /// Identifier of the rule behind the worst verdict.
        rule_id: Option<String>,
        /// Category of the matched block rule, if any.
        category: Option<String>,
        /// Whether composition was flagged as a bypass attempt.
        compound_bypass: bool,
        /// The final decision.
        decision: Decision,
    },

    /// Completion callback for a previously evaluated command.
    CommandCompleted {
        /// The `CommandEvaluated` event this completes.
        command_event: EventId,
        /// How execution ended.
        outcome: EventOutcome,
        /// Wall-clock duration in milliseconds.
        duration_ms: u64,
    },

    /// The session was held pending human approval.
    ApprovalRequested {
        /// The scope string an approval token must match.
        scope: String,
    },

    /// A human approval was observed and a token issued.
    ApprovalGranted {
        /// The approved scope.
        scope: String,
        /// The issued token.
        token: TokenId,
    },

    /// A human denied the pending operation.
    ApprovalDenied {
        /// The denied scope.
        scope: String,
        /// Reason given, if any.
        reason: Option<String>,
    },

    /// An out-of-order transition or other anomaly was rejected.
    SessionAnomaly {
        /// What happened.
        details: String,
    },
}

impl AuditKind {
    /// Human-readable description of the event.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::CommandEvaluated {
                raw_command,
                decision,
                ..
            } => format!("Evaluated '{raw_command}' -> {decision}"),
            Self::CommandCompleted {
                command_event,
                outcome,
                ..
            } => {
                let status = if outcome.is_success() { "ok" } else { "failed" };
                format!("Completed {command_event} ({status})")
            },
            Self::ApprovalRequested { scope } => format!("Approval requested: {scope}"),
            Self::ApprovalGranted { scope, .. } => format!("Approved: {scope}"),
            Self::ApprovalDenied { scope, .. } => format!("Denied: {scope}"),
            Self::SessionAnomaly { details } => format!("Anomaly: {details}"),
        }
    }
}
