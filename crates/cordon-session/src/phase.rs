//! The workflow phase machine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Phase of a multi-step agent task.
///
/// ```text
/// Investigating ──> PendingApproval ──> ApprovedExecuting ──> Complete
///      │  ^               │                    │
///      │  └── NeedsInput  └──> Investigating   └──> Investigating (next step)
///      └──────────────────────────> Blocked (from any non-terminal phase)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowPhase {
    /// Initial phase: the agent is gathering context and running low-risk
    /// commands.
    Investigating,
    /// A T3 verdict was produced and no valid token exists; the session is
    /// held for a human decision.
    PendingApproval,
    /// A matching approval was recorded and consumed; the high-risk
    /// operation may proceed.
    ApprovedExecuting,
    /// Terminal: the task finished successfully.
    Complete,
    /// Terminal: irrecoverable local failure.
    Blocked,
    /// Missing information must be supplied before work can continue.
    NeedsInput,
}

impl WorkflowPhase {
    /// Check if this phase is terminal.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Blocked)
    }

    /// Check whether a transition to `next` is legal.
    ///
    /// A session can never jump from `Investigating` straight to
    /// `ApprovedExecuting`; it must pass through `PendingApproval`.
    #[must_use]
    pub fn can_transition_to(&self, next: Self) -> bool {
        match self {
            Self::Investigating => matches!(
                next,
                Self::PendingApproval | Self::NeedsInput | Self::Complete | Self::Blocked
            ),
            Self::PendingApproval => {
                matches!(next, Self::ApprovedExecuting | Self::Investigating | Self::Blocked)
            },
            Self::ApprovedExecuting => {
                matches!(next, Self::Complete | Self::Investigating | Self::Blocked)
            },
            Self::NeedsInput => matches!(next, Self::Investigating | Self::Blocked),
            Self::Complete | Self::Blocked => false,
        }
    }
}

impl fmt::Display for WorkflowPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Investigating => write!(f, "INVESTIGATING"),
            Self::PendingApproval => write!(f, "PENDING_APPROVAL"),
            Self::ApprovedExecuting => write!(f, "APPROVED_EXECUTING"),
            Self::Complete => write!(f, "COMPLETE"),
            Self::Blocked => write!(f, "BLOCKED"),
            Self::NeedsInput => write!(f, "NEEDS_INPUT"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legal_happy_path() {
        assert!(WorkflowPhase::Investigating.can_transition_to(WorkflowPhase::PendingApproval));
        assert!(WorkflowPhase::PendingApproval.can_transition_to(WorkflowPhase::ApprovedExecuting));
        assert!(WorkflowPhase::ApprovedExecuting.can_transition_to(WorkflowPhase::Complete));
    }

    #[test]
    fn test_cannot_skip_pending_approval() {
        assert!(!WorkflowPhase::Investigating.can_transition_to(WorkflowPhase::ApprovedExecuting));
    }

    #[test]
    fn test_terminal_phases_are_final() {
        for next in [
            WorkflowPhase::Investigating,
            WorkflowPhase::PendingApproval,
            WorkflowPhase::ApprovedExecuting,
            WorkflowPhase::Complete,
            WorkflowPhase::Blocked,
            WorkflowPhase::NeedsInput,
        ] {
            assert!(!WorkflowPhase::Complete.can_transition_to(next));
            assert!(!WorkflowPhase::Blocked.can_transition_to(next));
        }
        assert!(WorkflowPhase::Complete.is_terminal());
        assert!(WorkflowPhase::Blocked.is_terminal());
        assert!(!WorkflowPhase::NeedsInput.is_terminal());
    }

    #[test]
    fn test_needs_input_returns_to_investigating() {
        assert!(WorkflowPhase::Investigating.can_transition_to(WorkflowPhase::NeedsInput));
        assert!(WorkflowPhase::NeedsInput.can_transition_to(WorkflowPhase::Investigating));
        assert!(!WorkflowPhase::NeedsInput.can_transition_to(WorkflowPhase::ApprovedExecuting));
    }

    #[test]
    fn test_denial_returns_to_investigating() {
        assert!(WorkflowPhase::PendingApproval.can_transition_to(WorkflowPhase::Investigating));
    }

    #[test]
    fn test_display_names() {
        assert_eq!(WorkflowPhase::PendingApproval.to_string(), "PENDING_APPROVAL");
        assert_eq!(WorkflowPhase::NeedsInput.to_string(), "NEEDS_INPUT");
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&WorkflowPhase::ApprovedExecuting).unwrap();
        assert_eq!(json, "\"approved_executing\"");
    }
}
