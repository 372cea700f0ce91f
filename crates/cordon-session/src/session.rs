//! Per-session workflow record.

use cordon_core::{SessionId, Timestamp};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{SessionError, SessionResult};
use crate::phase::WorkflowPhase;

/// Resume-eligibility policy for sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPolicy {
    /// Inactivity window in seconds after which a session cannot resume.
    #[serde(default = "default_staleness")]
    pub staleness_secs: i64,
    /// Error count at which a session cannot resume.
    #[serde(default = "default_error_cap")]
    pub error_cap: u32,
}

fn default_staleness() -> i64 {
    30 * 60
}

fn default_error_cap() -> u32 {
    3
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            staleness_secs: default_staleness(),
            error_cap: default_error_cap(),
        }
    }
}

/// One recorded phase change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseTransition {
    /// Phase the session left.
    pub from: WorkflowPhase,
    /// Phase the session entered.
    pub to: WorkflowPhase,
    /// When the transition happened.
    pub at: Timestamp,
}

/// The workflow state of one delegated agent session.
///
/// Created on first tool invocation; mutated only by the state tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSession {
    /// Stable session identifier.
    pub id: SessionId,
    /// Current workflow phase.
    pub phase: WorkflowPhase,
    /// History of phase transitions, oldest first.
    pub history: Vec<PhaseTransition>,
    /// Count of anomalies and local failures recorded against this session.
    pub error_count: u32,
    /// Last time this session saw any activity.
    pub last_activity: Timestamp,
    /// Scope of the operation awaiting approval, while in
    /// [`WorkflowPhase::PendingApproval`].
    pub pending_scope: Option<String>,
}

impl AgentSession {
    /// Create a fresh session in the initial phase.
    #[must_use]
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            phase: WorkflowPhase::Investigating,
            history: Vec::new(),
            error_count: 0,
            last_activity: Timestamp::now(),
            pending_scope: None,
        }
    }

    /// Record activity without changing phase.
    pub fn touch(&mut self) {
        self.last_activity = Timestamp::now();
    }

    /// Attempt a phase transition.
    ///
    /// Illegal transitions are rejected, logged as anomalies, and count
    /// against the session's error budget; the phase is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidTransition`] if the transition is not
    /// legal from the current phase.
    pub fn transition(&mut self, to: WorkflowPhase) -> SessionResult<()> {
        if !self.phase.can_transition_to(to) {
            warn!(
                session = %self.id,
                from = %self.phase,
                to = %to,
                "anomaly: rejected out-of-order phase transition"
            );
            self.error_count = self.error_count.saturating_add(1);
            return Err(SessionError::InvalidTransition {
                from: self.phase,
                to,
            });
        }
        let from = self.phase;
        self.phase = to;
        self.history.push(PhaseTransition {
            from,
            to,
            at: Timestamp::now(),
        });
        if to != WorkflowPhase::PendingApproval {
            self.pending_scope = None;
        }
        self.touch();
        Ok(())
    }

    /// Record a local failure against the error budget.
    pub fn record_error(&mut self) {
        self.error_count = self.error_count.saturating_add(1);
        self.touch();
    }

    /// Check whether the session has exceeded the inactivity window.
    #[must_use]
    pub fn is_stale(&self, policy: &SessionPolicy) -> bool {
        self.last_activity.age_secs() > policy.staleness_secs
    }

    /// Check whether the session may resume under the given policy.
    ///
    /// A stale session, an error-capped session, or a terminal session is
    /// not eligible; a fresh session must be started.
    #[must_use]
    pub fn is_resumable(&self, policy: &SessionPolicy) -> bool {
        !self.phase.is_terminal()
            && !self.is_stale(policy)
            && self.error_count < policy.error_cap
    }

    /// Why the session cannot resume, if it cannot.
    #[must_use]
    pub fn resume_obstacle(&self, policy: &SessionPolicy) -> Option<String> {
        if self.phase.is_terminal() {
            return Some(format!("session already {}", self.phase));
        }
        if self.is_stale(policy) {
            return Some(format!(
                "inactive for {}s (window {}s)",
                self.last_activity.age_secs(),
                policy.staleness_secs
            ));
        }
        if self.error_count >= policy.error_cap {
            return Some(format!(
                "error count {} reached cap {}",
                self.error_count, policy.error_cap
            ));
        }
        None
    }
}

#[cfg(test)]
#[allow(clippy::arithmetic_side_effects)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn session() -> AgentSession {
        AgentSession::new(SessionId::new())
    }

    #[test]
    fn test_new_session_is_investigating() {
        let s = session();
        assert_eq!(s.phase, WorkflowPhase::Investigating);
        assert!(s.history.is_empty());
        assert_eq!(s.error_count, 0);
    }

    #[test]
    fn test_happy_path_transitions() {
        let mut s = session();
        s.transition(WorkflowPhase::PendingApproval).unwrap();
        s.transition(WorkflowPhase::ApprovedExecuting).unwrap();
        s.transition(WorkflowPhase::Complete).unwrap();
        assert_eq!(s.history.len(), 3);
        assert_eq!(s.history[0].from, WorkflowPhase::Investigating);
        assert_eq!(s.history[2].to, WorkflowPhase::Complete);
    }

    #[test]
    fn test_skipping_pending_approval_is_rejected() {
        let mut s = session();
        let err = s.transition(WorkflowPhase::ApprovedExecuting).unwrap_err();
        assert_eq!(
            err,
            SessionError::InvalidTransition {
                from: WorkflowPhase::Investigating,
                to: WorkflowPhase::ApprovedExecuting,
            }
        );
        // Phase is untouched, anomaly counted.
        assert_eq!(s.phase, WorkflowPhase::Investigating);
        assert_eq!(s.error_count, 1);
        assert!(s.history.is_empty());
    }

    #[test]
    fn test_pending_scope_cleared_on_leaving_pending() {
        let mut s = session();
        s.transition(WorkflowPhase::PendingApproval).unwrap();
        s.pending_scope = Some("terraform apply".to_string());
        s.transition(WorkflowPhase::Investigating).unwrap();
        assert!(s.pending_scope.is_none());
    }

    #[test]
    fn test_staleness_at_31_minutes() {
        let mut s = session();
        s.last_activity = Timestamp::from_datetime(Utc::now() - chrono::Duration::minutes(31));
        let policy = SessionPolicy::default();
        assert!(s.is_stale(&policy));
        assert!(!s.is_resumable(&policy));
        assert!(s.resume_obstacle(&policy).unwrap().contains("inactive"));
    }

    #[test]
    fn test_fresh_session_is_resumable() {
        let s = session();
        assert!(s.is_resumable(&SessionPolicy::default()));
        assert!(s.resume_obstacle(&SessionPolicy::default()).is_none());
    }

    #[test]
    fn test_error_cap_blocks_resume() {
        let mut s = session();
        for _ in 0..3 {
            s.record_error();
        }
        let policy = SessionPolicy::default();
        assert!(!s.is_resumable(&policy));
        assert!(s.resume_obstacle(&policy).unwrap().contains("cap"));
    }

    #[test]
    fn test_terminal_session_not_resumable() {
        let mut s = session();
        s.transition(WorkflowPhase::Complete).unwrap();
        assert!(!s.is_resumable(&SessionPolicy::default()));
    }

    #[test]
    fn test_serde_roundtrip() {
        let mut s = session();
        s.transition(WorkflowPhase::PendingApproval).unwrap();
        let json = serde_json::to_string(&s).unwrap();
        let back: AgentSession = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }
}
