//! Inbound requests and outbound decisions.

use cordon_core::{Decision, EventId, SessionId, Tier, TokenId};
use cordon_rules::CommandClassification;
use cordon_session::WorkflowPhase;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One tool-invocation request as the orchestration runtime hands it over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolRequest {
    /// Declared name of the invoking tool.
    pub tool: String,
    /// The raw command or payload string.
    pub command: String,
    /// Working directory the command would run in, if declared.
    pub cwd: Option<PathBuf>,
    /// Stable session/agent id.
    pub session_id: SessionId,
    /// Prompt/description field, present on delegation-style invocations.
    pub description: Option<String>,
    /// Approval token carried by a retried request claiming "previously
    /// approved".
    pub approval_token: Option<TokenId>,
}

impl ToolRequest {
    /// A plain shell-execution request.
    #[must_use]
    pub fn shell(session_id: SessionId, command: impl Into<String>) -> Self {
        Self {
            tool: "shell".to_string(),
            command: command.into(),
            cwd: None,
            session_id,
            description: None,
            approval_token: None,
        }
    }

    /// A delegation-style request carrying a prompt for a specialized agent.
    #[must_use]
    pub fn delegation(
        session_id: SessionId,
        tool: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            tool: tool.into(),
            command: String::new(),
            cwd: None,
            session_id,
            description: Some(description.into()),
            approval_token: None,
        }
    }

    /// Set the working directory.
    #[must_use]
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Attach an approval token for a retried request.
    #[must_use]
    pub fn with_token(mut self, token: TokenId) -> Self {
        self.approval_token = Some(token);
        self
    }
}

/// The gate's answer to one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateDecision {
    /// The outbound decision: allow, ask, or deny.
    pub decision: Decision,
    /// Final tier, when classification ran.
    pub tier: Option<Tier>,
    /// Full per-sub-command classification, when classification ran.
    pub classification: Option<CommandClassification>,
    /// The audit event recording this evaluation; pass it back to the
    /// completion callback.
    pub event_id: EventId,
    /// The session's workflow phase after this evaluation.
    pub phase: WorkflowPhase,
}

impl GateDecision {
    /// Check if the request may proceed.
    #[must_use]
    pub fn is_allow(&self) -> bool {
        self.decision.is_allow()
    }

    /// The approval scope carried by an ask decision.
    #[must_use]
    pub fn scope(&self) -> Option<&str> {
        match &self.decision {
            Decision::Ask { scope, .. } => Some(scope),
            Decision::Allow | Decision::Deny { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_request() {
        let request = ToolRequest::shell(SessionId::new(), "ls -la").with_cwd("/tmp");
        assert_eq!(request.tool, "shell");
        assert_eq!(request.cwd, Some(PathBuf::from("/tmp")));
        assert!(request.approval_token.is_none());
    }

    #[test]
    fn test_delegation_request() {
        let request = ToolRequest::delegation(
            SessionId::new(),
            "task",
            "Investigate flaky checkout test in payments service",
        );
        assert!(request.description.is_some());
        assert!(request.command.is_empty());
    }

    #[test]
    fn test_request_serde_roundtrip() {
        let request =
            ToolRequest::shell(SessionId::new(), "git status").with_token(TokenId::new());
        let json = serde_json::to_string(&request).unwrap();
        let back: ToolRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, request);
    }
}
