//! Delegation request validation.
//!
//! Delegation-style invocations hand a prompt to a specialized sub-agent
//! instead of a shell command. The gate cannot classify the prompt's
//! blast radius, but it can reject delegations whose prompts lack the
//! contextual metadata the downstream agent needs to act safely.

use serde::{Deserialize, Serialize};

use crate::request::ToolRequest;

/// Minimum length for a usable delegation prompt.
const DEFAULT_MIN_DESCRIPTION_LEN: usize = 20;

/// Policy for the delegation validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegationPolicy {
    /// Tool names treated as delegation-style invocations.
    pub delegation_tools: Vec<String>,
    /// Minimum prompt length in characters.
    pub min_description_len: usize,
}

impl Default for DelegationPolicy {
    fn default() -> Self {
        Self {
            delegation_tools: vec![
                "task".to_string(),
                "delegate".to_string(),
                "agent".to_string(),
            ],
            min_description_len: DEFAULT_MIN_DESCRIPTION_LEN,
        }
    }
}

impl DelegationPolicy {
    /// Check whether a request targets a delegation tool.
    #[must_use]
    pub fn is_delegation(&self, request: &ToolRequest) -> bool {
        self.delegation_tools
            .iter()
            .any(|t| t.eq_ignore_ascii_case(&request.tool))
    }

    /// Validate a delegation request's prompt.
    ///
    /// Returns the rejection reason, or `None` when the prompt carries the
    /// required contextual metadata.
    #[must_use]
    pub fn rejection(&self, request: &ToolRequest) -> Option<String> {
        let Some(description) = request.description.as_deref() else {
            return Some("delegation request is missing a prompt/description".to_string());
        };
        let trimmed = description.trim();
        if trimmed.is_empty() {
            return Some("delegation prompt is empty".to_string());
        }
        if trimmed.chars().count() < self.min_description_len {
            return Some(format!(
                "delegation prompt too short ({} chars, minimum {})",
                trimmed.chars().count(),
                self.min_description_len
            ));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cordon_core::SessionId;

    #[test]
    fn test_recognizes_delegation_tools() {
        let policy = DelegationPolicy::default();
        let task = ToolRequest::delegation(SessionId::new(), "Task", "x");
        assert!(policy.is_delegation(&task));
        let shell = ToolRequest::shell(SessionId::new(), "ls");
        assert!(!policy.is_delegation(&shell));
    }

    #[test]
    fn test_missing_description_rejected() {
        let policy = DelegationPolicy::default();
        let mut request = ToolRequest::delegation(SessionId::new(), "task", "x");
        request.description = None;
        assert!(policy.rejection(&request).unwrap().contains("missing"));
    }

    #[test]
    fn test_short_prompt_rejected() {
        let policy = DelegationPolicy::default();
        let request = ToolRequest::delegation(SessionId::new(), "task", "fix it");
        assert!(policy.rejection(&request).unwrap().contains("too short"));
    }

    #[test]
    fn test_adequate_prompt_accepted() {
        let policy = DelegationPolicy::default();
        let request = ToolRequest::delegation(
            SessionId::new(),
            "task",
            "Investigate the flaky checkout test in the payments service and report findings",
        );
        assert!(policy.rejection(&request).is_none());
    }

    #[test]
    fn test_whitespace_only_prompt_rejected() {
        let policy = DelegationPolicy::default();
        let request = ToolRequest::delegation(SessionId::new(), "task", "    ");
        assert!(policy.rejection(&request).unwrap().contains("empty"));
    }
}
