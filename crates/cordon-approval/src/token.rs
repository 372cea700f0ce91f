//! Approval tokens.

use chrono::{Duration, Utc};
use cordon_core::{SessionId, Timestamp, TokenId};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::scope::ApprovalScope;

/// A single-consumption token recording a human approval for one specific
/// operation scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalToken {
    /// Unique token identifier.
    pub id: TokenId,
    /// Session the approval was granted to.
    pub session_id: SessionId,
    /// The operation scope the approval is bound to.
    pub scope: ApprovalScope,
    /// When the approval event was observed.
    pub issued_at: Timestamp,
    /// When the token expires (None = no expiry).
    pub expires_at: Option<Timestamp>,
    /// Whether the token has been consumed. Consumption is one-time.
    pub consumed: bool,
}

impl ApprovalToken {
    /// Issue a token for a session and scope, with an optional TTL in
    /// seconds.
    #[must_use]
    pub fn issue(session_id: SessionId, scope: ApprovalScope, ttl_secs: Option<i64>) -> Self {
        let expires_at = ttl_secs.map(|secs| {
            // chrono duration addition cannot overflow for config-sized TTLs
            #[allow(clippy::arithmetic_side_effects)]
            Timestamp::from_datetime(Utc::now() + Duration::seconds(secs))
        });
        Self {
            id: TokenId::new(),
            session_id,
            scope,
            issued_at: Timestamp::now(),
            expires_at,
            consumed: false,
        }
    }

    /// Check if the token has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at.as_ref().is_some_and(Timestamp::is_past)
    }

    /// Check if the token is live: unconsumed and unexpired.
    #[must_use]
    pub fn is_live(&self) -> bool {
        !self.consumed && !self.is_expired()
    }
}

impl fmt::Display for ApprovalToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.id, self.scope)
    }
}

#[cfg(test)]
#[allow(clippy::arithmetic_side_effects)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_without_ttl_never_expires() {
        let token = ApprovalToken::issue(
            SessionId::new(),
            ApprovalScope::exact("push to main"),
            None,
        );
        assert!(token.expires_at.is_none());
        assert!(!token.is_expired());
        assert!(token.is_live());
    }

    #[test]
    fn test_expired_token_is_not_live() {
        let mut token = ApprovalToken::issue(
            SessionId::new(),
            ApprovalScope::exact("push to main"),
            Some(900),
        );
        token.expires_at = Some(Timestamp::from_datetime(
            Utc::now() - Duration::seconds(1),
        ));
        assert!(token.is_expired());
        assert!(!token.is_live());
    }

    #[test]
    fn test_consumed_token_is_not_live() {
        let mut token =
            ApprovalToken::issue(SessionId::new(), ApprovalScope::exact("x"), None);
        token.consumed = true;
        assert!(!token.is_live());
    }

    #[test]
    fn test_serde_roundtrip() {
        let token = ApprovalToken::issue(
            SessionId::new(),
            ApprovalScope::exact("terraform apply"),
            Some(900),
        );
        let json = serde_json::to_string(&token).unwrap();
        let back: ApprovalToken = serde_json::from_str(&json).unwrap();
        assert_eq!(back, token);
    }
}
