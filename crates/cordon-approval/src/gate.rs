//! The approval gate: token issuance and atomic consumption.

use cordon_core::{SessionId, TokenId};
use cordon_session::{AgentSession, WorkflowPhase};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::{debug, warn};

use crate::error::{ApprovalError, ApprovalResult};
use crate::scope::ApprovalScope;
use crate::token::ApprovalToken;

/// Gate over approval tokens.
///
/// Holds at most one outstanding token per session: issuing a new one
/// implicitly invalidates the unconsumed prior one for that session.
/// Consumption is a one-time atomic operation under a single write lock -
/// a second attempt with the same token fails closed.
pub struct ApprovalGate {
    tokens: RwLock<HashMap<SessionId, ApprovalToken>>,
    ttl_secs: Option<i64>,
}

impl ApprovalGate {
    /// Create a gate with the given token TTL in seconds (None = no expiry).
    #[must_use]
    pub fn new(ttl_secs: Option<i64>) -> Self {
        Self {
            tokens: RwLock::new(HashMap::new()),
            ttl_secs,
        }
    }

    /// Issue a token for a session's pending operation.
    ///
    /// Only legal while the session is in `PENDING_APPROVAL`; the new token
    /// replaces any unconsumed prior token for the session.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalError::NotPendingApproval`] if the session is in
    /// any other phase, or a storage error if the lock is poisoned.
    pub fn issue(
        &self,
        session: &AgentSession,
        scope: ApprovalScope,
    ) -> ApprovalResult<ApprovalToken> {
        if session.phase != WorkflowPhase::PendingApproval {
            return Err(ApprovalError::NotPendingApproval {
                session_id: session.id.to_string(),
            });
        }
        let token = ApprovalToken::issue(session.id.clone(), scope, self.ttl_secs);
        let mut tokens = self
            .tokens
            .write()
            .map_err(|e| ApprovalError::Storage(e.to_string()))?;
        if let Some(prior) = tokens.insert(session.id.clone(), token.clone()) {
            if prior.is_live() {
                debug!(
                    session = %session.id,
                    superseded = %prior.id,
                    "new approval token invalidates unconsumed prior token"
                );
            }
        }
        debug!(session = %session.id, token = %token.id, "issued approval token");
        Ok(token)
    }

    /// Atomically consume a token against an execution attempt.
    ///
    /// Succeeds only if the presented token is the session's outstanding
    /// one, unconsumed, unexpired, and its stored scope matches the
    /// attempt. On success the token is marked consumed and returned.
    ///
    /// # Errors
    ///
    /// - [`ApprovalError::UnknownToken`] - no token exists for the session
    /// - [`ApprovalError::TokenSuperseded`] - a newer token replaced it
    /// - [`ApprovalError::AlreadyConsumed`] - second consumption attempt
    /// - [`ApprovalError::Expired`] - the token's TTL elapsed
    /// - [`ApprovalError::ScopeMismatch`] - the attempt is out of scope
    pub fn consume(
        &self,
        session_id: &SessionId,
        token_id: &TokenId,
        attempt_scope: &str,
    ) -> ApprovalResult<ApprovalToken> {
        let mut tokens = self
            .tokens
            .write()
            .map_err(|e| ApprovalError::Storage(e.to_string()))?;

        let token = tokens
            .get_mut(session_id)
            .ok_or_else(|| ApprovalError::UnknownToken {
                session_id: session_id.to_string(),
            })?;

        if token.id != *token_id {
            warn!(
                session = %session_id,
                presented = %token_id,
                "presented token superseded by a newer issuance"
            );
            return Err(ApprovalError::TokenSuperseded {
                token_id: token_id.to_string(),
            });
        }
        if token.consumed {
            warn!(token = %token_id, "replay: token already consumed");
            return Err(ApprovalError::AlreadyConsumed {
                token_id: token_id.to_string(),
            });
        }
        if token.is_expired() {
            return Err(ApprovalError::Expired {
                token_id: token_id.to_string(),
            });
        }
        if !token.scope.matches(attempt_scope) {
            warn!(
                token = %token_id,
                scope = %token.scope,
                attempt = %attempt_scope,
                "scope mismatch: treating as if no token were presented"
            );
            return Err(ApprovalError::ScopeMismatch {
                scope: token.scope.as_str().to_string(),
                attempt: attempt_scope.to_string(),
            });
        }

        token.consumed = true;
        debug!(token = %token_id, session = %session_id, "consumed approval token");
        Ok(token.clone())
    }

    /// The session's outstanding token, if any.
    #[must_use]
    pub fn outstanding(&self, session_id: &SessionId) -> Option<ApprovalToken> {
        let tokens = self.tokens.read().unwrap_or_else(|e| {
            warn!("ApprovalGate read lock poisoned, recovering");
            e.into_inner()
        });
        tokens.get(session_id).cloned()
    }

    /// Drop consumed and expired tokens. Returns the number removed.
    pub fn cleanup(&self) -> usize {
        let mut tokens = self.tokens.write().unwrap_or_else(|e| {
            warn!("ApprovalGate lock poisoned, recovering");
            e.into_inner()
        });
        let before = tokens.len();
        tokens.retain(|_, t| t.is_live());
        before.saturating_sub(tokens.len())
    }
}

impl Default for ApprovalGate {
    /// Gate with the default 15-minute token TTL.
    fn default() -> Self {
        Self::new(Some(15 * 60))
    }
}

impl std::fmt::Debug for ApprovalGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApprovalGate")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}
