//! Keyed in-memory store for session state.
//!
//! Sessions are addressed by opaque id into a locked map - never through
//! shared mutable globals - so concurrent sessions are naturally isolated
//! and the store can be swapped for a different backing implementation
//! without touching classification logic.

use cordon_core::SessionId;
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::{debug, warn};

use crate::error::{SessionError, SessionResult};
use crate::phase::WorkflowPhase;
use crate::session::{AgentSession, SessionPolicy};

/// Thread-safe store of active agent sessions.
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionId, AgentSession>>,
    policy: SessionPolicy,
}

impl SessionStore {
    /// Create a store with the given resume policy.
    #[must_use]
    pub fn new(policy: SessionPolicy) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            policy,
        }
    }

    /// The resume policy this store enforces.
    #[must_use]
    pub fn policy(&self) -> &SessionPolicy {
        &self.policy
    }

    /// Get a snapshot of a session's state, creating the session on first
    /// sight of the id.
    ///
    /// An existing session's last-activity timestamp is left untouched so
    /// that staleness checks see the silence that preceded this request;
    /// call [`touch`](Self::touch) once the session is allowed to proceed.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the internal lock is poisoned.
    pub fn get_or_create(&self, id: &SessionId) -> SessionResult<AgentSession> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| SessionError::Storage(e.to_string()))?;
        let session = sessions.entry(id.clone()).or_insert_with(|| {
            debug!(session = %id, "created session");
            AgentSession::new(id.clone())
        });
        Ok(session.clone())
    }

    /// Record activity on a session without changing its phase.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnknownSession`] or a storage error.
    pub fn touch(&self, id: &SessionId) -> SessionResult<()> {
        self.with_session(id, |s| {
            s.touch();
            Ok(())
        })
    }

    /// Get a snapshot of a session without creating it.
    #[must_use]
    pub fn get(&self, id: &SessionId) -> Option<AgentSession> {
        let sessions = self.sessions.read().unwrap_or_else(|e| {
            warn!("SessionStore read lock poisoned, recovering");
            e.into_inner()
        });
        sessions.get(id).cloned()
    }

    /// Run a mutation against a session under the write lock.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnknownSession`] if the id has never been
    /// seen, a storage error if the lock is poisoned, or whatever the
    /// mutation itself returns.
    pub fn with_session<T>(
        &self,
        id: &SessionId,
        f: impl FnOnce(&mut AgentSession) -> SessionResult<T>,
    ) -> SessionResult<T> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| SessionError::Storage(e.to_string()))?;
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| SessionError::UnknownSession {
                session_id: id.to_string(),
            })?;
        f(session)
    }

    /// Attempt a phase transition on a session.
    ///
    /// # Errors
    ///
    /// Propagates [`SessionError::InvalidTransition`] from the session, or
    /// [`SessionError::UnknownSession`] / storage errors from the store.
    pub fn transition(&self, id: &SessionId, to: WorkflowPhase) -> SessionResult<()> {
        self.with_session(id, |s| s.transition(to))
    }

    /// Record a local failure against a session's error budget.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnknownSession`] or a storage error.
    pub fn record_error(&self, id: &SessionId) -> SessionResult<()> {
        self.with_session(id, |s| {
            s.record_error();
            Ok(())
        })
    }

    /// Check resume eligibility for a session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Stale`] with the specific obstacle if the
    /// session cannot resume, or [`SessionError::UnknownSession`].
    pub fn check_resumable(&self, id: &SessionId) -> SessionResult<()> {
        let session = self.get(id).ok_or_else(|| SessionError::UnknownSession {
            session_id: id.to_string(),
        })?;
        match session.resume_obstacle(&self.policy) {
            None => Ok(()),
            Some(reason) => Err(SessionError::Stale { reason }),
        }
    }

    /// Drop sessions that have been inactive longer than `gc_window_secs`.
    ///
    /// Returns the number of sessions removed.
    pub fn sweep_stale(&self, gc_window_secs: i64) -> usize {
        let mut sessions = self.sessions.write().unwrap_or_else(|e| {
            warn!("SessionStore lock poisoned, recovering");
            e.into_inner()
        });
        let before = sessions.len();
        sessions.retain(|_, s| s.last_activity.age_secs() <= gc_window_secs);
        let removed = before.saturating_sub(sessions.len());
        if removed > 0 {
            debug!(removed, "swept stale sessions");
        }
        removed
    }

    /// Number of tracked sessions.
    #[must_use]
    pub fn count(&self) -> usize {
        let sessions = self.sessions.read().unwrap_or_else(|e| {
            warn!("SessionStore read lock poisoned, recovering");
            e.into_inner()
        });
        sessions.len()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(SessionPolicy::default())
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
