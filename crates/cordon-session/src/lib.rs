//! Cordon Session - per-session workflow state tracking.
//!
//! This crate provides:
//! - [`WorkflowPhase`]: the multi-step task state machine
//! - [`AgentSession`]: one session's phase, history, and error budget
//! - [`SessionStore`]: keyed, thread-safe store with staleness GC
//!
//! # State machine
//!
//! `INVESTIGATING` is the initial phase. A T3 verdict with no valid token
//! moves the session to `PENDING_APPROVAL`; a matching human approval moves
//! it to `APPROVED_EXECUTING`; `COMPLETE` and `BLOCKED` are terminal.
//! Out-of-order transitions are rejected and logged as anomalies - the
//! session stays in its prior phase.
//!
//! # Example
//!
//! ```
//! use cordon_core::SessionId;
//! use cordon_session::{SessionStore, WorkflowPhase};
//!
//! let store = SessionStore::default();
//! let id = SessionId::new();
//!
//! store.get_or_create(&id).unwrap();
//! store.transition(&id, WorkflowPhase::PendingApproval).unwrap();
//!
//! // Skipping PENDING_APPROVAL is impossible:
//! let fresh = SessionId::new();
//! store.get_or_create(&fresh).unwrap();
//! assert!(store.transition(&fresh, WorkflowPhase::ApprovedExecuting).is_err());
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod error;
mod phase;
mod session;
mod store;

pub use error::{SessionError, SessionResult};
pub use phase::WorkflowPhase;
pub use session::{AgentSession, PhaseTransition, SessionPolicy};
pub use store::SessionStore;
