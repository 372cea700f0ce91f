//! Cordon Approval - scoped, single-consumption approval tokens.
//!
//! This crate provides:
//! - [`ApprovalScope`]: exact or explicitly-declared-pattern operation scopes
//! - [`ApprovalToken`]: one human approval, bound to one scope, consumable once
//! - [`ApprovalGate`]: issuance (only from `PENDING_APPROVAL`) and atomic
//!   consumption, with at most one outstanding token per session
//!
//! # Security model
//!
//! A token never outlives its purpose: it is scoped to a specific operation
//! description, expires on a configurable TTL, is invalidated by any newer
//! issuance for the same session, and is consumed exactly once. Scope
//! comparison is exact-string or explicit glob, never fuzzy, so approval
//! cannot creep onto unrelated operations.
//!
//! # Example
//!
//! ```
//! use cordon_approval::{ApprovalGate, ApprovalScope};
//! use cordon_core::SessionId;
//! use cordon_session::{AgentSession, WorkflowPhase};
//!
//! let gate = ApprovalGate::default();
//!
//! let mut session = AgentSession::new(SessionId::new());
//! session.transition(WorkflowPhase::PendingApproval).unwrap();
//!
//! let token = gate.issue(&session, ApprovalScope::exact("push to main")).unwrap();
//! let consumed = gate.consume(&session.id, &token.id, "push to main").unwrap();
//! assert!(consumed.consumed);
//!
//! // One-time: a replay fails closed.
//! assert!(gate.consume(&session.id, &token.id, "push to main").is_err());
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod error;
mod gate;
mod scope;
mod token;

pub use error::{ApprovalError, ApprovalResult};
pub use gate::ApprovalGate;
pub use scope::ApprovalScope;
pub use token::ApprovalToken;
