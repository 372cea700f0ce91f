//! Cordon Gate - the engine facade.
//!
//! Every command a delegated automation agent attempts is evaluated here
//! before it executes: the raw string is decomposed into sub-commands,
//! matched against the safe and blocked tables, assigned a tier, checked
//! against the session's workflow phase and any approval token, and the
//! decision is written to the append-only audit log regardless of path.
//!
//! # Control flow
//!
//! ```text
//! ToolRequest
//!     |- parse failure ------------------> Deny (fail closed) + audit
//!     |- delegation tool ---> validator -> Allow / Deny + audit
//!     '- sub-commands -> matchers -> tier
//!            |- deny-action rule --------> Deny + audit
//!            |- tier maps to allow ------> Allow + audit
//!            '- tier maps to ask
//!                  |- valid token -------> consume, APPROVED_EXECUTING, Allow
//!                  '- otherwise --------->  PENDING_APPROVAL, Ask{scope} + audit
//! ```
//!
//! The engine never blocks waiting for approval: an ask decision returns
//! immediately with the exact scope string a future token must match, and
//! the orchestrator re-invokes with the token once a human approves.
//!
//! # Example
//!
//! ```
//! use cordon_config::GateConfig;
//! use cordon_core::{SessionId, Tier};
//! use cordon_gate::{CommandGate, ToolRequest};
//! # let dir = tempfile::TempDir::new().unwrap();
//!
//! let mut config = GateConfig::default();
//! config.audit.dir = dir.path().to_path_buf();
//! let gate = CommandGate::new(config).unwrap();
//!
//! let session = SessionId::new();
//! let decision = gate
//!     .evaluate(&ToolRequest::shell(session, "kubectl get pods -n default"))
//!     .unwrap();
//! assert!(decision.is_allow());
//! assert_eq!(decision.tier, Some(Tier::ReadOnly));
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod engine;
mod error;
mod request;
mod validator;

pub use engine::{
    CommandGate, RULE_DELEGATION_OK, RULE_DELEGATION_REJECTED, RULE_PARSE_FAIL_CLOSED,
    RULE_SESSION_STALE,
};
pub use error::{GateError, GateResult};
pub use request::{GateDecision, ToolRequest};
pub use validator::DelegationPolicy;
