//! Cordon Core - shared types for the command-security gate.
//!
//! This crate provides:
//! - Identifier newtypes (`SessionId`, `TokenId`, `EventId`, `AgentId`)
//! - The security tier ladder ([`Tier`]) and final decisions ([`Decision`])
//! - Command types ([`RawCommand`], [`AtomicSubCommand`], [`Redirection`])
//! - Content hashing for audit chain linking ([`ContentHash`])
//!
//! # Example
//!
//! ```
//! use cordon_core::{Decision, RawCommand, Tier};
//!
//! let raw = RawCommand::new("shell", "kubectl get pods -n default");
//! assert_eq!(raw.tool, "shell");
//!
//! // Tiers are ordered: the worst sub-command wins.
//! assert!(Tier::Irreversible > Tier::ReadOnly);
//!
//! let decision = Decision::Allow;
//! assert!(decision.is_allow());
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod command;
mod error;
mod hash;
mod types;

pub use command::{AtomicSubCommand, Connector, RawCommand, Redirection};
pub use error::{CoreError, CoreResult};
pub use hash::ContentHash;
pub use types::{AgentId, Decision, EventId, SessionId, Tier, Timestamp, TokenId};
