//! Prelude module - commonly used types for convenient import.
//!
//! Use `use cordon_core::prelude::*;` to import all essential types.

// Identifiers & time
pub use crate::{AgentId, EventId, SessionId, Timestamp, TokenId};

// Classification
pub use crate::{Decision, Tier};

// Commands
pub use crate::{AtomicSubCommand, Connector, RawCommand, Redirection};

// Hashing
pub use crate::ContentHash;

// Errors
pub use crate::{CoreError, CoreResult};
