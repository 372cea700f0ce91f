//! Cordon Config - the declarative configuration surface.
//!
//! The safe/block rule tables and the tier/timeout thresholds are loaded
//! from TOML at startup, validated once, and treated as read-only input
//! thereafter. The engine never mutates them.
//!
//! # Example
//!
//! ```
//! use cordon_config::{DecisionKind, GateConfig, from_toml_str};
//! use cordon_core::Tier;
//!
//! // Zero-config: seeded rule tables and fail-closed decision ladder.
//! let config = GateConfig::default();
//! assert_eq!(config.decisions.for_tier(Tier::Irreversible), DecisionKind::Ask);
//!
//! // Or from TOML, with unspecified sections falling back to defaults.
//! let config = from_toml_str(
//!     "[session]\nstaleness_secs = 600\nerror_cap = 3\ngc_window_secs = 7200\n",
//!     "<inline>",
//! ).unwrap();
//! assert_eq!(config.session.policy.staleness_secs, 600);
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod error;
mod loader;
mod types;
mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::{from_toml_str, load};
pub use types::{
    ApprovalSettings, AuditSettings, DecisionKind, DecisionPolicy, GateConfig, SessionSettings,
};
pub use validate::validate;
