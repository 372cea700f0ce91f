//! Cordon Audit - append-only, chain-linked decision logging.
//!
//! This crate provides:
//! - [`AuditEvent`] / [`AuditKind`]: immutable records of every
//!   classification decision, approval event, and completion callback
//! - [`AuditLog`]: per-day JSONL partitions with atomic single-record
//!   appends and per-session hash chains
//! - [`GateReport`]: aggregate metrics computed by streaming the log
//!
//! # Append-only model
//!
//! Entries are never overwritten or deleted. Outcome information arrives
//! after the fact via a completion callback; it is recorded by appending a
//! second event referencing the first. Chain linking (each event carries
//! the blake3 hash of the previous one for its session) makes mutation of
//! history detectable.
//!
//! # Example
//!
//! ```
//! use cordon_audit::{AuditKind, AuditLog, EventOutcome, GateReport};
//! use cordon_core::{Decision, SessionId, Tier};
//! # let dir = tempfile::TempDir::new().unwrap();
//!
//! let log = AuditLog::open(dir.path()).unwrap();
//! let session = SessionId::new();
//!
//! let event = log.append(&session, AuditKind::CommandEvaluated {
//!     tool: "shell".to_string(),
//!     raw_command: "ls".to_string(),
//!     sub_commands: vec!["ls".to_string()],
//!     tier: Some(Tier::ReadOnly),
//!     rule_id: Some("safe.ls".to_string()),
//!     category: None,
//!     compound_bypass: false,
//!     decision: Decision::Allow,
//! }).unwrap();
//!
//! log.record_completion(&session, event.id, EventOutcome::success(), 12).unwrap();
//!
//! let report = GateReport::over_window(&log, 1).unwrap();
//! assert_eq!(report.allowed, 1);
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod error;
mod event;
mod log;
mod report;

pub use error::{AuditError, AuditResult};
pub use event::{AuditEvent, AuditKind, EventOutcome};
pub use log::AuditLog;
pub use report::GateReport;
