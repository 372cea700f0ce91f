//! Cordon Shell - command decomposition for the security gate.
//!
//! This crate turns a raw command string into the ordered list of
//! [`AtomicSubCommand`](cordon_core::AtomicSubCommand)s the classifier
//! operates on. It recognizes pipes, sequencing, conditional chains, and
//! redirections, respects quoting and escaping, and rejects anything it
//! cannot decompose unambiguously.
//!
//! # Fail-closed contract
//!
//! A parse failure is a security signal, not a recoverable hiccup: the
//! caller must treat unparseable input as the most restrictive case.
//! Background execution (`&`), command substitution (`` ` ``, `$(`), and
//! process substitution (`<(`, `>(`) are rejected outright because they
//! detach or hide work the gate would otherwise classify.
//!
//! # Example
//!
//! ```
//! use cordon_shell::parse;
//!
//! let subs = parse("kubectl get pods && kubectl delete namespace prod").unwrap();
//! assert_eq!(subs.len(), 2);
//! assert_eq!(subs[0].rendered(), "kubectl get pods");
//! assert_eq!(subs[1].rendered(), "kubectl delete namespace prod");
//!
//! assert!(parse("echo $(whoami)").is_err());
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod error;
mod parser;

pub use error::{ShellError, ShellResult};
pub use parser::parse;
