//! Cordon Rules - declarative rule tables, leaf matchers, and the tier
//! classifier.
//!
//! This crate provides:
//! - [`RuleTables`]: versioned, serializable safe/local/block rule tables
//! - [`SafeMatcher`] / [`LocalMatcher`]: additive allow-list classifiers
//! - [`BlockedMatcher`]: unconditional destructive-pattern classifier
//! - [`Classifier`]: combines all signals into one tier per command
//!
//! # Rule tables are data, not code
//!
//! The pattern tables are plain serializable structs loaded from
//! configuration at startup. The classifier is testable in isolation from
//! rule content: swap in [`RuleTables::empty`] and everything defaults to
//! the ask tier.
//!
//! # Example
//!
//! ```
//! use cordon_core::Tier;
//! use cordon_rules::Classifier;
//! use cordon_shell::parse;
//!
//! let classifier = Classifier::default();
//!
//! let subs = parse("kubectl get pods -n default").unwrap();
//! assert_eq!(classifier.classify(&subs).tier, Tier::ReadOnly);
//!
//! let subs = parse("kubectl get pods && kubectl delete namespace prod").unwrap();
//! let classification = classifier.classify(&subs);
//! assert_eq!(classification.tier, Tier::Irreversible);
//! assert!(classification.is_compound_bypass_attempt);
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod blocked;
mod classify;
mod safe;
mod tables;
mod tokens;

pub use blocked::{BlockMatch, BlockedMatcher};
pub use classify::{
    ClassificationVerdict, Classifier, CommandClassification, RULE_DEFAULT_UNCLASSIFIED,
    RULE_REDIRECTION,
};
pub use safe::{LocalMatcher, SafeMatch, SafeMatcher};
pub use tables::{BlockAction, BlockRule, LocalRule, RuleCategory, RuleTables, SafeRule};
