//! Block-list matcher - "does this sub-command match a known-destructive
//! pattern?"
//!
//! A match here is unconditional: it cannot be overridden by a later
//! safe-list signal in the same sub-command. Matching is structural over
//! normalized tokens, never a substring search over the raw string, so a
//! quoted literal (`echo "rm -rf"`) cannot false-positive and argument
//! reordering (`rm -f -r`) cannot false-negative.

use cordon_core::AtomicSubCommand;
use globset::Glob;
use tracing::debug;

use crate::tables::{BlockAction, BlockRule, RuleCategory};
use crate::tokens::{has_flag, has_simulation_flag, has_word, norm_args, norm_program};

/// A successful block-list match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockMatch {
    /// Identifier of the rule that matched.
    pub rule_id: String,
    /// Category of the matched rule.
    pub category: RuleCategory,
    /// What the match does to the final decision.
    pub action: BlockAction,
    /// Whether a recognized simulation/dry-run flag was present on this
    /// specific sub-command.
    pub simulated: bool,
}

/// Leaf classifier over the block-list.
#[derive(Debug, Clone)]
pub struct BlockedMatcher {
    rules: Vec<BlockRule>,
    simulation_flags: Vec<String>,
}

impl BlockedMatcher {
    /// Build a matcher over the given rules and simulation-flag table.
    #[must_use]
    pub fn new(rules: Vec<BlockRule>, simulation_flags: Vec<String>) -> Self {
        Self {
            rules,
            simulation_flags,
        }
    }

    /// Check one sub-command against the block-list.
    ///
    /// Returns the first matching rule in table order.
    #[must_use]
    pub fn check(&self, sub: &AtomicSubCommand) -> Option<BlockMatch> {
        let program = norm_program(sub);
        let args_lower = norm_args(sub);

        for rule in &self.rules {
            if !rule.program.eq_ignore_ascii_case(&program) {
                continue;
            }
            if !rule.require_args.iter().all(|t| has_word(&args_lower, t)) {
                continue;
            }
            if !rule.any_args.is_empty() && !rule.any_args.iter().any(|t| has_word(&args_lower, t))
            {
                continue;
            }
            if !rule.any_flags.is_empty()
                && !rule.any_flags.iter().any(|f| has_flag(&sub.args, f))
            {
                continue;
            }
            if !rule.any_path_globs.is_empty() && !matches_any_glob(&rule.any_path_globs, &sub.args)
            {
                continue;
            }

            let simulated = has_simulation_flag(&sub.args, &self.simulation_flags);
            debug!(rule = %rule.id, category = %rule.category, simulated, command = %sub, "block-list match");
            return Some(BlockMatch {
                rule_id: rule.id.clone(),
                category: rule.category,
                action: rule.action,
                simulated,
            });
        }
        None
    }
}

/// Check if any argument matches any glob pattern in the list.
fn matches_any_glob(patterns: &[String], args: &[String]) -> bool {
    patterns.iter().any(|pattern| {
        Glob::new(pattern).ok().is_some_and(|g| {
            let matcher = g.compile_matcher();
            args.iter().any(|a| matcher.is_match(a))
        })
    })
}

#[cfg(test)]
#[path = "blocked_tests.rs"]
mod tests;
