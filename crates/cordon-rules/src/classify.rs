//! Tier classification - one verdict per sub-command, one tier per command.
//!
//! Combines the parser's decomposition with both leaf matchers plus the
//! contextual signals (simulation flags, redirections, operator
//! composition) to assign exactly one tier to the whole command.

use cordon_core::{AtomicSubCommand, Tier};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::blocked::BlockedMatcher;
use crate::safe::{LocalMatcher, SafeMatcher};
use crate::tables::{BlockAction, RuleCategory, RuleTables};

/// Rule id used when no table rule matched and the default policy applied.
pub const RULE_DEFAULT_UNCLASSIFIED: &str = "default.unclassified";
/// Rule id suffix recorded when a redirection forced the tier upward.
pub const RULE_REDIRECTION: &str = "default.redirection";

/// The verdict for one atomic sub-command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationVerdict {
    /// Assigned tier for this sub-command.
    pub tier: Tier,
    /// Whether a block-list rule matched.
    pub matched_blocklist: bool,
    /// Identifier of the rule that determined the tier.
    pub rule_id: String,
    /// Category of the matched block rule, if any.
    pub category: Option<RuleCategory>,
    /// Action of the matched block rule, if any.
    pub block_action: Option<BlockAction>,
    /// Whether this sub-command sits behind a benign-looking prefix in a
    /// compound chain (or receives piped output) in a way that could hide it.
    pub is_compound_bypass_attempt: bool,
    /// Human-readable explanation referencing the matched rule.
    pub reason: String,
}

/// The classification of a whole command: per-sub verdicts plus the
/// aggregate tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandClassification {
    /// Per-sub-command verdicts, in command order.
    pub verdicts: Vec<ClassificationVerdict>,
    /// Final tier: the maximum severity over all sub-commands.
    pub tier: Tier,
    /// Whether any sub-command was flagged as a compound bypass attempt.
    pub is_compound_bypass_attempt: bool,
    /// Index of the worst sub-command (first occurrence of the final tier).
    pub worst_index: usize,
    /// Deny reason, set when any matched block rule carries the deny action.
    pub deny_reason: Option<String>,
}

impl CommandClassification {
    /// The verdict of the worst sub-command, if any sub-command exists.
    #[must_use]
    pub fn worst(&self) -> Option<&ClassificationVerdict> {
        self.verdicts.get(self.worst_index)
    }
}

/// The tier classifier: owns the three matchers built from one table set.
#[derive(Debug, Clone)]
pub struct Classifier {
    safe: SafeMatcher,
    local: LocalMatcher,
    blocked: BlockedMatcher,
}

impl Classifier {
    /// Build a classifier from a rule table set.
    #[must_use]
    pub fn new(tables: RuleTables) -> Self {
        Self {
            safe: SafeMatcher::new(tables.safe_rules),
            local: LocalMatcher::new(tables.local_rules),
            blocked: BlockedMatcher::new(tables.block_rules, tables.simulation_flags),
        }
    }

    /// Classify one sub-command in isolation.
    ///
    /// Check order is fixed: block-list first (unconditional), then the
    /// safe-list, then the local-list, then the default-T2 policy. A
    /// redirection raises the tier to at least T2 afterwards.
    #[must_use]
    pub fn classify_sub(&self, sub: &AtomicSubCommand) -> ClassificationVerdict {
        let mut verdict = if let Some(m) = self.blocked.check(sub) {
            let (tier, reason) = if m.simulated {
                (
                    Tier::Reversible,
                    format!(
                        "matched block rule {} ({}) with a recognized simulation flag",
                        m.rule_id, m.category
                    ),
                )
            } else {
                (
                    Tier::Irreversible,
                    format!("matched block rule {} ({})", m.rule_id, m.category),
                )
            };
            ClassificationVerdict {
                tier,
                matched_blocklist: true,
                rule_id: m.rule_id,
                category: Some(m.category),
                block_action: Some(m.action),
                is_compound_bypass_attempt: false,
                reason,
            }
        } else if let Some(m) = self.safe.check(sub) {
            ClassificationVerdict {
                tier: Tier::ReadOnly,
                matched_blocklist: false,
                reason: format!("matched safe rule {}", m.rule_id),
                rule_id: m.rule_id,
                category: None,
                block_action: None,
                is_compound_bypass_attempt: false,
            }
        } else if let Some(m) = self.local.check(sub) {
            ClassificationVerdict {
                tier: Tier::LocalOnly,
                matched_blocklist: false,
                reason: format!("matched local rule {}", m.rule_id),
                rule_id: m.rule_id,
                category: None,
                block_action: None,
                is_compound_bypass_attempt: false,
            }
        } else {
            // Unknown is medium risk, never silently safe.
            ClassificationVerdict {
                tier: Tier::Reversible,
                matched_blocklist: false,
                rule_id: RULE_DEFAULT_UNCLASSIFIED.to_string(),
                category: None,
                block_action: None,
                is_compound_bypass_attempt: false,
                reason: format!("no rule matched '{}'; defaulting to T2", sub.base_program()),
            }
        };

        if sub.has_redirection() && verdict.tier < Tier::Reversible {
            verdict.tier = Tier::Reversible;
            verdict.rule_id = RULE_REDIRECTION.to_string();
            verdict.reason = "redirection present; forcing at least T2".to_string();
        }

        verdict
    }

    /// Classify a full ordered command.
    ///
    /// The final tier is the maximum severity over the parts; it never
    /// degrades because one part looks benign. A sub-command of tier >= T2
    /// that is not the first in a compound chain is flagged as a compound
    /// bypass attempt.
    #[must_use]
    pub fn classify(&self, subs: &[AtomicSubCommand]) -> CommandClassification {
        let mut verdicts: Vec<ClassificationVerdict> =
            subs.iter().map(|s| self.classify_sub(s)).collect();

        if subs.len() > 1 {
            for (i, verdict) in verdicts.iter_mut().enumerate() {
                if i > 0 && verdict.tier >= Tier::Reversible {
                    verdict.is_compound_bypass_attempt = true;
                }
            }
        }

        let tier = verdicts
            .iter()
            .map(|v| v.tier)
            .max()
            .unwrap_or(Tier::Reversible);
        let worst_index = verdicts
            .iter()
            .position(|v| v.tier == tier)
            .unwrap_or(0);
        let is_compound_bypass_attempt =
            verdicts.iter().any(|v| v.is_compound_bypass_attempt);
        let deny_reason = verdicts
            .iter()
            .find(|v| v.block_action == Some(BlockAction::Deny))
            .map(|v| v.reason.clone());

        debug!(
            %tier,
            segments = subs.len(),
            bypass = is_compound_bypass_attempt,
            "classified command"
        );

        CommandClassification {
            verdicts,
            tier,
            is_compound_bypass_attempt,
            worst_index,
            deny_reason,
        }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(RuleTables::default())
    }
}

#[cfg(test)]
#[path = "classify_tests.rs"]
mod tests;
