//! Configuration types.

use cordon_core::Tier;
use cordon_rules::RuleTables;
use cordon_session::SessionPolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Decision applied to a tier when no block rule forces otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionKind {
    /// Proceed silently.
    Allow,
    /// Hold for human approval.
    Ask,
}

/// Per-tier decision mapping.
///
/// Defaults follow the fail-closed ladder: read-only and local-only
/// commands proceed, everything reversible or worse asks. A deployment may
/// relax the reversible tier to allow, but the irreversible tier always
/// asks (or is denied by rule action).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionPolicy {
    /// Decision for tier T0.
    #[serde(default = "allow")]
    pub read_only: DecisionKind,
    /// Decision for tier T1.
    #[serde(default = "allow")]
    pub local_only: DecisionKind,
    /// Decision for tier T2.
    #[serde(default = "ask")]
    pub reversible: DecisionKind,
    /// Decision for tier T3.
    #[serde(default = "ask")]
    pub irreversible: DecisionKind,
}

fn allow() -> DecisionKind {
    DecisionKind::Allow
}

fn ask() -> DecisionKind {
    DecisionKind::Ask
}

impl DecisionPolicy {
    /// The configured decision for a tier.
    #[must_use]
    pub fn for_tier(&self, tier: Tier) -> DecisionKind {
        match tier {
            Tier::ReadOnly => self.read_only,
            Tier::LocalOnly => self.local_only,
            Tier::Reversible => self.reversible,
            Tier::Irreversible => self.irreversible,
        }
    }
}

impl Default for DecisionPolicy {
    fn default() -> Self {
        Self {
            read_only: DecisionKind::Allow,
            local_only: DecisionKind::Allow,
            reversible: DecisionKind::Ask,
            irreversible: DecisionKind::Ask,
        }
    }
}

/// Approval-token settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalSettings {
    /// Token time-to-live in seconds (None = no expiry).
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: Option<i64>,
}

fn default_token_ttl() -> Option<i64> {
    Some(15 * 60)
}

impl Default for ApprovalSettings {
    fn default() -> Self {
        Self {
            token_ttl_secs: default_token_ttl(),
        }
    }
}

/// Audit-log settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditSettings {
    /// Directory holding the per-day partitions.
    #[serde(default = "default_audit_dir")]
    pub dir: PathBuf,
    /// Rolling window, in days, for the aggregate report.
    #[serde(default = "default_report_window")]
    pub report_window_days: u32,
}

fn default_audit_dir() -> PathBuf {
    PathBuf::from("audit")
}

fn default_report_window() -> u32 {
    7
}

impl Default for AuditSettings {
    fn default() -> Self {
        Self {
            dir: default_audit_dir(),
            report_window_days: default_report_window(),
        }
    }
}

/// Session GC settings beyond the resume policy itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Resume policy (staleness window, error cap).
    #[serde(flatten)]
    pub policy: SessionPolicy,
    /// Inactivity window in seconds after which session records are
    /// garbage-collected entirely.
    #[serde(default = "default_gc_window")]
    pub gc_window_secs: i64,
}

fn default_gc_window() -> i64 {
    2 * 60 * 60
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            policy: SessionPolicy::default(),
            gc_window_secs: default_gc_window(),
        }
    }
}

/// The complete gate configuration.
///
/// Loaded from an external declarative source at startup and treated as
/// read-only input thereafter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GateConfig {
    /// Session resume and GC settings.
    #[serde(default)]
    pub session: SessionSettings,
    /// Approval-token settings.
    #[serde(default)]
    pub approval: ApprovalSettings,
    /// Audit-log settings.
    #[serde(default)]
    pub audit: AuditSettings,
    /// Per-tier decision mapping.
    #[serde(default)]
    pub decisions: DecisionPolicy,
    /// The safe/local/block rule tables.
    #[serde(default = "RuleTables::default")]
    pub rules: RuleTables,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_ladder() {
        let policy = DecisionPolicy::default();
        assert_eq!(policy.for_tier(Tier::ReadOnly), DecisionKind::Allow);
        assert_eq!(policy.for_tier(Tier::LocalOnly), DecisionKind::Allow);
        assert_eq!(policy.for_tier(Tier::Reversible), DecisionKind::Ask);
        assert_eq!(policy.for_tier(Tier::Irreversible), DecisionKind::Ask);
    }

    #[test]
    fn test_default_config_has_seeded_rules() {
        let config = GateConfig::default();
        assert!(!config.rules.block_rules.is_empty());
        assert_eq!(config.approval.token_ttl_secs, Some(900));
        assert_eq!(config.session.policy.staleness_secs, 1800);
        assert_eq!(config.session.policy.error_cap, 3);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: GateConfig = toml::from_str(
            r#"
            [session]
            staleness_secs = 600
            error_cap = 5
            gc_window_secs = 3600
            "#,
        )
        .unwrap();
        assert_eq!(config.session.policy.staleness_secs, 600);
        assert_eq!(config.session.policy.error_cap, 5);
        // Unspecified sections fall back to defaults.
        assert_eq!(config.audit.report_window_days, 7);
        assert!(!config.rules.safe_rules.is_empty());
    }
}
