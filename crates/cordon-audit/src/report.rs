//! Read-side aggregation over the audit log.
//!
//! Metrics are computed by streaming the partitions, never by maintaining a
//! separate mutable index - the log is the single source of truth.

use cordon_core::Decision;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::error::AuditResult;
use crate::event::AuditKind;
use crate::log::AuditLog;

/// Aggregate metrics over a rolling window of audit partitions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateReport {
    /// Total events in the window.
    pub total_events: usize,
    /// Evaluated commands that were allowed.
    pub allowed: usize,
    /// Evaluated commands held for approval.
    pub asked: usize,
    /// Evaluated commands refused.
    pub denied: usize,
    /// Completion events reporting success.
    pub completed_ok: usize,
    /// Completion events reporting failure.
    pub completed_failed: usize,
    /// Count of evaluated commands per tier label (`T0`..`T3`).
    pub tier_distribution: HashMap<String, usize>,
    /// Blocked-rule categories by match count, most frequent first.
    pub top_categories: Vec<(String, usize)>,
    /// Compound bypass attempts observed.
    pub bypass_attempts: usize,
}

impl GateReport {
    /// Build a report by streaming the last `days` partitions.
    ///
    /// # Errors
    ///
    /// Returns an io or serialization error from the underlying stream.
    pub fn over_window(log: &AuditLog, days: u32) -> AuditResult<Self> {
        let mut report = Self::default();
        let mut categories: HashMap<String, usize> = HashMap::new();

        for event in log.events_in_window(days)? {
            report.total_events = report.total_events.saturating_add(1);
            match &event.kind {
                AuditKind::CommandEvaluated {
                    tier,
                    category,
                    compound_bypass,
                    decision,
                    ..
                } => {
                    match decision {
                        Decision::Allow => {
                            report.allowed = report.allowed.saturating_add(1);
                        },
                        Decision::Ask { .. } => {
                            report.asked = report.asked.saturating_add(1);
                        },
                        Decision::Deny { .. } => {
                            report.denied = report.denied.saturating_add(1);
                        },
                    }
                    if let Some(tier) = tier {
                        bump(&mut report.tier_distribution, tier.label());
                    }
                    if let Some(category) = category {
                        bump(&mut categories, category);
                    }
                    if *compound_bypass {
                        report.bypass_attempts = report.bypass_attempts.saturating_add(1);
                    }
                },
                AuditKind::CommandCompleted { outcome, .. } => {
                    if outcome.is_success() {
                        report.completed_ok = report.completed_ok.saturating_add(1);
                    } else {
                        report.completed_failed = report.completed_failed.saturating_add(1);
                    }
                },
                AuditKind::ApprovalRequested { .. }
                | AuditKind::ApprovalGranted { .. }
                | AuditKind::ApprovalDenied { .. }
                | AuditKind::SessionAnomaly { .. } => {},
            }
        }

        let mut top: Vec<(String, usize)> = categories.into_iter().collect();
        top.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        report.top_categories = top;

        Ok(report)
    }

    /// Number of evaluated commands in the window.
    #[must_use]
    pub fn evaluated(&self) -> usize {
        self.allowed
            .saturating_add(self.asked)
            .saturating_add(self.denied)
    }
}

impl fmt::Display for GateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "audit window: {} events", self.total_events)?;
        writeln!(
            f,
            "decisions: {} allow / {} ask / {} deny",
            self.allowed, self.asked, self.denied
        )?;
        writeln!(
            f,
            "outcomes: {} ok / {} failed",
            self.completed_ok, self.completed_failed
        )?;
        let mut tiers: Vec<(&String, &usize)> = self.tier_distribution.iter().collect();
        tiers.sort();
        for (tier, count) in tiers {
            writeln!(f, "  {tier}: {count}")?;
        }
        if !self.top_categories.is_empty() {
            writeln!(f, "top offenders:")?;
            for (category, count) in &self.top_categories {
                writeln!(f, "  {category}: {count}")?;
            }
        }
        Ok(())
    }
}

fn bump(map: &mut HashMap<String, usize>, key: &str) {
    let entry = map.entry(key.to_string()).or_insert(0);
    *entry = entry.saturating_add(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventOutcome;
    use cordon_core::{SessionId, Tier};
    use tempfile::TempDir;

    fn evaluated(tier: Tier, category: Option<&str>, decision: Decision) -> AuditKind {
        AuditKind::CommandEvaluated {
            tool: "shell".to_string(),
            raw_command: "x".to_string(),
            sub_commands: vec!["x".to_string()],
            tier: Some(tier),
            rule_id: None,
            category: category.map(ToString::to_string),
            compound_bypass: false,
            decision,
        }
    }

    #[test]
    fn test_report_over_window() {
        let dir = TempDir::new().unwrap();
        let log = AuditLog::open(dir.path()).unwrap();
        let session = SessionId::new();

        log.append(&session, evaluated(Tier::ReadOnly, None, Decision::Allow))
            .unwrap();
        log.append(
            &session,
            evaluated(
                Tier::Irreversible,
                Some("cluster-mutate"),
                Decision::Ask {
                    scope: "kubectl delete ns prod".to_string(),
                    justification: "matched rule".to_string(),
                },
            ),
        )
        .unwrap();
        log.append(
            &session,
            evaluated(
                Tier::Irreversible,
                Some("cluster-mutate"),
                Decision::Deny {
                    reason: "blocked".to_string(),
                },
            ),
        )
        .unwrap();

        let first = log.events_in_window(1).unwrap()[0].id.clone();
        log.record_completion(&session, first, EventOutcome::success(), 10)
            .unwrap();
        let second = log.events_in_window(1).unwrap()[1].id.clone();
        log.record_completion(&session, second, EventOutcome::failure("boom"), 20)
            .unwrap();

        let report = GateReport::over_window(&log, 1).unwrap();
        assert_eq!(report.total_events, 5);
        assert_eq!(report.evaluated(), 3);
        assert_eq!(report.allowed, 1);
        assert_eq!(report.asked, 1);
        assert_eq!(report.denied, 1);
        assert_eq!(report.completed_ok, 1);
        assert_eq!(report.completed_failed, 1);
        assert_eq!(report.tier_distribution.get("T0"), Some(&1));
        assert_eq!(report.tier_distribution.get("T3"), Some(&2));
        assert_eq!(
            report.top_categories,
            vec![("cluster-mutate".to_string(), 2)]
        );
    }

    #[test]
    fn test_empty_window() {
        let dir = TempDir::new().unwrap();
        let log = AuditLog::open(dir.path()).unwrap();
        let report = GateReport::over_window(&log, 7).unwrap();
        assert_eq!(report.total_events, 0);
        assert_eq!(report.evaluated(), 0);
    }

    #[test]
    fn test_display_renders() {
        let dir = TempDir::new().unwrap();
        let log = AuditLog::open(dir.path()).unwrap();
        let report = GateReport::over_window(&log, 1).unwrap();
        let text = report.to_string();
        assert!(text.contains("decisions"));
    }
}
