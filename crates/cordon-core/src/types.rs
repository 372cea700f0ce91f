//! Common types used throughout Cordon.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a delegated agent session.
///
/// Created on the first tool invocation carrying a given id; the gate keys
/// all workflow state and approval tokens by this.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Create a new random session ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a session ID from a UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session:{}", self.0)
    }
}

/// Unique identifier for a delegated agent instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentId(pub Uuid);

impl AgentId {
    /// Create a new random agent ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AgentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "agent:{}", self.0)
    }
}

/// Unique identifier for an approval token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenId(pub Uuid);

impl TokenId {
    /// Create a new random token ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TokenId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "token:{}", self.0)
    }
}

/// Unique identifier for an audit event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub Uuid);

impl EventId {
    /// Create a new random event ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "event:{}", self.0)
    }
}

/// Timestamp wrapper for consistent handling throughout Cordon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub DateTime<Utc>);

impl Timestamp {
    /// Get the current timestamp.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Create a timestamp from a `DateTime<Utc>`.
    #[must_use]
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Check if this timestamp is in the past.
    #[must_use]
    pub fn is_past(&self) -> bool {
        self.0 < Utc::now()
    }

    /// Check if this timestamp is in the future.
    #[must_use]
    pub fn is_future(&self) -> bool {
        self.0 > Utc::now()
    }

    /// Seconds elapsed since this timestamp. Negative if it lies in the future.
    #[must_use]
    pub fn age_secs(&self) -> i64 {
        Utc::now().signed_duration_since(self.0).num_seconds()
    }

    /// Get the inner `DateTime<Utc>`.
    #[must_use]
    pub fn into_inner(self) -> DateTime<Utc> {
        self.0
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%dT%H:%M:%SZ"))
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

impl From<Timestamp> for DateTime<Utc> {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

/// Security tier assigned to a command.
///
/// Tiers are ordered by severity so that the tier of a compound command is
/// the maximum over its sub-commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Read-only. Allowed without approval.
    ReadOnly,
    /// Mutates local state only (working tree, local files, build artifacts).
    LocalOnly,
    /// Remote or reversible mutation, including simulated destructive runs.
    Reversible,
    /// Irreversible or destructive operation.
    Irreversible,
}

impl Tier {
    /// Check if this tier requires human approval under the default policy.
    #[must_use]
    pub fn requires_approval(&self) -> bool {
        matches!(self, Self::Reversible | Self::Irreversible)
    }

    /// The short wire label (`T0`..`T3`).
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::ReadOnly => "T0",
            Self::LocalOnly => "T1",
            Self::Reversible => "T2",
            Self::Irreversible => "T3",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadOnly => write!(f, "T0 (read-only)"),
            Self::LocalOnly => write!(f, "T1 (local-only)"),
            Self::Reversible => write!(f, "T2 (reversible)"),
            Self::Irreversible => write!(f, "T3 (irreversible)"),
        }
    }
}

/// Final decision for a tool-invocation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    /// Proceed silently.
    Allow,
    /// Surface to a human with a rule-based justification.
    Ask {
        /// The exact scope string an eventual approval token must match.
        scope: String,
        /// Human-readable justification referencing the matched rule.
        justification: String,
    },
    /// Refuse outright.
    Deny {
        /// Why the request was refused.
        reason: String,
    },
}

impl Decision {
    /// Check if this decision allows the request to proceed.
    #[must_use]
    pub fn is_allow(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Check if this decision requires human confirmation.
    #[must_use]
    pub fn is_ask(&self) -> bool {
        matches!(self, Self::Ask { .. })
    }

    /// Check if this decision refuses the request.
    #[must_use]
    pub fn is_deny(&self) -> bool {
        matches!(self, Self::Deny { .. })
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allow => write!(f, "allow"),
            Self::Ask { justification, .. } => write!(f, "ask: {justification}"),
            Self::Deny { reason } => write!(f, "deny: {reason}"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::arithmetic_side_effects)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id() {
        let id1 = SessionId::new();
        let id2 = SessionId::new();
        assert_ne!(id1, id2);
        assert!(id1.to_string().starts_with("session:"));
    }

    #[test]
    fn test_token_id() {
        let id = TokenId::new();
        assert!(id.to_string().starts_with("token:"));
    }

    #[test]
    fn test_event_id() {
        let id = EventId::new();
        assert!(id.to_string().starts_with("event:"));
    }

    #[test]
    fn test_timestamp() {
        let ts = Timestamp::now();
        assert!(!ts.is_future());

        let past = Timestamp::from_datetime(Utc::now() - chrono::Duration::hours(1));
        assert!(past.is_past());
        assert!(past.age_secs() >= 3600);
    }

    #[test]
    fn test_tier_ordering() {
        assert!(Tier::ReadOnly < Tier::LocalOnly);
        assert!(Tier::LocalOnly < Tier::Reversible);
        assert!(Tier::Reversible < Tier::Irreversible);
    }

    #[test]
    fn test_tier_max_is_worst() {
        let tiers = [Tier::ReadOnly, Tier::Irreversible, Tier::LocalOnly];
        assert_eq!(tiers.iter().copied().max(), Some(Tier::Irreversible));
    }

    #[test]
    fn test_tier_labels() {
        assert_eq!(Tier::ReadOnly.label(), "T0");
        assert_eq!(Tier::Irreversible.label(), "T3");
        assert!(!Tier::ReadOnly.requires_approval());
        assert!(Tier::Reversible.requires_approval());
        assert!(Tier::Irreversible.requires_approval());
    }

    #[test]
    fn test_decision_predicates() {
        assert!(Decision::Allow.is_allow());
        let ask = Decision::Ask {
            scope: "terraform apply".to_string(),
            justification: "matched rule infra.terraform.apply".to_string(),
        };
        assert!(ask.is_ask());
        let deny = Decision::Deny {
            reason: "unparseable command".to_string(),
        };
        assert!(deny.is_deny());
        assert!(deny.to_string().contains("unparseable"));
    }

    #[test]
    fn test_decision_serialization() {
        let ask = Decision::Ask {
            scope: "kubectl delete namespace prod".to_string(),
            justification: "matched rule cluster.kubectl.delete".to_string(),
        };
        let json = serde_json::to_string(&ask).unwrap();
        assert!(json.contains("\"decision\":\"ask\""));
        let back: Decision = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ask);
    }

    #[test]
    fn test_tier_serialization() {
        let json = serde_json::to_string(&Tier::Irreversible).unwrap();
        assert_eq!(json, "\"irreversible\"");
    }
}
