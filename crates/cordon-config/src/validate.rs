//! Configuration validation.
//!
//! Validates that deserialized [`GateConfig`](crate::GateConfig) values are
//! within acceptable ranges and that the rule tables are internally
//! consistent. The engine treats configuration as read-only, so everything
//! is checked once, up front.

use globset::Glob;
use std::collections::HashSet;

use crate::error::{ConfigError, ConfigResult};
use crate::types::GateConfig;

/// Validate a fully-parsed configuration.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate(config: &GateConfig) -> ConfigResult<()> {
    validate_session(config)?;
    validate_approval(config)?;
    validate_audit(config)?;
    validate_rules(config)?;
    Ok(())
}

fn validate_session(config: &GateConfig) -> ConfigResult<()> {
    let s = &config.session;
    if s.policy.staleness_secs <= 0 {
        return Err(ConfigError::ValidationError {
            field: "session.staleness_secs".to_owned(),
            message: "must be positive".to_owned(),
        });
    }
    if s.policy.error_cap == 0 {
        return Err(ConfigError::ValidationError {
            field: "session.error_cap".to_owned(),
            message: "must be at least 1".to_owned(),
        });
    }
    if s.gc_window_secs < s.policy.staleness_secs {
        return Err(ConfigError::ValidationError {
            field: "session.gc_window_secs".to_owned(),
            message: "must be at least the staleness window".to_owned(),
        });
    }
    Ok(())
}

fn validate_approval(config: &GateConfig) -> ConfigResult<()> {
    if let Some(ttl) = config.approval.token_ttl_secs
        && ttl <= 0
    {
        return Err(ConfigError::ValidationError {
            field: "approval.token_ttl_secs".to_owned(),
            message: "must be positive when set".to_owned(),
        });
    }
    Ok(())
}

fn validate_audit(config: &GateConfig) -> ConfigResult<()> {
    if config.audit.report_window_days == 0 {
        return Err(ConfigError::ValidationError {
            field: "audit.report_window_days".to_owned(),
            message: "must be at least 1".to_owned(),
        });
    }
    Ok(())
}

fn validate_rules(config: &GateConfig) -> ConfigResult<()> {
    let rules = &config.rules;
    let mut seen: HashSet<&str> = HashSet::new();

    let ids = rules
        .safe_rules
        .iter()
        .map(|r| (r.id.as_str(), r.program.as_str()))
        .chain(rules.local_rules.iter().map(|r| (r.id.as_str(), r.program.as_str())))
        .chain(rules.block_rules.iter().map(|r| (r.id.as_str(), r.program.as_str())));

    for (id, program) in ids {
        if id.is_empty() {
            return Err(ConfigError::ValidationError {
                field: "rules".to_owned(),
                message: "rule with empty id".to_owned(),
            });
        }
        if program.is_empty() {
            return Err(ConfigError::ValidationError {
                field: format!("rules.{id}"),
                message: "empty program".to_owned(),
            });
        }
        if !seen.insert(id) {
            return Err(ConfigError::ValidationError {
                field: format!("rules.{id}"),
                message: "duplicate rule id".to_owned(),
            });
        }
    }

    for rule in &rules.block_rules {
        for pattern in &rule.any_path_globs {
            if let Err(e) = Glob::new(pattern) {
                return Err(ConfigError::ValidationError {
                    field: format!("rules.{}.any_path_globs", rule.id),
                    message: format!("invalid glob '{pattern}': {e}"),
                });
            }
        }
    }

    for flag in &rules.simulation_flags {
        if !flag.starts_with('-') {
            return Err(ConfigError::ValidationError {
                field: "rules.simulation_flags".to_owned(),
                message: format!("'{flag}' does not look like a flag"),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cordon_rules::{BlockAction, BlockRule, RuleCategory};

    #[test]
    fn test_default_config_validates() {
        validate(&GateConfig::default()).unwrap();
    }

    #[test]
    fn test_zero_staleness_rejected() {
        let mut config = GateConfig::default();
        config.session.policy.staleness_secs = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_gc_window_shorter_than_staleness_rejected() {
        let mut config = GateConfig::default();
        config.session.gc_window_secs = 60;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_nonpositive_ttl_rejected() {
        let mut config = GateConfig::default();
        config.approval.token_ttl_secs = Some(0);
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_duplicate_rule_id_rejected() {
        let mut config = GateConfig::default();
        let first = config.rules.block_rules[0].clone();
        config.rules.block_rules.push(first);
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_bad_glob_rejected() {
        let mut config = GateConfig::default();
        config.rules.block_rules.push(BlockRule {
            id: "bad.glob".to_string(),
            category: RuleCategory::CredentialExposure,
            program: "cat".to_string(),
            require_args: Vec::new(),
            any_args: Vec::new(),
            any_flags: Vec::new(),
            any_path_globs: vec!["bad[glob".to_string()],
            action: BlockAction::Deny,
        });
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("invalid glob"));
    }

    #[test]
    fn test_bad_simulation_flag_rejected() {
        let mut config = GateConfig::default();
        config.rules.simulation_flags.push("dryrun".to_string());
        assert!(validate(&config).is_err());
    }
}
