//! Allow-list matchers - "is this sub-command unconditionally read-only
//! (or local-only)?"
//!
//! Both matchers are purely additive: a miss is not a judgment, it just
//! means the decision falls through to the other classification signals.

use cordon_core::AtomicSubCommand;
use tracing::debug;

use crate::tables::{LocalRule, SafeRule};
use crate::tokens::{has_word, norm_args, norm_program, verb_matches, word_tokens};

/// A successful allow-list match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeMatch {
    /// Identifier of the rule that matched.
    pub rule_id: String,
}

/// Core rule evaluation shared by the safe and local matchers.
///
/// A rule matches when the program agrees, every consulted token is
/// consistent with the rule's verbs, and no disqualifying verb appears
/// anywhere in the argument list - a safe-looking prefix is not enough.
fn rule_matches(
    program: &str,
    subcommands: &[String],
    deny_args: &[String],
    sub_program: &str,
    args_lower: &[String],
) -> bool {
    if !program.eq_ignore_ascii_case(sub_program) {
        return false;
    }
    if deny_args.iter().any(|d| has_word(args_lower, d)) {
        return false;
    }
    if subcommands.is_empty() {
        return true;
    }
    let words = word_tokens(args_lower);
    subcommands.iter().any(|verb| verb_matches(verb, &words))
}

/// Leaf classifier over the safe-list: unconditionally read-only commands.
#[derive(Debug, Clone)]
pub struct SafeMatcher {
    rules: Vec<SafeRule>,
}

impl SafeMatcher {
    /// Build a matcher over the given rules.
    #[must_use]
    pub fn new(rules: Vec<SafeRule>) -> Self {
        Self { rules }
    }

    /// Check one sub-command against the safe-list.
    #[must_use]
    pub fn check(&self, sub: &AtomicSubCommand) -> Option<SafeMatch> {
        let program = norm_program(sub);
        let args_lower = norm_args(sub);
        for rule in &self.rules {
            if rule_matches(&rule.program, &rule.subcommands, &rule.deny_args, &program, &args_lower)
            {
                debug!(rule = %rule.id, command = %sub, "safe-list match");
                return Some(SafeMatch {
                    rule_id: rule.id.clone(),
                });
            }
        }
        None
    }
}

/// Leaf classifier over the local-list: mutations whose effects stay on the
/// invoking machine.
#[derive(Debug, Clone)]
pub struct LocalMatcher {
    rules: Vec<LocalRule>,
}

impl LocalMatcher {
    /// Build a matcher over the given rules.
    #[must_use]
    pub fn new(rules: Vec<LocalRule>) -> Self {
        Self { rules }
    }

    /// Check one sub-command against the local-list.
    #[must_use]
    pub fn check(&self, sub: &AtomicSubCommand) -> Option<SafeMatch> {
        let program = norm_program(sub);
        let args_lower = norm_args(sub);
        for rule in &self.rules {
            if rule_matches(&rule.program, &rule.subcommands, &rule.deny_args, &program, &args_lower)
            {
                debug!(rule = %rule.id, command = %sub, "local-list match");
                return Some(SafeMatch {
                    rule_id: rule.id.clone(),
                });
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::RuleTables;

    fn sub(program: &str, args: &[&str]) -> AtomicSubCommand {
        AtomicSubCommand::new(program, args.iter().map(ToString::to_string).collect())
    }

    fn default_safe() -> SafeMatcher {
        SafeMatcher::new(RuleTables::default().safe_rules)
    }

    fn default_local() -> LocalMatcher {
        LocalMatcher::new(RuleTables::default().local_rules)
    }

    #[test]
    fn test_kubectl_get_is_safe() {
        let matcher = default_safe();
        let m = matcher.check(&sub("kubectl", &["get", "pods", "-n", "default"]));
        assert_eq!(m.unwrap().rule_id, "safe.kubectl.read");
    }

    #[test]
    fn test_kubectl_delete_is_not_safe() {
        let matcher = default_safe();
        assert!(matcher.check(&sub("kubectl", &["delete", "pod", "x"])).is_none());
    }

    #[test]
    fn test_deny_arg_anywhere_disqualifies() {
        let matcher = default_safe();
        // Leading tokens look safe, but a mutate verb appears later.
        assert!(
            matcher
                .check(&sub("kubectl", &["get", "pods", "delete"]))
                .is_none()
        );
    }

    #[test]
    fn test_bare_program_rule() {
        let matcher = default_safe();
        assert!(matcher.check(&sub("ls", &["-la"])).is_some());
        assert!(matcher.check(&sub("pwd", &[])).is_some());
    }

    #[test]
    fn test_program_case_insensitive() {
        let matcher = default_safe();
        assert!(matcher.check(&sub("Kubectl", &["get", "pods"])).is_some());
    }

    #[test]
    fn test_path_prefix_stripped() {
        let matcher = default_safe();
        assert!(matcher.check(&sub("/bin/ls", &[])).is_some());
    }

    #[test]
    fn test_find_with_delete_is_not_safe() {
        let matcher = default_safe();
        assert!(matcher.check(&sub("find", &[".", "-name", "*.log"])).is_some());
        assert!(
            matcher
                .check(&sub("find", &[".", "-name", "*.log", "-delete"]))
                .is_none()
        );
    }

    #[test]
    fn test_multi_word_verb() {
        let matcher = default_safe();
        assert!(matcher.check(&sub("aws", &["s3", "ls"])).is_some());
        assert!(
            matcher
                .check(&sub("aws", &["ec2", "describe-instances"]))
                .is_some()
        );
        assert!(matcher.check(&sub("aws", &["s3", "rm", "s3://b/k"])).is_none());
    }

    #[test]
    fn test_unknown_program_is_a_miss_not_a_judgment() {
        let matcher = default_safe();
        assert!(matcher.check(&sub("customctl", &["get"])).is_none());
    }

    #[test]
    fn test_local_git_commit() {
        let matcher = default_local();
        let m = matcher.check(&sub("git", &["commit", "-m", "msg"]));
        assert_eq!(m.unwrap().rule_id, "local.git.worktree");
    }

    #[test]
    fn test_local_cargo_build() {
        let matcher = default_local();
        assert!(matcher.check(&sub("cargo", &["build", "--release"])).is_some());
        assert!(matcher.check(&sub("cargo", &["publish"])).is_none());
    }

    #[test]
    fn test_git_read_is_safe_not_local() {
        let safe = default_safe();
        let local = default_local();
        let status = sub("git", &["status"]);
        assert!(safe.check(&status).is_some());
        // `git status` is not in the local verbs table.
        assert!(local.check(&status).is_none());
    }

    #[test]
    fn test_terraform_plan_is_local() {
        let matcher = default_local();
        assert!(
            matcher
                .check(&sub("terraform", &["plan", "-out=/tmp/plan"]))
                .is_some()
        );
    }
}
