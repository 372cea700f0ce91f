use cordon_core::AtomicSubCommand;

use super::BlockedMatcher;
use crate::tables::{BlockAction, RuleCategory, RuleTables};

fn sub(program: &str, args: &[&str]) -> AtomicSubCommand {
    AtomicSubCommand::new(program, args.iter().map(ToString::to_string).collect())
}

fn default_matcher() -> BlockedMatcher {
    let tables = RuleTables::default();
    BlockedMatcher::new(tables.block_rules, tables.simulation_flags)
}

// =========================================================================
// Infrastructure apply
// =========================================================================

#[test]
fn test_terraform_apply_blocked() {
    let matcher = default_matcher();
    let m = matcher.check(&sub("terraform", &["apply", "-auto-approve"])).unwrap();
    assert_eq!(m.rule_id, "infra.terraform.apply");
    assert_eq!(m.category, RuleCategory::InfrastructureApply);
    assert_eq!(m.action, BlockAction::Ask);
    assert!(!m.simulated);
}

#[test]
fn test_terraform_plan_not_blocked() {
    let matcher = default_matcher();
    assert!(matcher.check(&sub("terraform", &["plan", "-out=/tmp/plan"])).is_none());
}

#[test]
fn test_terraform_destroy_blocked() {
    let matcher = default_matcher();
    let m = matcher.check(&sub("terraform", &["destroy"])).unwrap();
    assert_eq!(m.rule_id, "infra.terraform.destroy");
}

// =========================================================================
// Cluster mutate
// =========================================================================

#[test]
fn test_kubectl_delete_blocked() {
    let matcher = default_matcher();
    let m = matcher
        .check(&sub("kubectl", &["delete", "namespace", "prod"]))
        .unwrap();
    assert_eq!(m.rule_id, "cluster.kubectl.delete");
    assert_eq!(m.category, RuleCategory::ClusterMutate);
}

#[test]
fn test_kubectl_delete_dry_run_is_simulated() {
    let matcher = default_matcher();
    let m = matcher
        .check(&sub("kubectl", &["delete", "pod", "x", "--dry-run=client"]))
        .unwrap();
    assert!(m.simulated);
}

#[test]
fn test_kubectl_apply_blocked() {
    let matcher = default_matcher();
    let m = matcher.check(&sub("kubectl", &["apply", "-f", "deploy.yaml"])).unwrap();
    assert_eq!(m.rule_id, "cluster.kubectl.mutate");
}

#[test]
fn test_kubectl_get_not_blocked() {
    let matcher = default_matcher();
    assert!(matcher.check(&sub("kubectl", &["get", "pods"])).is_none());
}

// =========================================================================
// VCS destructive
// =========================================================================

#[test]
fn test_git_force_push_long_flag() {
    let matcher = default_matcher();
    let m = matcher
        .check(&sub("git", &["push", "--force", "origin", "main"]))
        .unwrap();
    assert_eq!(m.rule_id, "vcs.git.force-push");
    assert_eq!(m.category, RuleCategory::VcsDestructive);
}

#[test]
fn test_git_force_push_short_flag() {
    let matcher = default_matcher();
    assert!(matcher.check(&sub("git", &["push", "-f"])).is_some());
}

#[test]
fn test_git_plain_push_not_blocked() {
    let matcher = default_matcher();
    assert!(matcher.check(&sub("git", &["push", "origin", "main"])).is_none());
}

#[test]
fn test_git_hard_reset_blocked() {
    let matcher = default_matcher();
    let m = matcher.check(&sub("git", &["reset", "--hard", "HEAD~3"])).unwrap();
    assert_eq!(m.rule_id, "vcs.git.hard-reset");
}

#[test]
fn test_git_soft_reset_not_blocked() {
    let matcher = default_matcher();
    assert!(matcher.check(&sub("git", &["reset", "--soft", "HEAD~1"])).is_none());
}

// =========================================================================
// Filesystem recursive delete
// =========================================================================

#[test]
fn test_rm_rf_blocked() {
    let matcher = default_matcher();
    let m = matcher.check(&sub("rm", &["-rf", "/data"])).unwrap();
    assert_eq!(m.rule_id, "fs.rm.recursive");
    assert_eq!(m.category, RuleCategory::FsRecursiveDelete);
}

#[test]
fn test_rm_flag_reordering_still_matches() {
    let matcher = default_matcher();
    assert!(matcher.check(&sub("rm", &["-f", "-r", "/data"])).is_some());
    assert!(matcher.check(&sub("rm", &["-fr", "/data"])).is_some());
    assert!(matcher.check(&sub("rm", &["--recursive", "/data"])).is_some());
    assert!(matcher.check(&sub("rm", &["-R", "/data"])).is_some());
}

#[test]
fn test_rm_single_file_not_blocked() {
    let matcher = default_matcher();
    assert!(matcher.check(&sub("rm", &["-f", "notes.txt"])).is_none());
}

#[test]
fn test_path_prefixed_rm_still_matches() {
    let matcher = default_matcher();
    assert!(matcher.check(&sub("/usr/bin/rm", &["-rf", "/data"])).is_some());
}

#[test]
fn test_dd_denied_outright() {
    let matcher = default_matcher();
    let m = matcher.check(&sub("dd", &["if=/dev/zero", "of=/dev/sda"])).unwrap();
    assert_eq!(m.action, BlockAction::Deny);
}

// =========================================================================
// Container prune
// =========================================================================

#[test]
fn test_docker_prune_blocked() {
    let matcher = default_matcher();
    let m = matcher.check(&sub("docker", &["system", "prune", "-a"])).unwrap();
    assert_eq!(m.category, RuleCategory::ContainerPrune);
}

#[test]
fn test_docker_ps_not_blocked() {
    let matcher = default_matcher();
    assert!(matcher.check(&sub("docker", &["ps", "-a"])).is_none());
}

// =========================================================================
// Credential exposure
// =========================================================================

#[test]
fn test_cat_ssh_key_denied() {
    let matcher = default_matcher();
    let m = matcher
        .check(&sub("cat", &["/home/user/.ssh/id_rsa"]))
        .unwrap();
    assert_eq!(m.category, RuleCategory::CredentialExposure);
    assert_eq!(m.action, BlockAction::Deny);
}

#[test]
fn test_cat_ordinary_file_not_blocked() {
    let matcher = default_matcher();
    assert!(matcher.check(&sub("cat", &["README.md"])).is_none());
}

#[test]
fn test_kubectl_get_secrets_blocked_despite_safe_verb() {
    let matcher = default_matcher();
    let m = matcher.check(&sub("kubectl", &["get", "secrets", "-o", "yaml"])).unwrap();
    assert_eq!(m.rule_id, "cred.kubectl.secrets");
}

// =========================================================================
// Structural matching, not substring
// =========================================================================

#[test]
fn test_quoted_literal_does_not_false_positive() {
    // The parser keeps `rm -rf /` inside quotes as a single argument of
    // echo; the matcher sees program `echo`, which no block rule names.
    let echo = sub("echo", &["rm -rf /"]);
    let matcher = default_matcher();
    assert!(matcher.check(&echo).is_none());
}

#[test]
fn test_verb_as_value_does_not_false_positive() {
    // `delete` appears as a flag value token for a program no rule names.
    let matcher = default_matcher();
    assert!(matcher.check(&sub("mytool", &["--mode", "delete"])).is_none());
}

#[test]
fn test_case_insensitive_program() {
    let matcher = default_matcher();
    assert!(matcher.check(&sub("Terraform", &["apply"])).is_some());
}
