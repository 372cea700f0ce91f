//! Declarative rule tables.
//!
//! The safe/local/block pattern tables are data, not code: arrays of
//! structured rules, versioned, loaded from configuration at startup and
//! treated as read-only. [`RuleTables::default`] seeds a working table set
//! so the gate is usable with zero files on disk.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a blocked operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleCategory {
    /// Infrastructure provisioning applies (`terraform apply`, `pulumi up`).
    InfrastructureApply,
    /// Cluster-state mutation (`kubectl delete`, `helm uninstall`).
    ClusterMutate,
    /// Version-control force pushes and history destruction.
    VcsDestructive,
    /// Container and image pruning.
    ContainerPrune,
    /// Recursive filesystem deletion and device-level writes.
    FsRecursiveDelete,
    /// Reads that expose credentials or secrets.
    CredentialExposure,
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InfrastructureApply => write!(f, "infrastructure-apply"),
            Self::ClusterMutate => write!(f, "cluster-mutate"),
            Self::VcsDestructive => write!(f, "vcs-destructive"),
            Self::ContainerPrune => write!(f, "container-prune"),
            Self::FsRecursiveDelete => write!(f, "fs-recursive-delete"),
            Self::CredentialExposure => write!(f, "credential-exposure"),
        }
    }
}

/// What a block-rule match does to the final decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockAction {
    /// Hold for human approval (the default).
    #[default]
    Ask,
    /// Refuse outright; no approval path exists.
    Deny,
}

/// Allow-list rule: a program (plus optional read-only verbs) that is
/// unconditionally read-only.
///
/// Purely additive: absence of a match is not "unsafe", it only means the
/// decision falls through to the other classification signals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafeRule {
    /// Stable rule identifier for audit and justification strings.
    pub id: String,
    /// Program name (case-insensitive, path prefix stripped before compare).
    pub program: String,
    /// Recognized read-only verbs. Entries may be multi-word (`"s3 ls"`)
    /// or end in `*` for a verb-prefix match (`"describe-*"`). Empty means
    /// the bare program is read-only regardless of arguments.
    #[serde(default)]
    pub subcommands: Vec<String>,
    /// Mutating verbs that disqualify the match anywhere in the argument
    /// list, even when the leading tokens look safe.
    #[serde(default)]
    pub deny_args: Vec<String>,
}

/// Local-only mutation rule: commands whose effects stay on the invoking
/// machine (working tree, build artifacts, local files).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalRule {
    /// Stable rule identifier.
    pub id: String,
    /// Program name (case-insensitive).
    pub program: String,
    /// Recognized local-only verbs; same matching rules as [`SafeRule`].
    #[serde(default)]
    pub subcommands: Vec<String>,
    /// Verbs that disqualify the match anywhere in the argument list.
    #[serde(default)]
    pub deny_args: Vec<String>,
}

/// Block-list rule: a known-destructive pattern over normalized tokens.
///
/// Matching is structural - program name, token presence, flag detection -
/// never a substring search over the raw string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockRule {
    /// Stable rule identifier.
    pub id: String,
    /// Category this rule belongs to.
    pub category: RuleCategory,
    /// Program name (case-insensitive, path prefix stripped).
    pub program: String,
    /// Word tokens that must all be present in the argument list.
    #[serde(default)]
    pub require_args: Vec<String>,
    /// Word tokens of which at least one must be present (if non-empty).
    #[serde(default)]
    pub any_args: Vec<String>,
    /// Flags of which at least one must be present (if non-empty).
    /// Long form (`--force`) matches exactly or as `--force=..`; a single
    /// letter (`r`) matches inside combined short clusters (`-rf`).
    #[serde(default)]
    pub any_flags: Vec<String>,
    /// Glob patterns of which at least one argument must match (if
    /// non-empty). Used for path-shaped rules such as credential reads.
    #[serde(default)]
    pub any_path_globs: Vec<String>,
    /// What a match does to the final decision.
    #[serde(default)]
    pub action: BlockAction,
}

/// The complete declarative rule set the classifier runs against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleTables {
    /// Table format version; bumped when rule semantics change.
    #[serde(default = "default_table_version")]
    pub version: u32,
    /// Allow-list (tier T0) rules.
    #[serde(default)]
    pub safe_rules: Vec<SafeRule>,
    /// Local-only (tier T1) rules.
    #[serde(default)]
    pub local_rules: Vec<LocalRule>,
    /// Block-list (tier T3) rules.
    #[serde(default)]
    pub block_rules: Vec<BlockRule>,
    /// Flags recognized as simulation/dry-run markers. Matched by token
    /// equality or `flag=value` prefix; downgrade a block match to T2.
    #[serde(default)]
    pub simulation_flags: Vec<String>,
}

fn default_table_version() -> u32 {
    1
}

impl RuleTables {
    /// An empty table set (nothing is safe, nothing is blocked - everything
    /// falls through to the default-T2 policy).
    #[must_use]
    pub fn empty() -> Self {
        Self {
            version: 1,
            safe_rules: Vec::new(),
            local_rules: Vec::new(),
            block_rules: Vec::new(),
            simulation_flags: Vec::new(),
        }
    }
}

fn safe(id: &str, program: &str, subcommands: &[&str], deny_args: &[&str]) -> SafeRule {
    SafeRule {
        id: id.to_string(),
        program: program.to_string(),
        subcommands: subcommands.iter().map(ToString::to_string).collect(),
        deny_args: deny_args.iter().map(ToString::to_string).collect(),
    }
}

fn local(id: &str, program: &str, subcommands: &[&str], deny_args: &[&str]) -> LocalRule {
    LocalRule {
        id: id.to_string(),
        program: program.to_string(),
        subcommands: subcommands.iter().map(ToString::to_string).collect(),
        deny_args: deny_args.iter().map(ToString::to_string).collect(),
    }
}

impl Default for RuleTables {
    /// Seed tables covering the common CLI families:
    /// - read-only verbs of kubectl, git, terraform, docker, helm, aws
    /// - plain read-only unix tools
    /// - local-only mutations (git working-tree verbs, build tools)
    /// - destructive patterns per category
    #[allow(clippy::too_many_lines)]
    fn default() -> Self {
        let safe_rules = vec![
            safe(
                "safe.kubectl.read",
                "kubectl",
                &["get", "describe", "logs", "top", "version", "api-resources", "explain"],
                &["delete", "apply", "edit", "patch", "scale", "drain", "cordon", "replace"],
            ),
            safe(
                "safe.git.read",
                "git",
                &["status", "log", "diff", "show", "remote", "tag", "blame"],
                &["push", "-d", "-D", "--delete", "--force", "-f"],
            ),
            safe(
                "safe.terraform.read",
                "terraform",
                &["show", "validate", "version", "providers", "graph", "output"],
                &["apply", "destroy", "import", "taint"],
            ),
            safe(
                "safe.docker.read",
                "docker",
                &["ps", "images", "inspect", "logs", "version", "info", "stats"],
                &["rm", "rmi", "prune", "kill", "stop"],
            ),
            safe(
                "safe.helm.read",
                "helm",
                &["list", "status", "history", "version", "show"],
                &["uninstall", "delete", "rollback", "upgrade", "install"],
            ),
            safe(
                "safe.aws.read",
                "aws",
                &["s3 ls", "sts get-caller-identity", "describe-*", "list-*", "get-*"],
                &["delete", "terminate-instances"],
            ),
            safe("safe.ls", "ls", &[], &[]),
            safe("safe.cat", "cat", &[], &[]),
            safe("safe.head", "head", &[], &[]),
            safe("safe.tail", "tail", &[], &[]),
            safe("safe.grep", "grep", &[], &[]),
            safe("safe.wc", "wc", &[], &[]),
            safe("safe.pwd", "pwd", &[], &[]),
            safe("safe.echo", "echo", &[], &[]),
            safe("safe.whoami", "whoami", &[], &[]),
            safe("safe.date", "date", &[], &[]),
            safe("safe.df", "df", &[], &[]),
            safe("safe.du", "du", &[], &[]),
            safe("safe.ps", "ps", &[], &[]),
            safe("safe.which", "which", &[], &[]),
            safe("safe.stat", "stat", &[], &[]),
            safe("safe.file", "file", &[], &[]),
            safe("safe.tree", "tree", &[], &[]),
            safe("safe.uptime", "uptime", &[], &[]),
            safe("safe.test", "test", &[], &[]),
            safe("safe.find.read", "find", &[], &["-delete", "-exec", "-execdir", "-ok"]),
        ];

        let local_rules = vec![
            local(
                "local.git.worktree",
                "git",
                &[
                    "add", "commit", "checkout", "switch", "restore", "stash", "merge",
                    "rebase", "fetch", "pull", "init", "clone", "branch",
                ],
                &["--force", "-f", "-D"],
            ),
            local("local.mkdir", "mkdir", &[], &[]),
            local("local.touch", "touch", &[], &[]),
            local("local.cp", "cp", &[], &[]),
            local("local.mv", "mv", &[], &[]),
            local(
                "local.cargo.build",
                "cargo",
                &["build", "check", "test", "fmt", "clippy", "doc", "bench", "metadata"],
                &["publish", "yank"],
            ),
            local(
                "local.npm.build",
                "npm",
                &["install", "ci", "run", "test", "ls", "audit"],
                &["publish", "unpublish", "deprecate"],
            ),
            local("local.make", "make", &[], &[]),
            local("local.docker.build", "docker", &["build", "tag", "pull"], &["push"]),
            local("local.terraform.plan", "terraform", &["plan", "init", "fmt", "refresh"], &[]),
        ];

        let block_rules = vec![
            BlockRule {
                id: "infra.terraform.apply".to_string(),
                category: RuleCategory::InfrastructureApply,
                program: "terraform".to_string(),
                require_args: vec!["apply".to_string()],
                any_args: Vec::new(),
                any_flags: Vec::new(),
                any_path_globs: Vec::new(),
                action: BlockAction::Ask,
            },
            BlockRule {
                id: "infra.terraform.destroy".to_string(),
                category: RuleCategory::InfrastructureApply,
                program: "terraform".to_string(),
                require_args: vec!["destroy".to_string()],
                any_args: Vec::new(),
                any_flags: Vec::new(),
                any_path_globs: Vec::new(),
                action: BlockAction::Ask,
            },
            BlockRule {
                id: "infra.pulumi.up".to_string(),
                category: RuleCategory::InfrastructureApply,
                program: "pulumi".to_string(),
                require_args: Vec::new(),
                any_args: vec!["up".to_string(), "destroy".to_string()],
                any_flags: Vec::new(),
                any_path_globs: Vec::new(),
                action: BlockAction::Ask,
            },
            BlockRule {
                id: "cluster.kubectl.delete".to_string(),
                category: RuleCategory::ClusterMutate,
                program: "kubectl".to_string(),
                require_args: vec!["delete".to_string()],
                any_args: Vec::new(),
                any_flags: Vec::new(),
                any_path_globs: Vec::new(),
                action: BlockAction::Ask,
            },
            BlockRule {
                id: "cluster.kubectl.mutate".to_string(),
                category: RuleCategory::ClusterMutate,
                program: "kubectl".to_string(),
                require_args: Vec::new(),
                any_args: vec![
                    "apply".to_string(),
                    "patch".to_string(),
                    "scale".to_string(),
                    "replace".to_string(),
                    "drain".to_string(),
                    "cordon".to_string(),
                ],
                any_flags: Vec::new(),
                any_path_globs: Vec::new(),
                action: BlockAction::Ask,
            },
            BlockRule {
                id: "cluster.helm.mutate".to_string(),
                category: RuleCategory::ClusterMutate,
                program: "helm".to_string(),
                require_args: Vec::new(),
                any_args: vec![
                    "uninstall".to_string(),
                    "delete".to_string(),
                    "rollback".to_string(),
                    "upgrade".to_string(),
                    "install".to_string(),
                ],
                any_flags: Vec::new(),
                any_path_globs: Vec::new(),
                action: BlockAction::Ask,
            },
            BlockRule {
                id: "vcs.git.force-push".to_string(),
                category: RuleCategory::VcsDestructive,
                program: "git".to_string(),
                require_args: vec!["push".to_string()],
                any_args: Vec::new(),
                any_flags: vec![
                    "--force".to_string(),
                    "f".to_string(),
                    "--force-with-lease".to_string(),
                ],
                any_path_globs: Vec::new(),
                action: BlockAction::Ask,
            },
            BlockRule {
                id: "vcs.git.hard-reset".to_string(),
                category: RuleCategory::VcsDestructive,
                program: "git".to_string(),
                require_args: vec!["reset".to_string()],
                any_args: Vec::new(),
                any_flags: vec!["--hard".to_string()],
                any_path_globs: Vec::new(),
                action: BlockAction::Ask,
            },
            BlockRule {
                id: "vcs.git.clean-force".to_string(),
                category: RuleCategory::VcsDestructive,
                program: "git".to_string(),
                require_args: vec!["clean".to_string()],
                any_args: Vec::new(),
                any_flags: vec!["--force".to_string(), "f".to_string()],
                any_path_globs: Vec::new(),
                action: BlockAction::Ask,
            },
            BlockRule {
                id: "container.docker.prune".to_string(),
                category: RuleCategory::ContainerPrune,
                program: "docker".to_string(),
                require_args: Vec::new(),
                any_args: vec!["prune".to_string(), "rmi".to_string()],
                any_flags: Vec::new(),
                any_path_globs: Vec::new(),
                action: BlockAction::Ask,
            },
            BlockRule {
                id: "fs.rm.recursive".to_string(),
                category: RuleCategory::FsRecursiveDelete,
                program: "rm".to_string(),
                require_args: Vec::new(),
                any_args: Vec::new(),
                any_flags: vec!["r".to_string(), "R".to_string(), "--recursive".to_string()],
                any_path_globs: Vec::new(),
                action: BlockAction::Ask,
            },
            BlockRule {
                id: "fs.dd".to_string(),
                category: RuleCategory::FsRecursiveDelete,
                program: "dd".to_string(),
                require_args: Vec::new(),
                any_args: Vec::new(),
                any_flags: Vec::new(),
                any_path_globs: Vec::new(),
                action: BlockAction::Deny,
            },
            BlockRule {
                id: "fs.mkfs".to_string(),
                category: RuleCategory::FsRecursiveDelete,
                program: "mkfs".to_string(),
                require_args: Vec::new(),
                any_args: Vec::new(),
                any_flags: Vec::new(),
                any_path_globs: Vec::new(),
                action: BlockAction::Deny,
            },
            BlockRule {
                id: "fs.shred".to_string(),
                category: RuleCategory::FsRecursiveDelete,
                program: "shred".to_string(),
                require_args: Vec::new(),
                any_args: Vec::new(),
                any_flags: Vec::new(),
                any_path_globs: Vec::new(),
                action: BlockAction::Ask,
            },
            BlockRule {
                id: "cred.cat.secrets".to_string(),
                category: RuleCategory::CredentialExposure,
                program: "cat".to_string(),
                require_args: Vec::new(),
                any_args: Vec::new(),
                any_flags: Vec::new(),
                any_path_globs: vec![
                    "**/.ssh/*".to_string(),
                    "**/.aws/credentials".to_string(),
                    "**/.env".to_string(),
                    "**/id_rsa*".to_string(),
                    "**/id_ed25519*".to_string(),
                    "**/.netrc".to_string(),
                    "/etc/shadow".to_string(),
                ],
                action: BlockAction::Deny,
            },
            BlockRule {
                id: "cred.kubectl.secrets".to_string(),
                category: RuleCategory::CredentialExposure,
                program: "kubectl".to_string(),
                require_args: vec!["get".to_string()],
                any_args: vec!["secret".to_string(), "secrets".to_string()],
                any_flags: Vec::new(),
                any_path_globs: Vec::new(),
                action: BlockAction::Ask,
            },
        ];

        let simulation_flags = vec![
            "--dry-run".to_string(),
            "--check".to_string(),
            "--what-if".to_string(),
            "--plan-only".to_string(),
            "--simulate".to_string(),
            "--noop".to_string(),
            "--server-dry-run".to_string(),
        ];

        Self {
            version: 1,
            safe_rules,
            local_rules,
            block_rules,
            simulation_flags,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tables_nonempty() {
        let tables = RuleTables::default();
        assert!(!tables.safe_rules.is_empty());
        assert!(!tables.local_rules.is_empty());
        assert!(!tables.block_rules.is_empty());
        assert!(!tables.simulation_flags.is_empty());
        assert_eq!(tables.version, 1);
    }

    #[test]
    fn test_empty_tables() {
        let tables = RuleTables::empty();
        assert!(tables.safe_rules.is_empty());
        assert!(tables.block_rules.is_empty());
    }

    #[test]
    fn test_rule_ids_unique() {
        let tables = RuleTables::default();
        let mut ids: Vec<&str> = tables
            .safe_rules
            .iter()
            .map(|r| r.id.as_str())
            .chain(tables.local_rules.iter().map(|r| r.id.as_str()))
            .chain(tables.block_rules.iter().map(|r| r.id.as_str()))
            .collect();
        let total = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), total, "duplicate rule id in default tables");
    }

    #[test]
    fn test_category_display() {
        assert_eq!(
            RuleCategory::InfrastructureApply.to_string(),
            "infrastructure-apply"
        );
        assert_eq!(
            RuleCategory::CredentialExposure.to_string(),
            "credential-exposure"
        );
    }

    #[test]
    fn test_tables_toml_roundtrip() {
        let tables = RuleTables::default();
        let text = toml::to_string(&tables).unwrap();
        let back: RuleTables = toml::from_str(&text).unwrap();
        assert_eq!(back.block_rules.len(), tables.block_rules.len());
        assert_eq!(back.safe_rules.len(), tables.safe_rules.len());
    }

    #[test]
    fn test_block_action_default_is_ask() {
        let rule: BlockRule = toml::from_str(
            r#"
            id = "x"
            category = "cluster-mutate"
            program = "kubectl"
            require_args = ["delete"]
            "#,
        )
        .unwrap();
        assert_eq!(rule.action, BlockAction::Ask);
    }
}
