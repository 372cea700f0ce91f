//! Command types - the raw invocation and its decomposed parts.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// A raw tool-invocation command as received from the orchestrator.
///
/// Immutable once received; the parser decomposes it but never rewrites it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCommand {
    /// Declared name of the invoking tool (e.g. a shell-execution tool).
    pub tool: String,
    /// The unparsed command string.
    pub command: String,
    /// Working directory the command would run in, if declared.
    pub cwd: Option<PathBuf>,
}

impl RawCommand {
    /// Create a new raw command.
    #[must_use]
    pub fn new(tool: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            command: command.into(),
            cwd: None,
        }
    }

    /// Set the working directory.
    #[must_use]
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }
}

impl fmt::Display for RawCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.tool, self.command)
    }
}

/// An output/input redirection attached to a sub-command.
///
/// Redirections are recorded as classification signals; targets are kept
/// verbatim and never resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Redirection {
    /// `> target` - overwrite.
    Overwrite {
        /// Redirection target as written.
        target: String,
    },
    /// `>> target` - append.
    Append {
        /// Redirection target as written.
        target: String,
    },
    /// `< source` - input.
    Input {
        /// Redirection source as written.
        source: String,
    },
    /// `2>` / `2>&1` - stderr redirection.
    Stderr {
        /// Redirection target as written (`&1` for merge).
        target: String,
    },
}

impl fmt::Display for Redirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overwrite { target } => write!(f, "> {target}"),
            Self::Append { target } => write!(f, ">> {target}"),
            Self::Input { source } => write!(f, "< {source}"),
            Self::Stderr { target } => write!(f, "2> {target}"),
        }
    }
}

/// How a sub-command is joined to the one before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Connector {
    /// First sub-command in the chain.
    First,
    /// `|` - output feeds the next command.
    Pipe,
    /// `;` - unconditional sequencing.
    Seq,
    /// `&&` - runs only if the previous succeeded.
    And,
    /// `||` - runs only if the previous failed.
    Or,
}

impl fmt::Display for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::First => write!(f, ""),
            Self::Pipe => write!(f, "|"),
            Self::Seq => write!(f, ";"),
            Self::And => write!(f, "&&"),
            Self::Or => write!(f, "||"),
        }
    }
}

/// One command with no remaining compositional operators.
///
/// A [`RawCommand`] decomposes into an ordered sequence of these; order
/// matters for audit but not for classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtomicSubCommand {
    /// Program name as written (path prefix preserved).
    pub program: String,
    /// Ordered argument list.
    pub args: Vec<String>,
    /// How this sub-command is joined to its predecessor.
    pub connector: Connector,
    /// Redirections attached to this sub-command.
    pub redirections: Vec<Redirection>,
}

impl AtomicSubCommand {
    /// Create a sub-command with no connector or redirections.
    #[must_use]
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            connector: Connector::First,
            redirections: Vec::new(),
        }
    }

    /// The program name with any path prefix stripped (`/usr/bin/rm` -> `rm`).
    #[must_use]
    pub fn base_program(&self) -> &str {
        self.program
            .rsplit('/')
            .next()
            .unwrap_or(self.program.as_str())
    }

    /// Check whether any redirection is attached.
    #[must_use]
    pub fn has_redirection(&self) -> bool {
        !self.redirections.is_empty()
    }

    /// Render the canonical display string (`program arg1 arg2 ...`).
    ///
    /// This rendering is what approval scopes are derived from, so it must
    /// be stable for a given parse.
    #[must_use]
    pub fn rendered(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

impl fmt::Display for AtomicSubCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rendered())
    }
}
