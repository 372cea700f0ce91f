//! Token normalization helpers shared by the matchers.
//!
//! Matching is structural over the parsed argument vector - program name
//! compared case-insensitively with any path prefix stripped, verbs compared
//! over lowercased word tokens, flags detected in original case (short-flag
//! clusters are case-sensitive: `-r` and `-R` are different flags).

use cordon_core::AtomicSubCommand;

/// Lowercased program name with path prefix stripped.
pub(crate) fn norm_program(sub: &AtomicSubCommand) -> String {
    sub.base_program().to_ascii_lowercase()
}

/// Lowercased copies of the arguments, for verb/word matching.
pub(crate) fn norm_args(sub: &AtomicSubCommand) -> Vec<String> {
    sub.args.iter().map(|a| a.to_ascii_lowercase()).collect()
}

/// The non-flag tokens of a lowercased argument list, in order.
pub(crate) fn word_tokens(norm_args: &[String]) -> Vec<&str> {
    norm_args
        .iter()
        .filter(|a| !a.starts_with('-'))
        .map(String::as_str)
        .collect()
}

/// Check a verb entry against the word tokens of a sub-command.
///
/// - a single word (`"get"`) must be the first word token;
/// - a multi-word entry (`"s3 ls"`) must be the leading word tokens;
/// - a trailing-`*` entry (`"describe-*"`) matches if any word token starts
///   with the prefix (read verbs of large CLI families sit after a service
///   word, e.g. `aws ec2 describe-instances`).
pub(crate) fn verb_matches(entry: &str, words: &[&str]) -> bool {
    if let Some(prefix) = entry.strip_suffix('*') {
        return words.iter().any(|w| w.starts_with(prefix));
    }
    let entry_words: Vec<&str> = entry.split_whitespace().collect();
    if entry_words.is_empty() || words.len() < entry_words.len() {
        return false;
    }
    entry_words
        .iter()
        .zip(words.iter())
        .all(|(e, w)| e.eq_ignore_ascii_case(w))
}

/// Check whether a word token is present (lowercased equality).
pub(crate) fn has_word(norm_args: &[String], token: &str) -> bool {
    let token = token.to_ascii_lowercase();
    norm_args.iter().any(|a| *a == token)
}

/// Check whether a flag is present, in original case.
///
/// Long flags (`--force`) match exactly or as `--force=value`. A single
/// letter matches inside a combined short cluster (`r` matches `-rf`).
pub(crate) fn has_flag(args: &[String], flag: &str) -> bool {
    if flag.starts_with("--") {
        args.iter()
            .any(|a| a == flag || a.strip_prefix(flag).is_some_and(|rest| rest.starts_with('=')))
    } else if flag.len() == 1 {
        let Some(c) = flag.chars().next() else {
            return false;
        };
        args.iter().any(|a| {
            a.starts_with('-')
                && !a.starts_with("--")
                && a.chars().skip(1).all(|x| x.is_ascii_alphanumeric())
                && a.chars().skip(1).any(|x| x == c)
        })
    } else {
        // `-rf`-style literal entry.
        args.iter().any(|a| a == flag)
    }
}

/// Check whether any recognized simulation/dry-run flag is present.
///
/// Flags match by token equality or `flag=value` prefix, so `--dry-run`
/// covers `--dry-run=client` as well.
pub(crate) fn has_simulation_flag(args: &[String], simulation_flags: &[String]) -> bool {
    args.iter().any(|a| {
        simulation_flags.iter().any(|f| {
            a == f || a.strip_prefix(f.as_str()).is_some_and(|rest| rest.starts_with('='))
        })
    })
}
