//! Quote-aware decomposition of a raw command string.
//!
//! The parser recognizes pipe (`|`), sequencing (`;`, newline), conditional
//! chains (`&&`, `||`), and redirections (`>`, `>>`, `<`, `2>`). Operator
//! characters inside single or double quotes are literal. Anything the
//! parser cannot decompose unambiguously - unbalanced quotes, background
//! `&`, command or process substitution - is an error, never a guess.

use cordon_core::{AtomicSubCommand, Connector, Redirection};
use tracing::debug;

use crate::error::{ShellError, ShellResult};

/// Which redirection operator is waiting for its target word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingRedirection {
    Overwrite,
    Append,
    Input,
    Stderr,
}

impl PendingRedirection {
    fn operator(self) -> &'static str {
        match self {
            Self::Overwrite => ">",
            Self::Append => ">>",
            Self::Input => "<",
            Self::Stderr => "2>",
        }
    }

    fn into_redirection(self, target: String) -> Redirection {
        match self {
            Self::Overwrite => Redirection::Overwrite { target },
            Self::Append => Redirection::Append { target },
            Self::Input => Redirection::Input { source: target },
            Self::Stderr => Redirection::Stderr { target },
        }
    }
}

/// Working state for the segment currently being accumulated.
#[derive(Debug, Default)]
struct Segment {
    words: Vec<String>,
    redirections: Vec<Redirection>,
    word: String,
    /// True once the current word has content, including an empty quoted
    /// string (`""` is a real argument).
    word_started: bool,
    pending_redirection: Option<PendingRedirection>,
}

impl Segment {
    fn finish_word(&mut self) -> ShellResult<()> {
        if !self.word_started {
            return Ok(());
        }
        let word = std::mem::take(&mut self.word);
        self.word_started = false;
        if let Some(kind) = self.pending_redirection.take() {
            self.redirections.push(kind.into_redirection(word));
        } else {
            self.words.push(word);
        }
        Ok(())
    }

    fn is_empty(&self) -> bool {
        self.words.is_empty() && self.redirections.is_empty() && !self.word_started
    }

    fn close(&mut self, connector: Connector) -> ShellResult<Option<AtomicSubCommand>> {
        self.finish_word()?;
        if let Some(kind) = self.pending_redirection.take() {
            return Err(ShellError::MissingRedirectionTarget {
                operator: kind.operator().to_string(),
            });
        }
        if self.words.is_empty() {
            // A redirection with no program (`> /tmp/x`) is not a command.
            if !self.redirections.is_empty() {
                return Err(ShellError::EmptySegment {
                    operator: "redirection".to_string(),
                });
            }
            return Ok(None);
        }
        let mut words = std::mem::take(&mut self.words).into_iter();
        let program = words.next().unwrap_or_default();
        Ok(Some(AtomicSubCommand {
            program,
            args: words.collect(),
            connector,
            redirections: std::mem::take(&mut self.redirections),
        }))
    }
}

/// Parse a raw command string into its ordered atomic sub-commands.
///
/// # Errors
///
/// Returns a [`ShellError`] for unbalanced quotes, trailing escapes,
/// unsupported operators (background `&`, `` ` ``, `$(`, `<(`, `>(`),
/// empty segments around operators, missing redirection targets, or an
/// entirely empty command. Callers must treat any of these as fail-closed.
#[allow(clippy::too_many_lines)]
pub fn parse(input: &str) -> ShellResult<Vec<AtomicSubCommand>> {
    let chars: Vec<char> = input.chars().collect();
    let len = chars.len();

    let mut subs: Vec<AtomicSubCommand> = Vec::new();
    let mut segment = Segment::default();
    let mut connector = Connector::First;
    let mut i = 0usize;

    while i < len {
        let c = chars[i];
        match c {
            '\'' => {
                segment.word_started = true;
                i = i.saturating_add(1);
                let start = i;
                while i < len && chars[i] != '\'' {
                    segment.word.push(chars[i]);
                    i = i.saturating_add(1);
                }
                if i >= len {
                    debug!(offset = start, "unterminated single quote");
                    return Err(ShellError::UnbalancedQuote { quote: '\'' });
                }
                i = i.saturating_add(1);
            },
            '"' => {
                segment.word_started = true;
                i = i.saturating_add(1);
                let start = i;
                loop {
                    if i >= len {
                        debug!(offset = start, "unterminated double quote");
                        return Err(ShellError::UnbalancedQuote { quote: '"' });
                    }
                    match chars[i] {
                        '"' => {
                            i = i.saturating_add(1);
                            break;
                        },
                        '\\' => {
                            let next = i.saturating_add(1);
                            if next >= len {
                                return Err(ShellError::TrailingEscape);
                            }
                            segment.word.push(chars[next]);
                            i = next.saturating_add(1);
                        },
                        other => {
                            segment.word.push(other);
                            i = i.saturating_add(1);
                        },
                    }
                }
            },
            '\\' => {
                let next = i.saturating_add(1);
                if next >= len {
                    return Err(ShellError::TrailingEscape);
                }
                segment.word_started = true;
                segment.word.push(chars[next]);
                i = next.saturating_add(1);
            },
            ' ' | '\t' => {
                segment.finish_word()?;
                i = i.saturating_add(1);
            },
            '\n' => {
                // Multi-line input is plain sequencing, except after a
                // dangling conditional or pipe, which continues on the
                // next line.
                if let Some(sub) = segment.close(connector)? {
                    subs.push(sub);
                    connector = Connector::Seq;
                } else if !subs.is_empty()
                    && matches!(connector, Connector::First | Connector::Seq)
                {
                    connector = Connector::Seq;
                }
                i = i.saturating_add(1);
            },
            ';' => {
                match segment.close(connector)? {
                    Some(sub) => subs.push(sub),
                    None => {
                        return Err(ShellError::EmptySegment {
                            operator: ";".to_string(),
                        });
                    },
                }
                connector = Connector::Seq;
                i = i.saturating_add(1);
            },
            '|' => {
                let (op, next_connector) = if chars.get(i.saturating_add(1)) == Some(&'|') {
                    ("||", Connector::Or)
                } else {
                    ("|", Connector::Pipe)
                };
                match segment.close(connector)? {
                    Some(sub) => subs.push(sub),
                    None => {
                        return Err(ShellError::EmptySegment {
                            operator: op.to_string(),
                        });
                    },
                }
                connector = next_connector;
                i = i.saturating_add(op.len());
            },
            '&' => {
                if chars.get(i.saturating_add(1)) == Some(&'&') {
                    match segment.close(connector)? {
                        Some(sub) => subs.push(sub),
                        None => {
                            return Err(ShellError::EmptySegment {
                                operator: "&&".to_string(),
                            });
                        },
                    }
                    connector = Connector::And;
                    i = i.saturating_add(2);
                } else {
                    // Background execution detaches the command from its
                    // exit status; the gate refuses to reason about it.
                    return Err(ShellError::UnsupportedOperator {
                        operator: "&".to_string(),
                    });
                }
            },
            '`' => {
                return Err(ShellError::UnsupportedOperator {
                    operator: "`".to_string(),
                });
            },
            '$' if chars.get(i.saturating_add(1)) == Some(&'(') => {
                return Err(ShellError::UnsupportedOperator {
                    operator: "$(".to_string(),
                });
            },
            '<' => {
                if chars.get(i.saturating_add(1)) == Some(&'(') {
                    return Err(ShellError::UnsupportedOperator {
                        operator: "<(".to_string(),
                    });
                }
                segment.finish_word()?;
                segment.pending_redirection = Some(PendingRedirection::Input);
                i = i.saturating_add(1);
                i = consume_redirection_target(&chars, i, &mut segment)?;
            },
            '>' => {
                if chars.get(i.saturating_add(1)) == Some(&'(') {
                    return Err(ShellError::UnsupportedOperator {
                        operator: ">(".to_string(),
                    });
                }
                segment.finish_word()?;
                if chars.get(i.saturating_add(1)) == Some(&'>') {
                    segment.pending_redirection = Some(PendingRedirection::Append);
                    i = i.saturating_add(2);
                } else {
                    segment.pending_redirection = Some(PendingRedirection::Overwrite);
                    i = i.saturating_add(1);
                }
                i = consume_redirection_target(&chars, i, &mut segment)?;
            },
            d if d.is_ascii_digit() && !segment.word_started => {
                // `2>` style file-descriptor redirection; only when the
                // digit starts a fresh word.
                let mut j = i;
                while j < len && chars[j].is_ascii_digit() {
                    j = j.saturating_add(1);
                }
                if chars.get(j) == Some(&'>') {
                    segment.pending_redirection = Some(PendingRedirection::Stderr);
                    i = j.saturating_add(1);
                    if chars.get(i) == Some(&'>') {
                        // `2>>` appends; the signal is the same.
                        i = i.saturating_add(1);
                    }
                    i = consume_redirection_target(&chars, i, &mut segment)?;
                } else {
                    segment.word_started = true;
                    segment.word.push(d);
                    i = i.saturating_add(1);
                }
            },
            other => {
                segment.word_started = true;
                segment.word.push(other);
                i = i.saturating_add(1);
            },
        }
    }

    match segment.close(connector)? {
        Some(sub) => subs.push(sub),
        None => {
            if subs.is_empty() {
                return Err(ShellError::EmptyCommand);
            }
            // A trailing `;` or newline with nothing after it is tolerated,
            // but a dangling conditional or pipe is not.
            match connector {
                Connector::And | Connector::Or | Connector::Pipe => {
                    return Err(ShellError::EmptySegment {
                        operator: connector.to_string(),
                    });
                },
                Connector::First | Connector::Seq => {},
            }
        },
    }

    if subs.is_empty() {
        return Err(ShellError::EmptyCommand);
    }

    debug!(segments = subs.len(), "parsed command");
    Ok(subs)
}

/// After a redirection operator, consume optional whitespace and the target
/// word. `&1`-style file-descriptor targets are taken verbatim.
fn consume_redirection_target(
    chars: &[char],
    mut i: usize,
    segment: &mut Segment,
) -> ShellResult<usize> {
    let len = chars.len();
    while i < len && (chars[i] == ' ' || chars[i] == '\t') {
        i = i.saturating_add(1);
    }
    if chars.get(i) == Some(&'&') {
        // `2>&1` / `>&2` - duplicate onto another descriptor.
        let mut target = String::from('&');
        i = i.saturating_add(1);
        while i < len && chars[i].is_ascii_digit() {
            target.push(chars[i]);
            i = i.saturating_add(1);
        }
        if target.len() == 1 {
            let kind = segment.pending_redirection.unwrap_or(PendingRedirection::Overwrite);
            return Err(ShellError::MissingRedirectionTarget {
                operator: kind.operator().to_string(),
            });
        }
        if let Some(kind) = segment.pending_redirection.take() {
            segment.redirections.push(kind.into_redirection(target));
        }
    }
    // Otherwise the next ordinary word becomes the target via finish_word().
    Ok(i)
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
