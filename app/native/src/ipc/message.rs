//! Client message grammar.
//!
//! A client message is one line, split into words by a quote-aware
//! tokenizer and parsed with clap:
//!
//! ```text
//! command "focus left"
//! subscribe -e focus_changed,window_managed
//! get monitors | workspaces | windows | focused
//! ```

use clap::{Parser, Subcommand};

use crate::error::{WmError, WmResult};

/// A parsed client message.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "trellis", no_binary_name = true, disable_help_subcommand = true)]
#[command(disable_help_flag = true, disable_version_flag = true)]
pub struct ClientMessage {
    #[command(subcommand)]
    pub request: Request,
}

/// What a client asks for.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Runs a window manager command, such as `command "move left"`.
    Command {
        /// The command string. Unquoted words are joined with spaces.
        #[arg(required = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
        words: Vec<String>,
    },

    /// Streams events to the client.
    Subscribe {
        /// Event names separated by commas, or `all`.
        #[arg(short = 'e', long = "events", required = true, value_delimiter = ',')]
        events: Vec<String>,
    },

    /// Queries a snapshot of the current state.
    #[command(subcommand)]
    Get(Query),
}

/// Snapshot queries.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query {
    Monitors,
    Workspaces,
    Windows,
    Focused,
}

impl Request {
    /// The command string of a `command` request.
    #[must_use]
    pub fn command_text(&self) -> Option<String> {
        match self {
            Self::Command { words } => Some(words.join(" ")),
            _ => None,
        }
    }
}

/// Tokenizes and parses a raw client message.
///
/// # Errors
///
/// Fails with `InvalidCommand` on unbalanced quotes or when the words do not
/// form a known message.
pub fn parse_message(raw: &str) -> WmResult<ClientMessage> {
    let words = tokenize(raw)?;
    ClientMessage::try_parse_from(words).map_err(|error| {
        let rendered = error.to_string();
        let first = rendered.lines().next().unwrap_or_default();
        WmError::invalid(first.trim_start_matches("error: ").to_string())
    })
}

/// Splits a line into words. Single and double quotes group words and are
/// removed; inside double quotes a backslash escapes the next character.
///
/// # Errors
///
/// Fails with `InvalidCommand` if a quote is left open.
pub fn tokenize(raw: &str) -> WmResult<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    // distinguishes `""` from no word at all
    let mut in_word = false;
    let mut chars = raw.chars();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(escaped) => current.push(escaped),
                            None => return Err(unterminated('"')),
                        },
                        Some(other) => current.push(other),
                        None => return Err(unterminated('"')),
                    }
                }
            }
            '\'' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(other) => current.push(other),
                        None => return Err(unterminated('\'')),
                    }
                }
            }
            ch if ch.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            other => {
                in_word = true;
                current.push(other);
            }
        }
    }

    if in_word {
        words.push(current);
    }
    Ok(words)
}

fn unterminated(quote: char) -> WmError { WmError::invalid(format!("unterminated {quote} quote")) }
