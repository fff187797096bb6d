//! Command string grammar.
//!
//! Turns the text of a `command` message into a [`Command`]. Every command
//! acts on `subject`, which the bus resolves to the focused container when
//! it is `None`.

use crate::error::{WmError, WmResult};
use crate::tiling::bus::{Command, WindowStateTarget, WorkspaceTarget};
use crate::tiling::state::{ContainerId, Direction, Layout, ResizeDimension};

/// Parses a command string.
///
/// # Errors
///
/// Fails with `InvalidCommand` for unknown verbs, bad arguments and
/// trailing words.
pub fn parse_command(text: &str, subject: Option<ContainerId>) -> WmResult<Command> {
    let words: Vec<&str> = text.split_whitespace().collect();

    let command = match words.as_slice() {
        ["focus", "workspace", rest @ ..] => Command::FocusWorkspace(workspace_target(rest)?),
        ["focus", "monitor", direction] => Command::FocusMonitor(parse_direction(direction)?),
        ["focus", direction] => {
            Command::FocusDirection { subject, direction: parse_direction(direction)? }
        }
        ["move", "to", "workspace", rest @ ..] => {
            Command::MoveToWorkspace { subject, workspace: workspace_name(rest)? }
        }
        ["move", direction] => {
            Command::MoveDirection { subject, direction: parse_direction(direction)? }
        }
        ["resize", verb, dimension, amount @ ..] => {
            let grow = match *verb {
                "grow" => true,
                "shrink" => false,
                other => return Err(unknown_argument("resize", other)),
            };
            let dimension = match *dimension {
                "width" => ResizeDimension::Width,
                "height" => ResizeDimension::Height,
                other => return Err(unknown_argument("resize", other)),
            };
            let amount = match amount {
                [] => None,
                [percent] => Some(parse_percent(percent)?),
                _ => return Err(trailing(text)),
            };
            Command::Resize { subject, dimension, grow, amount }
        }
        ["layout", "toggle"] => Command::ToggleLayout { subject },
        ["layout", layout] => Command::SetLayout { subject, layout: parse_layout(layout)? },
        ["toggle", target] => {
            let target = match parse_state(target)? {
                WindowStateTarget::Tiling | WindowStateTarget::Minimized => {
                    return Err(unknown_argument("toggle", target));
                }
                target => target,
            };
            Command::ToggleWindowState { subject, target }
        }
        ["set", target] => Command::SetWindowState { subject, target: parse_state(target)? },
        ["close"] => Command::Close { subject },
        ["exit"] => Command::Exit,
        ["reload"] => Command::ReloadConfig(None),
        ["redraw"] => Command::Redraw,
        [] => return Err(WmError::invalid("empty command")),
        [verb, ..] if KNOWN_VERBS.contains(verb) => return Err(trailing(text)),
        [verb, ..] => return Err(WmError::invalid(format!("unknown command \"{verb}\""))),
    };
    Ok(command)
}

const KNOWN_VERBS: [&str; 10] =
    ["focus", "move", "resize", "layout", "toggle", "set", "close", "exit", "reload", "redraw"];

fn workspace_target(words: &[&str]) -> WmResult<WorkspaceTarget> {
    Ok(match words {
        ["next"] => WorkspaceTarget::Next,
        ["prev"] => WorkspaceTarget::Previous,
        ["recent"] => WorkspaceTarget::Recent,
        _ => WorkspaceTarget::Name(workspace_name(words)?),
    })
}

fn workspace_name(words: &[&str]) -> WmResult<String> {
    if words.is_empty() {
        return Err(WmError::invalid("missing workspace name"));
    }
    Ok(words.join(" "))
}

fn parse_direction(word: &str) -> WmResult<Direction> {
    Direction::parse(word).ok_or_else(|| WmError::invalid(format!("unknown direction \"{word}\"")))
}

fn parse_layout(word: &str) -> WmResult<Layout> {
    match word {
        "horizontal" => Ok(Layout::Horizontal),
        "vertical" => Ok(Layout::Vertical),
        other => Err(unknown_argument("layout", other)),
    }
}

fn parse_state(word: &str) -> WmResult<WindowStateTarget> {
    WindowStateTarget::parse(word)
        .ok_or_else(|| WmError::invalid(format!("unknown window state \"{word}\"")))
}

/// Accepts `10` or `10%` and returns the fraction.
fn parse_percent(word: &str) -> WmResult<f64> {
    let value: f64 = word
        .trim_end_matches('%')
        .parse()
        .map_err(|_| WmError::invalid(format!("invalid resize amount \"{word}\"")))?;
    if !value.is_finite() || value <= 0.0 || value > 100.0 {
        return Err(WmError::invalid(format!("resize amount must be in (0, 100], got {word}")));
    }
    Ok(value / 100.0)
}

fn unknown_argument(verb: &str, word: &str) -> WmError {
    WmError::invalid(format!("unknown argument \"{word}\" for {verb}"))
}

fn trailing(text: &str) -> WmError { WmError::invalid(format!("malformed command \"{text}\"")) }
