//! Fatal error path.
//!
//! Errors that are not recoverable command failures end up here. The path
//! builds a report (error message, command history most recent first, and a
//! pretty JSON dump of the tree unless the error came from the user's
//! config), logs it, appends it to the configured error log and asks the
//! injected [`FatalPrompt`] whether to keep running.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use crate::error::WmError;
use crate::ipc::dto;
use crate::platform::{PlacementFlags, WindowPlacement};
use crate::tiling::bus::Event;
use crate::tiling::layout::{Gaps, window_rects};
use crate::tiling::state::{WindowState, WmState};

/// What to do after a fatal error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatalDecision {
    Continue,
    Exit,
}

/// Everything known about a fatal error when it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FatalReport {
    pub message: String,
    /// Most recent first.
    pub command_history: Vec<String>,
    /// Pretty JSON of the root container. Absent for config errors.
    pub tree_dump: Option<String>,
}

impl FatalReport {
    /// Builds the report for `error` from the current state.
    #[must_use]
    pub fn new(state: &WmState, error: &WmError) -> Self {
        let tree_dump = (!error.is_fatal_user())
            .then(|| dto::snapshot(state, state.tree.root()))
            .flatten()
            .and_then(|root| serde_json::to_string_pretty(&root).ok());

        Self { message: error.to_string(), command_history: state.command_history(), tree_dump }
    }

    /// Plain-text form written to the error log.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = format!("{}\n", self.message);
        if !self.command_history.is_empty() {
            out.push_str("\nCommand history (most recent first):\n");
            for (index, command) in self.command_history.iter().enumerate() {
                out.push_str(&format!("  {}. {command}\n", index + 1));
            }
        }
        if let Some(dump) = &self.tree_dump {
            out.push_str("\nContainer tree:\n");
            out.push_str(dump);
            out.push('\n');
        }
        out
    }
}

/// Decides whether the window manager keeps running after a fatal error.
pub trait FatalPrompt: Send + Sync {
    fn decide(&self, report: &FatalReport) -> FatalDecision;
}

impl<F> FatalPrompt for F
where
    F: Fn(&FatalReport) -> FatalDecision + Send + Sync,
{
    fn decide(&self, report: &FatalReport) -> FatalDecision { self(report) }
}

/// Always keeps running.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContinueOnFatal;

impl FatalPrompt for ContinueOnFatal {
    fn decide(&self, _: &FatalReport) -> FatalDecision { FatalDecision::Continue }
}

/// Always exits.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExitOnFatal;

impl FatalPrompt for ExitOnFatal {
    fn decide(&self, _: &FatalReport) -> FatalDecision { FatalDecision::Exit }
}

/// Reports a fatal error and carries out the prompt's decision.
///
/// On [`FatalDecision::Exit`] windows are restored, the window system is
/// shut down, `ApplicationExiting` is queued and exit code 1 is recorded.
pub fn handle_fatal_error(
    state: &mut WmState,
    error: &WmError,
    prompt: &dyn FatalPrompt,
) -> FatalDecision {
    let report = report_fatal_error(state, error);
    let decision = prompt.decide(&report);
    apply_fatal_decision(state, decision);
    decision
}

/// Builds the report for `error`, logs it and appends it to the error log.
pub fn report_fatal_error(state: &WmState, error: &WmError) -> FatalReport {
    let report = FatalReport::new(state, error);

    tracing::error!(%error, "fatal window manager error");
    for (index, command) in report.command_history.iter().enumerate() {
        tracing::error!(index, command = %command, "command history");
    }
    if let Some(dump) = &report.tree_dump {
        tracing::error!("container tree:\n{dump}");
    }

    if let Some(path) = &state.config().general.error_log {
        append_report(path, &report);
    }
    report
}

/// Carries out a prompt's decision.
pub fn apply_fatal_decision(state: &mut WmState, decision: FatalDecision) {
    match decision {
        FatalDecision::Exit => {
            teardown(state);
            state.queue_event(Event::ApplicationExiting);
            state.set_exit_code(1);
        }
        FatalDecision::Continue => tracing::warn!("continuing after fatal error"),
    }
}

fn append_report(path: &Path, report: &FatalReport) {
    let written = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .and_then(|mut file| writeln!(file, "{}", report.render()));

    if let Err(err) = written {
        tracing::warn!(path = %path.display(), %err, "could not write error log");
    }
}

/// Shows every window the manager hid, restores minimized windows and shuts
/// the window system down.
pub(crate) fn teardown(state: &mut WmState) {
    let gaps = Gaps::from_config(state.config());
    let root = state.tree.root();

    let mut placements = Vec::new();
    let mut minimized = Vec::new();
    for (id, rect) in window_rects(&state.tree, &gaps, root) {
        let Some(window) = state.tree.get(id).and_then(|c| c.as_window()) else { continue };
        if matches!(window.state, WindowState::Minimized { .. }) {
            minimized.push(window.handle);
        } else if window.hidden_by_manager {
            placements.push(WindowPlacement::from_rect(
                window.handle,
                &rect,
                PlacementFlags::SHOW | PlacementFlags::NO_ACTIVATE,
            ));
        }
    }

    let system = state.system();
    if !placements.is_empty()
        && let Err(err) = system.apply_placements(&placements)
    {
        tracing::warn!(%err, "could not show hidden windows during teardown");
    }
    for handle in minimized {
        if let Err(err) = system.restore_window(handle) {
            tracing::warn!(window = %handle, %err, "could not restore window during teardown");
        }
    }
    system.shutdown();
    tracing::info!("window manager torn down");
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::WmConfig;
    use crate::platform::{HeadlessWindowSystem, SystemCall};

    fn state(config: WmConfig) -> (WmState, Arc<HeadlessWindowSystem>) {
        let system = Arc::new(HeadlessWindowSystem::new());
        (WmState::new(Arc::new(config), system.clone()), system)
    }

    #[test]
    fn test_report_lists_history_most_recent_first() {
        let (mut state, _) = state(WmConfig::default());
        state.record_command("focus left".into());
        state.record_command("move right".into());

        let report = FatalReport::new(&state, &WmError::invariant("broken"));
        assert_eq!(report.command_history, vec!["move right".to_string(), "focus left".to_string()]);
        assert!(report.tree_dump.as_deref().is_some_and(|dump| dump.contains("\"type\": \"root\"")));

        let rendered = report.render();
        let first = rendered.find("move right").unwrap();
        let second = rendered.find("focus left").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_config_errors_skip_tree_dump() {
        let (state, _) = state(WmConfig::default());
        let report = FatalReport::new(&state, &WmError::FatalUser("bad config".into()));
        assert_eq!(report.tree_dump, None);
        assert_eq!(report.render(), "bad config\n");
    }

    #[test]
    fn test_exit_decision_tears_down() {
        let (mut state, system) = state(WmConfig::default());
        let decision = handle_fatal_error(&mut state, &WmError::platform("gone"), &ExitOnFatal);

        assert_eq!(decision, FatalDecision::Exit);
        assert_eq!(state.exit_code(), Some(1));
        assert!(system.calls().contains(&SystemCall::Shutdown));
        assert_eq!(state.queued_events().last(), Some(&Event::ApplicationExiting));
    }

    #[test]
    fn test_continue_decision_keeps_running() {
        let (mut state, system) = state(WmConfig::default());
        let prompt = |report: &FatalReport| {
            assert!(report.message.contains("gone"));
            FatalDecision::Continue
        };
        assert_eq!(handle_fatal_error(&mut state, &WmError::platform("gone"), &prompt), FatalDecision::Continue);
        assert_eq!(state.exit_code(), None);
        assert!(system.calls().is_empty());
    }

    #[test]
    fn test_report_is_appended_to_error_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("errors.log");
        let mut config = WmConfig::default();
        config.general.error_log = Some(path.clone());
        let (mut state, _) = state(config);

        handle_fatal_error(&mut state, &WmError::invariant("first"), &ContinueOnFatal);
        handle_fatal_error(&mut state, &WmError::invariant("second"), &ContinueOnFatal);

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.find("first").unwrap() < contents.find("second").unwrap());
    }
}
