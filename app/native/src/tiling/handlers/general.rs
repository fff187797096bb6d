//! Config reload, full redraw and exit.

use std::sync::Arc;

use super::window::{change_state, release};
use crate::config::{self, RuleAction, RuleSubject, WmConfig};
use crate::error::WmResult;
use crate::tiling::bus::{Event, WindowStateTarget};
use crate::tiling::fatal;
use crate::tiling::services::{windows, workspaces};
use crate::tiling::state::{ContainerId, WindowState, WmState};

/// Swaps in a new config snapshot, loading it from disk when none is given,
/// and re-applies window rules to windows the user has not overridden.
///
/// # Errors
///
/// Fails with `Config` if the file cannot be loaded; the old config stays
/// in effect.
pub fn reload_config(state: &mut WmState, config: Option<Arc<WmConfig>>) -> WmResult<()> {
    let config = match config {
        Some(config) => config,
        None => {
            let (config, path) = config::load_config()?;
            tracing::info!(path = %path.display(), "reloaded configuration");
            Arc::new(config)
        }
    };
    state.set_config(Arc::clone(&config));

    let root = state.tree.root();
    for id in windows(&state.tree, root) {
        let Some((current, action)) = rule_action(state, &config, id) else { continue };
        let target = match action {
            RuleAction::Ignore => {
                release(state, id)?;
                continue;
            }
            RuleAction::Floating => WindowStateTarget::Floating,
            RuleAction::Tiling => WindowStateTarget::Tiling,
        };
        if matches!(current, WindowState::Tiling { .. } | WindowState::Floating) {
            change_state(state, id, target)?;
        }
    }

    for workspace in workspaces(&state.tree) {
        state.mark_dirty(workspace);
    }
    state.queue_event(Event::UserConfigReloaded);
    Ok(())
}

fn rule_action(
    state: &WmState,
    config: &WmConfig,
    id: ContainerId,
) -> Option<(WindowState, RuleAction)> {
    let window = state.tree.get(id)?.as_window()?;
    if window.user_override {
        return None;
    }
    let subject = RuleSubject {
        process_name: &window.process_name,
        class_name: &window.class_name,
        title: &window.title,
    };
    Some((window.state, config.rule_action_for(&subject).unwrap_or_default()))
}

/// Redraws every window.
pub fn redraw(state: &mut WmState) {
    let root = state.tree.root();
    state.mark_dirty(root);
}

/// Restores every window and records exit code 0.
pub fn exit(state: &mut WmState) {
    tracing::info!("window manager exiting");
    fatal::teardown(state);
    state.set_exit_code(0);
    state.queue_event(Event::ApplicationExiting);
}
