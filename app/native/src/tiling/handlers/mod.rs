//! Command handlers.
//!
//! [`dispatch`] is the only entry point: one `match` arm per [`Command`]
//! variant. Handlers receive `&mut WmState`, mutate the tree, mark
//! containers dirty and queue follow-up events. Nested commands are plain
//! calls to [`dispatch`] on the same state.

pub mod container;
pub mod focus;
pub mod general;
pub mod monitor;
pub mod movement;
pub mod redraw;
pub mod window;
pub mod workspace;

use crate::error::{WmError, WmResult};
use crate::tiling::bus::Command;
use crate::tiling::state::{ContainerId, WmState};

/// Runs the handler for `command`.
///
/// # Errors
///
/// Propagates the handler's error. Recoverable errors leave the tree valid.
pub fn dispatch(state: &mut WmState, command: Command) -> WmResult<()> {
    match command {
        Command::FocusDirection { subject, direction } => {
            let origin = resolve_subject(state, subject)?;
            focus::focus_in_direction(state, origin, direction)
        }
        Command::FocusWorkspace(target) => focus::focus_workspace(state, &target),
        Command::FocusMonitor(direction) => focus::focus_monitor(state, direction),
        Command::SetFocusedDescendant(id) => {
            state.tree.container(id)?;
            focus::focus_container(state, id, false)
        }
        Command::MoveDirection { subject, direction } => {
            let window = resolve_window(state, subject)?;
            movement::move_in_direction(state, window, direction)
        }
        Command::MoveToWorkspace { subject, workspace } => {
            let window = resolve_window(state, subject)?;
            movement::move_to_workspace(state, window, &workspace)
        }
        Command::Resize { subject, dimension, grow, amount } => {
            let window = resolve_window(state, subject)?;
            let step = amount.unwrap_or_else(|| state.config().general.resize_step());
            window::resize(state, window, dimension, if grow { step } else { -step })
        }
        Command::SetLayout { subject, layout } => {
            let id = resolve_subject(state, subject)?;
            container::set_layout(state, id, layout)
        }
        Command::ToggleLayout { subject } => {
            let id = resolve_subject(state, subject)?;
            container::toggle_layout(state, id)
        }
        Command::SetWindowState { subject, target } => {
            let window = resolve_window(state, subject)?;
            window::set_state_by_user(state, window, target)
        }
        Command::ToggleWindowState { subject, target } => {
            let window = resolve_window(state, subject)?;
            window::toggle_state(state, window, target)
        }
        Command::SyncMinimized { window, minimized } => {
            window::sync_minimized(state, window, minimized)
        }
        Command::UpdateFloatingPlacement { window, rect } => {
            movement::update_floating_placement(state, window, rect)
        }
        Command::Close { subject } => {
            let window = resolve_window(state, subject)?;
            window::close(state, window)
        }
        Command::ManageWindow { handle, info, action, workspace } => {
            window::manage(state, handle, &info, action, workspace).map(|_| ())
        }
        Command::UnmanageWindow(id) => window::unmanage(state, id),
        Command::ActivateWorkspace { monitor, name } => {
            workspace::activate(state, monitor, name.as_deref()).map(|_| ())
        }
        Command::DeactivateWorkspace(id) => workspace::deactivate(state, id),
        Command::DisplayWorkspace(id) => workspace::display(state, id),
        Command::AddMonitor(info) => monitor::add(state, &info).map(|_| ()),
        Command::RemoveMonitor { device_name } => monitor::remove(state, &device_name),
        Command::RefreshMonitors(infos) => monitor::refresh(state, &infos),
        Command::ReloadConfig(config) => general::reload_config(state, config),
        Command::Redraw => {
            general::redraw(state);
            Ok(())
        }
        Command::Exit => {
            general::exit(state);
            Ok(())
        }
    }
}

/// The subject container of a command: the given one or the focused one.
///
/// # Errors
///
/// Fails with `ContainerNotFound` for stale keys or when nothing is focused.
pub fn resolve_subject(state: &WmState, subject: Option<ContainerId>) -> WmResult<ContainerId> {
    match subject {
        Some(id) if state.tree.is_attached(id) => Ok(id),
        Some(id) => Err(WmError::not_found(format!("{id:?}"))),
        None => state
            .focused_container()
            .ok_or_else(|| WmError::not_found("no container is focused")),
    }
}

/// Like [`resolve_subject`], but the subject must be a window.
///
/// # Errors
///
/// Fails with `InvalidCommand` if the subject is not a window.
pub fn resolve_window(state: &WmState, subject: Option<ContainerId>) -> WmResult<ContainerId> {
    let id = resolve_subject(state, subject)?;
    if state.tree.container(id)?.is_window() {
        Ok(id)
    } else {
        Err(WmError::invalid("command requires a window"))
    }
}
