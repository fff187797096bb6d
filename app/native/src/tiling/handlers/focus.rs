//! Focus handlers.

use super::workspace;
use crate::error::{WmError, WmResult};
use crate::tiling::bus::WorkspaceTarget;
use crate::tiling::services::{
    descendant_in_direction, displayed_workspace, floating_in_direction, focused_monitor,
    focused_workspace, is_displayed, monitor_in_direction, monitor_of, tiling_focus_target,
    workspace_by_name, workspace_in_cycle, workspace_name, workspace_of,
};
use crate::tiling::state::{Container, ContainerId, Direction, WindowState, WmState};

/// Makes `id` the focused container, displaying its workspace first if it
/// is hidden. With `sync_native` the bus also moves OS focus afterwards.
///
/// # Errors
///
/// Fails if `id` is stale or its workspace cannot be displayed.
pub fn focus_container(state: &mut WmState, id: ContainerId, sync_native: bool) -> WmResult<()> {
    state.tree.container(id)?;
    let previous = focused_workspace(state);
    let previous_name =
        previous.and_then(|ws| workspace_name(&state.tree, ws)).map(str::to_string);
    let target = workspace_of(&state.tree, id);

    if let Some(ws) = target
        && !is_displayed(&state.tree, ws)
    {
        workspace::display(state, ws)?;
    }

    state.tree.set_focused_descendant(id);
    if sync_native {
        state.request_focus_sync();
    }

    if previous != target && previous.is_some() && target.is_some() {
        state.recent_workspace = previous_name;
        if let Some(previous) = previous {
            workspace::clean_up_if_unused(state, previous)?;
        }
    }
    Ok(())
}

/// First container in focus order under `id` that can take focus: a
/// non-minimized window other than `exclude`, or `id` itself.
#[must_use]
pub fn focus_target_in(state: &WmState, id: ContainerId, exclude: ContainerId) -> ContainerId {
    fn walk(state: &WmState, id: ContainerId, exclude: ContainerId) -> Option<ContainerId> {
        state.tree.focus_order(id).iter().copied().filter(|child| *child != exclude).find_map(|child| {
            let node = state.tree.get(child)?;
            match node.as_window() {
                Some(window) if matches!(window.state, WindowState::Minimized { .. }) => None,
                Some(_) => Some(child),
                None => walk(state, child, exclude),
            }
        })
    }
    walk(state, id, exclude).unwrap_or(id)
}

/// Moves focus in a direction.
///
/// Floating windows move to the nearest floating window on their
/// workspace. Everything else first searches the workspace's tiling tree,
/// then the displayed workspace of the monitor in that direction.
///
/// # Errors
///
/// Fails if `origin` is stale.
pub fn focus_in_direction(
    state: &mut WmState,
    origin: ContainerId,
    direction: Direction,
) -> WmResult<()> {
    let node = state.tree.container(origin)?;

    if node.is_floating_window() {
        return match floating_in_direction(&state.tree, origin, direction) {
            Some(target) => focus_container(state, target, true),
            None => Ok(()),
        };
    }

    let within_workspace = if node.is_workspace() {
        None
    } else {
        tiling_focus_target(&state.tree, origin, direction)
    };
    let target = within_workspace.or_else(|| {
        let monitor = monitor_of(&state.tree, origin)?;
        let next = monitor_in_direction(&state.tree, monitor, direction)?;
        let ws = displayed_workspace(&state.tree, next)?;
        Some(descendant_in_direction(&state.tree, ws, direction))
    });

    match target {
        Some(target) => focus_container(state, target, true),
        None => Ok(()),
    }
}

/// Focuses a workspace by name, by cycling, or the recently focused one.
/// Inactive workspaces named in the config are activated on the focused
/// monitor.
///
/// # Errors
///
/// Fails with `ContainerNotFound` for names missing from the config and
/// with `Unsupported` when there is no recent workspace.
pub fn focus_workspace(state: &mut WmState, target: &WorkspaceTarget) -> WmResult<()> {
    let current = focused_workspace(state);

    let ws = match target {
        WorkspaceTarget::Name(name) => workspace_or_activate(state, name)?,
        WorkspaceTarget::Recent => {
            let name = state
                .recent_workspace
                .clone()
                .ok_or_else(|| WmError::unsupported("no recently focused workspace"))?;
            workspace_or_activate(state, &name)?
        }
        WorkspaceTarget::Next | WorkspaceTarget::Previous => {
            let forward = matches!(target, WorkspaceTarget::Next);
            let config = state.config_arc();
            let Some(next) =
                current.and_then(|ws| workspace_in_cycle(&state.tree, &config, ws, forward))
            else {
                return Ok(());
            };
            next
        }
    };

    if Some(ws) == current {
        return Ok(());
    }
    let focus = state.tree.last_focused_descendant(ws).unwrap_or(ws);
    tracing::debug!(workspace = ?workspace_name(&state.tree, ws), "focusing workspace");
    focus_container(state, focus, true)
}

fn workspace_or_activate(state: &mut WmState, name: &str) -> WmResult<ContainerId> {
    if let Some(ws) = workspace_by_name(&state.tree, name) {
        return Ok(ws);
    }
    let monitor = focused_monitor(state).ok_or_else(|| WmError::not_found("monitor"))?;
    workspace::activate(state, monitor, Some(name))
}

/// Focuses the displayed workspace of the monitor in `direction`.
///
/// # Errors
///
/// Fails only on structural errors.
pub fn focus_monitor(state: &mut WmState, direction: Direction) -> WmResult<()> {
    let Some(target) = focused_monitor(state)
        .and_then(|monitor| monitor_in_direction(&state.tree, monitor, direction))
        .and_then(|monitor| displayed_workspace(&state.tree, monitor))
    else {
        return Ok(());
    };
    let focus = state.tree.last_focused_descendant(target).unwrap_or(target);
    focus_container(state, focus, true)
}

/// Returns `true` if `id` is a window that can take focus.
#[must_use]
pub fn is_focusable_window(state: &WmState, id: ContainerId) -> bool {
    state
        .tree
        .get(id)
        .and_then(Container::as_window)
        .is_some_and(|window| !matches!(window.state, WindowState::Minimized { .. }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiling::handlers::test_support::Fixture;
    use crate::tiling::state::{Rect, RestoreState};

    #[test]
    fn test_focus_direction_within_workspace() {
        let mut fx = Fixture::new(&["1"]);
        let a = fx.tiling(1);
        let b = fx.tiling(2);
        assert_eq!(fx.state.focused_container(), Some(b));

        focus_in_direction(&mut fx.state, b, Direction::Left).unwrap();
        assert_eq!(fx.state.focused_container(), Some(a));
        focus_in_direction(&mut fx.state, a, Direction::Left).unwrap();
        assert_eq!(fx.state.focused_container(), Some(a));
    }

    #[test]
    fn test_focus_direction_crosses_monitors() {
        let mut fx = Fixture::new(&["1", "2"]);
        let a = fx.tiling(1);
        let (_, second_ws) = fx.add_monitor("DISPLAY2", Rect::new(1000.0, 0.0, 1000.0, 500.0));

        focus_in_direction(&mut fx.state, a, Direction::Right).unwrap();
        assert_eq!(fx.state.focused_container(), Some(second_ws));
        focus_in_direction(&mut fx.state, second_ws, Direction::Left).unwrap();
        assert_eq!(fx.state.focused_container(), Some(a));
    }

    #[test]
    fn test_focus_workspace_switches_display_and_remembers_recent() {
        let mut fx = Fixture::new(&["1", "2"]);
        let a = fx.tiling(1);

        focus_workspace(&mut fx.state, &WorkspaceTarget::Name("2".into())).unwrap();
        let two = workspace_by_name(&fx.state.tree, "2").unwrap();
        assert_eq!(fx.state.focused_container(), Some(two));
        assert!(is_displayed(&fx.state.tree, two));
        assert!(!is_displayed(&fx.state.tree, a));

        focus_workspace(&mut fx.state, &WorkspaceTarget::Recent).unwrap();
        assert_eq!(fx.state.focused_container(), Some(a));
        // "2" was empty and lost focus
        assert_eq!(workspace_by_name(&fx.state.tree, "2"), None);
    }

    #[test]
    fn test_focus_workspace_rejects_unknown_name() {
        let mut fx = Fixture::new(&["1"]);
        let err = focus_workspace(&mut fx.state, &WorkspaceTarget::Name("nope".into())).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_focus_target_skips_minimized_windows() {
        let mut fx = Fixture::new(&["1"]);
        let a = fx.tiling(1);
        let b = fx.tiling(2);
        fx.state.tree.get_mut(a).unwrap().as_window_mut().unwrap().state =
            WindowState::Minimized {
                previous: RestoreState::Tiling,
                from: None,
                placement: Rect::zero(),
            };
        assert_eq!(focus_target_in(&fx.state, fx.workspace, b), fx.workspace);
        assert!(!is_focusable_window(&fx.state, a));
    }
}
