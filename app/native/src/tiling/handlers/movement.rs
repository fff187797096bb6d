//! Move handlers: directional moves, moves between workspaces and OS-driven
//! floating placement updates.

use super::container::{self, mark_for_redraw, set_axis, wrap_children};
use super::focus::{focus_container, focus_target_in};
use super::workspace;
use crate::error::{WmError, WmResult};
use crate::tiling::layout::sizing::resizable_children;
use crate::tiling::services::{
    descendant_in_direction, displayed_workspace, focused_monitor, monitor_at_point,
    monitor_in_direction, monitor_of, sibling_in_direction, workspace_by_name, workspace_of,
};
use crate::tiling::state::{Container, ContainerId, Direction, Rect, WindowState, WmState};

/// Moves a window in a direction.
///
/// # Errors
///
/// Fails with `Unsupported` for minimized, maximized and fullscreen windows.
pub fn move_in_direction(state: &mut WmState, id: ContainerId, direction: Direction) -> WmResult<()> {
    let window_state = state
        .tree
        .container(id)?
        .as_window()
        .map(|window| window.state)
        .ok_or_else(|| WmError::invalid("command requires a window"))?;

    match window_state {
        WindowState::Floating => move_floating(state, id, direction),
        WindowState::Tiling { .. } => move_tiling(state, id, direction),
        other => Err(WmError::unsupported(format!("cannot move a {} window", other.as_str()))),
    }
}

fn move_floating(state: &mut WmState, id: ContainerId, direction: Direction) -> WmResult<()> {
    let step = f64::from(state.config().general.floating_move_step);
    let (dx, dy) = match direction {
        Direction::Left => (-step, 0.0),
        Direction::Right => (step, 0.0),
        Direction::Up => (0.0, -step),
        Direction::Down => (0.0, step),
    };

    let window = state
        .tree
        .container_mut(id)?
        .as_window_mut()
        .ok_or_else(|| WmError::invalid("command requires a window"))?;
    window.floating_placement = window.floating_placement.translated(dx, dy);

    relocate_floating(state, id, true)?;
    mark_for_redraw(state, id);
    Ok(())
}

/// Moves a floating window to the displayed workspace of the monitor its
/// center is on, if that is another monitor.
fn relocate_floating(state: &mut WmState, id: ContainerId, sync_native: bool) -> WmResult<()> {
    let Some(placement) = state.tree.container(id)?.as_window().map(|w| w.floating_placement) else {
        return Ok(());
    };
    let (cx, cy) = placement.center();
    let Some(monitor) = monitor_at_point(&state.tree, cx, cy) else { return Ok(()) };
    if monitor_of(&state.tree, id) == Some(monitor) {
        return Ok(());
    }
    let Some(target) = displayed_workspace(&state.tree, monitor) else { return Ok(()) };

    let was_focused = state.focused_container() == Some(id);
    container::detach(state, id)?;
    container::attach(state, target, id, None)?;
    if was_focused {
        focus_container(state, id, sync_native)?;
    }
    tracing::debug!(?monitor, "floating window changed monitor");
    Ok(())
}

fn move_tiling(state: &mut WmState, id: ContainerId, direction: Direction) -> WmResult<()> {
    let workspace =
        workspace_of(&state.tree, id).ok_or_else(|| WmError::not_found("workspace of window"))?;

    if let Some(sibling) = sibling_in_direction(&state.tree, id, direction) {
        if state.tree.container(sibling)?.is_window() {
            let index = state.tree.index(sibling).unwrap_or_default();
            state.tree.move_to_index(id, index)?;
            if let Some(parent) = state.tree.parent(id) {
                mark_for_redraw(state, parent);
            }
            return Ok(());
        }
        return move_into_split(state, id, sibling, direction);
    }

    // first ancestor below the workspace whose parent runs along the axis
    let escape = state
        .tree
        .ancestors(id)
        .take_while(|ancestor| *ancestor != workspace)
        .find(|ancestor| {
            state
                .tree
                .parent(*ancestor)
                .and_then(|parent| state.tree.get(parent)?.layout())
                == Some(direction.axis())
        });
    if let Some(ancestor) = escape {
        let parent = state
            .tree
            .parent(ancestor)
            .ok_or_else(|| WmError::invariant(format!("{ancestor:?} is not attached")))?;
        let index = state.tree.index(ancestor).unwrap_or_default() + usize::from(direction.is_forward());
        container::detach(state, id)?;
        container::attach(state, parent, id, Some(index))?;
        return focus_container(state, id, false);
    }

    let workspace_layout = state.tree.container(workspace)?.layout().unwrap_or_default();
    let has_company = resizable_children(&state.tree, workspace).len() > 1;
    if workspace_layout != direction.axis() && has_company {
        container::detach(state, id)?;
        wrap_children(state, workspace, workspace_layout)?;
        set_axis(state, workspace, direction.axis())?;
        let index = if direction.is_forward() { None } else { Some(0) };
        container::attach(state, workspace, id, index)?;
        return focus_container(state, id, false);
    }

    move_to_adjacent_monitor(state, id, workspace, direction)
}

/// Inserts `id` next to the descendant of `split` nearest to it.
fn move_into_split(
    state: &mut WmState,
    id: ContainerId,
    split: ContainerId,
    direction: Direction,
) -> WmResult<()> {
    let target = descendant_in_direction(&state.tree, split, direction);
    container::detach(state, id)?;

    let parent = state
        .tree
        .parent(target)
        .ok_or_else(|| WmError::invariant(format!("{target:?} is not attached")))?;
    let index = state.tree.index(target).unwrap_or_default();
    let along_axis = state.tree.container(parent)?.layout() == Some(direction.axis());
    let index = if along_axis && direction.is_forward() { index } else { index + 1 };

    container::attach(state, parent, id, Some(index))?;
    focus_container(state, id, false)
}

fn move_to_adjacent_monitor(
    state: &mut WmState,
    id: ContainerId,
    workspace: ContainerId,
    direction: Direction,
) -> WmResult<()> {
    let Some(target) = monitor_of(&state.tree, workspace)
        .and_then(|monitor| monitor_in_direction(&state.tree, monitor, direction))
        .and_then(|monitor| displayed_workspace(&state.tree, monitor))
    else {
        return Ok(());
    };

    container::detach(state, id)?;
    let index = if direction.is_forward() { Some(0) } else { None };
    container::attach(state, target, id, index)?;
    focus_container(state, id, true)
}

/// Moves a window to the named workspace, activating it on the focused
/// monitor if needed. The window is hidden if the target is not displayed,
/// and focus falls back within the source workspace.
///
/// # Errors
///
/// Fails with `ContainerNotFound` for names missing from the config.
pub fn move_to_workspace(state: &mut WmState, id: ContainerId, name: &str) -> WmResult<()> {
    let target = match workspace_by_name(&state.tree, name) {
        Some(ws) => ws,
        None => {
            let monitor = focused_monitor(state).ok_or_else(|| WmError::not_found("monitor"))?;
            workspace::activate(state, monitor, Some(name))?
        }
    };
    let source = workspace_of(&state.tree, id);
    if source == Some(target) {
        return Ok(());
    }

    let was_focused = state.focused_container() == Some(id);
    container::detach(state, id)?;
    container::attach(state, target, id, None)?;
    if let Some(source) = source {
        carry_floating_placement(state, id, source, target)?;
    }
    state.mark_dirty(id);

    if let Some(source) = source {
        if was_focused {
            let fallback = focus_target_in(state, source, id);
            focus_container(state, fallback, true)?;
        }
        workspace::clean_up_if_unused(state, source)?;
    }
    tracing::debug!(workspace = name, "moved window to workspace");
    Ok(())
}

/// Keeps a window's floating placement at the same offset from its monitor
/// when it changes monitor.
fn carry_floating_placement(
    state: &mut WmState,
    id: ContainerId,
    source: ContainerId,
    target: ContainerId,
) -> WmResult<()> {
    let origin = |workspace| {
        let monitor = monitor_of(&state.tree, workspace)?;
        state.tree.get(monitor)?.as_monitor().map(|data| data.rect)
    };
    let (Some(from), Some(to)) = (origin(source), origin(target)) else { return Ok(()) };
    if from == to {
        return Ok(());
    }

    let window = state
        .tree
        .container_mut(id)?
        .as_window_mut()
        .ok_or_else(|| WmError::invalid("container is not a window"))?;
    window.floating_placement = window.floating_placement.translated(to.x - from.x, to.y - from.y);
    Ok(())
}

/// Adopts the rect the OS reports for a floating window. The window is not
/// redrawn; it is already where the OS says it is.
///
/// # Errors
///
/// Fails with `Unsupported` if the window is not floating.
pub fn update_floating_placement(state: &mut WmState, id: ContainerId, rect: Rect) -> WmResult<()> {
    let window = state
        .tree
        .container_mut(id)?
        .as_window_mut()
        .ok_or_else(|| WmError::invalid("container is not a window"))?;
    if !matches!(window.state, WindowState::Floating) {
        return Err(WmError::unsupported("only floating windows track their placement"));
    }
    window.floating_placement = rect;
    relocate_floating(state, id, false)
}

/// Returns `true` if `id` is a floating window.
#[must_use]
pub fn is_floating(state: &WmState, id: ContainerId) -> bool {
    state.tree.get(id).is_some_and(Container::is_floating_window)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiling::bus::WindowStateTarget;
    use crate::tiling::handlers::container::wrap_in_split;
    use crate::tiling::handlers::window::set_state_by_user;
    use crate::tiling::handlers::test_support::Fixture;
    use crate::tiling::state::Layout;

    #[test]
    fn test_move_swaps_with_window_sibling() {
        let mut fx = Fixture::new(&["1"]);
        let a = fx.tiling(1);
        let b = fx.tiling(2);
        move_in_direction(&mut fx.state, a, Direction::Right).unwrap();
        assert_eq!(fx.state.tree.children(fx.workspace), &[b, a]);
    }

    #[test]
    fn test_move_into_split_sibling() {
        let mut fx = Fixture::new(&["1"]);
        let a = fx.tiling(1);
        let b = fx.tiling(2);
        let split = wrap_in_split(&mut fx.state, b, Layout::Vertical).unwrap();
        let c = fx.tiling_in(split, 3);

        move_in_direction(&mut fx.state, a, Direction::Right).unwrap();
        assert_eq!(fx.state.tree.children(fx.workspace), &[split]);
        assert_eq!(fx.state.tree.children(split), &[b, a, c]);
        fx.state.tree.check_invariants().unwrap();
    }

    #[test]
    fn test_move_escapes_perpendicular_split() {
        let mut fx = Fixture::new(&["1"]);
        let x = fx.tiling(1);
        let a = fx.tiling(2);
        let split = wrap_in_split(&mut fx.state, a, Layout::Vertical).unwrap();
        let y = fx.tiling_in(split, 3);

        move_in_direction(&mut fx.state, a, Direction::Left).unwrap();
        assert!(!fx.state.tree.contains(split));
        assert_eq!(fx.state.tree.children(fx.workspace), &[x, a, y]);
        assert_eq!(fx.state.focused_container(), Some(a));
        fx.state.tree.check_invariants().unwrap();
    }

    #[test]
    fn test_move_across_workspace_axis_wraps_siblings() {
        let mut fx = Fixture::new(&["1"]);
        let a = fx.tiling(1);
        let b = fx.tiling(2);
        let c = fx.tiling(3);

        move_in_direction(&mut fx.state, a, Direction::Up).unwrap();
        let ws = fx.state.tree.container(fx.workspace).unwrap();
        assert_eq!(ws.layout(), Some(Layout::Vertical));
        let children = fx.state.tree.children(fx.workspace).to_vec();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0], a);
        assert_eq!(fx.state.tree.children(children[1]), &[b, c]);
        fx.state.tree.check_invariants().unwrap();
    }

    #[test]
    fn test_move_past_workspace_edge_changes_monitor() {
        let mut fx = Fixture::new(&["1", "2"]);
        let a = fx.tiling(1);
        let (_, second) = fx.add_monitor("DISPLAY2", Rect::new(1000.0, 0.0, 1000.0, 500.0));

        move_in_direction(&mut fx.state, a, Direction::Right).unwrap();
        assert_eq!(fx.state.tree.parent(a), Some(second));
        assert_eq!(fx.state.focused_container(), Some(a));
    }

    #[test]
    fn test_move_floating_window_shifts_placement() {
        let mut fx = Fixture::new(&["1"]);
        let a = fx.tiling(1);
        set_state_by_user(&mut fx.state, a, WindowStateTarget::Floating).unwrap();
        let before = fx.state.tree.get(a).unwrap().as_window().unwrap().floating_placement;

        move_in_direction(&mut fx.state, a, Direction::Down).unwrap();
        let after = fx.state.tree.get(a).unwrap().as_window().unwrap().floating_placement;
        assert!((after.y - before.y - 50.0).abs() < f64::EPSILON);
        assert!(is_floating(&fx.state, a));
    }

    #[test]
    fn test_move_to_workspace_activates_target() {
        let mut fx = Fixture::new(&["1", "2"]);
        let a = fx.tiling(1);
        let b = fx.tiling(2);

        move_to_workspace(&mut fx.state, b, "2").unwrap();
        let two = workspace_by_name(&fx.state.tree, "2").unwrap();
        assert_eq!(fx.state.tree.parent(b), Some(two));
        assert_eq!(fx.state.focused_container(), Some(a));
        assert!(fx.state.is_dirty(b));
        assert!(!fx.state.is_dirty(two));
    }

    #[test]
    fn test_update_floating_placement_requires_floating() {
        let mut fx = Fixture::new(&["1"]);
        let a = fx.tiling(1);
        let err = update_floating_placement(&mut fx.state, a, Rect::new(0.0, 0.0, 10.0, 10.0));
        assert!(matches!(err, Err(WmError::Unsupported(_))));
    }
}
