//! Window lifecycle and window-state handlers.
//!
//! State changes replace the window's variant in place: the container keeps
//! its key, its stable id and its position among its siblings. Only the
//! share bookkeeping changes when a window enters or leaves tiling.

use super::container::{self, mark_for_redraw};
use super::focus::{focus_container, focus_target_in, is_focusable_window};
use crate::config::RuleAction;
use crate::error::{WmError, WmResult};
use crate::ipc::dto;
use crate::platform::{NativeWindowInfo, PlacementFlags, WindowPlacement};
use crate::tiling::bus::{Event, WindowStateTarget};
use crate::tiling::layout::{self, Gaps, share_on_attach, share_on_detach};
use crate::tiling::services::{ancestor_along_axis, focused_workspace, is_displayed, workspace_of};
use crate::tiling::state::{
    Container, ContainerId, ContainerKind, Rect, ResizeDimension, RestoreState, TransientState,
    WindowData, WindowHandle, WindowState, WmState,
};

fn window(state: &WmState, id: ContainerId) -> WmResult<&WindowData> {
    state.tree.container(id)?.as_window().ok_or_else(|| WmError::invalid("container is not a window"))
}

fn window_mut(state: &mut WmState, id: ContainerId) -> WmResult<&mut WindowData> {
    state
        .tree
        .container_mut(id)?
        .as_window_mut()
        .ok_or_else(|| WmError::invalid("container is not a window"))
}

fn workspace_rect(state: &WmState, workspace: ContainerId) -> Option<Rect> {
    let gaps = Gaps::from_config(state.config());
    layout::rect(&state.tree, &gaps, workspace)
}

/// Starts managing a native window.
///
/// The window lands on `workspace`, or on the focused workspace. Tiling
/// windows are inserted right after the focused tiling window of that
/// workspace; floating windows are attached to the workspace itself. Already
/// managed handles return their existing container.
///
/// # Errors
///
/// - `InvalidCommand` for `ignore` actions or a target that is not a workspace
/// - `ContainerNotFound` when there is no workspace to manage into
pub fn manage(
    state: &mut WmState,
    handle: WindowHandle,
    info: &NativeWindowInfo,
    action: RuleAction,
    workspace: Option<ContainerId>,
) -> WmResult<ContainerId> {
    if let Some(existing) = state.tree.find_window(handle) {
        return Ok(existing);
    }

    let workspace = match workspace {
        Some(ws) if state.tree.container(ws)?.is_workspace() => ws,
        Some(_) => return Err(WmError::invalid("windows can only be managed into workspaces")),
        None => focused_workspace(state)
            .ok_or_else(|| WmError::not_found("no workspace to manage the window into"))?,
    };

    let window_state = match action {
        RuleAction::Tiling => WindowState::Tiling { size_percentage: 0.0 },
        RuleAction::Floating => WindowState::Floating,
        RuleAction::Ignore => return Err(WmError::invalid("ignored windows cannot be managed")),
    };

    let mut placement = info.rect;
    if action == RuleAction::Floating
        && state.config().general.center_new_floating_windows
        && let Some(outer) = workspace_rect(state, workspace)
    {
        placement = placement.centered_in(&outer);
    }

    let mut data = WindowData::new(handle, window_state, placement);
    data.title.clone_from(&info.title);
    data.process_name.clone_from(&info.process_name);
    data.class_name.clone_from(&info.class_name);
    let id = state.tree.insert(Container::new(ContainerKind::Window(data)))?;

    let anchor = if action == RuleAction::Tiling {
        state
            .tree
            .last_focused_descendant(workspace)
            .filter(|focused| state.tree.get(*focused).is_some_and(Container::is_tiling_window))
    } else {
        None
    };
    match anchor.and_then(|a| Some((state.tree.parent(a)?, state.tree.index(a)?))) {
        Some((parent, index)) => container::attach(state, parent, id, Some(index + 1))?,
        None => container::attach(state, workspace, id, None)?,
    }

    let displayed = is_displayed(&state.tree, id);
    if displayed {
        focus_container(state, id, true)?;
    } else {
        state.mark_dirty(id);
    }

    tracing::info!(%handle, process = %info.process_name, ?action, "managing window");
    if let Some(managed_window) = dto::snapshot(state, id) {
        state.queue_event(Event::WindowManaged { managed_window });
    }
    Ok(id)
}

/// Stops managing a window and frees its container.
///
/// If the window held focus, focus moves to the last focused window of its
/// parent, then of its grandparent, then to the workspace.
///
/// # Errors
///
/// Fails if `id` is not a window.
pub fn unmanage(state: &mut WmState, id: ContainerId) -> WmResult<()> {
    let handle = window(state, id)?.handle;
    let uuid = state.tree.container(id)?.id;
    let was_focused = state.focused_container() == Some(id);
    let parent = state.tree.parent(id);
    let grandparent = parent.and_then(|p| state.tree.parent(p));
    let workspace = workspace_of(&state.tree, id);

    container::remove(state, id)?;

    if was_focused {
        let fallback = [parent, grandparent]
            .into_iter()
            .flatten()
            .filter(|c| state.tree.is_attached(*c) && workspace_of(&state.tree, *c) == workspace)
            .map(|c| focus_target_in(state, c, id))
            .find(|target| is_focusable_window(state, *target))
            .or_else(|| workspace.filter(|ws| state.tree.is_attached(*ws)));
        if let Some(target) = fallback {
            focus_container(state, target, true)?;
        }
    }

    tracing::info!(%handle, "unmanaged window");
    state.queue_event(Event::WindowUnmanaged { unmanaged_id: uuid, unmanaged_handle: handle });
    Ok(())
}

/// Stops managing a window that rules now ignore. A window the manager hid
/// is shown again first, since nothing would show it afterwards.
///
/// # Errors
///
/// Fails if `id` is not a window or the window system rejects the
/// placement.
pub fn release(state: &mut WmState, id: ContainerId) -> WmResult<()> {
    let data = window(state, id)?;
    if data.hidden_by_manager {
        let handle = data.handle;
        let gaps = Gaps::from_config(state.config());
        let rect = layout::rect(&state.tree, &gaps, id).unwrap_or(data.floating_placement);
        state.system().apply_placements(&[WindowPlacement::from_rect(
            handle,
            &rect,
            PlacementFlags::SHOW | PlacementFlags::NO_ACTIVATE,
        )])?;
        window_mut(state, id)?.hidden_by_manager = false;
    }
    unmanage(state, id)
}

/// Asks the OS to close a window. The window is unmanaged once the OS
/// reports it destroyed.
///
/// # Errors
///
/// Returns the window system's error.
pub fn close(state: &mut WmState, id: ContainerId) -> WmResult<()> {
    let handle = window(state, id)?.handle;
    state.system().close_window(handle)
}

/// Floating placement for a window entering the floating state: its stored
/// placement, or half its workspace when it never floated.
fn floating_placement_for(state: &WmState, id: ContainerId, workspace: ContainerId) -> WmResult<Rect> {
    let stored = window(state, id)?.floating_placement;
    if stored.is_valid() {
        return Ok(stored);
    }
    let outer = workspace_rect(state, workspace).unwrap_or_default();
    let half = Rect::new(0.0, 0.0, outer.width / 2.0, outer.height / 2.0);
    Ok(half.centered_in(&outer))
}

/// Replaces a window's variant in place.
pub(crate) fn change_state(
    state: &mut WmState,
    id: ContainerId,
    target: WindowStateTarget,
) -> WmResult<()> {
    let current = window(state, id)?.state;
    if current.as_str() == target.as_str() {
        return Ok(());
    }
    let workspace =
        workspace_of(&state.tree, id).ok_or_else(|| WmError::not_found("workspace of window"))?;

    let previous = current.restore_state();
    let next = match target {
        WindowStateTarget::Tiling => WindowState::Tiling { size_percentage: 0.0 },
        WindowStateTarget::Floating => WindowState::Floating,
        WindowStateTarget::Minimized => {
            let placement = if matches!(current, WindowState::Floating) {
                window(state, id)?.floating_placement
            } else {
                let gaps = Gaps::from_config(state.config());
                layout::rect(&state.tree, &gaps, id).unwrap_or_default()
            };
            WindowState::Minimized { previous, from: current.transient(), placement }
        }
        WindowStateTarget::Maximized => WindowState::Maximized { previous },
        WindowStateTarget::Fullscreen => WindowState::Fullscreen { previous },
    };

    let leaving_minimized = matches!(current, WindowState::Minimized { .. });
    if matches!(next, WindowState::Floating) {
        let placement = match current {
            WindowState::Minimized { placement, .. } if placement.is_valid() => placement,
            _ if leaving_minimized => window(state, id)?.floating_placement,
            _ => floating_placement_for(state, id, workspace)?,
        };
        window_mut(state, id)?.floating_placement = placement;
    }

    // floating windows live directly under their workspace
    if matches!(next, WindowState::Floating) && state.tree.parent(id) != Some(workspace) {
        container::detach(state, id)?;
        window_mut(state, id)?.state = next;
        container::attach(state, workspace, id, None)?;
    } else {
        let freed = state.tree.container(id)?.size_percentage();
        let parent = state.tree.parent(id);
        window_mut(state, id)?.state = next;

        match (freed, parent) {
            (Some(freed), Some(parent)) => share_on_detach(&mut state.tree, parent, freed),
            (None, _) if matches!(next, WindowState::Tiling { .. }) => {
                share_on_attach(&mut state.tree, id);
            }
            _ => {}
        }
    }

    tracing::debug!(from = current.as_str(), to = target.as_str(), "window state changed");
    mark_for_redraw(state, workspace);
    // the OS shows a restored window even when its workspace is hidden
    if leaving_minimized && !is_displayed(&state.tree, id) {
        state.mark_dirty(id);
    }
    Ok(())
}

/// Changes a window's state on the user's behalf. Rules no longer apply to
/// the window afterwards.
///
/// Minimizing and restoring also go through the OS, and a minimized window
/// hands focus to the next focusable container of its workspace.
///
/// # Errors
///
/// Fails if `id` is not a window or the OS call fails.
pub fn set_state_by_user(
    state: &mut WmState,
    id: ContainerId,
    target: WindowStateTarget,
) -> WmResult<()> {
    let current = window(state, id)?.state;
    let handle = window(state, id)?.handle;
    window_mut(state, id)?.user_override = true;

    let was_minimized = matches!(current, WindowState::Minimized { .. });
    change_state(state, id, target)?;

    match target {
        WindowStateTarget::Minimized if !was_minimized => {
            state.system().minimize_window(handle)?;
            if state.focused_container() == Some(id)
                && let Some(workspace) = workspace_of(&state.tree, id)
            {
                let next = focus_target_in(state, workspace, id);
                focus_container(state, next, true)?;
            }
        }
        _ if was_minimized && target != WindowStateTarget::Minimized => {
            state.system().restore_window(handle)?;
            focus_container(state, id, true)?;
        }
        _ => {}
    }
    Ok(())
}

/// Toggles a window in and out of `target`. Leaving a transient state
/// returns to the remembered variant; leaving floating returns to tiling.
///
/// # Errors
///
/// Same as [`set_state_by_user`].
pub fn toggle_state(
    state: &mut WmState,
    id: ContainerId,
    target: WindowStateTarget,
) -> WmResult<()> {
    let current = window(state, id)?.state;
    let next = if current.as_str() == target.as_str() {
        match current.restore_state() {
            RestoreState::Floating if target != WindowStateTarget::Floating => {
                WindowStateTarget::Floating
            }
            _ => WindowStateTarget::Tiling,
        }
    } else {
        target
    };
    set_state_by_user(state, id, next)
}

/// The variant a minimized window returns to.
const fn restore_target(current: &WindowState) -> WindowStateTarget {
    match (current.transient(), current.restore_state()) {
        (Some(TransientState::Maximized), _) => WindowStateTarget::Maximized,
        (Some(TransientState::Fullscreen), _) => WindowStateTarget::Fullscreen,
        (None, RestoreState::Tiling) => WindowStateTarget::Tiling,
        (None, RestoreState::Floating) => WindowStateTarget::Floating,
    }
}

/// Mirrors a minimize or restore the OS already performed.
///
/// # Errors
///
/// Fails if `id` is not a window.
pub fn sync_minimized(state: &mut WmState, id: ContainerId, minimized: bool) -> WmResult<()> {
    let current = window(state, id)?.state;
    if minimized == matches!(current, WindowState::Minimized { .. }) {
        return Ok(());
    }
    if !minimized {
        return change_state(state, id, restore_target(&current));
    }

    change_state(state, id, WindowStateTarget::Minimized)?;
    if state.focused_container() == Some(id)
        && let Some(workspace) = workspace_of(&state.tree, id)
    {
        let next = focus_target_in(state, workspace, id);
        focus_container(state, next, false)?;
    }
    Ok(())
}

/// Resizes a window along `dimension` by `delta`, a fraction of the
/// workspace. Tiling windows trade share with the siblings of their nearest
/// ancestor along the matching axis; floating windows grow their placement.
///
/// # Errors
///
/// Fails with `Unsupported` for other window states or when nothing can be
/// resized along that axis.
pub fn resize(
    state: &mut WmState,
    id: ContainerId,
    dimension: ResizeDimension,
    delta: f64,
) -> WmResult<()> {
    match window(state, id)?.state {
        WindowState::Floating => {
            let workspace = workspace_of(&state.tree, id)
                .ok_or_else(|| WmError::not_found("workspace of window"))?;
            let outer = workspace_rect(state, workspace).unwrap_or_default();
            let placement = &mut window_mut(state, id)?.floating_placement;
            match dimension {
                ResizeDimension::Width => {
                    placement.width = (placement.width + delta * outer.width).max(1.0);
                }
                ResizeDimension::Height => {
                    placement.height = (placement.height + delta * outer.height).max(1.0);
                }
            }
            mark_for_redraw(state, id);
            Ok(())
        }
        WindowState::Tiling { .. } => {
            let target = ancestor_along_axis(&state.tree, id, dimension.axis())
                .ok_or_else(|| WmError::unsupported("nothing to resize along that axis"))?;
            layout::resize(&mut state.tree, target, delta)?;
            if let Some(parent) = state.tree.parent(target) {
                mark_for_redraw(state, parent);
            }
            Ok(())
        }
        other => Err(WmError::unsupported(format!("cannot resize a {} window", other.as_str()))),
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::platform::{SystemCall, WindowSystem};
    use crate::tiling::handlers::test_support::Fixture;

    fn state_of(fx: &Fixture, id: ContainerId) -> WindowState {
        fx.state.tree.get(id).unwrap().as_window().unwrap().state
    }

    #[test]
    fn test_manage_inserts_after_focused_tiling_window() {
        let mut fx = Fixture::new(&["1"]);
        let a = fx.tiling(1);
        let b = fx.tiling(2);
        fx.state.tree.set_focused_descendant(a);
        let c = fx.tiling(3);

        assert_eq!(fx.state.tree.children(fx.workspace), &[a, c, b]);
        assert_eq!(fx.state.focused_container(), Some(c));
        for id in [a, b, c] {
            assert_relative_eq!(fx.share(id), 1.0 / 3.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_manage_is_idempotent_per_handle() {
        let mut fx = Fixture::new(&["1"]);
        let a = fx.tiling(1);
        let info = fx.system.window_info(WindowHandle(1)).unwrap();
        let again = manage(&mut fx.state, WindowHandle(1), &info, RuleAction::Tiling, None).unwrap();
        assert_eq!(a, again);
        assert_eq!(fx.state.tree.children(fx.workspace).len(), 1);
    }

    #[test]
    fn test_unmanage_redistributes_and_refocuses() {
        let mut fx = Fixture::new(&["1"]);
        let a = fx.tiling(1);
        let b = fx.tiling(2);
        let c = fx.tiling(3);
        fx.state.tree.set_focused_descendant(a);
        fx.state.tree.set_focused_descendant(c);

        unmanage(&mut fx.state, c).unwrap();
        assert_eq!(fx.state.focused_container(), Some(a));
        assert_relative_eq!(fx.share(a) + fx.share(b), 1.0, epsilon = 1e-9);
        assert!(fx.state.queued_events().any(|event| matches!(
            event,
            Event::WindowUnmanaged { unmanaged_handle: WindowHandle(3), .. }
        )));
    }

    #[test]
    fn test_floating_round_trip_keeps_position() {
        let mut fx = Fixture::new(&["1"]);
        let a = fx.tiling(1);
        let b = fx.tiling(2);

        set_state_by_user(&mut fx.state, a, WindowStateTarget::Floating).unwrap();
        assert_eq!(state_of(&fx, a), WindowState::Floating);
        assert_relative_eq!(fx.share(b), 1.0, epsilon = 1e-9);
        assert!(fx.state.tree.get(a).unwrap().as_window().unwrap().floating_placement.is_valid());

        set_state_by_user(&mut fx.state, a, WindowStateTarget::Tiling).unwrap();
        assert_eq!(fx.state.tree.children(fx.workspace), &[a, b]);
        assert_relative_eq!(fx.share(a), 0.5, epsilon = 1e-9);
        assert!(fx.state.tree.get(a).unwrap().as_window().unwrap().user_override);
        fx.state.tree.check_invariants().unwrap();
    }

    #[test]
    fn test_minimize_moves_focus_and_calls_os() {
        let mut fx = Fixture::new(&["1"]);
        let a = fx.tiling(1);
        let b = fx.tiling(2);
        fx.system.take_calls();

        set_state_by_user(&mut fx.state, b, WindowStateTarget::Minimized).unwrap();
        assert!(matches!(state_of(&fx, b), WindowState::Minimized { previous: RestoreState::Tiling, .. }));
        assert_eq!(fx.state.focused_container(), Some(a));
        assert!(fx.system.calls().contains(&SystemCall::Minimize(WindowHandle(2))));

        set_state_by_user(&mut fx.state, b, WindowStateTarget::Tiling).unwrap();
        assert!(fx.system.calls().contains(&SystemCall::Restore(WindowHandle(2))));
        assert_eq!(fx.state.focused_container(), Some(b));
    }

    #[test]
    fn test_toggle_maximized_returns_to_previous_state() {
        let mut fx = Fixture::new(&["1"]);
        let a = fx.tiling(1);
        set_state_by_user(&mut fx.state, a, WindowStateTarget::Floating).unwrap();

        toggle_state(&mut fx.state, a, WindowStateTarget::Maximized).unwrap();
        assert_eq!(state_of(&fx, a), WindowState::Maximized { previous: RestoreState::Floating });
        toggle_state(&mut fx.state, a, WindowStateTarget::Maximized).unwrap();
        assert_eq!(state_of(&fx, a), WindowState::Floating);
        toggle_state(&mut fx.state, a, WindowStateTarget::Floating).unwrap();
        assert!(matches!(state_of(&fx, a), WindowState::Tiling { .. }));
    }

    #[test]
    fn test_sync_minimized_remembers_fullscreen() {
        let mut fx = Fixture::new(&["1"]);
        let a = fx.tiling(1);
        set_state_by_user(&mut fx.state, a, WindowStateTarget::Floating).unwrap();
        set_state_by_user(&mut fx.state, a, WindowStateTarget::Fullscreen).unwrap();

        sync_minimized(&mut fx.state, a, true).unwrap();
        assert!(matches!(state_of(&fx, a), WindowState::Minimized {
            previous: RestoreState::Floating,
            from: Some(TransientState::Fullscreen),
            ..
        }));
        sync_minimized(&mut fx.state, a, false).unwrap();
        assert_eq!(state_of(&fx, a), WindowState::Fullscreen { previous: RestoreState::Floating });

        // a stray restore leaves a window that is not minimized alone
        sync_minimized(&mut fx.state, a, false).unwrap();
        assert_eq!(state_of(&fx, a), WindowState::Fullscreen { previous: RestoreState::Floating });
    }

    #[test]
    fn test_release_shows_window_hidden_by_manager() {
        let mut fx = Fixture::new(&["1", "2"]);
        let a = fx.tiling(1);
        fx.state.tree.get_mut(a).unwrap().as_window_mut().unwrap().hidden_by_manager = true;
        fx.system.take_calls();

        release(&mut fx.state, a).unwrap();
        assert!(!fx.state.tree.is_attached(a));
        let calls = fx.system.take_calls();
        let Some(SystemCall::ApplyPlacements(batch)) = calls.first() else {
            panic!("expected a placement, got {calls:?}");
        };
        assert_eq!(batch[0].handle, WindowHandle(1));
        assert!(batch[0].flags.contains(PlacementFlags::SHOW));
    }

    #[test]
    fn test_resize_tiling_window() {
        let mut fx = Fixture::new(&["1"]);
        let a = fx.tiling(1);
        let b = fx.tiling(2);
        resize(&mut fx.state, a, ResizeDimension::Width, 0.1).unwrap();
        assert_relative_eq!(fx.share(a), 0.6, epsilon = 1e-9);
        assert_relative_eq!(fx.share(b), 0.4, epsilon = 1e-9);

        let err = resize(&mut fx.state, a, ResizeDimension::Height, 0.1).unwrap_err();
        assert!(matches!(err, WmError::Unsupported(_)));
    }
}
