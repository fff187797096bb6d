//! Window-state reconciler.
//!
//! Turns OS notifications into commands. Each [`EventKind`] maps to a static
//! list of handlers, run in order by the bus under the state lock. Window
//! manager events have no in-process handlers; they only go out to
//! subscribers.

use crate::error::WmResult;
use crate::tiling::bus::{Command, Event, EventKind};
use crate::tiling::handlers::{dispatch, movement};
use crate::tiling::services::{displayed_workspace, focused_monitor, should_manage};
use crate::tiling::state::{Container, ContainerId, WindowHandle, WmState};

/// In-process event handler.
pub type EventHandler = fn(&mut WmState, &Event) -> WmResult<()>;

/// Handlers registered for an event kind, in delivery order.
#[must_use]
pub fn handlers_for(kind: EventKind) -> &'static [EventHandler] {
    match kind {
        EventKind::WindowShown => &[on_shown],
        EventKind::WindowHidden => &[on_hidden],
        EventKind::WindowDestroyed => &[on_destroyed],
        EventKind::WindowFocused => &[on_focused],
        EventKind::WindowMinimized => &[on_minimized],
        EventKind::WindowMinimizeEnded => &[on_minimize_ended],
        EventKind::WindowLocationChanged => &[on_location_changed],
        EventKind::WindowTitleChanged => &[on_title_changed],
        EventKind::DisplaySettingsChanged => &[on_display_settings_changed],
        _ => &[],
    }
}

fn managed(state: &WmState, event: &Event) -> Option<(WindowHandle, ContainerId)> {
    let handle = event.window_handle()?;
    Some((handle, state.tree.find_window(handle)?))
}

/// Consumes one expected echo of a manager-issued show or hide. Returns
/// `true` if the event was such an echo.
fn consume_echo(state: &mut WmState, id: ContainerId) -> bool {
    let Some(window) = state.tree.get_mut(id).and_then(Container::as_window_mut) else {
        return false;
    };
    if window.pending_visibility_changes > 0 {
        window.pending_visibility_changes -= 1;
        return true;
    }
    false
}

fn on_shown(state: &mut WmState, event: &Event) -> WmResult<()> {
    let Some(handle) = event.window_handle() else { return Ok(()) };

    if let Some(id) = state.tree.find_window(handle) {
        consume_echo(state, id);
        return Ok(());
    }
    if state.ignored_handles.contains(&handle) {
        return Ok(());
    }

    let Some(info) = state.system().window_info(handle) else { return Ok(()) };
    let Some(action) = should_manage(&info, state.config()) else {
        tracing::debug!(%handle, process = %info.process_name, "window not managed");
        state.ignored_handles.insert(handle);
        return Ok(());
    };

    let workspace =
        focused_monitor(state).and_then(|monitor| displayed_workspace(&state.tree, monitor));
    dispatch(state, Command::ManageWindow { handle, info, action, workspace })
}

fn on_hidden(state: &mut WmState, event: &Event) -> WmResult<()> {
    let Some((_, id)) = managed(state, event) else { return Ok(()) };
    if consume_echo(state, id) {
        return Ok(());
    }
    dispatch(state, Command::UnmanageWindow(id))
}

fn on_destroyed(state: &mut WmState, event: &Event) -> WmResult<()> {
    let Some(handle) = event.window_handle() else { return Ok(()) };
    state.ignored_handles.remove(&handle);
    match state.tree.find_window(handle) {
        Some(id) => dispatch(state, Command::UnmanageWindow(id)),
        None => Ok(()),
    }
}

fn on_focused(state: &mut WmState, event: &Event) -> WmResult<()> {
    let Some((_, id)) = managed(state, event) else { return Ok(()) };
    if state.focused_container() == Some(id) {
        return Ok(());
    }
    dispatch(state, Command::SetFocusedDescendant(id))
}

fn on_minimized(state: &mut WmState, event: &Event) -> WmResult<()> {
    let Some((_, id)) = managed(state, event) else { return Ok(()) };
    dispatch(state, Command::SyncMinimized { window: id, minimized: true })
}

fn on_minimize_ended(state: &mut WmState, event: &Event) -> WmResult<()> {
    let Some((_, id)) = managed(state, event) else { return Ok(()) };
    dispatch(state, Command::SyncMinimized { window: id, minimized: false })
}

fn on_location_changed(state: &mut WmState, event: &Event) -> WmResult<()> {
    let Some((handle, id)) = managed(state, event) else { return Ok(()) };
    if !movement::is_floating(state, id) {
        return Ok(());
    }
    let Some(info) = state.system().window_info(handle) else { return Ok(()) };
    dispatch(state, Command::UpdateFloatingPlacement { window: id, rect: info.rect })
}

fn on_title_changed(state: &mut WmState, event: &Event) -> WmResult<()> {
    let Some((handle, id)) = managed(state, event) else { return Ok(()) };
    let Some(info) = state.system().window_info(handle) else { return Ok(()) };
    if let Some(window) = state.tree.get_mut(id).and_then(Container::as_window_mut) {
        window.title = info.title;
    }
    Ok(())
}

fn on_display_settings_changed(state: &mut WmState, event: &Event) -> WmResult<()> {
    let Event::DisplaySettingsChanged { monitors } = event else { return Ok(()) };
    dispatch(state, Command::RefreshMonitors(monitors.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{NativeWindowInfo, WindowSystem};
    use crate::tiling::handlers::test_support::Fixture;
    use crate::tiling::state::{Rect, WindowState};

    fn is_minimized(state: &WmState, id: ContainerId) -> bool {
        state
            .tree
            .get(id)
            .and_then(Container::as_window)
            .is_some_and(|window| matches!(window.state, WindowState::Minimized { .. }))
    }

    fn emit(fx: &mut Fixture, event: &Event) {
        for handler in handlers_for(event.kind()) {
            handler(&mut fx.state, event).unwrap();
        }
        fx.settle();
    }

    #[test]
    fn test_wm_events_have_no_handlers() {
        assert!(handlers_for(EventKind::FocusChanged).is_empty());
        assert!(handlers_for(EventKind::ApplicationExiting).is_empty());
        assert_eq!(handlers_for(EventKind::WindowShown).len(), 1);
    }

    #[test]
    fn test_shown_manages_once_and_caches_rejections() {
        let mut fx = Fixture::new(&["1"]);
        fx.system.add_window(WindowHandle(1), "app", Rect::new(0.0, 0.0, 300.0, 200.0));
        fx.system.add_window_info(WindowHandle(2), NativeWindowInfo {
            is_visible: true,
            is_tool_window: true,
            ..Default::default()
        });

        emit(&mut fx, &Event::WindowShown { handle: WindowHandle(1) });
        emit(&mut fx, &Event::WindowShown { handle: WindowHandle(2) });
        let managed = fx.state.tree.find_window(WindowHandle(1)).unwrap();
        assert_eq!(fx.state.tree.parent(managed), Some(fx.workspace));
        assert!(fx.state.tree.find_window(WindowHandle(2)).is_none());
        assert!(fx.state.ignored_handles.contains(&WindowHandle(2)));

        emit(&mut fx, &Event::WindowDestroyed { handle: WindowHandle(2) });
        assert!(!fx.state.ignored_handles.contains(&WindowHandle(2)));
    }

    #[test]
    fn test_hidden_echo_is_ignored() {
        let mut fx = Fixture::new(&["1", "2"]);
        let a = fx.tiling(1);
        fx.state.tree.get_mut(a).unwrap().as_window_mut().unwrap().pending_visibility_changes = 1;

        emit(&mut fx, &Event::WindowHidden { handle: WindowHandle(1) });
        assert!(fx.state.tree.contains(a));
        emit(&mut fx, &Event::WindowHidden { handle: WindowHandle(1) });
        assert!(!fx.state.tree.contains(a));
    }

    #[test]
    fn test_minimize_events_round_trip_variant() {
        let mut fx = Fixture::new(&["1"]);
        let a = fx.tiling(1);
        let b = fx.tiling(2);

        emit(&mut fx, &Event::WindowMinimized { handle: WindowHandle(2) });
        assert!(is_minimized(&fx.state, b));
        assert_eq!(fx.state.focused_container(), Some(a));

        emit(&mut fx, &Event::WindowMinimizeEnded { handle: WindowHandle(2) });
        assert!(fx.state.tree.get(b).unwrap().is_tiling_window());
        assert_eq!(fx.state.tree.children(fx.workspace), &[a, b]);
    }

    #[test]
    fn test_focused_event_updates_focus_without_native_call() {
        let mut fx = Fixture::new(&["1"]);
        let a = fx.tiling(1);
        fx.tiling(2);
        fx.system.take_calls();

        emit(&mut fx, &Event::WindowFocused { handle: WindowHandle(1) });
        assert_eq!(fx.state.focused_container(), Some(a));
        assert_eq!(fx.system.foreground(), None);
    }

    #[test]
    fn test_title_and_location_updates() {
        let mut fx = Fixture::new(&["1"]);
        let a = fx.tiling(1);
        let mut info = fx.system.window_info(WindowHandle(1)).unwrap();
        info.title = "renamed".into();
        fx.system.add_window_info(WindowHandle(1), info);

        emit(&mut fx, &Event::WindowTitleChanged { handle: WindowHandle(1) });
        assert_eq!(fx.state.tree.get(a).unwrap().as_window().unwrap().title, "renamed");

        // tiling windows ignore location changes
        fx.system.move_window(WindowHandle(1), Rect::new(5.0, 5.0, 50.0, 50.0));
        emit(&mut fx, &Event::WindowLocationChanged { handle: WindowHandle(1) });
        assert!(fx.state.tree.get(a).unwrap().is_tiling_window());
    }
}
