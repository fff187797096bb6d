//! Monitor handlers.

use super::focus::focus_container;
use super::workspace;
use crate::error::{WmError, WmResult};
use crate::ipc::dto;
use crate::platform::MonitorInfo;
use crate::tiling::bus::Event;
use crate::tiling::services::{
    displayed_workspace, focused_monitor, insertion_index, monitor_by_device_name, monitors,
    workspace_name, workspace_to_activate,
};
use crate::tiling::state::{Container, ContainerId, ContainerKind, MonitorData, WmState};

/// Adds a monitor and activates a workspace on it. A monitor that is
/// already known only has its geometry updated.
///
/// # Errors
///
/// Fails with `FatalUser` when no workspace config is left to activate.
/// The tree is untouched in that case.
pub fn add(state: &mut WmState, info: &MonitorInfo) -> WmResult<ContainerId> {
    if let Some(existing) = monitor_by_device_name(&state.tree, &info.device_name) {
        if let Some(monitor) = state.tree.container_mut(existing)?.as_monitor_mut()
            && monitor.rect != info.rect
        {
            monitor.rect = info.rect;
            tracing::info!(device = %info.device_name, "monitor geometry changed");
        }
        state.mark_dirty(existing);
        return Ok(existing);
    }

    let config = state.config_arc();
    if workspace_to_activate(&state.tree, &config, &info.device_name).is_none() {
        return Err(WmError::FatalUser("at least 1 workspace required per monitor".to_string()));
    }

    let is_first = monitors(&state.tree).is_empty();
    let monitor = state.tree.insert(Container::new(ContainerKind::Monitor(MonitorData {
        device_name: info.device_name.clone(),
        rect: info.rect,
        displayed_workspace: None,
    })))?;
    let root = state.tree.root();
    state.tree.add_child(root, monitor)?;
    let workspace = workspace::activate(state, monitor, None)?;

    if is_first {
        focus_container(state, workspace, true)?;
    }
    state.mark_dirty(monitor);

    tracing::info!(device = %info.device_name, "monitor added");
    if let Some(added_monitor) = dto::snapshot(state, monitor) {
        state.queue_event(Event::MonitorAdded { added_monitor });
    }
    Ok(monitor)
}

/// Removes a monitor. Its workspaces move to the focused monitor, or to the
/// first remaining one, and are hidden there.
///
/// # Errors
///
/// Fails with `ContainerNotFound` for unknown devices and with `Unsupported`
/// for the last monitor.
pub fn remove(state: &mut WmState, device_name: &str) -> WmResult<()> {
    let monitor = monitor_by_device_name(&state.tree, device_name)
        .ok_or_else(|| WmError::not_found(format!("monitor {device_name}")))?;
    let others: Vec<ContainerId> =
        monitors(&state.tree).into_iter().filter(|id| *id != monitor).collect();
    let Some(&first_other) = others.first() else {
        return Err(WmError::unsupported("cannot remove the last monitor"));
    };

    let focused = focused_monitor(state);
    let had_focus = focused == Some(monitor);
    let target = focused.filter(|id| *id != monitor).unwrap_or(first_other);
    let uuid = state.tree.container(monitor)?.id;
    let config = state.config_arc();

    for ws in state.tree.children(monitor).to_vec() {
        let name = workspace_name(&state.tree, ws).unwrap_or_default().to_string();
        state.tree.remove_child(ws)?;
        let index = insertion_index(&state.tree, &config, target, &name);
        state.tree.insert_child(target, index, ws)?;
        state.mark_dirty(ws);
        workspace::clean_up_if_unused(state, ws)?;
    }
    state.tree.remove_subtree(monitor)?;

    if had_focus && let Some(ws) = displayed_workspace(&state.tree, target) {
        let focus = state.tree.last_focused_descendant(ws).unwrap_or(ws);
        focus_container(state, focus, true)?;
    }

    tracing::info!(device = %device_name, "monitor removed");
    state.queue_event(Event::MonitorRemoved {
        removed_id: uuid,
        removed_device_name: device_name.to_string(),
    });
    Ok(())
}

/// Reconciles the monitor set with what the OS reports: unknown monitors
/// are added, known ones updated and missing ones removed.
///
/// # Errors
///
/// Propagates errors from [`add`] and [`remove`].
pub fn refresh(state: &mut WmState, infos: &[MonitorInfo]) -> WmResult<()> {
    if infos.is_empty() {
        tracing::warn!("ignoring display change without monitors");
        return Ok(());
    }

    for info in infos {
        add(state, info)?;
    }

    let stale: Vec<String> = monitors(&state.tree)
        .into_iter()
        .filter_map(|id| state.tree.get(id)?.as_monitor().map(|m| m.device_name.clone()))
        .filter(|name| !infos.iter().any(|info| &info.device_name == name))
        .collect();
    for device_name in stale {
        remove(state, &device_name)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiling::handlers::test_support::Fixture;
    use crate::tiling::services::{is_displayed, workspace_by_name};
    use crate::tiling::state::Rect;

    #[test]
    fn test_add_activates_workspace_and_focuses_first_monitor() {
        let fx = Fixture::new(&["1", "2"]);
        assert_eq!(displayed_workspace(&fx.state.tree, fx.monitor), Some(fx.workspace));
        assert_eq!(fx.state.focused_container(), Some(fx.workspace));
    }

    #[test]
    fn test_add_without_workspace_is_fatal_and_untouched() {
        let mut fx = Fixture::new(&["1"]);
        let before = fx.state.tree.len();
        let err = add(&mut fx.state, &MonitorInfo::new("DISPLAY2", Rect::new(1000.0, 0.0, 800.0, 600.0)))
            .unwrap_err();
        assert!(err.is_fatal_user());
        assert_eq!(fx.state.tree.len(), before);
    }

    #[test]
    fn test_add_known_monitor_updates_rect() {
        let mut fx = Fixture::new(&["1"]);
        let rect = Rect::new(0.0, 0.0, 1920.0, 1080.0);
        let id = add(&mut fx.state, &MonitorInfo::new("DISPLAY1", rect)).unwrap();
        assert_eq!(id, fx.monitor);
        assert_eq!(fx.state.tree.get(id).unwrap().as_monitor().unwrap().rect, rect);
    }

    #[test]
    fn test_remove_moves_workspaces_and_focus() {
        let mut fx = Fixture::new(&["1", "2"]);
        let a = fx.tiling(1);
        let (second, ws) = fx.add_monitor("DISPLAY2", Rect::new(1000.0, 0.0, 1000.0, 500.0));
        let b = fx.tiling_in(ws, 2);
        focus_container(&mut fx.state, b, true).unwrap();

        remove(&mut fx.state, "DISPLAY2").unwrap();
        assert!(!fx.state.tree.contains(second));
        assert_eq!(fx.state.tree.parent(ws), Some(fx.monitor));
        assert!(!is_displayed(&fx.state.tree, b));
        assert_eq!(fx.state.focused_container(), Some(a));
        assert!(workspace_by_name(&fx.state.tree, "2").is_some());
    }

    #[test]
    fn test_remove_last_monitor_is_unsupported() {
        let mut fx = Fixture::new(&["1"]);
        assert!(matches!(remove(&mut fx.state, "DISPLAY1"), Err(WmError::Unsupported(_))));
    }

    #[test]
    fn test_refresh_adds_and_removes() {
        let mut fx = Fixture::new(&["1", "2"]);
        let infos = vec![MonitorInfo::new("DISPLAY2", Rect::new(0.0, 0.0, 800.0, 600.0))];
        refresh(&mut fx.state, &infos).unwrap();

        let remaining = monitors(&fx.state.tree);
        assert_eq!(remaining.len(), 1);
        assert!(monitor_by_device_name(&fx.state.tree, "DISPLAY2").is_some());
        assert!(!fx.state.tree.contains(fx.monitor));
    }
}
