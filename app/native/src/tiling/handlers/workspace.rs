//! Workspace lifecycle handlers.

use super::container::mark_for_redraw;
use crate::error::{WmError, WmResult};
use crate::ipc::dto;
use crate::tiling::bus::Event;
use crate::tiling::services::{
    displayed_workspace, insertion_index, is_displayed, workspace_by_name, workspace_to_activate,
};
use crate::tiling::state::{
    Container, ContainerId, ContainerKind, Layout, WmState, WorkspaceData,
};

/// Activates a workspace on `monitor`: the named one, or the one the
/// config prefers for the monitor. The first workspace of a monitor
/// becomes its displayed workspace.
///
/// # Errors
///
/// - `ContainerNotFound` if the name is not in the config
/// - `Unsupported` if it is already active or nothing is left to activate
pub fn activate(
    state: &mut WmState,
    monitor: ContainerId,
    name: Option<&str>,
) -> WmResult<ContainerId> {
    let config = state.config_arc();
    let (device_name, monitor_rect) = state
        .tree
        .container(monitor)?
        .as_monitor()
        .map(|m| (m.device_name.clone(), m.rect))
        .ok_or_else(|| WmError::invalid("workspaces can only be activated on monitors"))?;

    let ws_config = match name {
        Some(name) => {
            if workspace_by_name(&state.tree, name).is_some() {
                return Err(WmError::unsupported(format!("workspace {name} is already active")));
            }
            config.workspace(name).ok_or_else(|| WmError::not_found(format!("workspace {name}")))?
        }
        None => workspace_to_activate(&state.tree, &config, &device_name)
            .ok_or_else(|| WmError::unsupported("no workspace left to activate"))?,
    };

    let id = state.tree.insert(Container::new(ContainerKind::Workspace(WorkspaceData {
        name: ws_config.name.clone(),
        display_name: ws_config.display_name.clone(),
        keep_alive: ws_config.keep_alive,
        layout: ws_config.layout.unwrap_or_else(|| Layout::for_rect(&monitor_rect)),
    })))?;
    let index = insertion_index(&state.tree, &config, monitor, &ws_config.name);
    state.tree.insert_child(monitor, index, id)?;

    if let Some(data) = state.tree.container_mut(monitor)?.as_monitor_mut()
        && data.displayed_workspace.is_none()
    {
        data.displayed_workspace = Some(id);
    }

    tracing::info!(workspace = %ws_config.name, monitor = %device_name, "workspace activated");
    if let Some(activated_workspace) = dto::snapshot(state, id) {
        state.queue_event(Event::WorkspaceActivated { activated_workspace });
    }
    Ok(id)
}

/// Destroys an empty, hidden workspace.
///
/// # Errors
///
/// Fails with `Unsupported` if the workspace has children or is displayed.
pub fn deactivate(state: &mut WmState, id: ContainerId) -> WmResult<()> {
    let node = state.tree.container(id)?;
    let name = node
        .as_workspace()
        .map(|ws| ws.name.clone())
        .ok_or_else(|| WmError::invalid("container is not a workspace"))?;
    let uuid = node.id;

    if !node.children().is_empty() {
        return Err(WmError::unsupported(format!("workspace {name} is not empty")));
    }
    if is_displayed(&state.tree, id) {
        return Err(WmError::unsupported(format!("workspace {name} is displayed")));
    }

    state.tree.remove_subtree(id)?;
    tracing::info!(workspace = %name, "workspace deactivated");
    state.queue_event(Event::WorkspaceDeactivated { deactivated_id: uuid, deactivated_name: name });
    Ok(())
}

/// Deactivates a workspace if it is empty, hidden and not kept alive.
/// Returns whether it was deactivated. Stale keys are ignored.
///
/// # Errors
///
/// Propagates errors from [`deactivate`].
pub fn clean_up_if_unused(state: &mut WmState, id: ContainerId) -> WmResult<bool> {
    let Some(ws) = state.tree.get(id).and_then(Container::as_workspace) else { return Ok(false) };
    let unused = !ws.keep_alive
        && state.tree.children(id).is_empty()
        && !is_displayed(&state.tree, id);
    if unused {
        deactivate(state, id)?;
    }
    Ok(unused)
}

/// Makes a workspace the one its monitor displays. The previously displayed
/// workspace is hidden, and destroyed if unused.
///
/// # Errors
///
/// Fails if `id` is not an attached workspace.
pub fn display(state: &mut WmState, id: ContainerId) -> WmResult<()> {
    if !state.tree.container(id)?.is_workspace() {
        return Err(WmError::invalid("container is not a workspace"));
    }
    let monitor = state
        .tree
        .parent(id)
        .ok_or_else(|| WmError::invariant(format!("{id:?} has no monitor")))?;
    let previous = displayed_workspace(&state.tree, monitor);
    if previous == Some(id) {
        return Ok(());
    }

    if let Some(data) = state.tree.container_mut(monitor)?.as_monitor_mut() {
        data.displayed_workspace = Some(id);
    }
    mark_for_redraw(state, id);

    if let Some(previous) = previous {
        state.mark_dirty(previous);
        clean_up_if_unused(state, previous)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiling::handlers::test_support::Fixture;
    use crate::tiling::services::workspace_name;

    #[test]
    fn test_activate_orders_by_config() {
        let mut fx = Fixture::new(&["1", "2", "3"]);
        let three = activate(&mut fx.state, fx.monitor, Some("3")).unwrap();
        let two = activate(&mut fx.state, fx.monitor, Some("2")).unwrap();

        assert_eq!(fx.state.tree.children(fx.monitor), &[fx.workspace, two, three]);
        assert!(activate(&mut fx.state, fx.monitor, Some("2")).is_err());
        assert!(activate(&mut fx.state, fx.monitor, None).is_err());
    }

    #[test]
    fn test_deactivate_requires_empty_hidden_workspace() {
        let mut fx = Fixture::new(&["1", "2"]);
        let two = activate(&mut fx.state, fx.monitor, Some("2")).unwrap();
        assert!(deactivate(&mut fx.state, fx.workspace).is_err());

        deactivate(&mut fx.state, two).unwrap();
        assert!(!fx.state.tree.contains(two));
        assert!(fx.state.queued_events().any(|event| matches!(
            event,
            Event::WorkspaceDeactivated { deactivated_name, .. } if deactivated_name == "2"
        )));
    }

    #[test]
    fn test_display_hides_previous_and_cleans_it_up() {
        let mut fx = Fixture::new(&["1", "2"]);
        let two = activate(&mut fx.state, fx.monitor, Some("2")).unwrap();
        fx.state.take_pending_redraw();

        display(&mut fx.state, two).unwrap();
        assert_eq!(displayed_workspace(&fx.state.tree, fx.monitor), Some(two));
        assert!(!fx.state.tree.contains(fx.workspace));
        assert_eq!(workspace_name(&fx.state.tree, two), Some("2"));
    }

    #[test]
    fn test_keep_alive_workspace_survives() {
        let mut fx = Fixture::with_config(|config| config.workspaces[0].keep_alive = true, &["1", "2"]);
        let two = activate(&mut fx.state, fx.monitor, Some("2")).unwrap();
        display(&mut fx.state, two).unwrap();
        assert!(fx.state.tree.contains(fx.workspace));
    }
}
