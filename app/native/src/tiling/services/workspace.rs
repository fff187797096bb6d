//! Workspace queries: activation preference, ordering and cycling.

use std::cmp::Ordering;

use super::container::workspace_of;
use super::monitor::monitors;
use crate::config::{WmConfig, WorkspaceConfig};
use crate::tiling::state::{Container, ContainerId, ContainerTree, WmState};

/// All active workspaces, in monitor order then child order.
#[must_use]
pub fn workspaces(tree: &ContainerTree) -> Vec<ContainerId> {
    monitors(tree)
        .into_iter()
        .flat_map(|monitor| tree.children(monitor).to_vec())
        .filter(|id| tree.get(*id).is_some_and(Container::is_workspace))
        .collect()
}

/// Name of a workspace container.
#[must_use]
pub fn workspace_name(tree: &ContainerTree, id: ContainerId) -> Option<&str> {
    tree.get(id)?.as_workspace().map(|ws| ws.name.as_str())
}

/// Active workspace with the given name.
#[must_use]
pub fn workspace_by_name(tree: &ContainerTree, name: &str) -> Option<ContainerId> {
    workspaces(tree).into_iter().find(|id| workspace_name(tree, *id) == Some(name))
}

/// Workspace configs with no active workspace, in declaration order.
#[must_use]
pub fn inactive_configs<'a>(tree: &ContainerTree, config: &'a WmConfig) -> Vec<&'a WorkspaceConfig> {
    config
        .workspaces
        .iter()
        .filter(|ws| workspace_by_name(tree, &ws.name).is_none())
        .collect()
}

/// Config of the workspace to activate on a monitor that needs one.
///
/// Preference: a config bound to the monitor's device name, else the first
/// inactive config bound to no monitor, else the first inactive config.
#[must_use]
pub fn workspace_to_activate<'a>(
    tree: &ContainerTree,
    config: &'a WmConfig,
    device_name: &str,
) -> Option<&'a WorkspaceConfig> {
    let inactive = inactive_configs(tree, config);
    inactive
        .iter()
        .find(|ws| ws.is_bound_to(device_name))
        .or_else(|| inactive.iter().find(|ws| ws.bind_to_monitor.is_none()))
        .or_else(|| inactive.first())
        .copied()
}

/// Ordering of workspace names: config declaration order first, unknown
/// names after, naturally sorted.
#[must_use]
pub fn compare_names(config: &WmConfig, a: &str, b: &str) -> Ordering {
    match (config.workspace_index(a), config.workspace_index(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => natord::compare(a, b),
    }
}

/// Index at which a workspace named `name` is inserted under `monitor`.
#[must_use]
pub fn insertion_index(
    tree: &ContainerTree,
    config: &WmConfig,
    monitor: ContainerId,
    name: &str,
) -> usize {
    tree.children(monitor)
        .iter()
        .take_while(|child| {
            workspace_name(tree, **child)
                .is_some_and(|existing| compare_names(config, existing, name) == Ordering::Less)
        })
        .count()
}

/// Active workspaces sorted by [`compare_names`].
#[must_use]
pub fn sorted_workspaces(tree: &ContainerTree, config: &WmConfig) -> Vec<ContainerId> {
    let mut all = workspaces(tree);
    all.sort_by(|a, b| {
        compare_names(
            config,
            workspace_name(tree, *a).unwrap_or_default(),
            workspace_name(tree, *b).unwrap_or_default(),
        )
    });
    all
}

/// The workspace after (or before) `current` in sorted order, wrapping.
#[must_use]
pub fn workspace_in_cycle(
    tree: &ContainerTree,
    config: &WmConfig,
    current: ContainerId,
    forward: bool,
) -> Option<ContainerId> {
    let sorted = sorted_workspaces(tree, config);
    let index = sorted.iter().position(|id| *id == current)?;
    let len = sorted.len();
    let next = if forward { (index + 1) % len } else { (index + len - 1) % len };
    (sorted[next] != current).then_some(sorted[next])
}

/// Workspace holding focus.
#[must_use]
pub fn focused_workspace(state: &WmState) -> Option<ContainerId> {
    state.focused_container().and_then(|focused| workspace_of(&state.tree, focused))
}
