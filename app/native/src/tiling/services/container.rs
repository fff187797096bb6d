//! Container queries.
//!
//! Ancestor lookups and the directional descent used by focus and move.

use crate::tiling::layout::sizing::resizable_children;
use crate::tiling::state::{Container, ContainerId, ContainerTree, Direction};

/// Nearest workspace at or above `id`.
#[must_use]
pub fn workspace_of(tree: &ContainerTree, id: ContainerId) -> Option<ContainerId> {
    tree.self_and_ancestors(id).find(|a| tree.get(*a).is_some_and(Container::is_workspace))
}

/// Nearest monitor at or above `id`.
#[must_use]
pub fn monitor_of(tree: &ContainerTree, id: ContainerId) -> Option<ContainerId> {
    tree.self_and_ancestors(id).find(|a| tree.get(*a).is_some_and(Container::is_monitor))
}

/// Returns `true` if `id` sits under the workspace its monitor displays.
#[must_use]
pub fn is_displayed(tree: &ContainerTree, id: ContainerId) -> bool {
    let Some(workspace) = workspace_of(tree, id) else { return false };
    monitor_of(tree, workspace)
        .and_then(|monitor| tree.get(monitor)?.as_monitor()?.displayed_workspace)
        == Some(workspace)
}

/// The resizable sibling of `id` in `direction`, if `id`'s parent lays out
/// along that direction's axis.
#[must_use]
pub fn sibling_in_direction(
    tree: &ContainerTree,
    id: ContainerId,
    direction: Direction,
) -> Option<ContainerId> {
    let parent = tree.parent(id)?;
    if tree.get(parent)?.layout()? != direction.axis() {
        return None;
    }

    let siblings = resizable_children(tree, parent);
    let index = siblings.iter().position(|s| *s == id)?;
    if direction.is_forward() {
        siblings.get(index + 1).copied()
    } else {
        index.checked_sub(1).and_then(|i| siblings.get(i).copied())
    }
}

/// Descends from `id` to the tiling container a move in `direction` enters
/// first: the first child when travelling right/down, the last when
/// travelling left/up, and the last focused child across a perpendicular
/// split. Returns `id` itself when it has no tiling children.
#[must_use]
pub fn descendant_in_direction(
    tree: &ContainerTree,
    id: ContainerId,
    direction: Direction,
) -> ContainerId {
    let mut current = id;
    loop {
        let Some(node) = tree.get(current) else { return current };
        let Some(layout) = node.layout() else { return current };

        let children = resizable_children(tree, current);
        let next = if layout == direction.axis() {
            if direction.is_forward() { children.first() } else { children.last() }.copied()
        } else {
            tree.focus_order(current).iter().copied().find(|child| children.contains(child))
        };

        match next {
            Some(child) => current = child,
            None => return current,
        }
    }
}

/// The tiling container focus moves to from `origin` in `direction`,
/// without leaving `origin`'s workspace.
#[must_use]
pub fn tiling_focus_target(
    tree: &ContainerTree,
    origin: ContainerId,
    direction: Direction,
) -> Option<ContainerId> {
    for ancestor in tree.self_and_ancestors(origin) {
        if tree.get(ancestor)?.is_workspace() {
            break;
        }
        if let Some(sibling) = sibling_in_direction(tree, ancestor, direction) {
            return Some(descendant_in_direction(tree, sibling, direction));
        }
    }
    None
}

/// First ancestor of `id` (inclusive) whose parent lays out along `axis`,
/// stopping below the workspace. Used for resize targets.
#[must_use]
pub fn ancestor_along_axis(
    tree: &ContainerTree,
    id: ContainerId,
    axis: crate::tiling::state::Layout,
) -> Option<ContainerId> {
    tree.self_and_ancestors(id)
        .take_while(|a| tree.get(*a).is_some_and(Container::is_resizable))
        .find(|a| tree.parent(*a).and_then(|p| tree.get(p)?.layout()) == Some(axis))
}
