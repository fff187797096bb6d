//! Proportional sizing of resizable siblings.
//!
//! Every function here preserves the sum-to-one invariant of a split's
//! resizable children. Non-resizable children (floating, minimized,
//! maximized, fullscreen windows) are ignored.

use crate::error::{WmError, WmResult};
use crate::tiling::state::{Container, ContainerId, ContainerTree};

/// Smallest share a resizable container can be resized down to.
pub const MIN_SIZE_PERCENTAGE: f64 = 0.01;

/// Resizable siblings of `id`, in child order.
#[must_use]
pub fn resizable_siblings(tree: &ContainerTree, id: ContainerId) -> Vec<ContainerId> {
    tree.siblings(id).filter(|sibling| tree.get(*sibling).is_some_and(Container::is_resizable)).collect()
}

/// Resizable children of `parent`, in child order.
#[must_use]
pub fn resizable_children(tree: &ContainerTree, parent: ContainerId) -> Vec<ContainerId> {
    tree.children(parent)
        .iter()
        .copied()
        .filter(|child| tree.get(*child).is_some_and(Container::is_resizable))
        .collect()
}

fn percentage(tree: &ContainerTree, id: ContainerId) -> f64 {
    tree.get(id).and_then(Container::size_percentage).unwrap_or(0.0)
}

fn set_percentage(tree: &mut ContainerTree, id: ContainerId, value: f64) {
    if let Some(node) = tree.get_mut(id) {
        node.set_size_percentage(value);
    }
}

/// Gives a freshly attached resizable child a `1/(n+1)` share, scaling its
/// `n` resizable siblings by `n/(n+1)`. No-op for non-resizable children.
pub fn share_on_attach(tree: &mut ContainerTree, child: ContainerId) {
    if !tree.get(child).is_some_and(Container::is_resizable) {
        return;
    }
    let siblings = resizable_siblings(tree, child);
    #[allow(clippy::cast_precision_loss)]
    let share = 1.0 / (siblings.len() + 1) as f64;

    for sibling in siblings {
        let scaled = percentage(tree, sibling) * (1.0 - share);
        set_percentage(tree, sibling, scaled);
    }
    set_percentage(tree, child, share);
}

/// Hands a removed child's share to the remaining resizable children of
/// `parent`, split evenly.
pub fn share_on_detach(tree: &mut ContainerTree, parent: ContainerId, freed: f64) {
    let remaining = resizable_children(tree, parent);
    if remaining.is_empty() || freed <= 0.0 {
        return;
    }

    #[allow(clippy::cast_precision_loss)]
    let gain = freed / remaining.len() as f64;
    for child in remaining {
        let grown = percentage(tree, child) + gain;
        set_percentage(tree, child, grown);
    }
}

/// Grows `id` by `delta` (negative shrinks), taking `delta / n` from each of
/// its `n` resizable siblings. The delta is clamped so nobody drops below
/// [`MIN_SIZE_PERCENTAGE`]. Returns the delta actually applied.
///
/// # Errors
///
/// Returns `WmError::Unsupported` if the container is not resizable or has
/// no resizable siblings.
pub fn resize(tree: &mut ContainerTree, id: ContainerId, delta: f64) -> WmResult<f64> {
    let current = tree
        .container(id)?
        .size_percentage()
        .ok_or_else(|| WmError::unsupported("container is not resizable"))?;

    let siblings = resizable_siblings(tree, id);
    if siblings.is_empty() {
        return Err(WmError::unsupported("no sibling to resize against"));
    }

    #[allow(clippy::cast_precision_loss)]
    let count = siblings.len() as f64;
    let smallest_sibling = siblings
        .iter()
        .map(|sibling| percentage(tree, *sibling))
        .fold(f64::INFINITY, f64::min);

    let max_grow = ((smallest_sibling - MIN_SIZE_PERCENTAGE) * count).max(0.0);
    let max_shrink = (current - MIN_SIZE_PERCENTAGE).max(0.0);
    let applied = delta.clamp(-max_shrink, max_grow);

    set_percentage(tree, id, current + applied);
    for sibling in siblings {
        let shrunk = percentage(tree, sibling) - applied / count;
        set_percentage(tree, sibling, shrunk);
    }

    Ok(applied)
}
