//! Geometry derivation.
//!
//! Pure functions over the tree. Only monitors store geometry; everything
//! else is derived:
//!
//! - a workspace is its monitor minus outer gaps and the bar
//! - a resizable child (split or tiling window) spans its parent's full extent
//!   on the cross axis, and `pct * (extent - gap * (n - 1))` on the parent's
//!   axis, placed right after its previous resizable sibling plus one gap
//! - floating windows use their floating placement, maximized windows their
//!   workspace, fullscreen windows their monitor
//!
//! Positions are produced by one cumulative sweep over a parent's children.

use super::gaps::Gaps;
use crate::tiling::state::{
    ContainerId, ContainerKind, ContainerTree, Layout, Rect, WindowData, WindowState,
};

/// Computes the rectangle of any container. `None` for stale keys, the root
/// and detached non-monitor containers.
#[must_use]
pub fn rect(tree: &ContainerTree, gaps: &Gaps, id: ContainerId) -> Option<Rect> {
    let node = tree.get(id)?;
    match &node.kind {
        ContainerKind::Root => None,
        ContainerKind::Monitor(monitor) => Some(monitor.rect),
        ContainerKind::Workspace(_) => {
            let monitor = tree.get(tree.parent(id)?)?.as_monitor()?;
            Some(gaps.apply_outer(&monitor.rect))
        }
        ContainerKind::Window(window) if !node.is_resizable() => non_tiling_rect(tree, gaps, id, window),
        ContainerKind::Split(_) | ContainerKind::Window(_) => {
            let parent = tree.parent(id)?;
            let parent_rect = rect(tree, gaps, parent)?;
            child_rects(tree, gaps, parent, &parent_rect)
                .into_iter()
                .find_map(|(child, child_rect)| (child == id).then_some(child_rect))
        }
    }
}

#[must_use]
pub fn width(tree: &ContainerTree, gaps: &Gaps, id: ContainerId) -> Option<f64> {
    rect(tree, gaps, id).map(|r| r.width)
}

#[must_use]
pub fn height(tree: &ContainerTree, gaps: &Gaps, id: ContainerId) -> Option<f64> {
    rect(tree, gaps, id).map(|r| r.height)
}

#[must_use]
pub fn x(tree: &ContainerTree, gaps: &Gaps, id: ContainerId) -> Option<f64> {
    rect(tree, gaps, id).map(|r| r.x)
}

#[must_use]
pub fn y(tree: &ContainerTree, gaps: &Gaps, id: ContainerId) -> Option<f64> {
    rect(tree, gaps, id).map(|r| r.y)
}

/// Rectangles of `parent`'s resizable children, in child order.
#[must_use]
pub fn child_rects(
    tree: &ContainerTree,
    gaps: &Gaps,
    parent: ContainerId,
    parent_rect: &Rect,
) -> Vec<(ContainerId, Rect)> {
    let Some(axis) = tree.get(parent).and_then(|node| node.layout()) else {
        return Vec::new();
    };

    let resizable: Vec<(ContainerId, f64)> = tree
        .children(parent)
        .iter()
        .filter_map(|child| Some((*child, tree.get(*child)?.size_percentage()?)))
        .collect();
    if resizable.is_empty() {
        return Vec::new();
    }

    let gap = gaps.inner(axis);
    #[allow(clippy::cast_precision_loss)]
    let gap_total = gap * (resizable.len() - 1) as f64;

    let (origin, extent) = match axis {
        Layout::Horizontal => (parent_rect.x, parent_rect.width),
        Layout::Vertical => (parent_rect.y, parent_rect.height),
    };
    let available = (extent - gap_total).max(0.0);

    let mut cursor = origin;
    resizable
        .into_iter()
        .map(|(child, pct)| {
            let size = pct * available;
            let child_rect = match axis {
                Layout::Horizontal => Rect::new(cursor, parent_rect.y, size, parent_rect.height),
                Layout::Vertical => Rect::new(parent_rect.x, cursor, parent_rect.width, size),
            };
            cursor += size + gap;
            (child, child_rect)
        })
        .collect()
}

/// Rectangles of every window under `id` (inclusive), computed top-down.
#[must_use]
pub fn window_rects(tree: &ContainerTree, gaps: &Gaps, id: ContainerId) -> Vec<(ContainerId, Rect)> {
    let mut out = Vec::new();
    if id == tree.root() {
        for monitor in tree.children(id) {
            collect(tree, gaps, *monitor, None, &mut out);
        }
    } else {
        collect(tree, gaps, id, None, &mut out);
    }
    out
}

fn collect(
    tree: &ContainerTree,
    gaps: &Gaps,
    id: ContainerId,
    known: Option<Rect>,
    out: &mut Vec<(ContainerId, Rect)>,
) {
    let Some(node) = tree.get(id) else { return };

    if let ContainerKind::Window(window) = &node.kind {
        let own = if node.is_resizable() {
            known.or_else(|| rect(tree, gaps, id))
        } else {
            non_tiling_rect(tree, gaps, id, window)
        };
        if let Some(own) = own {
            out.push((id, own));
        }
        return;
    }

    let Some(own) = known.or_else(|| rect(tree, gaps, id)) else { return };

    if node.is_monitor() {
        for child in tree.children(id) {
            collect(tree, gaps, *child, None, out);
        }
        return;
    }

    let sized = child_rects(tree, gaps, id, &own);
    for child in tree.children(id) {
        let child_rect = sized.iter().find_map(|(c, r)| (c == child).then_some(*r));
        collect(tree, gaps, *child, child_rect, out);
    }
}

fn non_tiling_rect(
    tree: &ContainerTree,
    gaps: &Gaps,
    id: ContainerId,
    window: &WindowData,
) -> Option<Rect> {
    match window.state {
        WindowState::Floating | WindowState::Minimized { .. } | WindowState::Tiling { .. } => {
            Some(window.floating_placement)
        }
        WindowState::Maximized { .. } => {
            let workspace = tree.ancestors(id).find(|a| tree.get(*a).is_some_and(|n| n.is_workspace()))?;
            rect(tree, gaps, workspace)
        }
        WindowState::Fullscreen { .. } => {
            let monitor = tree.ancestors(id).find(|a| tree.get(*a).is_some_and(|n| n.is_monitor()))?;
            rect(tree, gaps, monitor)
        }
    }
}
