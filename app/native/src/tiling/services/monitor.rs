//! Monitor queries and directional monitor search.

use super::container::monitor_of;
use crate::tiling::state::{Container, ContainerId, ContainerTree, Direction, Rect, WmState};

/// All monitors, in attach order.
#[must_use]
pub fn monitors(tree: &ContainerTree) -> Vec<ContainerId> {
    tree.children(tree.root())
        .iter()
        .copied()
        .filter(|id| tree.get(*id).is_some_and(Container::is_monitor))
        .collect()
}

/// Monitor with the given OS device name.
#[must_use]
pub fn monitor_by_device_name(tree: &ContainerTree, device_name: &str) -> Option<ContainerId> {
    monitors(tree).into_iter().find(|id| {
        tree.get(*id)
            .and_then(Container::as_monitor)
            .is_some_and(|monitor| monitor.device_name == device_name)
    })
}

fn monitor_rect(tree: &ContainerTree, id: ContainerId) -> Option<Rect> {
    tree.get(id).and_then(Container::as_monitor).map(|monitor| monitor.rect)
}

/// Workspace currently displayed on a monitor.
#[must_use]
pub fn displayed_workspace(tree: &ContainerTree, monitor: ContainerId) -> Option<ContainerId> {
    tree.get(monitor)?.as_monitor()?.displayed_workspace
}

/// The nearest monitor in `direction` from `origin`.
///
/// Candidates must lie strictly beyond the origin on the direction's axis and
/// overlap it on the perpendicular axis. Among those, the one with the
/// smallest coordinate wins for right/down and the largest for left/up.
#[must_use]
pub fn monitor_in_direction(
    tree: &ContainerTree,
    origin: ContainerId,
    direction: Direction,
) -> Option<ContainerId> {
    let origin_rect = monitor_rect(tree, origin)?;

    let candidates = monitors(tree).into_iter().filter(|id| *id != origin).filter_map(|id| {
        let rect = monitor_rect(tree, id)?;
        let (beyond, overlaps, coordinate) = match direction {
            Direction::Right => {
                (rect.x > origin_rect.x, rect.overlaps_vertically(&origin_rect), rect.x)
            }
            Direction::Left => {
                (rect.x < origin_rect.x, rect.overlaps_vertically(&origin_rect), rect.x)
            }
            Direction::Down => {
                (rect.y > origin_rect.y, rect.overlaps_horizontally(&origin_rect), rect.y)
            }
            Direction::Up => {
                (rect.y < origin_rect.y, rect.overlaps_horizontally(&origin_rect), rect.y)
            }
        };
        (beyond && overlaps).then_some((id, coordinate))
    });

    let best = if direction.is_forward() {
        candidates.min_by(|a, b| a.1.total_cmp(&b.1))
    } else {
        candidates.max_by(|a, b| a.1.total_cmp(&b.1))
    };
    best.map(|(id, _)| id)
}

/// Monitor containing a point, falling back to the one whose center is
/// nearest.
#[must_use]
pub fn monitor_at_point(tree: &ContainerTree, x: f64, y: f64) -> Option<ContainerId> {
    let all = monitors(tree);
    if let Some(hit) = all
        .iter()
        .copied()
        .find(|id| monitor_rect(tree, *id).is_some_and(|rect| rect.contains_point(x, y)))
    {
        return Some(hit);
    }

    all.into_iter()
        .filter_map(|id| {
            let (cx, cy) = monitor_rect(tree, id)?.center();
            Some((id, (cx - x).powi(2) + (cy - y).powi(2)))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| id)
}

/// Monitor holding focus, or the first monitor if nothing is focused.
#[must_use]
pub fn focused_monitor(state: &WmState) -> Option<ContainerId> {
    state
        .focused_container()
        .and_then(|focused| monitor_of(&state.tree, focused))
        .or_else(|| monitors(&state.tree).first().copied())
}
