//! Window queries and the should-manage filter.

use super::container::workspace_of;
use crate::config::{RuleAction, RuleSubject, WmConfig};
use crate::platform::NativeWindowInfo;
use crate::tiling::state::{Container, ContainerId, ContainerTree, Direction, WindowState};

/// Every window at or below `id`, depth first.
#[must_use]
pub fn windows(tree: &ContainerTree, id: ContainerId) -> Vec<ContainerId> {
    tree.self_and_descendants(id).filter(|d| tree.get(*d).is_some_and(Container::is_window)).collect()
}

/// Every window matching a state predicate at or below `id`.
#[must_use]
pub fn windows_where(
    tree: &ContainerTree,
    id: ContainerId,
    predicate: impl Fn(&WindowState) -> bool,
) -> Vec<ContainerId> {
    tree.self_and_descendants(id)
        .filter(|d| tree.get(*d).and_then(Container::as_window).is_some_and(|w| predicate(&w.state)))
        .collect()
}

/// Decides whether a newly shown window is managed, and how.
///
/// Returns `None` for windows that are invisible, tool windows, owned
/// windows, or matched by an `ignore` rule.
#[must_use]
pub fn should_manage(info: &NativeWindowInfo, config: &WmConfig) -> Option<RuleAction> {
    if !info.is_visible || info.is_tool_window || info.has_owner {
        return None;
    }

    let subject = RuleSubject {
        process_name: &info.process_name,
        class_name: &info.class_name,
        title: &info.title,
    };
    match config.rule_action_for(&subject).unwrap_or_default() {
        RuleAction::Ignore => None,
        action => Some(action),
    }
}

/// The nearest floating window on `origin`'s workspace in `direction`,
/// measured between floating placement centers.
#[must_use]
pub fn floating_in_direction(
    tree: &ContainerTree,
    origin: ContainerId,
    direction: Direction,
) -> Option<ContainerId> {
    let workspace = workspace_of(tree, origin)?;
    let (ox, oy) = tree.get(origin)?.as_window()?.floating_placement.center();

    windows_where(tree, workspace, |state| matches!(state, WindowState::Floating))
        .into_iter()
        .filter(|id| *id != origin)
        .filter_map(|id| {
            let (cx, cy) = tree.get(id)?.as_window()?.floating_placement.center();
            let (along, across) = match direction {
                Direction::Right => (cx - ox, cy - oy),
                Direction::Left => (ox - cx, cy - oy),
                Direction::Down => (cy - oy, cx - ox),
                Direction::Up => (oy - cy, cx - ox),
            };
            (along > 0.0).then_some((id, along + across.abs()))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MatchPattern, MatchStrategy, WindowRule};
    use crate::tiling::services::test_support::TreeBuilder;
    use crate::tiling::state::{Layout, Rect};

    fn info(process_name: &str) -> NativeWindowInfo {
        NativeWindowInfo {
            process_name: process_name.to_string(),
            is_visible: true,
            ..Default::default()
        }
    }

    fn rule(process_name: &str, action: RuleAction) -> WindowRule {
        WindowRule {
            process_name: Some(MatchPattern::new(process_name, MatchStrategy::Exact)),
            action,
            ..Default::default()
        }
    }

    #[test]
    fn test_should_manage_filters_native_flags() {
        let config = WmConfig::default();
        assert_eq!(should_manage(&info("editor"), &config), Some(RuleAction::Tiling));

        let hidden = NativeWindowInfo { is_visible: false, ..info("editor") };
        let tool = NativeWindowInfo { is_tool_window: true, ..info("editor") };
        let owned = NativeWindowInfo { has_owner: true, ..info("editor") };
        for candidate in [hidden, tool, owned] {
            assert_eq!(should_manage(&candidate, &config), None);
        }
    }

    #[test]
    fn test_should_manage_applies_rules() {
        let mut config = WmConfig {
            window_rules: vec![rule("calc", RuleAction::Floating), rule("tray", RuleAction::Ignore)],
            ..Default::default()
        };
        config.prepare();

        assert_eq!(should_manage(&info("calc"), &config), Some(RuleAction::Floating));
        assert_eq!(should_manage(&info("tray"), &config), None);
        assert_eq!(should_manage(&info("term"), &config), Some(RuleAction::Tiling));
    }

    #[test]
    fn test_floating_in_direction_prefers_aligned_neighbour() {
        let mut b = TreeBuilder::single_monitor(Layout::Horizontal);
        let origin = b.floating(b.workspace, 1, Rect::new(100.0, 100.0, 100.0, 100.0));
        let aligned = b.floating(b.workspace, 2, Rect::new(400.0, 100.0, 100.0, 100.0));
        let diagonal = b.floating(b.workspace, 3, Rect::new(300.0, 400.0, 100.0, 100.0));
        b.tiling(b.workspace, 4);

        assert_eq!(floating_in_direction(&b.tree, origin, Direction::Right), Some(aligned));
        assert_eq!(floating_in_direction(&b.tree, origin, Direction::Down), Some(diagonal));
        assert_eq!(floating_in_direction(&b.tree, origin, Direction::Left), None);
        assert_eq!(windows(&b.tree, b.workspace).len(), 4);
    }
}
