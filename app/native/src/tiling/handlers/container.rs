//! Structural primitives shared by the handlers.
//!
//! Attach and detach keep sibling percentages summing to one, and detach
//! cleans up after itself: splits left empty are removed and splits left
//! with a single child are replaced by that child.

use crate::error::{WmError, WmResult};
use crate::ipc::dto;
use crate::tiling::bus::Event;
use crate::tiling::layout::sizing::resizable_children;
use crate::tiling::layout::{share_on_attach, share_on_detach};
use crate::tiling::services::is_displayed;
use crate::tiling::state::{
    Container, ContainerId, ContainerKind, Layout, SplitData, WmState,
};

/// Marks `id` dirty if it is visible. Hidden workspaces are left alone.
pub fn mark_for_redraw(state: &mut WmState, id: ContainerId) {
    let visible = state.tree.get(id).is_some_and(|node| {
        matches!(node.kind, ContainerKind::Root | ContainerKind::Monitor(_))
            || is_displayed(&state.tree, id)
    });
    if visible {
        state.mark_dirty(id);
    }
}

/// Inserts a detached container under `parent` (at the end when `index` is
/// `None`) and gives it its share of the parent.
///
/// # Errors
///
/// Propagates structural errors from the tree.
pub fn attach(
    state: &mut WmState,
    parent: ContainerId,
    child: ContainerId,
    index: Option<usize>,
) -> WmResult<()> {
    let index = index.unwrap_or_else(|| state.tree.children(parent).len());
    state.tree.insert_child(parent, index, child)?;
    share_on_attach(&mut state.tree, child);
    mark_for_redraw(state, parent);
    Ok(())
}

/// Detaches a container, hands its share to its siblings and cleans up the
/// split it leaves behind. The container stays in the arena.
///
/// # Errors
///
/// Fails if the container has no parent.
pub fn detach(state: &mut WmState, id: ContainerId) -> WmResult<()> {
    let parent = state
        .tree
        .parent(id)
        .ok_or_else(|| WmError::invariant(format!("{id:?} is not attached")))?;
    let freed = state.tree.container(id)?.size_percentage().unwrap_or(0.0);

    mark_for_redraw(state, parent);
    state.tree.remove_child(id)?;
    share_on_detach(&mut state.tree, parent, freed);
    clean_up_split(state, parent)
}

/// Detaches a container and frees it together with its descendants.
///
/// # Errors
///
/// Fails if the container has no parent.
pub fn remove(state: &mut WmState, id: ContainerId) -> WmResult<()> {
    detach(state, id)?;
    state.tree.remove_subtree(id)
}

fn clean_up_split(state: &mut WmState, split: ContainerId) -> WmResult<()> {
    if !state.tree.get(split).is_some_and(Container::is_split) {
        return Ok(());
    }
    match state.tree.children(split).len() {
        0 => remove(state, split),
        1 => flatten(state, split),
        _ => Ok(()),
    }
}

/// Replaces a single-child split with its child.
///
/// # Errors
///
/// Fails if `split` does not hold exactly one child.
pub fn flatten(state: &mut WmState, split: ContainerId) -> WmResult<()> {
    let &[child] = state.tree.children(split) else {
        return Err(WmError::invariant(format!("{split:?} must hold exactly one child")));
    };
    let share = state.tree.container(split)?.size_percentage().unwrap_or(1.0);
    let grandparent = state
        .tree
        .parent(split)
        .ok_or_else(|| WmError::invariant(format!("{split:?} is not attached")))?;

    state.tree.remove_child(child)?;
    state.tree.replace_child(split, child)?;
    state.tree.remove_subtree(split)?;

    let node = state.tree.container_mut(child)?;
    if node.is_resizable() {
        node.set_size_percentage(share);
    } else {
        share_on_detach(&mut state.tree, grandparent, share);
    }
    mark_for_redraw(state, grandparent);
    Ok(())
}

/// Wraps `id` in a new split with `layout`, taking `id`'s place and share.
///
/// # Errors
///
/// Fails if `id` is not attached.
pub fn wrap_in_split(state: &mut WmState, id: ContainerId, layout: Layout) -> WmResult<ContainerId> {
    let share = state.tree.container(id)?.size_percentage().unwrap_or(1.0);
    let split = state
        .tree
        .insert(Container::new(ContainerKind::Split(SplitData { layout, size_percentage: share })))?;
    state.tree.replace_child(id, split)?;
    state.tree.add_child(split, id)?;
    state.tree.container_mut(id)?.set_size_percentage(1.0);
    Ok(split)
}

/// Moves every resizable child of `parent` into one new split with
/// `layout`, keeping their order, shares and relative focus order. Returns
/// `None` when there are fewer than two to wrap.
///
/// # Errors
///
/// Propagates structural errors from the tree.
pub fn wrap_children(
    state: &mut WmState,
    parent: ContainerId,
    layout: Layout,
) -> WmResult<Option<ContainerId>> {
    let wrapped = resizable_children(&state.tree, parent);
    let Some(&first) = wrapped.first() else { return Ok(None) };
    if wrapped.len() < 2 {
        return Ok(None);
    }

    let parent_focus: Vec<ContainerId> = state.tree.focus_order(parent).to_vec();
    let index = state.tree.index(first).unwrap_or(0);
    let split = state
        .tree
        .insert(Container::new(ContainerKind::Split(SplitData { layout, size_percentage: 1.0 })))?;

    for child in &wrapped {
        state.tree.remove_child(*child)?;
        state.tree.add_child(split, *child)?;
    }
    state.tree.insert_child(parent, index, split)?;

    let split_focus: Vec<ContainerId> =
        parent_focus.iter().copied().filter(|id| wrapped.contains(id)).collect();
    state.tree.set_focus_order(split, &split_focus)?;

    let mut new_focus = Vec::with_capacity(parent_focus.len());
    for id in parent_focus {
        let id = if wrapped.contains(&id) { split } else { id };
        if !new_focus.contains(&id) {
            new_focus.push(id);
        }
    }
    state.tree.set_focus_order(parent, &new_focus)?;

    Ok(Some(split))
}

pub(crate) fn set_axis(state: &mut WmState, id: ContainerId, layout: Layout) -> WmResult<()> {
    match &mut state.tree.container_mut(id)?.kind {
        ContainerKind::Workspace(ws) => ws.layout = layout,
        ContainerKind::Split(split) => split.layout = layout,
        _ => return Err(WmError::invalid("container has no layout")),
    }
    mark_for_redraw(state, id);
    if let Some(container) = dto::snapshot(state, id) {
        state.queue_event(Event::TilingDirectionChanged { container, new_layout: layout });
    }
    Ok(())
}

/// Sets the tiling direction for a container.
///
/// Workspaces and splits change their own axis. A tiling window that is
/// its parent's only child changes the parent's axis; otherwise it is
/// wrapped in a new split with the requested axis. Other windows change
/// their workspace's axis.
///
/// # Errors
///
/// Fails for monitors and the root.
pub fn set_layout(state: &mut WmState, id: ContainerId, layout: Layout) -> WmResult<()> {
    let node = state.tree.container(id)?;
    if node.layout().is_some() {
        return set_axis(state, id, layout);
    }
    if !node.is_window() {
        return Err(WmError::invalid("layout applies to workspaces, splits and windows"));
    }

    let parent = state
        .tree
        .parent(id)
        .ok_or_else(|| WmError::invariant(format!("{id:?} is not attached")))?;
    if !node.is_tiling_window() {
        let workspace = crate::tiling::services::workspace_of(&state.tree, id)
            .ok_or_else(|| WmError::not_found("workspace of window"))?;
        return set_axis(state, workspace, layout);
    }

    let parent_layout = state.tree.container(parent)?.layout();
    if resizable_children(&state.tree, parent).len() == 1 {
        return set_axis(state, parent, layout);
    }
    if parent_layout == Some(layout) {
        return Ok(());
    }

    let split = wrap_in_split(state, id, layout)?;
    mark_for_redraw(state, parent);
    if let Some(container) = dto::snapshot(state, split) {
        state.queue_event(Event::TilingDirectionChanged { container, new_layout: layout });
    }
    Ok(())
}

/// Flips the axis [`set_layout`] would change.
///
/// # Errors
///
/// Same as [`set_layout`].
pub fn toggle_layout(state: &mut WmState, id: ContainerId) -> WmResult<()> {
    let node = state.tree.container(id)?;
    let current = match node.layout() {
        Some(layout) => layout,
        None => state
            .tree
            .parent(id)
            .and_then(|parent| state.tree.get(parent)?.layout())
            .ok_or_else(|| WmError::invalid("container has no layout"))?,
    };
    set_layout(state, id, current.toggled())
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::tiling::handlers::test_support::Fixture;

    #[test]
    fn test_detach_flattens_single_child_split() {
        let mut fx = Fixture::new(&["1"]);
        let a = fx.tiling(1);
        let b = fx.tiling(2);
        let split = wrap_in_split(&mut fx.state, b, Layout::Vertical).unwrap();
        let c = fx.tiling_in(split, 3);

        remove(&mut fx.state, c).unwrap();
        assert!(!fx.state.tree.contains(split));
        assert_eq!(fx.state.tree.parent(b), Some(fx.workspace));
        assert_eq!(fx.state.tree.children(fx.workspace), &[a, b]);
        assert_relative_eq!(fx.share(b), 0.5, epsilon = 1e-9);
        fx.state.tree.check_invariants().unwrap();
    }

    #[test]
    fn test_wrap_children_keeps_shares_and_focus() {
        let mut fx = Fixture::new(&["1"]);
        let a = fx.tiling(1);
        let b = fx.tiling(2);
        fx.state.tree.set_focused_descendant(b);

        let split = wrap_children(&mut fx.state, fx.workspace, Layout::Horizontal).unwrap().unwrap();
        assert_eq!(fx.state.tree.children(fx.workspace), &[split]);
        assert_eq!(fx.state.tree.children(split), &[a, b]);
        assert_eq!(fx.state.tree.focus_order(split), &[b, a]);
        assert_relative_eq!(fx.share(split), 1.0);
        fx.state.tree.check_invariants().unwrap();
    }

    #[test]
    fn test_set_layout_on_single_child_changes_parent() {
        let mut fx = Fixture::new(&["1"]);
        let a = fx.tiling(1);
        set_layout(&mut fx.state, a, Layout::Vertical).unwrap();
        assert_eq!(fx.state.tree.container(fx.workspace).unwrap().layout(), Some(Layout::Vertical));
    }

    #[test]
    fn test_set_layout_wraps_window_among_siblings() {
        let mut fx = Fixture::new(&["1"]);
        fx.tiling(1);
        let b = fx.tiling(2);
        set_layout(&mut fx.state, b, Layout::Vertical).unwrap();

        let parent = fx.state.tree.parent(b).unwrap();
        assert_ne!(parent, fx.workspace);
        assert_eq!(fx.state.tree.container(parent).unwrap().layout(), Some(Layout::Vertical));
        assert!(
            fx.state
                .queued_events()
                .any(|event| matches!(event, Event::TilingDirectionChanged { new_layout: Layout::Vertical, .. }))
        );
        fx.state.tree.check_invariants().unwrap();
    }
}
