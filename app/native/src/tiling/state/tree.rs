//! Arena-backed container tree.
//!
//! The tree owns every container in a [`SlotMap`]; parent and child relations
//! are arena keys. All structural mutation goes through this type so the
//! children list, the focus order and the parent key stay consistent, and so
//! the handle and id indexes never go stale.
//!
//! Index and sibling queries are computed from the parent's children list and
//! are never stored.

use std::collections::HashMap;

use slotmap::SlotMap;
use uuid::Uuid;

use super::container::{Container, ContainerId, ContainerKind};
use super::types::WindowHandle;
use crate::error::{WmError, WmResult};

/// Tolerance used when checking that split percentages sum to one.
pub const PERCENTAGE_TOLERANCE: f64 = 1e-6;

/// The container tree.
#[derive(Debug, Clone)]
pub struct ContainerTree {
    nodes: SlotMap<ContainerId, Container>,
    root: ContainerId,
    by_handle: HashMap<WindowHandle, ContainerId>,
    by_uuid: HashMap<Uuid, ContainerId>,
}

impl Default for ContainerTree {
    fn default() -> Self { Self::new() }
}

impl ContainerTree {
    /// Creates a tree holding only a root container.
    #[must_use]
    pub fn new() -> Self { Self::with_root(Container::new(ContainerKind::Root)) }

    /// Creates a tree around an existing root container.
    #[must_use]
    pub fn with_root(root: Container) -> Self {
        let mut nodes = SlotMap::with_key();
        let uuid = root.id;
        let root = nodes.insert(root);
        let mut by_uuid = HashMap::new();
        by_uuid.insert(uuid, root);
        Self {
            nodes,
            root,
            by_handle: HashMap::new(),
            by_uuid,
        }
    }

    #[must_use]
    pub const fn root(&self) -> ContainerId { self.root }

    /// Number of live containers, including detached ones.
    #[must_use]
    pub fn len(&self) -> usize { self.nodes.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.nodes.is_empty() }

    #[must_use]
    pub fn contains(&self, id: ContainerId) -> bool { self.nodes.contains_key(id) }

    #[must_use]
    pub fn get(&self, id: ContainerId) -> Option<&Container> { self.nodes.get(id) }

    pub fn get_mut(&mut self, id: ContainerId) -> Option<&mut Container> { self.nodes.get_mut(id) }

    /// Returns the container or a not-found error.
    ///
    /// # Errors
    ///
    /// Returns `WmError::ContainerNotFound` if the key is stale.
    pub fn container(&self, id: ContainerId) -> WmResult<&Container> {
        self.nodes.get(id).ok_or_else(|| WmError::not_found(format!("{id:?}")))
    }

    /// Mutable variant of [`Self::container`].
    ///
    /// # Errors
    ///
    /// Returns `WmError::ContainerNotFound` if the key is stale.
    pub fn container_mut(&mut self, id: ContainerId) -> WmResult<&mut Container> {
        self.nodes.get_mut(id).ok_or_else(|| WmError::not_found(format!("{id:?}")))
    }

    /// Inserts a detached container into the arena.
    ///
    /// # Errors
    ///
    /// Returns an invariant violation if the container wraps a window handle
    /// or id that is already in the tree.
    pub fn insert(&mut self, container: Container) -> WmResult<ContainerId> {
        if self.by_uuid.contains_key(&container.id) {
            return Err(WmError::invariant(format!("duplicate container id {}", container.id)));
        }
        let handle = container.as_window().map(|window| window.handle);
        if let Some(handle) = handle
            && self.by_handle.contains_key(&handle)
        {
            return Err(WmError::invariant(format!("window {handle} is already managed")));
        }

        let uuid = container.id;
        let id = self.nodes.insert(container);
        self.by_uuid.insert(uuid, id);
        if let Some(handle) = handle {
            self.by_handle.insert(handle, id);
        }
        Ok(id)
    }

    /// Looks up the container wrapping a native window.
    #[must_use]
    pub fn find_window(&self, handle: WindowHandle) -> Option<ContainerId> {
        self.by_handle.get(&handle).copied()
    }

    /// Looks up a container by its stable id.
    #[must_use]
    pub fn find_by_uuid(&self, uuid: Uuid) -> Option<ContainerId> { self.by_uuid.get(&uuid).copied() }

    // ========================================================================
    // Structure
    // ========================================================================

    #[must_use]
    pub fn parent(&self, id: ContainerId) -> Option<ContainerId> {
        self.nodes.get(id).and_then(Container::parent)
    }

    #[must_use]
    pub fn children(&self, id: ContainerId) -> &[ContainerId] {
        self.nodes.get(id).map_or(&[], Container::children)
    }

    #[must_use]
    pub fn focus_order(&self, id: ContainerId) -> &[ContainerId] {
        self.nodes.get(id).map_or(&[], Container::focus_order)
    }

    /// Returns `true` if the container hangs off the root.
    #[must_use]
    pub fn is_attached(&self, id: ContainerId) -> bool {
        self.self_and_ancestors(id).last() == Some(self.root)
    }

    /// Appends `child` to `parent`'s children and focus order.
    ///
    /// # Errors
    ///
    /// Fails if either key is stale or the child already has a parent.
    pub fn add_child(&mut self, parent: ContainerId, child: ContainerId) -> WmResult<()> {
        let index = self.children(parent).len();
        self.insert_child(parent, index, child)
    }

    /// Inserts `child` at `index` in `parent`'s children, and at the back of
    /// its focus order. The index is clamped to the children count.
    ///
    /// # Errors
    ///
    /// Fails if either key is stale, the child already has a parent, or the
    /// child is the parent itself or one of its ancestors.
    pub fn insert_child(
        &mut self,
        parent: ContainerId,
        index: usize,
        child: ContainerId,
    ) -> WmResult<()> {
        if self.container(child)?.parent.is_some() {
            return Err(WmError::invariant(format!("{child:?} is already attached")));
        }
        if self.self_and_ancestors(parent).any(|id| id == child) {
            return Err(WmError::invariant(format!("{child:?} cannot contain itself")));
        }

        let parent_node = self.container_mut(parent)?;
        let index = index.min(parent_node.children.len());
        parent_node.children.insert(index, child);
        parent_node.focus_order.push(child);

        self.container_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Removes `child` from its parent's children and focus order and clears
    /// its parent. Detached containers stay in the arena.
    ///
    /// # Errors
    ///
    /// Fails if the key is stale or the container has no parent.
    pub fn remove_child(&mut self, child: ContainerId) -> WmResult<()> {
        let parent = self
            .container(child)?
            .parent
            .ok_or_else(|| WmError::invariant(format!("{child:?} has no parent")))?;

        let parent_node = self.container_mut(parent)?;
        parent_node.children.retain(|id| *id != child);
        parent_node.focus_order.retain(|id| *id != child);

        self.container_mut(child)?.parent = None;
        Ok(())
    }

    /// Puts the detached container `new` in `old`'s place, at the same child
    /// index and focus position, and detaches `old`.
    ///
    /// # Errors
    ///
    /// Fails if either key is stale, `old` has no parent, `new` is attached,
    /// or `new` is an ancestor of `old`.
    pub fn replace_child(&mut self, old: ContainerId, new: ContainerId) -> WmResult<()> {
        if self.container(new)?.parent.is_some() {
            return Err(WmError::invariant(format!("{new:?} is already attached")));
        }
        let parent = self
            .container(old)?
            .parent
            .ok_or_else(|| WmError::invariant(format!("{old:?} has no parent")))?;
        if self.self_and_ancestors(parent).any(|id| id == new) {
            return Err(WmError::invariant(format!("{new:?} cannot contain itself")));
        }

        let parent_node = self.container_mut(parent)?;
        for slot in parent_node.children.iter_mut().chain(parent_node.focus_order.iter_mut()) {
            if *slot == old {
                *slot = new;
            }
        }

        self.container_mut(old)?.parent = None;
        self.container_mut(new)?.parent = Some(parent);
        Ok(())
    }

    /// Moves `child` to `index` among its current siblings.
    ///
    /// # Errors
    ///
    /// Fails if the key is stale or the container has no parent.
    pub fn move_to_index(&mut self, child: ContainerId, index: usize) -> WmResult<()> {
        let parent = self
            .parent(child)
            .ok_or_else(|| WmError::invariant(format!("{child:?} has no parent")))?;
        let parent_node = self.container_mut(parent)?;
        parent_node.children.retain(|id| *id != child);
        let index = index.min(parent_node.children.len());
        parent_node.children.insert(index, child);
        Ok(())
    }

    /// Detaches a container and frees it together with all its descendants.
    ///
    /// # Errors
    ///
    /// Fails if the key is stale or refers to the root.
    pub fn remove_subtree(&mut self, id: ContainerId) -> WmResult<()> {
        if id == self.root {
            return Err(WmError::invariant("the root container cannot be removed"));
        }
        if self.container(id)?.parent.is_some() {
            self.remove_child(id)?;
        }

        let doomed: Vec<ContainerId> = self.self_and_descendants(id).collect();
        for node_id in doomed {
            if let Some(node) = self.nodes.remove(node_id) {
                self.by_uuid.remove(&node.id);
                if let Some(window) = node.as_window() {
                    self.by_handle.remove(&window.handle);
                }
            }
        }
        Ok(())
    }

    // ========================================================================
    // Traversal
    // ========================================================================

    /// Depth-first, pre-order iterator over `id` and all its descendants.
    #[must_use]
    pub fn self_and_descendants(&self, id: ContainerId) -> Descendants<'_> {
        let stack = if self.contains(id) { vec![id] } else { Vec::new() };
        Descendants { tree: self, stack }
    }

    /// Depth-first, pre-order iterator over all descendants of `id`.
    #[must_use]
    pub fn descendants(&self, id: ContainerId) -> Descendants<'_> {
        let stack = self.children(id).iter().rev().copied().collect();
        Descendants { tree: self, stack }
    }

    /// Iterator from `id` up to the root.
    #[must_use]
    pub fn self_and_ancestors(&self, id: ContainerId) -> Ancestors<'_> {
        Ancestors { tree: self, next: self.contains(id).then_some(id) }
    }

    /// Iterator from `id`'s parent up to the root.
    #[must_use]
    pub fn ancestors(&self, id: ContainerId) -> Ancestors<'_> {
        Ancestors { tree: self, next: self.parent(id) }
    }

    /// Position of `id` among its siblings.
    #[must_use]
    pub fn index(&self, id: ContainerId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|child| *child == id)
    }

    /// Siblings of `id`, in order, excluding `id`.
    pub fn siblings(&self, id: ContainerId) -> impl Iterator<Item = ContainerId> + '_ {
        self.parent(id)
            .map(|parent| self.children(parent))
            .unwrap_or_default()
            .iter()
            .copied()
            .filter(move |sibling| *sibling != id)
    }

    #[must_use]
    pub fn next_sibling(&self, id: ContainerId) -> Option<ContainerId> {
        let parent = self.parent(id)?;
        let index = self.index(id)?;
        self.children(parent).get(index + 1).copied()
    }

    #[must_use]
    pub fn previous_sibling(&self, id: ContainerId) -> Option<ContainerId> {
        let parent = self.parent(id)?;
        let index = self.index(id)?;
        index.checked_sub(1).and_then(|i| self.children(parent).get(i).copied())
    }

    // ========================================================================
    // Focus
    // ========================================================================

    /// The most recently focused direct child of `id`.
    #[must_use]
    pub fn last_focused_child(&self, id: ContainerId) -> Option<ContainerId> {
        self.focus_order(id).first().copied()
    }

    /// Follows the focus order downward until a node has no focused child.
    /// Returns `None` if `id` has no children.
    #[must_use]
    pub fn last_focused_descendant(&self, id: ContainerId) -> Option<ContainerId> {
        let mut current = self.last_focused_child(id)?;
        while let Some(next) = self.last_focused_child(current) {
            current = next;
        }
        Some(current)
    }

    /// Position of `id` in its parent's focus order (0 = most recent).
    #[must_use]
    pub fn focus_index(&self, id: ContainerId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.focus_order(parent).iter().position(|child| *child == id)
    }

    /// Moves `id` and every ancestor to the front of their parent's focus
    /// order, making `id` the root's last focused descendant.
    pub fn set_focused_descendant(&mut self, id: ContainerId) {
        let path: Vec<ContainerId> = self.self_and_ancestors(id).collect();
        for node in path {
            let Some(parent) = self.parent(node) else { continue };
            if let Some(parent_node) = self.nodes.get_mut(parent) {
                parent_node.focus_order.retain(|child| *child != node);
                parent_node.focus_order.insert(0, node);
            }
        }
    }

    /// Replaces `id`'s focus order. `order` must hold exactly its children.
    ///
    /// # Errors
    ///
    /// Fails if `order` is not a permutation of the children.
    pub fn set_focus_order(&mut self, id: ContainerId, order: &[ContainerId]) -> WmResult<()> {
        let node = self.container_mut(id)?;
        let mut expected: Vec<ContainerId> = node.children.to_vec();
        let mut given: Vec<ContainerId> = order.to_vec();
        expected.sort_unstable();
        given.sort_unstable();
        if expected != given {
            return Err(WmError::invariant("focus order must contain exactly the children"));
        }
        node.focus_order = order.iter().copied().collect();
        Ok(())
    }

    // ========================================================================
    // Invariants
    // ========================================================================

    /// Verifies the structural invariants of the attached tree.
    ///
    /// # Errors
    ///
    /// Returns `WmError::InvariantViolation` describing the first violation.
    pub fn check_invariants(&self) -> WmResult<()> {
        let mut seen_handles = HashMap::new();

        for id in self.self_and_descendants(self.root) {
            let node = self.container(id)?;

            if (id == self.root) != node.parent.is_none() {
                return Err(WmError::invariant(format!("{id:?} has an unexpected parent")));
            }

            if node.children.len() != node.focus_order.len() {
                return Err(WmError::invariant(format!("{id:?} focus order length mismatch")));
            }

            for child in &node.children {
                let occurrences = node.children.iter().filter(|c| *c == child).count();
                let focus_occurrences = node.focus_order.iter().filter(|c| *c == child).count();
                if occurrences != 1 || focus_occurrences != 1 {
                    return Err(WmError::invariant(format!(
                        "{child:?} must appear exactly once under {id:?}"
                    )));
                }
                if self.parent(*child) != Some(id) {
                    return Err(WmError::invariant(format!("{child:?} has a stale parent")));
                }
            }

            if let Some(window) = node.as_window()
                && let Some(previous) = seen_handles.insert(window.handle, id)
            {
                return Err(WmError::invariant(format!(
                    "window {} appears twice ({previous:?}, {id:?})",
                    window.handle
                )));
            }

            if node.layout().is_some() {
                let resizable: Vec<f64> = node
                    .children
                    .iter()
                    .filter_map(|child| self.get(*child).and_then(Container::size_percentage))
                    .collect();
                let sum: f64 = resizable.iter().sum();
                if !resizable.is_empty() && (sum - 1.0).abs() > PERCENTAGE_TOLERANCE {
                    return Err(WmError::invariant(format!(
                        "{id:?} child percentages sum to {sum}"
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Depth-first traversal, restartable by calling the constructor again.
pub struct Descendants<'a> {
    tree: &'a ContainerTree,
    stack: Vec<ContainerId>,
}

impl Iterator for Descendants<'_> {
    type Item = ContainerId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack.extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}

/// Upward traversal.
pub struct Ancestors<'a> {
    tree: &'a ContainerTree,
    next: Option<ContainerId>,
}

impl Iterator for Ancestors<'_> {
    type Item = ContainerId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        self.next = self.tree.parent(id);
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiling::state::container::{SplitData, WindowData, WindowState};
    use crate::tiling::state::types::{Layout, Rect};

    fn split(tree: &mut ContainerTree) -> ContainerId {
        tree.insert(Container::new(ContainerKind::Split(SplitData {
            layout: Layout::Horizontal,
            size_percentage: 1.0,
        })))
        .unwrap()
    }

    fn window(tree: &mut ContainerTree, handle: u64) -> ContainerId {
        tree.insert(Container::new(ContainerKind::Window(WindowData::new(
            WindowHandle(handle),
            WindowState::Floating,
            Rect::zero(),
        ))))
        .unwrap()
    }

    #[test]
    fn test_add_child_sets_both_sequences_and_parent() {
        let mut tree = ContainerTree::new();
        let root = tree.root();
        let a = split(&mut tree);
        tree.add_child(root, a).unwrap();

        assert_eq!(tree.parent(a), Some(root));
        assert_eq!(tree.children(root), &[a]);
        assert_eq!(tree.focus_order(root), &[a]);
        assert!(tree.is_attached(a));
    }

    #[test]
    fn test_remove_child_clears_both_sequences_and_parent() {
        let mut tree = ContainerTree::new();
        let root = tree.root();
        let a = split(&mut tree);
        tree.add_child(root, a).unwrap();
        tree.remove_child(a).unwrap();

        assert_eq!(tree.parent(a), None);
        assert!(!tree.children(root).contains(&a));
        assert!(!tree.focus_order(root).contains(&a));
        assert!(tree.contains(a));
        assert!(!tree.is_attached(a));
    }

    #[test]
    fn test_add_child_rejects_attached_child_and_cycles() {
        let mut tree = ContainerTree::new();
        let root = tree.root();
        let a = split(&mut tree);
        let b = split(&mut tree);
        tree.add_child(root, a).unwrap();
        tree.add_child(a, b).unwrap();

        assert!(tree.add_child(root, b).is_err());
        tree.remove_child(a).unwrap();
        assert!(tree.add_child(b, a).is_err());
    }

    #[test]
    fn test_insert_rejects_duplicate_handle() {
        let mut tree = ContainerTree::new();
        window(&mut tree, 7);
        let duplicate = Container::new(ContainerKind::Window(WindowData::new(
            WindowHandle(7),
            WindowState::Floating,
            Rect::zero(),
        )));
        assert!(tree.insert(duplicate).is_err());
    }

    #[test]
    fn test_sibling_queries_are_computed() {
        let mut tree = ContainerTree::new();
        let root = tree.root();
        let ids: Vec<_> = (0..3).map(|_| split(&mut tree)).collect();
        for id in &ids {
            tree.add_child(root, *id).unwrap();
        }

        assert_eq!(tree.index(ids[1]), Some(1));
        assert_eq!(tree.next_sibling(ids[1]), Some(ids[2]));
        assert_eq!(tree.previous_sibling(ids[1]), Some(ids[0]));
        assert_eq!(tree.previous_sibling(ids[0]), None);
        assert_eq!(tree.siblings(ids[1]).collect::<Vec<_>>(), vec![ids[0], ids[2]]);

        tree.move_to_index(ids[2], 0).unwrap();
        assert_eq!(tree.index(ids[1]), Some(2));
    }

    #[test]
    fn test_traversal_order() {
        let mut tree = ContainerTree::new();
        let root = tree.root();
        let a = split(&mut tree);
        let b = split(&mut tree);
        let c = window(&mut tree, 1);
        tree.add_child(root, a).unwrap();
        tree.add_child(a, c).unwrap();
        tree.add_child(root, b).unwrap();

        let order: Vec<_> = tree.self_and_descendants(root).collect();
        assert_eq!(order, vec![root, a, c, b]);
        // restartable
        assert_eq!(tree.descendants(root).count(), 3);
        assert_eq!(tree.self_and_ancestors(c).collect::<Vec<_>>(), vec![c, a, root]);
    }

    #[test]
    fn test_set_focused_descendant_propagates_up() {
        let mut tree = ContainerTree::new();
        let root = tree.root();
        let a = split(&mut tree);
        let b = split(&mut tree);
        let c = window(&mut tree, 1);
        tree.add_child(root, a).unwrap();
        tree.add_child(root, b).unwrap();
        tree.add_child(b, c).unwrap();

        assert_eq!(tree.last_focused_descendant(root), Some(a));

        tree.set_focused_descendant(c);
        assert_eq!(tree.focus_order(root), &[b, a]);
        assert_eq!(tree.last_focused_descendant(root), Some(c));
        assert_eq!(tree.focus_index(a), Some(1));
        assert_eq!(tree.last_focused_descendant(c), None);
    }

    #[test]
    fn test_remove_subtree_frees_nodes_and_handles() {
        let mut tree = ContainerTree::new();
        let root = tree.root();
        let a = split(&mut tree);
        let c = window(&mut tree, 9);
        tree.add_child(root, a).unwrap();
        tree.add_child(a, c).unwrap();

        tree.remove_subtree(a).unwrap();
        assert!(!tree.contains(a));
        assert!(!tree.contains(c));
        assert_eq!(tree.find_window(WindowHandle(9)), None);
        assert!(tree.children(root).is_empty());
        assert!(tree.remove_subtree(root).is_err());
    }

    #[test]
    fn test_check_invariants_detects_bad_percentages() {
        let mut tree = ContainerTree::new();
        let root = tree.root();
        let parent = split(&mut tree);
        let a = split(&mut tree);
        let b = split(&mut tree);
        tree.add_child(root, parent).unwrap();
        tree.add_child(parent, a).unwrap();
        tree.add_child(parent, b).unwrap();

        assert!(tree.check_invariants().is_err());

        tree.get_mut(a).unwrap().set_size_percentage(0.5);
        tree.get_mut(b).unwrap().set_size_percentage(0.5);
        assert!(tree.check_invariants().is_ok());
    }

    #[test]
    fn test_set_focus_order_requires_permutation() {
        let mut tree = ContainerTree::new();
        let root = tree.root();
        let a = split(&mut tree);
        let b = split(&mut tree);
        tree.add_child(root, a).unwrap();
        tree.add_child(root, b).unwrap();

        tree.set_focus_order(root, &[b, a]).unwrap();
        assert_eq!(tree.last_focused_child(root), Some(b));
        assert!(tree.set_focus_order(root, &[b]).is_err());
    }

    #[test]
    fn test_replace_child_keeps_position_and_focus_slot() {
        let mut tree = ContainerTree::new();
        let root = tree.root();
        let a = split(&mut tree);
        let b = split(&mut tree);
        let c = split(&mut tree);
        tree.add_child(root, a).unwrap();
        tree.add_child(root, b).unwrap();
        tree.set_focused_descendant(b);

        tree.replace_child(b, c).unwrap();
        assert_eq!(tree.children(root), &[a, c]);
        assert_eq!(tree.focus_order(root), &[c, a]);
        assert_eq!(tree.parent(b), None);
        assert!(tree.replace_child(a, c).is_err());
    }
}
