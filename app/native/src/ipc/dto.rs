//! Serializable container snapshots.
//!
//! A [`ContainerDto`] is a detached, owned copy of a subtree with computed
//! geometry filled in. Events and query responses carry these so nothing
//! outside the state lock ever observes live nodes. The root snapshot holds
//! enough to rebuild the tree with [`ContainerTree::from_dto`].

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{WmError, WmResult};
use crate::tiling::layout::{self, Gaps};
use crate::tiling::state::{
    Container, ContainerId, ContainerKind, ContainerTree, Layout, MonitorData, Rect, RestoreState,
    SplitData, TransientState, WindowData, WindowHandle, WindowState, WmState, WorkspaceData,
};

/// Snapshot of a container and its descendants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContainerDto {
    pub id: Uuid,
    #[serde(flatten)]
    pub kind: ContainerKindDto,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Position in the parent's focus order, 0 being the most recent.
    pub focus_index: usize,
    pub children: Vec<ContainerDto>,
}

/// Per-variant fields, discriminated by `type`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContainerKindDto {
    Root,
    Monitor {
        device_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        displayed_workspace: Option<Uuid>,
    },
    Workspace {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        display_name: Option<String>,
        keep_alive: bool,
        layout: Layout,
        is_displayed: bool,
    },
    SplitContainer {
        layout: Layout,
        size_percentage: f64,
    },
    TilingWindow(WindowDto),
    FloatingWindow(WindowDto),
    MinimizedWindow(WindowDto),
    MaximizedWindow(WindowDto),
    FullscreenWindow(WindowDto),
}

/// Fields shared by every window variant. The optional ones are set only by
/// the variants that carry them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WindowDto {
    pub handle: WindowHandle,
    pub title: String,
    pub process_name: String,
    pub class_name: String,
    pub floating_placement: Rect,
    pub user_override: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_state: Option<RestoreState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimized_placement: Option<Rect>,
    /// Maximized or fullscreen state a minimized window returns to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimized_from: Option<TransientState>,
}

impl ContainerDto {
    /// The `type` discriminant.
    #[must_use]
    pub const fn type_name(&self) -> &'static str { self.kind.type_name() }

    /// Computed geometry as a rectangle.
    #[must_use]
    pub const fn rect(&self) -> Rect { Rect::new(self.x, self.y, self.width, self.height) }

    /// Depth-first iterator over this snapshot and its descendants.
    pub fn walk(&self) -> impl Iterator<Item = &Self> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            stack.extend(next.children.iter().rev());
            Some(next)
        })
    }
}

impl ContainerKindDto {
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Monitor { .. } => "monitor",
            Self::Workspace { .. } => "workspace",
            Self::SplitContainer { .. } => "split_container",
            Self::TilingWindow(_) => "tiling_window",
            Self::FloatingWindow(_) => "floating_window",
            Self::MinimizedWindow(_) => "minimized_window",
            Self::MaximizedWindow(_) => "maximized_window",
            Self::FullscreenWindow(_) => "fullscreen_window",
        }
    }

    /// Window fields, for window variants.
    #[must_use]
    pub const fn window(&self) -> Option<&WindowDto> {
        match self {
            Self::TilingWindow(window)
            | Self::FloatingWindow(window)
            | Self::MinimizedWindow(window)
            | Self::MaximizedWindow(window)
            | Self::FullscreenWindow(window) => Some(window),
            _ => None,
        }
    }
}

// ============================================================================
// Live tree -> snapshot
// ============================================================================

/// Snapshots `id` using the gaps of the current config.
#[must_use]
pub fn snapshot(state: &WmState, id: ContainerId) -> Option<ContainerDto> {
    to_dto(&state.tree, &Gaps::from_config(state.config()), id)
}

/// Snapshots `id` and its subtree. Returns `None` for stale keys.
#[must_use]
pub fn to_dto(tree: &ContainerTree, gaps: &Gaps, id: ContainerId) -> Option<ContainerDto> {
    let node = tree.get(id)?;
    let rect = layout::rect(tree, gaps, id).unwrap_or_default();

    Some(ContainerDto {
        id: node.id,
        kind: kind_dto(tree, id, node),
        x: rect.x,
        y: rect.y,
        width: rect.width,
        height: rect.height,
        focus_index: tree.focus_index(id).unwrap_or(0),
        children: tree.children(id).iter().filter_map(|child| to_dto(tree, gaps, *child)).collect(),
    })
}

fn kind_dto(tree: &ContainerTree, id: ContainerId, node: &Container) -> ContainerKindDto {
    match &node.kind {
        ContainerKind::Root => ContainerKindDto::Root,
        ContainerKind::Monitor(monitor) => ContainerKindDto::Monitor {
            device_name: monitor.device_name.clone(),
            displayed_workspace: monitor
                .displayed_workspace
                .and_then(|workspace| tree.get(workspace))
                .map(|workspace| workspace.id),
        },
        ContainerKind::Workspace(workspace) => ContainerKindDto::Workspace {
            name: workspace.name.clone(),
            display_name: workspace.display_name.clone(),
            keep_alive: workspace.keep_alive,
            layout: workspace.layout,
            is_displayed: tree
                .parent(id)
                .and_then(|monitor| tree.get(monitor)?.as_monitor()?.displayed_workspace)
                == Some(id),
        },
        ContainerKind::Split(split) => ContainerKindDto::SplitContainer {
            layout: split.layout,
            size_percentage: split.size_percentage,
        },
        ContainerKind::Window(window) => window_dto(window),
    }
}

fn window_dto(window: &WindowData) -> ContainerKindDto {
    let mut dto = WindowDto {
        handle: window.handle,
        title: window.title.clone(),
        process_name: window.process_name.clone(),
        class_name: window.class_name.clone(),
        floating_placement: window.floating_placement,
        user_override: window.user_override,
        size_percentage: None,
        previous_state: None,
        minimized_placement: None,
        minimized_from: None,
    };

    match window.state {
        WindowState::Tiling { size_percentage } => {
            dto.size_percentage = Some(size_percentage);
            ContainerKindDto::TilingWindow(dto)
        }
        WindowState::Floating => ContainerKindDto::FloatingWindow(dto),
        WindowState::Minimized { previous, from, placement } => {
            dto.previous_state = Some(previous);
            dto.minimized_placement = Some(placement);
            dto.minimized_from = from;
            ContainerKindDto::MinimizedWindow(dto)
        }
        WindowState::Maximized { previous } => {
            dto.previous_state = Some(previous);
            ContainerKindDto::MaximizedWindow(dto)
        }
        WindowState::Fullscreen { previous } => {
            dto.previous_state = Some(previous);
            ContainerKindDto::FullscreenWindow(dto)
        }
    }
}

// ============================================================================
// Snapshot -> tree
// ============================================================================

impl ContainerTree {
    /// Rebuilds a tree from a root snapshot: same ids, variants, children
    /// order, focus order and displayed workspaces.
    ///
    /// # Errors
    ///
    /// Fails with `InvalidCommand` if the snapshot is not rooted at a root
    /// container or a variant lacks its required fields, and with an
    /// invariant violation if the rebuilt tree is inconsistent.
    pub fn from_dto(root: &ContainerDto) -> WmResult<Self> {
        if root.kind != ContainerKindDto::Root {
            return Err(WmError::invalid(format!(
                "snapshot must start at the root, not a {}",
                root.type_name()
            )));
        }

        let mut tree = Self::with_root(Container::with_id(root.id, ContainerKind::Root));
        let mut displayed = Vec::new();
        let root_id = tree.root();
        tree.attach_snapshot_children(root_id, root, &mut displayed)?;

        for (monitor, workspace) in displayed {
            let workspace = tree.find_by_uuid(workspace).ok_or_else(|| {
                WmError::invalid(format!("displayed workspace {workspace} is not in the snapshot"))
            })?;
            if let Some(data) = tree.container_mut(monitor)?.as_monitor_mut() {
                data.displayed_workspace = Some(workspace);
            }
        }

        tree.check_invariants()?;
        Ok(tree)
    }

    fn attach_snapshot_children(
        &mut self,
        parent: ContainerId,
        dto: &ContainerDto,
        displayed: &mut Vec<(ContainerId, Uuid)>,
    ) -> WmResult<()> {
        let mut by_focus = Vec::with_capacity(dto.children.len());

        for child in &dto.children {
            let kind = container_kind(child)?;
            let id = self.insert(Container::with_id(child.id, kind))?;
            self.add_child(parent, id)?;
            if let ContainerKindDto::Monitor { displayed_workspace: Some(workspace), .. } = child.kind {
                displayed.push((id, workspace));
            }
            self.attach_snapshot_children(id, child, displayed)?;
            by_focus.push((child.focus_index, id));
        }

        by_focus.sort_by_key(|(focus_index, _)| *focus_index);
        let order: Vec<ContainerId> = by_focus.into_iter().map(|(_, id)| id).collect();
        self.set_focus_order(parent, &order)
    }
}

fn container_kind(dto: &ContainerDto) -> WmResult<ContainerKind> {
    let missing = |field: &str| {
        WmError::invalid(format!("{} {} is missing {field}", dto.type_name(), dto.id))
    };

    Ok(match &dto.kind {
        ContainerKindDto::Root => {
            return Err(WmError::invalid(format!("nested root container {}", dto.id)));
        }
        ContainerKindDto::Monitor { device_name, .. } => ContainerKind::Monitor(MonitorData {
            device_name: device_name.clone(),
            rect: dto.rect(),
            displayed_workspace: None,
        }),
        ContainerKindDto::Workspace { name, display_name, keep_alive, layout, .. } => {
            ContainerKind::Workspace(WorkspaceData {
                name: name.clone(),
                display_name: display_name.clone(),
                keep_alive: *keep_alive,
                layout: *layout,
            })
        }
        ContainerKindDto::SplitContainer { layout, size_percentage } => {
            ContainerKind::Split(SplitData { layout: *layout, size_percentage: *size_percentage })
        }
        ContainerKindDto::TilingWindow(window) => {
            let size_percentage = window.size_percentage.ok_or_else(|| missing("size_percentage"))?;
            window_kind(window, WindowState::Tiling { size_percentage })
        }
        ContainerKindDto::FloatingWindow(window) => window_kind(window, WindowState::Floating),
        ContainerKindDto::MinimizedWindow(window) => {
            let previous = window.previous_state.ok_or_else(|| missing("previous_state"))?;
            let placement =
                window.minimized_placement.ok_or_else(|| missing("minimized_placement"))?;
            let from = window.minimized_from;
            window_kind(window, WindowState::Minimized { previous, from, placement })
        }
        ContainerKindDto::MaximizedWindow(window) => {
            let previous = window.previous_state.ok_or_else(|| missing("previous_state"))?;
            window_kind(window, WindowState::Maximized { previous })
        }
        ContainerKindDto::FullscreenWindow(window) => {
            let previous = window.previous_state.ok_or_else(|| missing("previous_state"))?;
            window_kind(window, WindowState::Fullscreen { previous })
        }
    })
}

fn window_kind(dto: &WindowDto, state: WindowState) -> ContainerKind {
    let mut window = WindowData::new(dto.handle, state, dto.floating_placement);
    window.title.clone_from(&dto.title);
    window.process_name.clone_from(&dto.process_name);
    window.class_name.clone_from(&dto.class_name);
    window.user_override = dto.user_override;
    ContainerKind::Window(window)
}
