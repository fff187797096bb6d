//! Container node types.
//!
//! Every node of the tree is a [`Container`]: shared structural fields plus a
//! per-variant [`ContainerKind`] payload. Nodes live in the tree's arena and
//! refer to each other through [`ContainerId`] keys, never through pointers.

use slotmap::new_key_type;
use smallvec::SmallVec;
use uuid::Uuid;

use super::types::{Layout, Rect, WindowHandle};

new_key_type! {
    /// Arena key of a container node.
    pub struct ContainerId;
}

/// Inline capacity for child lists; most splits hold a handful of children.
pub(crate) type ChildList = SmallVec<[ContainerId; 4]>;

/// Monitor payload.
#[derive(Clone, Debug, PartialEq)]
pub struct MonitorData {
    /// OS device name, used for workspace bindings.
    pub device_name: String,
    /// Device geometry, authoritative.
    pub rect: Rect,
    /// Workspace currently displayed on this monitor.
    pub displayed_workspace: Option<ContainerId>,
}

/// Workspace payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkspaceData {
    pub name: String,
    pub display_name: Option<String>,
    pub keep_alive: bool,
    pub layout: Layout,
}

/// Split container payload.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SplitData {
    pub layout: Layout,
    pub size_percentage: f64,
}

/// The non-transient state a window returns to after minimize, maximize or
/// fullscreen ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestoreState {
    Tiling,
    Floating,
}

/// Full-workspace state a window was minimized out of.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransientState {
    Maximized,
    Fullscreen,
}

/// Mutually exclusive window states.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WindowState {
    Tiling { size_percentage: f64 },
    Floating,
    /// `from` is set when the window was maximized or fullscreen; restoring
    /// returns there, with `previous` kept underneath.
    Minimized { previous: RestoreState, from: Option<TransientState>, placement: Rect },
    Maximized { previous: RestoreState },
    Fullscreen { previous: RestoreState },
}

impl WindowState {
    /// Returns the state's name as used in payloads and commands.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Tiling { .. } => "tiling",
            Self::Floating => "floating",
            Self::Minimized { .. } => "minimized",
            Self::Maximized { .. } => "maximized",
            Self::Fullscreen { .. } => "fullscreen",
        }
    }

    /// The state this window collapses to when leaving a transient state.
    #[must_use]
    pub const fn restore_state(&self) -> RestoreState {
        match *self {
            Self::Tiling { .. } => RestoreState::Tiling,
            Self::Floating => RestoreState::Floating,
            Self::Minimized { previous, .. }
            | Self::Maximized { previous }
            | Self::Fullscreen { previous } => previous,
        }
    }

    /// The transient variant this state sits in, if any.
    #[must_use]
    pub const fn transient(&self) -> Option<TransientState> {
        match *self {
            Self::Maximized { .. } => Some(TransientState::Maximized),
            Self::Fullscreen { .. } => Some(TransientState::Fullscreen),
            Self::Minimized { from, .. } => from,
            Self::Tiling { .. } | Self::Floating => None,
        }
    }
}

/// Window payload.
#[derive(Clone, Debug, PartialEq)]
pub struct WindowData {
    pub handle: WindowHandle,
    pub state: WindowState,
    /// Placement used while floating, kept across state changes.
    pub floating_placement: Rect,
    pub title: String,
    pub process_name: String,
    pub class_name: String,
    /// Set once the user changes the state explicitly; rules no longer apply.
    pub user_override: bool,
    /// Show/hide calls issued by the manager whose OS echo is still expected.
    pub pending_visibility_changes: u32,
    /// Whether the last placement issued for this window hid it.
    pub hidden_by_manager: bool,
}

impl WindowData {
    /// Creates window data for a freshly managed window.
    #[must_use]
    pub fn new(handle: WindowHandle, state: WindowState, floating_placement: Rect) -> Self {
        Self {
            handle,
            state,
            floating_placement,
            title: String::new(),
            process_name: String::new(),
            class_name: String::new(),
            user_override: false,
            pending_visibility_changes: 0,
            hidden_by_manager: false,
        }
    }
}

/// Per-variant container payload.
#[derive(Clone, Debug, PartialEq)]
pub enum ContainerKind {
    Root,
    Monitor(MonitorData),
    Workspace(WorkspaceData),
    Split(SplitData),
    Window(WindowData),
}

impl ContainerKind {
    /// Returns the discriminant name used in logs and payloads.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Monitor(_) => "monitor",
            Self::Workspace(_) => "workspace",
            Self::Split(_) => "split_container",
            Self::Window(window) => match window.state {
                WindowState::Tiling { .. } => "tiling_window",
                WindowState::Floating => "floating_window",
                WindowState::Minimized { .. } => "minimized_window",
                WindowState::Maximized { .. } => "maximized_window",
                WindowState::Fullscreen { .. } => "fullscreen_window",
            },
        }
    }
}

/// A node in the container tree.
#[derive(Clone, Debug)]
pub struct Container {
    /// Stable identifier exposed in events and snapshots.
    pub id: Uuid,
    pub(crate) parent: Option<ContainerId>,
    pub(crate) children: ChildList,
    /// Same members as `children`, most recently focused first.
    pub(crate) focus_order: ChildList,
    pub kind: ContainerKind,
}

impl Container {
    /// Creates a detached container with a fresh id.
    #[must_use]
    pub fn new(kind: ContainerKind) -> Self { Self::with_id(Uuid::now_v7(), kind) }

    /// Creates a detached container with the given id.
    #[must_use]
    pub fn with_id(id: Uuid, kind: ContainerKind) -> Self {
        Self {
            id,
            parent: None,
            children: ChildList::new(),
            focus_order: ChildList::new(),
            kind,
        }
    }

    #[must_use]
    pub const fn parent(&self) -> Option<ContainerId> { self.parent }

    #[must_use]
    pub fn children(&self) -> &[ContainerId] { &self.children }

    #[must_use]
    pub fn focus_order(&self) -> &[ContainerId] { &self.focus_order }

    /// Returns `true` if the container takes part in proportional sizing.
    #[must_use]
    pub const fn is_resizable(&self) -> bool {
        matches!(
            self.kind,
            ContainerKind::Split(_)
                | ContainerKind::Window(WindowData { state: WindowState::Tiling { .. }, .. })
        )
    }

    /// Size share within the parent, for resizable containers.
    #[must_use]
    pub const fn size_percentage(&self) -> Option<f64> {
        match &self.kind {
            ContainerKind::Split(split) => Some(split.size_percentage),
            ContainerKind::Window(WindowData {
                state: WindowState::Tiling { size_percentage },
                ..
            }) => Some(*size_percentage),
            _ => None,
        }
    }

    /// Sets the size share; no-op for non-resizable containers.
    pub fn set_size_percentage(&mut self, value: f64) {
        match &mut self.kind {
            ContainerKind::Split(split) => split.size_percentage = value,
            ContainerKind::Window(WindowData {
                state: WindowState::Tiling { size_percentage },
                ..
            }) => *size_percentage = value,
            _ => {}
        }
    }

    /// Axis this container lays its children out along, if it is a split.
    #[must_use]
    pub const fn layout(&self) -> Option<Layout> {
        match &self.kind {
            ContainerKind::Workspace(ws) => Some(ws.layout),
            ContainerKind::Split(split) => Some(split.layout),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_window(&self) -> Option<&WindowData> {
        match &self.kind {
            ContainerKind::Window(window) => Some(window),
            _ => None,
        }
    }

    pub const fn as_window_mut(&mut self) -> Option<&mut WindowData> {
        match &mut self.kind {
            ContainerKind::Window(window) => Some(window),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_workspace(&self) -> Option<&WorkspaceData> {
        match &self.kind {
            ContainerKind::Workspace(ws) => Some(ws),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_monitor(&self) -> Option<&MonitorData> {
        match &self.kind {
            ContainerKind::Monitor(monitor) => Some(monitor),
            _ => None,
        }
    }

    pub const fn as_monitor_mut(&mut self) -> Option<&mut MonitorData> {
        match &mut self.kind {
            ContainerKind::Monitor(monitor) => Some(monitor),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_window(&self) -> bool { matches!(self.kind, ContainerKind::Window(_)) }

    #[must_use]
    pub const fn is_workspace(&self) -> bool { matches!(self.kind, ContainerKind::Workspace(_)) }

    #[must_use]
    pub const fn is_monitor(&self) -> bool { matches!(self.kind, ContainerKind::Monitor(_)) }

    #[must_use]
    pub const fn is_split(&self) -> bool { matches!(self.kind, ContainerKind::Split(_)) }

    /// Returns `true` for tiling windows.
    #[must_use]
    pub const fn is_tiling_window(&self) -> bool {
        matches!(
            self.kind,
            ContainerKind::Window(WindowData { state: WindowState::Tiling { .. }, .. })
        )
    }

    /// Returns `true` for floating windows.
    #[must_use]
    pub const fn is_floating_window(&self) -> bool {
        matches!(
            self.kind,
            ContainerKind::Window(WindowData { state: WindowState::Floating, .. })
        )
    }
}
