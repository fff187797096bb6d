//! Commands accepted by the bus.
//!
//! [`Command`] is closed: every variant has exactly one handler, selected by
//! the single `match` in `handlers::dispatch`. Commands that act on a
//! container carry an optional subject; `None` means the focused container.

use std::fmt;
use std::sync::Arc;

use crate::config::{RuleAction, WmConfig};
use crate::platform::{MonitorInfo, NativeWindowInfo};
use crate::tiling::state::{ContainerId, Direction, Layout, Rect, ResizeDimension, WindowHandle};

/// Target of `focus workspace`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceTarget {
    Name(String),
    Next,
    Previous,
    /// The workspace focused before the current one.
    Recent,
}

/// Window state requested by `set` and `toggle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowStateTarget {
    Tiling,
    Floating,
    Minimized,
    Maximized,
    Fullscreen,
}

impl WindowStateTarget {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tiling => "tiling",
            Self::Floating => "floating",
            Self::Minimized => "minimized",
            Self::Maximized => "maximized",
            Self::Fullscreen => "fullscreen",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "tiling" => Some(Self::Tiling),
            "floating" => Some(Self::Floating),
            "minimized" => Some(Self::Minimized),
            "maximized" => Some(Self::Maximized),
            "fullscreen" => Some(Self::Fullscreen),
            _ => None,
        }
    }
}

/// A request to change window manager state.
#[derive(Debug, Clone)]
pub enum Command {
    // ========================================================================
    // Focus
    // ========================================================================
    FocusDirection { subject: Option<ContainerId>, direction: Direction },
    FocusWorkspace(WorkspaceTarget),
    FocusMonitor(Direction),
    /// Makes a container the focused one without touching native focus.
    SetFocusedDescendant(ContainerId),

    // ========================================================================
    // Layout and movement
    // ========================================================================
    MoveDirection { subject: Option<ContainerId>, direction: Direction },
    MoveToWorkspace { subject: Option<ContainerId>, workspace: String },
    /// Grows or shrinks by a fraction of the parent; `amount` defaults to
    /// the configured resize step.
    Resize {
        subject: Option<ContainerId>,
        dimension: ResizeDimension,
        grow: bool,
        amount: Option<f64>,
    },
    SetLayout { subject: Option<ContainerId>, layout: Layout },
    ToggleLayout { subject: Option<ContainerId> },

    // ========================================================================
    // Window state
    // ========================================================================
    SetWindowState { subject: Option<ContainerId>, target: WindowStateTarget },
    ToggleWindowState { subject: Option<ContainerId>, target: WindowStateTarget },
    /// Mirrors a minimize or restore the OS already performed.
    SyncMinimized { window: ContainerId, minimized: bool },
    /// Adopts a floating window's OS rect as its floating placement.
    UpdateFloatingPlacement { window: ContainerId, rect: Rect },
    Close { subject: Option<ContainerId> },

    // ========================================================================
    // Windows
    // ========================================================================
    ManageWindow {
        handle: WindowHandle,
        info: NativeWindowInfo,
        action: RuleAction,
        workspace: Option<ContainerId>,
    },
    UnmanageWindow(ContainerId),

    // ========================================================================
    // Workspaces and monitors
    // ========================================================================
    ActivateWorkspace { monitor: ContainerId, name: Option<String> },
    DeactivateWorkspace(ContainerId),
    DisplayWorkspace(ContainerId),
    AddMonitor(MonitorInfo),
    RemoveMonitor { device_name: String },
    RefreshMonitors(Vec<MonitorInfo>),

    // ========================================================================
    // General
    // ========================================================================
    /// Swaps the config snapshot; `None` reloads it from disk.
    ReloadConfig(Option<Arc<WmConfig>>),
    Redraw,
    Exit,
}

impl Command {
    /// Short name used in logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::FocusDirection { .. } => "focus_direction",
            Self::FocusWorkspace(_) => "focus_workspace",
            Self::FocusMonitor(_) => "focus_monitor",
            Self::SetFocusedDescendant(_) => "set_focused_descendant",
            Self::MoveDirection { .. } => "move_direction",
            Self::MoveToWorkspace { .. } => "move_to_workspace",
            Self::Resize { .. } => "resize",
            Self::SetLayout { .. } => "set_layout",
            Self::ToggleLayout { .. } => "toggle_layout",
            Self::SetWindowState { .. } => "set_window_state",
            Self::ToggleWindowState { .. } => "toggle_window_state",
            Self::SyncMinimized { .. } => "sync_minimized",
            Self::UpdateFloatingPlacement { .. } => "update_floating_placement",
            Self::Close { .. } => "close",
            Self::ManageWindow { .. } => "manage_window",
            Self::UnmanageWindow(_) => "unmanage_window",
            Self::ActivateWorkspace { .. } => "activate_workspace",
            Self::DeactivateWorkspace(_) => "deactivate_workspace",
            Self::DisplayWorkspace(_) => "display_workspace",
            Self::AddMonitor(_) => "add_monitor",
            Self::RemoveMonitor { .. } => "remove_monitor",
            Self::RefreshMonitors(_) => "refresh_monitors",
            Self::ReloadConfig(_) => "reload_config",
            Self::Redraw => "redraw",
            Self::Exit => "exit",
        }
    }
}

/// One-line description recorded in the command history.
impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FocusDirection { direction, .. } => write!(f, "focus {direction:?}"),
            Self::FocusWorkspace(target) => write!(f, "focus workspace {target:?}"),
            Self::FocusMonitor(direction) => write!(f, "focus monitor {direction:?}"),
            Self::MoveDirection { direction, .. } => write!(f, "move {direction:?}"),
            Self::MoveToWorkspace { workspace, .. } => write!(f, "move to workspace {workspace}"),
            Self::Resize { dimension, grow, amount, .. } => {
                let verb = if *grow { "grow" } else { "shrink" };
                match amount {
                    Some(amount) => write!(f, "resize {verb} {dimension:?} {amount}"),
                    None => write!(f, "resize {verb} {dimension:?}"),
                }
            }
            Self::SetLayout { layout, .. } => write!(f, "layout {}", layout.as_str()),
            Self::SetWindowState { target, .. } => write!(f, "set {}", target.as_str()),
            Self::ToggleWindowState { target, .. } => write!(f, "toggle {}", target.as_str()),
            Self::SyncMinimized { window, minimized } => {
                write!(f, "sync minimized={minimized} {window:?}")
            }
            Self::ManageWindow { handle, action, .. } => write!(f, "manage {handle} as {action:?}"),
            Self::AddMonitor(info) => write!(f, "add monitor {}", info.device_name),
            Self::RemoveMonitor { device_name } => write!(f, "remove monitor {device_name}"),
            Self::RefreshMonitors(infos) => write!(f, "refresh monitors ({})", infos.len()),
            Self::ActivateWorkspace { name, .. } => write!(f, "activate workspace {name:?}"),
            Self::SetFocusedDescendant(id)
            | Self::UnmanageWindow(id)
            | Self::DeactivateWorkspace(id)
            | Self::DisplayWorkspace(id)
            | Self::UpdateFloatingPlacement { window: id, .. } => write!(f, "{} {id:?}", self.name()),
            Self::ToggleLayout { .. }
            | Self::Close { .. }
            | Self::ReloadConfig(_)
            | Self::Redraw
            | Self::Exit => f.write_str(self.name()),
        }
    }
}
