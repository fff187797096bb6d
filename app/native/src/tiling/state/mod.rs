//! State of the tiling window manager.
//!
//! - [`types`]: geometry, axes, directions, handles
//! - [`container`]: node payloads
//! - [`tree`]: the arena that owns every node
//! - [`wm_state`]: the tree plus collaborators and per-command bookkeeping

pub mod container;
pub mod tree;
pub mod types;
pub mod wm_state;

pub use container::{
    Container, ContainerId, ContainerKind, MonitorData, RestoreState, SplitData, TransientState,
    WindowData, WindowState, WorkspaceData,
};
pub use tree::{ContainerTree, PERCENTAGE_TOLERANCE};
pub use types::{Direction, Layout, Rect, ResizeDimension, WindowHandle};
pub use wm_state::WmState;
