//! Window system abstraction.
//!
//! The core never talks to the OS directly. Everything it needs from the
//! window system goes through [`WindowSystem`]:
//!
//! - batched window placement (one call per redraw flush)
//! - foreground focus, close, minimize and restore
//! - window metadata used by the should-manage filter and window rules
//!
//! [`headless::HeadlessWindowSystem`] is an in-memory implementation that
//! records every call, used by tests and dry runs.

pub mod headless;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::error::WmResult;
use crate::tiling::state::{Rect, WindowHandle};

pub use headless::{HeadlessWindowSystem, SystemCall};

bitflags! {
    /// Flags attached to a placement call.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PlacementFlags: u32 {
        /// Make the window visible.
        const SHOW = 1;
        /// Hide the window (OS visibility only, the window stays managed).
        const HIDE = 1 << 1;
        /// Do not activate the window when placing it.
        const NO_ACTIVATE = 1 << 2;
    }
}

/// One window's placement within a batched redraw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowPlacement {
    pub handle: WindowHandle,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub flags: PlacementFlags,
}

impl WindowPlacement {
    /// Creates a placement from a layout rectangle, rounding to whole pixels.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_rect(handle: WindowHandle, rect: &Rect, flags: PlacementFlags) -> Self {
        Self {
            handle,
            x: rect.x.round() as i32,
            y: rect.y.round() as i32,
            width: rect.width.round() as i32,
            height: rect.height.round() as i32,
            flags,
        }
    }

    /// Returns the placement as a layout rectangle.
    #[must_use]
    pub fn rect(&self) -> Rect {
        Rect::new(
            f64::from(self.x),
            f64::from(self.y),
            f64::from(self.width),
            f64::from(self.height),
        )
    }
}

/// Metadata the OS reports for a native window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NativeWindowInfo {
    pub title: String,
    pub process_name: String,
    pub class_name: String,
    pub rect: Rect,
    pub is_visible: bool,
    pub is_minimized: bool,
    /// Tool windows (palettes, tooltips) are never managed.
    pub is_tool_window: bool,
    /// Owned windows (dialogs) are never managed.
    pub has_owner: bool,
}

/// A physical display as reported by the OS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorInfo {
    pub device_name: String,
    pub rect: Rect,
}

impl MonitorInfo {
    #[must_use]
    pub fn new(device_name: impl Into<String>, rect: Rect) -> Self {
        Self { device_name: device_name.into(), rect }
    }
}

/// Operations the core issues against the native window system.
pub trait WindowSystem: Send + Sync {
    /// Applies a batch of placements atomically from the user's perspective.
    ///
    /// # Errors
    ///
    /// Returns `WmError::Platform` if the OS rejects the batch.
    fn apply_placements(&self, placements: &[WindowPlacement]) -> WmResult<()>;

    /// Gives keyboard focus to a window, or to the desktop for `None`.
    ///
    /// # Errors
    ///
    /// Returns `WmError::Platform` on OS failure.
    fn set_foreground(&self, handle: Option<WindowHandle>) -> WmResult<()>;

    /// Asks a window to close. The OS reports the destruction later.
    ///
    /// # Errors
    ///
    /// Returns `WmError::Platform` on OS failure.
    fn close_window(&self, handle: WindowHandle) -> WmResult<()>;

    /// Minimizes a window.
    ///
    /// # Errors
    ///
    /// Returns `WmError::Platform` on OS failure.
    fn minimize_window(&self, handle: WindowHandle) -> WmResult<()>;

    /// Restores a minimized or hidden window to a normal, visible state.
    ///
    /// # Errors
    ///
    /// Returns `WmError::Platform` on OS failure.
    fn restore_window(&self, handle: WindowHandle) -> WmResult<()>;

    /// Queries window metadata. `None` if the window no longer exists.
    fn window_info(&self, handle: WindowHandle) -> Option<NativeWindowInfo>;

    /// Releases OS hooks during teardown.
    fn shutdown(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placement_rounds_to_pixels() {
        let placement = WindowPlacement::from_rect(
            WindowHandle(1),
            &Rect::new(10.4, 10.6, 99.5, 50.2),
            PlacementFlags::SHOW | PlacementFlags::NO_ACTIVATE,
        );
        assert_eq!((placement.x, placement.y, placement.width, placement.height), (10, 11, 100, 50));
        assert!(placement.flags.contains(PlacementFlags::SHOW));
        assert!(!placement.flags.contains(PlacementFlags::HIDE));
    }
}
