//! In-memory window system.
//!
//! Keeps a table of fake native windows and records every call the core
//! makes, so behaviour can be asserted without an OS.

use std::collections::HashMap;

use parking_lot::Mutex;

use super::{NativeWindowInfo, PlacementFlags, WindowPlacement, WindowSystem};
use crate::error::{WmError, WmResult};
use crate::tiling::state::{Rect, WindowHandle};

/// A call recorded by [`HeadlessWindowSystem`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemCall {
    ApplyPlacements(Vec<WindowPlacement>),
    SetForeground(Option<WindowHandle>),
    Close(WindowHandle),
    Minimize(WindowHandle),
    Restore(WindowHandle),
    Shutdown,
}

#[derive(Debug, Default)]
struct Inner {
    windows: HashMap<WindowHandle, NativeWindowInfo>,
    calls: Vec<SystemCall>,
    fail_placements: bool,
}

/// Window system backed by an in-memory table.
#[derive(Debug, Default)]
pub struct HeadlessWindowSystem {
    inner: Mutex<Inner>,
}

impl HeadlessWindowSystem {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Registers a visible, manageable window.
    pub fn add_window(&self, handle: WindowHandle, process_name: &str, rect: Rect) {
        self.add_window_info(handle, NativeWindowInfo {
            title: format!("{process_name} window"),
            process_name: process_name.to_string(),
            class_name: format!("{process_name}Class"),
            rect,
            is_visible: true,
            ..Default::default()
        });
    }

    /// Registers a window with explicit metadata.
    pub fn add_window_info(&self, handle: WindowHandle, info: NativeWindowInfo) {
        self.inner.lock().windows.insert(handle, info);
    }

    /// Forgets a window, as if it was destroyed.
    pub fn remove_window(&self, handle: WindowHandle) { self.inner.lock().windows.remove(&handle); }

    /// Updates a window's reported rectangle, as if the user dragged it.
    pub fn move_window(&self, handle: WindowHandle, rect: Rect) {
        if let Some(info) = self.inner.lock().windows.get_mut(&handle) {
            info.rect = rect;
        }
    }

    /// Makes subsequent placement batches fail.
    pub fn set_fail_placements(&self, fail: bool) { self.inner.lock().fail_placements = fail; }

    /// Returns a copy of the recorded calls.
    #[must_use]
    pub fn calls(&self) -> Vec<SystemCall> { self.inner.lock().calls.clone() }

    /// Returns and clears the recorded calls.
    pub fn take_calls(&self) -> Vec<SystemCall> { std::mem::take(&mut self.inner.lock().calls) }

    /// All placements recorded so far, flattened across batches.
    #[must_use]
    pub fn placements(&self) -> Vec<WindowPlacement> {
        self.inner
            .lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                SystemCall::ApplyPlacements(batch) => Some(batch.clone()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    /// The most recent placement recorded for a window.
    #[must_use]
    pub fn last_placement(&self, handle: WindowHandle) -> Option<WindowPlacement> {
        self.placements().into_iter().rev().find(|placement| placement.handle == handle)
    }

    /// The window most recently given focus.
    #[must_use]
    pub fn foreground(&self) -> Option<Option<WindowHandle>> {
        self.inner.lock().calls.iter().rev().find_map(|call| match call {
            SystemCall::SetForeground(handle) => Some(*handle),
            _ => None,
        })
    }
}

impl WindowSystem for HeadlessWindowSystem {
    fn apply_placements(&self, placements: &[WindowPlacement]) -> WmResult<()> {
        let mut inner = self.inner.lock();
        if inner.fail_placements {
            return Err(WmError::platform("placement batch rejected"));
        }

        for placement in placements {
            if let Some(info) = inner.windows.get_mut(&placement.handle) {
                info.rect = placement.rect();
                if placement.flags.contains(PlacementFlags::HIDE) {
                    info.is_visible = false;
                } else if placement.flags.contains(PlacementFlags::SHOW) {
                    info.is_visible = true;
                }
            }
        }
        inner.calls.push(SystemCall::ApplyPlacements(placements.to_vec()));
        Ok(())
    }

    fn set_foreground(&self, handle: Option<WindowHandle>) -> WmResult<()> {
        self.inner.lock().calls.push(SystemCall::SetForeground(handle));
        Ok(())
    }

    fn close_window(&self, handle: WindowHandle) -> WmResult<()> {
        self.inner.lock().calls.push(SystemCall::Close(handle));
        Ok(())
    }

    fn minimize_window(&self, handle: WindowHandle) -> WmResult<()> {
        let mut inner = self.inner.lock();
        if let Some(info) = inner.windows.get_mut(&handle) {
            info.is_minimized = true;
        }
        inner.calls.push(SystemCall::Minimize(handle));
        Ok(())
    }

    fn restore_window(&self, handle: WindowHandle) -> WmResult<()> {
        let mut inner = self.inner.lock();
        if let Some(info) = inner.windows.get_mut(&handle) {
            info.is_minimized = false;
            info.is_visible = true;
        }
        inner.calls.push(SystemCall::Restore(handle));
        Ok(())
    }

    fn window_info(&self, handle: WindowHandle) -> Option<NativeWindowInfo> {
        self.inner.lock().windows.get(&handle).cloned()
    }

    fn shutdown(&self) { self.inner.lock().calls.push(SystemCall::Shutdown); }
}
