//! Redraw flush and native focus sync, run by the bus after every handler.

use std::collections::HashSet;

use crate::error::WmResult;
use crate::ipc::dto;
use crate::platform::{PlacementFlags, WindowPlacement};
use crate::tiling::bus::Event;
use crate::tiling::layout::{Gaps, window_rects};
use crate::tiling::services::is_displayed;
use crate::tiling::state::{WindowState, WmState};

/// Turns the pending redraw set into one batched placement call.
///
/// Windows on displayed workspaces are shown, windows on hidden workspaces
/// are hidden, minimized windows are skipped. Every visibility flip the
/// manager issues is counted so the reconciler can drop its OS echo.
///
/// # Errors
///
/// Returns the window system's error if the batch is rejected.
pub fn flush(state: &mut WmState) -> WmResult<()> {
    let pending = state.take_pending_redraw();
    if pending.is_empty() {
        return Ok(());
    }

    let gaps = Gaps::from_config(state.config());
    let mut seen = HashSet::new();
    let mut placements = Vec::new();

    for id in pending {
        if !state.tree.is_attached(id) {
            continue;
        }
        for (window_id, rect) in window_rects(&state.tree, &gaps, id) {
            if !seen.insert(window_id) {
                continue;
            }
            let displayed = is_displayed(&state.tree, window_id);
            let Some(window) = state.tree.get_mut(window_id).and_then(|c| c.as_window_mut()) else {
                continue;
            };
            if matches!(window.state, WindowState::Minimized { .. }) {
                continue;
            }

            let visibility = if displayed { PlacementFlags::SHOW } else { PlacementFlags::HIDE };
            if window.hidden_by_manager == displayed {
                window.hidden_by_manager = !displayed;
                window.pending_visibility_changes += 1;
            }
            placements.push(WindowPlacement::from_rect(
                window.handle,
                &rect,
                visibility | PlacementFlags::NO_ACTIVATE,
            ));
        }
    }

    if placements.is_empty() {
        return Ok(());
    }
    tracing::trace!(count = placements.len(), "applying placements");
    state.system().apply_placements(&placements)
}

/// Publishes focus changes and, when requested, moves native focus to the
/// focused container.
///
/// # Errors
///
/// Returns the window system's error if native focus cannot be set.
pub fn sync_focus(state: &mut WmState) -> WmResult<()> {
    let focused = state.focused_container();
    let uuid = focused.and_then(|id| state.tree.get(id)).map(|c| c.id);

    if state.take_focus_sync() {
        let handle = focused
            .and_then(|id| state.tree.get(id)?.as_window())
            .filter(|window| !matches!(window.state, WindowState::Minimized { .. }))
            .map(|window| window.handle);
        state.system().set_foreground(handle)?;
    }

    if uuid != state.last_synced_focus {
        state.last_synced_focus = uuid;
        if let Some(focused_container) = focused.and_then(|id| dto::snapshot(state, id)) {
            tracing::debug!(container = %focused_container.id, "focus changed");
            state.queue_event(Event::FocusChanged { focused_container });
        }
    }
    Ok(())
}
