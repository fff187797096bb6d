//! The window manager's mutable state.
//!
//! [`WmState`] is the context every handler receives. It bundles the container
//! tree with the collaborators handlers need (configuration snapshot, window
//! system) and the per-command bookkeeping the bus drains afterwards: the
//! pending redraw set, the focus sync flag and the event outbox.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use super::container::ContainerId;
use super::tree::ContainerTree;
use super::types::WindowHandle;
use crate::config::WmConfig;
use crate::platform::WindowSystem;
use crate::tiling::bus::Event;

/// Shared mutable state, owned by the bus.
pub struct WmState {
    pub tree: ContainerTree,
    config: Arc<WmConfig>,
    system: Arc<dyn WindowSystem>,
    pending_redraw: Vec<ContainerId>,
    pending_focus_sync: bool,
    outbox: VecDeque<Event>,
    history: VecDeque<String>,
    /// Handles rejected by the should-manage filter.
    pub(crate) ignored_handles: HashSet<WindowHandle>,
    /// Name of the workspace focused before the current one.
    pub(crate) recent_workspace: Option<String>,
    /// Container focus was last synced to, by stable id.
    pub(crate) last_synced_focus: Option<uuid::Uuid>,
    exit_code: Option<i32>,
}

impl std::fmt::Debug for WmState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WmState")
            .field("containers", &self.tree.len())
            .field("pending_redraw", &self.pending_redraw.len())
            .field("outbox", &self.outbox.len())
            .finish_non_exhaustive()
    }
}

impl WmState {
    /// Creates an empty state (root only).
    #[must_use]
    pub fn new(config: Arc<WmConfig>, system: Arc<dyn WindowSystem>) -> Self {
        Self {
            tree: ContainerTree::new(),
            config,
            system,
            pending_redraw: Vec::new(),
            pending_focus_sync: false,
            outbox: VecDeque::new(),
            history: VecDeque::new(),
            ignored_handles: HashSet::new(),
            recent_workspace: None,
            last_synced_focus: None,
            exit_code: None,
        }
    }

    #[must_use]
    pub fn config(&self) -> &WmConfig { &self.config }

    #[must_use]
    pub fn config_arc(&self) -> Arc<WmConfig> { Arc::clone(&self.config) }

    pub(crate) fn set_config(&mut self, config: Arc<WmConfig>) { self.config = config; }

    #[must_use]
    pub fn system(&self) -> &dyn WindowSystem { self.system.as_ref() }

    /// The container that currently holds focus.
    #[must_use]
    pub fn focused_container(&self) -> Option<ContainerId> {
        self.tree.last_focused_descendant(self.tree.root())
    }

    // ========================================================================
    // Redraw bookkeeping
    // ========================================================================

    /// Queues a container for the next redraw flush.
    pub fn mark_dirty(&mut self, id: ContainerId) {
        if !self.pending_redraw.contains(&id) {
            self.pending_redraw.push(id);
        }
    }

    /// Returns `true` if the container is queued for redraw.
    #[must_use]
    pub fn is_dirty(&self, id: ContainerId) -> bool { self.pending_redraw.contains(&id) }

    #[must_use]
    pub fn pending_redraw(&self) -> &[ContainerId] { &self.pending_redraw }

    pub(crate) fn take_pending_redraw(&mut self) -> Vec<ContainerId> {
        std::mem::take(&mut self.pending_redraw)
    }

    /// Requests that native focus be synced to the focused container.
    pub fn request_focus_sync(&mut self) { self.pending_focus_sync = true; }

    pub(crate) fn take_focus_sync(&mut self) -> bool { std::mem::take(&mut self.pending_focus_sync) }

    // ========================================================================
    // Events and history
    // ========================================================================

    /// Queues a follow-up event, delivered once the current command finishes.
    pub fn queue_event(&mut self, event: Event) { self.outbox.push_back(event); }

    #[must_use]
    pub fn queued_events(&self) -> impl Iterator<Item = &Event> { self.outbox.iter() }

    pub(crate) fn drain_events(&mut self) -> Vec<Event> { self.outbox.drain(..).collect() }

    /// Records a command description, keeping the configured number.
    pub(crate) fn record_command(&mut self, description: String) {
        let limit = self.config.general.command_history_size.max(1);
        self.history.push_front(description);
        self.history.truncate(limit);
    }

    /// Recent commands, most recent first.
    #[must_use]
    pub fn command_history(&self) -> Vec<String> { self.history.iter().cloned().collect() }

    #[must_use]
    pub const fn exit_code(&self) -> Option<i32> { self.exit_code }

    pub(crate) const fn set_exit_code(&mut self, code: i32) { self.exit_code = Some(code); }
}
