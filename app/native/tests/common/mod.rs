//! Shared helpers for the integration tests.
//!
//! A [`Harness`] is a bus over a headless window system with one monitor,
//! `DISPLAY1` at (0, 0, 1000x500), displaying the first configured
//! workspace.

#![allow(dead_code)]

use std::sync::Arc;

use trellis_lib::config::{WmConfig, WorkspaceConfig};
use trellis_lib::ipc::{ContainerDto, dto};
use trellis_lib::platform::{HeadlessWindowSystem, MonitorInfo, WindowSystem};
use trellis_lib::tiling::state::{ContainerId, Rect, WindowHandle, WindowState};
use trellis_lib::tiling::{Bus, Command, ContinueOnFatal, Event, FatalPrompt};

pub const DISPLAY1: Rect = Rect::new(0.0, 0.0, 1000.0, 500.0);

/// Config with the given workspaces and defaults everywhere else.
pub fn config(names: &[&str]) -> WmConfig {
    let mut config = WmConfig {
        workspaces: names.iter().map(|name| WorkspaceConfig::named(*name)).collect(),
        ..Default::default()
    };
    config.prepare();
    config
}

pub struct Harness {
    pub bus: Bus,
    pub system: Arc<HeadlessWindowSystem>,
}

impl Harness {
    pub fn new(names: &[&str]) -> Self { Self::with_prompt(config(names), ContinueOnFatal) }

    pub fn with_prompt(config: WmConfig, prompt: impl FatalPrompt + 'static) -> Self {
        let system = Arc::new(HeadlessWindowSystem::new());
        let bus = Bus::with_system(
            Arc::new(config),
            Arc::clone(&system) as Arc<dyn WindowSystem>,
            prompt,
        );
        let harness = Self { bus, system };
        let response = harness
            .bus
            .invoke(Command::AddMonitor(MonitorInfo::new("DISPLAY1", DISPLAY1)))
            .unwrap();
        assert!(response.success);
        harness
    }

    /// Opens a native window and lets the reconciler manage it.
    pub fn open(&self, handle: u64) -> ContainerId {
        let handle = WindowHandle(handle);
        self.system.add_window(handle, "app", Rect::new(100.0, 100.0, 400.0, 300.0));
        self.bus.emit(Event::WindowShown { handle }).unwrap();
        self.find(handle).expect("window should be managed")
    }

    pub fn find(&self, handle: WindowHandle) -> Option<ContainerId> {
        self.bus.with_state(|state| state.tree.find_window(handle))
    }

    pub fn window_state(&self, id: ContainerId) -> WindowState {
        self.bus.with_state(|state| state.tree.get(id).unwrap().as_window().unwrap().state)
    }

    pub fn focused(&self) -> Option<ContainerId> { self.bus.with_state(|state| state.focused_container()) }

    pub fn root_snapshot(&self) -> ContainerDto {
        self.bus.with_state(|state| dto::snapshot(state, state.tree.root()).unwrap())
    }

    /// Invokes a command and asserts it succeeded.
    pub fn run(&self, command: Command) {
        let response = self.bus.invoke(command).unwrap();
        assert!(response.success, "command failed: {:?}", response.error);
    }
}
