//! Trellis - the core of a tiling window manager.
//!
//! The crate keeps a tree of monitors, workspaces, splits and windows, lays
//! it out, and keeps native window placement in sync with it. Everything
//! runs through one [`tiling::Bus`]: user commands and OS notifications go
//! in, placement calls go out through a [`platform::WindowSystem`], and
//! snapshots of what changed go to subscribers.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use trellis_lib::config;
//! use trellis_lib::platform::{HeadlessWindowSystem, MonitorInfo};
//! use trellis_lib::tiling::state::Rect;
//! use trellis_lib::tiling::{Bus, Command, ExitOnFatal};
//!
//! let config = config::load_or_default(None);
//! let bus = Bus::with_system(
//!     Arc::new(config),
//!     Arc::new(HeadlessWindowSystem::new()),
//!     ExitOnFatal,
//! );
//! let monitor = MonitorInfo::new("DISPLAY1", Rect::new(0.0, 0.0, 1920.0, 1080.0));
//! bus.invoke(Command::AddMonitor(monitor)).ok();
//! ```

pub mod config;
pub mod error;
pub mod ipc;
pub mod logging;
pub mod platform;
pub mod tiling;

pub use error::{WmError, WmResult};
