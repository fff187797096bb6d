//! Tiling window manager core.
//!
//! - [`state`]: the container arena and the mutable window manager state
//! - [`layout`]: gaps, geometry and proportional sizing
//! - [`services`]: read-only queries over the tree
//! - [`handlers`]: one handler per command
//! - [`bus`]: commands, events and the single lock they run under
//! - [`reconciler`]: OS notifications turned into commands
//! - [`fatal`]: the fatal-error path

pub mod bus;
pub mod fatal;
pub mod handlers;
pub mod layout;
pub mod reconciler;
pub mod services;
pub mod state;

pub use bus::{Bus, Command, CommandResponse, Event, EventKind};
pub use fatal::{ContinueOnFatal, ExitOnFatal, FatalDecision, FatalPrompt, FatalReport};
pub use state::{ContainerId, ContainerTree, WmState};
