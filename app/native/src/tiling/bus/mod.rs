//! Command/event bus.
//!
//! The bus is the single synchronization point of the window manager. State
//! lives behind one reentrant lock; every command and every event handler
//! runs under it, followed by a redraw flush, a native focus sync and, in
//! debug builds, an invariant check. Follow-up events queued by handlers are
//! then delivered: first to the in-process handler table, then to external
//! subscribers over a broadcast channel.
//!
//! ```text
//!   invoke(cmd) ──► dispatch ──► flush ──► sync focus ──► check
//!                                                          │
//!   emit(event) ──► reconciler handlers ◄── outbox ◄───────┘
//!                          │
//!                          └──► broadcast ──► subscribers
//! ```

pub mod commands;
pub mod events;
pub mod response;

use std::cell::RefCell;
use std::collections::VecDeque;
use std::sync::Arc;

pub use commands::{Command, WindowStateTarget, WorkspaceTarget};
pub use events::{Event, EventKind};
use parking_lot::{ReentrantMutex, ReentrantMutexGuard};
pub use response::CommandResponse;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::config::WmConfig;
use crate::error::{WmError, WmResult};
use crate::platform::WindowSystem;
use crate::tiling::fatal::{self, FatalPrompt};
use crate::tiling::handlers::{self, redraw};
use crate::tiling::reconciler;
use crate::tiling::state::WmState;

/// Capacity of the external event channel. Slow subscribers lag past it.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

type StateGuard<'a> = ReentrantMutexGuard<'a, RefCell<WmState>>;

struct Inner {
    state: ReentrantMutex<RefCell<WmState>>,
    events: broadcast::Sender<Event>,
    prompt: Box<dyn FatalPrompt>,
}

/// Handle to the window manager. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct Bus {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for Bus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bus")
            .field("subscribers", &self.inner.events.receiver_count())
            .finish_non_exhaustive()
    }
}

impl Bus {
    /// Creates a bus owning `state`.
    #[must_use]
    pub fn new(state: WmState, prompt: impl FatalPrompt + 'static) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                state: ReentrantMutex::new(RefCell::new(state)),
                events,
                prompt: Box::new(prompt),
            }),
        }
    }

    /// Creates a bus over an empty tree.
    #[must_use]
    pub fn with_system(
        config: Arc<WmConfig>,
        system: Arc<dyn WindowSystem>,
        prompt: impl FatalPrompt + 'static,
    ) -> Self {
        Self::new(WmState::new(config, system), prompt)
    }

    /// Subscribes to every event the bus delivers from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Event> { self.inner.events.subscribe() }

    /// Runs a command to completion on the calling thread.
    ///
    /// Recoverable failures come back as an unsuccessful response.
    ///
    /// # Errors
    ///
    /// Returns the error after it went through the fatal-error path.
    pub fn invoke(&self, command: Command) -> WmResult<CommandResponse> {
        let guard = self.inner.state.lock();
        let name = command.name();

        let outcome = {
            let mut state = guard.borrow_mut();
            if state.exit_code().is_some() {
                return Ok(CommandResponse::failure(WmError::unsupported(
                    "window manager is exiting",
                )));
            }
            state.record_command(command.to_string());
            tracing::debug!(command = name, "invoking command");
            let result = handlers::dispatch(&mut state, command);
            settle(&mut state, result)
        };

        match outcome {
            Ok(()) => {
                self.deliver(&guard, VecDeque::new())?;
                Ok(CommandResponse::success(focused_uuid(&guard.borrow())))
            }
            Err(error) if error.is_recoverable() => {
                tracing::warn!(command = name, %error, "command failed");
                self.deliver(&guard, VecDeque::new())?;
                Ok(CommandResponse::failure(error))
            }
            Err(error) => {
                self.fatal(&guard, &error);
                Err(error)
            }
        }
    }

    /// Runs a command on the blocking pool. Only mutual exclusion with other
    /// callers is guaranteed, not ordering.
    pub fn invoke_async(&self, command: Command) -> JoinHandle<WmResult<CommandResponse>> {
        let bus = self.clone();
        tokio::task::spawn_blocking(move || bus.invoke(command))
    }

    /// Delivers an event: in-process handlers first, in registration order,
    /// then external subscribers.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error a handler raised, after it went through
    /// the fatal-error path. Recoverable handler errors are logged only.
    pub fn emit(&self, event: Event) -> WmResult<()> {
        let guard = self.inner.state.lock();
        self.deliver(&guard, VecDeque::from([event]))
    }

    /// [`Bus::emit`] on the blocking pool.
    pub fn emit_async(&self, event: Event) -> JoinHandle<WmResult<()>> {
        let bus = self.clone();
        tokio::task::spawn_blocking(move || bus.emit(event))
    }

    /// Runs a read-only closure against the state under the lock.
    ///
    /// Must not be called from inside a command or event handler.
    pub fn with_state<R>(&self, f: impl FnOnce(&WmState) -> R) -> R {
        let guard = self.inner.state.lock();
        let state = guard.borrow();
        f(&state)
    }

    /// Exit code requested by `exit` or by the fatal-error path.
    #[must_use]
    pub fn exit_code(&self) -> Option<i32> { self.with_state(WmState::exit_code) }

    // ========================================================================
    // Delivery
    // ========================================================================

    fn deliver(&self, guard: &StateGuard<'_>, mut queue: VecDeque<Event>) -> WmResult<()> {
        queue.extend(guard.borrow_mut().drain_events());
        let mut first_fatal = None;

        while let Some(event) = queue.pop_front() {
            let kind = event.kind();
            for handler in reconciler::handlers_for(kind) {
                let outcome = {
                    let mut state = guard.borrow_mut();
                    let result = handler(&mut state, &event);
                    settle(&mut state, result)
                };

                match outcome {
                    Ok(()) => {}
                    Err(error) if error.is_recoverable() => {
                        tracing::debug!(event = kind.name(), %error, "event handler failed");
                    }
                    Err(error) => {
                        self.fatal(guard, &error);
                        first_fatal.get_or_insert(error);
                    }
                }
            }

            queue.extend(guard.borrow_mut().drain_events());
            // no receivers is not an error
            let _ = self.inner.events.send(event);
        }

        first_fatal.map_or(Ok(()), Err)
    }

    fn fatal(&self, guard: &StateGuard<'_>, error: &WmError) {
        let report = fatal::report_fatal_error(&guard.borrow(), error);
        // the prompt may read the state back through the bus
        let decision = self.inner.prompt.decide(&report);
        fatal::apply_fatal_decision(&mut guard.borrow_mut(), decision);

        let exiting: Vec<Event> = guard.borrow_mut().drain_events();
        for event in exiting {
            let _ = self.inner.events.send(event);
        }
    }
}

/// Flushes redraws, syncs focus and checks invariants after a handler ran,
/// keeping the handler's own error unless settling raised a fatal one.
fn settle(state: &mut WmState, result: WmResult<()>) -> WmResult<()> {
    let settled = redraw::flush(state).and_then(|()| redraw::sync_focus(state)).and_then(|()| {
        if cfg!(debug_assertions) { state.tree.check_invariants() } else { Ok(()) }
    });

    match (result, settled) {
        (_, Err(error)) if !error.is_recoverable() => Err(error),
        (Err(error), _) => Err(error),
        (Ok(()), settled) => settled,
    }
}

fn focused_uuid(state: &WmState) -> Option<Uuid> {
    state.focused_container().and_then(|id| state.tree.get(id)).map(|container| container.id)
}
