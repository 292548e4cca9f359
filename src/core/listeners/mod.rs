//! Keyboard and mouse activity listeners.
//!
//! Each [`InputListener`] drains an [`InputSource`] on its own thread and
//! folds the events into the shared [`ListenerCounters`]. The monitor loop
//! only reads the counters.

mod counters;

pub use counters::{KeyboardCounts, ListenerCounters, ListenerSnapshot, MouseCounts};

use std::fmt;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::Mutex;

use crate::core::resolver::liveness::LivenessFlag;
use crate::error::{ResolverError, Result};

/// How long a source may block waiting for events before the listener
/// re-checks whether it should keep running
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    Keyboard,
    Mouse,
}

impl fmt::Display for ListenerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListenerKind::Keyboard => write!(f, "keyboard"),
            ListenerKind::Mouse => write!(f, "mouse"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Input events relevant to the counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    KeyPress,
    KeyRelease,
    ButtonPress(MouseButton),
    ButtonRelease(MouseButton),
    Scroll { dx: i64, dy: i64 },
    Move,
}

/// OS-level source of input events
pub trait InputSource: Send {
    /// Wait up to `timeout` for events; an empty batch is not an error
    fn poll(&mut self, timeout: Duration) -> Result<Vec<InputEvent>>;
}

enum ListenerState {
    Idle(Box<dyn InputSource>),
    Running(JoinHandle<Box<dyn InputSource>>),
    Broken,
}

/// Background subscription counting events of one kind
pub struct InputListener {
    kind: ListenerKind,
    counters: Arc<ListenerCounters>,
    liveness: Arc<LivenessFlag>,
    state: Mutex<ListenerState>,
}

impl InputListener {
    pub fn new(
        kind: ListenerKind,
        source: Box<dyn InputSource>,
        counters: Arc<ListenerCounters>,
        liveness: Arc<LivenessFlag>,
    ) -> Self {
        Self {
            kind,
            counters,
            liveness,
            state: Mutex::new(ListenerState::Idle(source)),
        }
    }

    pub fn kind(&self) -> ListenerKind {
        self.kind
    }

    pub fn is_up(&self) -> bool {
        self.counters.is_up(self.kind)
    }

    /// Register the hook and mark the listener up
    pub fn start(&self) -> Result<()> {
        let mut state = self.state.lock();

        let source = match std::mem::replace(&mut *state, ListenerState::Broken) {
            ListenerState::Idle(source) => source,
            ListenerState::Running(handle) if self.is_up() => {
                *state = ListenerState::Running(handle);
                return Ok(());
            }
            ListenerState::Running(handle) => handle.join().map_err(|_| {
                ResolverError::metric_collection(format!("{} listener thread panicked", self.kind))
            })?,
            ListenerState::Broken => {
                return Err(ResolverError::metric_collection(format!(
                    "{} listener cannot be restarted",
                    self.kind
                )))
            }
        };

        self.counters.set_up(self.kind, true);

        let kind = self.kind;
        let counters = self.counters.clone();
        let liveness = self.liveness.clone();
        let handle = thread::Builder::new()
            .name(format!("listener-{}", kind))
            .spawn(move || listen(kind, source, counters, liveness));

        match handle {
            Ok(handle) => {
                *state = ListenerState::Running(handle);
                log::info!(target: "resolver::listener", "{} listener started", kind);
                Ok(())
            }
            Err(e) => {
                self.counters.set_up(self.kind, false);
                Err(e.into())
            }
        }
    }

    /// Mark the listener down. Never blocks; the hook thread notices on its
    /// next poll and exits.
    pub fn stop(&self) {
        self.counters.set_up(self.kind, false);
    }

    /// Wait for the hook thread after a stop or shutdown
    pub fn join(&self) {
        let mut state = self.state.lock();

        match std::mem::replace(&mut *state, ListenerState::Broken) {
            ListenerState::Running(handle) => match handle.join() {
                Ok(source) => *state = ListenerState::Idle(source),
                Err(_) => {
                    log::error!(target: "resolver::listener", "{} listener thread panicked", self.kind)
                }
            },
            other => *state = other,
        }
    }
}

fn listen(
    kind: ListenerKind,
    mut source: Box<dyn InputSource>,
    counters: Arc<ListenerCounters>,
    liveness: Arc<LivenessFlag>,
) -> Box<dyn InputSource> {
    while counters.is_up(kind) && liveness.is_alive() {
        match source.poll(POLL_INTERVAL) {
            Ok(events) => {
                for event in &events {
                    counters.record(event);
                }
            }
            Err(e) => {
                log::error!(target: "resolver::listener", "{} listener failed: {}", kind, e);
                break;
            }
        }
    }

    counters.set_up(kind, false);
    log::debug!(target: "resolver::listener", "{} listener stopped", kind);
    source
}
