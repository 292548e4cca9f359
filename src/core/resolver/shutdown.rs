//! SIGINT/SIGTERM handling.
//!
//! The handler only flips the [`LivenessFlag`] and marks the listeners
//! down. Joining the loop threads is left to the main thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::Mutex;

use crate::core::listeners::InputListener;
use crate::error::Result;

use super::liveness::LivenessFlag;

/// Coordinator the process signal handler forwards to
static ACTIVE: Lazy<Mutex<Option<Arc<ShutdownCoordinator>>>> = Lazy::new(|| Mutex::new(None));
static HANDLER_INSTALLED: AtomicBool = AtomicBool::new(false);

pub struct ShutdownCoordinator {
    liveness: Arc<LivenessFlag>,
    listeners: Vec<Arc<InputListener>>,
}

impl ShutdownCoordinator {
    pub fn new(liveness: Arc<LivenessFlag>, listeners: Vec<Arc<InputListener>>) -> Self {
        Self {
            liveness,
            listeners,
        }
    }

    pub fn liveness(&self) -> &Arc<LivenessFlag> {
        &self.liveness
    }

    /// Begin shutdown. Only the first call has an effect; returns whether
    /// this call was it.
    pub fn request(&self) -> bool {
        if !self.liveness.shutdown() {
            return false;
        }

        for listener in &self.listeners {
            listener.stop();
        }
        true
    }

    /// Route SIGINT and SIGTERM to this coordinator. Installing again
    /// (e.g. a second daemon in the same process) redirects the handler.
    pub fn install(self: &Arc<Self>) -> Result<()> {
        *ACTIVE.lock() = Some(Arc::clone(self));

        if HANDLER_INSTALLED
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Ok(());
        }

        let installed = ctrlc::set_handler(|| {
            let active = ACTIVE.lock().clone();
            if let Some(coordinator) = active {
                if coordinator.request() {
                    log::info!(target: "resolver::shutdown", "termination signal received");
                }
            }
        });

        if let Err(e) = installed {
            HANDLER_INSTALLED.store(false, Ordering::SeqCst);
            return Err(e.into());
        }

        Ok(())
    }
}
