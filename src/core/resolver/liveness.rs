use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// Process-wide liveness flag coordinating graceful shutdown.
///
/// Starts alive and goes down exactly once. Loops sleep on it between
/// cycles so a shutdown wakes them immediately instead of after a full
/// cadence period.
#[derive(Debug)]
pub struct LivenessFlag {
    alive: AtomicBool,
    lock: Mutex<()>,
    wake: Condvar,
}

impl Default for LivenessFlag {
    fn default() -> Self {
        Self::new()
    }
}

impl LivenessFlag {
    pub fn new() -> Self {
        Self {
            alive: AtomicBool::new(true),
            lock: Mutex::new(()),
            wake: Condvar::new(),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Flip the flag down. Returns true only for the call that flipped it.
    pub fn shutdown(&self) -> bool {
        let flipped = self.alive.swap(false, Ordering::SeqCst);
        if flipped {
            let _guard = self.lock.lock();
            self.wake.notify_all();
        }
        flipped
    }

    /// Sleep for `duration` or until shutdown, whichever comes first.
    /// Returns whether the flag is still alive afterwards.
    pub fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        let mut guard = self.lock.lock();

        while self.is_alive() {
            if self.wake.wait_until(&mut guard, deadline).timed_out() {
                break;
            }
        }

        self.is_alive()
    }
}
