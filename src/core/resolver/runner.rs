//! Fault isolation for metric tasks.
//!
//! A [`MetricTask`] performs one blocking read of an OS or hardware sensor.
//! [`TaskRunner`] invokes it and turns every failure (an error or a panic)
//! into an absent result plus a single log entry, so a broken sensor never
//! aborts the rest of a collection cycle.

use std::panic::{self, AssertUnwindSafe};

use crate::error::Result;

/// A single source of metrics.
pub trait MetricTask: Send {
    /// Structured value produced by a successful read
    type Output;

    /// Short name used in log scopes (e.g. "gpu", "thermals")
    fn name(&self) -> &'static str;

    /// Read the sensor once
    fn resolve(&mut self) -> Result<Self::Output>;
}

impl<T: MetricTask + ?Sized> MetricTask for Box<T> {
    type Output = T::Output;

    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn resolve(&mut self) -> Result<Self::Output> {
        (**self).resolve()
    }
}

/// Runs metric tasks, containing their failures.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskRunner;

impl TaskRunner {
    pub fn new() -> Self {
        Self
    }

    /// Run a task once, returning `None` if it failed.
    pub fn run<T: MetricTask + ?Sized>(&self, task: &mut T) -> Option<T::Output> {
        let name = task.name();

        match panic::catch_unwind(AssertUnwindSafe(|| task.resolve())) {
            Ok(Ok(output)) => {
                log::trace!(target: "resolver::task", "{} resolved", name);
                Some(output)
            }
            Ok(Err(e)) => {
                if e.is_unavailable() {
                    log::error!(target: "resolver::task", "{} unavailable: {}", name, e);
                } else {
                    log::error!(target: "resolver::task", "{} failed: {:?}", name, e);
                }
                None
            }
            Err(payload) => {
                let reason = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                log::error!(target: "resolver::task", "{} panicked: {}", name, reason);
                None
            }
        }
    }
}
