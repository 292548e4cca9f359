use crate::core::resolver::runner::MetricTask;
use crate::core::resolver::snapshot::Uptime;
use crate::error::Result;
use crate::platform::linux;

/// Uptime decomposed into hours, minutes and seconds
pub struct UptimeTask {
    source: fn() -> Result<f64>,
}

impl Default for UptimeTask {
    fn default() -> Self {
        Self::new()
    }
}

impl UptimeTask {
    pub fn new() -> Self {
        Self {
            source: linux::read_uptime_secs,
        }
    }

    /// Task reading raw seconds from `source` instead of the OS
    pub fn with_source(source: fn() -> Result<f64>) -> Self {
        Self { source }
    }
}

impl MetricTask for UptimeTask {
    type Output = Uptime;

    fn name(&self) -> &'static str {
        "uptime"
    }

    fn resolve(&mut self) -> Result<Uptime> {
        let raw = (self.source)()?;
        Ok(Uptime::from_secs(raw))
    }
}
