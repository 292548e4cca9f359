use sysinfo::{CpuRefreshKind, RefreshKind, System};

use crate::core::resolver::runner::MetricTask;
use crate::core::resolver::snapshot::CpuLoad;
use crate::error::{ResolverError, Result};
use crate::utils::units::decimal;

/// CPU utilization and current clock.
///
/// Usage is measured between two refreshes, so the task keeps its
/// `System` across cycles. Creating the task waits out sysinfo's minimum
/// update interval once so the first cycle already has a valid baseline.
pub struct CpuLoadTask {
    system: System,
}

impl Default for CpuLoadTask {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuLoadTask {
    pub fn new() -> Self {
        let refresh = RefreshKind::nothing().with_cpu(CpuRefreshKind::everything());
        let system = System::new_with_specifics(refresh);
        std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
        Self { system }
    }
}

impl MetricTask for CpuLoadTask {
    type Output = CpuLoad;

    fn name(&self) -> &'static str {
        "cpu"
    }

    fn resolve(&mut self) -> Result<CpuLoad> {
        self.system.refresh_cpu_specifics(CpuRefreshKind::everything());

        let clock = self
            .system
            .cpus()
            .first()
            .map(|cpu| cpu.frequency())
            .ok_or_else(|| ResolverError::metric_collection("no CPUs reported"))?;

        let util = f64::from(self.system.global_cpu_usage()).clamp(0.0, 100.0);

        Ok(CpuLoad {
            util: decimal(util, 1),
            clock,
        })
    }
}
