use sysinfo::{MemoryRefreshKind, RefreshKind, System};

use crate::core::resolver::runner::MetricTask;
use crate::core::resolver::snapshot::MemoryLoad;
use crate::error::{ResolverError, Result};
use crate::utils::units::{decimal, mb_floor, percent};

/// RAM utilization with used/free in whole MiB
pub struct MemoryLoadTask {
    system: System,
}

impl Default for MemoryLoadTask {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryLoadTask {
    pub fn new() -> Self {
        let refresh = RefreshKind::nothing().with_memory(MemoryRefreshKind::everything());
        Self {
            system: System::new_with_specifics(refresh),
        }
    }
}

impl MetricTask for MemoryLoadTask {
    type Output = MemoryLoad;

    fn name(&self) -> &'static str {
        "memory"
    }

    fn resolve(&mut self) -> Result<MemoryLoad> {
        self.system.refresh_memory();

        memory_load(self.system.total_memory(), self.system.available_memory())
    }
}

/// Used memory is what is not available for new allocations
fn memory_load(total: u64, available: u64) -> Result<MemoryLoad> {
    if total == 0 {
        return Err(ResolverError::metric_collection("total memory reported as zero"));
    }

    let used = total.saturating_sub(available);
    Ok(MemoryLoad {
        util: decimal(percent(used, total), 1),
        used: mb_floor(used),
        free: mb_floor(available),
    })
}
