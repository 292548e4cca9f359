use crate::core::resolver::gpu::GpuReading;
use crate::core::resolver::runner::MetricTask;
use crate::core::resolver::snapshot::GpuLoad;
use crate::error::Result;
use crate::utils::units::{decimal, mb_floor};

use super::SharedGpu;

/// GPU utilization and memory, straight from the driver query
pub struct GpuLoadTask {
    gpu: SharedGpu,
}

impl GpuLoadTask {
    pub fn new(gpu: SharedGpu) -> Self {
        Self { gpu }
    }
}

impl MetricTask for GpuLoadTask {
    type Output = GpuLoad;

    fn name(&self) -> &'static str {
        "gpu"
    }

    fn resolve(&mut self) -> Result<GpuLoad> {
        let reading = self.gpu.lock().read()?;
        Ok(gpu_load(&reading))
    }
}

fn gpu_load(reading: &GpuReading) -> GpuLoad {
    GpuLoad {
        util: decimal(reading.utilization_percent, 1),
        used: mb_floor(reading.memory_used_bytes),
        free: mb_floor(reading.memory_free_bytes()),
    }
}
