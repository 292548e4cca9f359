use sysinfo::{CpuRefreshKind, RefreshKind, System};

use crate::core::resolver::gpu::{GpuHandle, GpuReading};
use crate::core::resolver::runner::MetricTask;
use crate::core::resolver::snapshot::{CpuInfo, GpuInfo, HardwareInfo};
use crate::error::{ResolverError, Result};
use crate::platform::linux;
use crate::utils::units::{mb_floor, text};

/// Board, CPU and GPU facts. Resolved once per daemon run.
pub struct HardwareTask {
    gpu: GpuHandle,
}

impl HardwareTask {
    pub fn new(gpu: GpuHandle) -> Self {
        Self { gpu }
    }
}

impl MetricTask for HardwareTask {
    type Output = HardwareInfo;

    fn name(&self) -> &'static str {
        "hardware"
    }

    fn resolve(&mut self) -> Result<HardwareInfo> {
        let refresh = RefreshKind::nothing().with_cpu(CpuRefreshKind::everything());
        let sys = System::new_with_specifics(refresh);

        let cpus = sys.cpus();
        let first = cpus
            .first()
            .ok_or_else(|| ResolverError::metric_collection("no CPUs reported"))?;

        let cpu = CpuInfo {
            name: text(first.brand()),
            arch: text(std::env::consts::ARCH),
            endian: text(if cfg!(target_endian = "little") {
                "little"
            } else {
                "big"
            }),
            cores: System::physical_core_count(),
            threads: cpus.len(),
            clock: linux::read_cpu_max_mhz().ok(),
        };

        let board = match linux::read_board_name() {
            Ok(name) => text(name),
            Err(e) => {
                log::debug!(target: "resolver::task::hardware", "board name: {}", e);
                None
            }
        };

        let gpu = match self.gpu.read() {
            Ok(reading) => Some(gpu_info(&reading)),
            Err(e) => {
                log::debug!(target: "resolver::task::hardware", "no GPU facts: {}", e);
                None
            }
        };

        Ok(HardwareInfo { board, cpu, gpu })
    }
}

fn gpu_info(reading: &GpuReading) -> GpuInfo {
    GpuInfo {
        name: text(&reading.name),
        memory: mb_floor(reading.memory_total_bytes),
    }
}
