use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;

use sysinfo::Disks;

use crate::core::resolver::meter::RateMeter;
use crate::core::resolver::runner::MetricTask;
use crate::core::resolver::snapshot::{DiskLoad, IoCounter, MountUsage};
use crate::error::Result;
use crate::platform::linux;
use crate::utils::units::{decimal, mb, mb_floor, percent};

/// Usage of the monitored mountpoints plus system-wide disk I/O rates
pub struct DiskLoadTask {
    disks: Disks,
    mountpoints: Vec<String>,
    io_source: fn() -> Result<(u64, u64)>,
    read: RateMeter,
    write: RateMeter,
}

impl DiskLoadTask {
    pub fn new(mountpoints: Vec<String>) -> Self {
        Self::with_io_source(mountpoints, linux::read_disk_io)
    }

    /// Task taking cumulative (read, written) bytes from `io_source`
    pub fn with_io_source(mountpoints: Vec<String>, io_source: fn() -> Result<(u64, u64)>) -> Self {
        Self {
            disks: Disks::new_with_refreshed_list(),
            mountpoints,
            io_source,
            read: RateMeter::new(),
            write: RateMeter::new(),
        }
    }

    fn mount_usages(&mut self) -> BTreeMap<String, MountUsage> {
        self.disks.refresh(true);

        let mut mounts = BTreeMap::new();
        for mountpoint in &self.mountpoints {
            let found = self
                .disks
                .iter()
                .find(|disk| disk.mount_point() == Path::new(mountpoint));

            match found {
                Some(disk) => {
                    let usage = mount_usage(
                        &disk.file_system().to_string_lossy(),
                        disk.total_space(),
                        disk.available_space(),
                    );
                    mounts.insert(mountpoint.clone(), usage);
                }
                None => {
                    log::debug!(
                        target: "resolver::task::disk",
                        "{} is not a separate mount",
                        mountpoint
                    );
                }
            }
        }
        mounts
    }
}

impl MetricTask for DiskLoadTask {
    type Output = DiskLoad;

    fn name(&self) -> &'static str {
        "disk"
    }

    fn resolve(&mut self) -> Result<DiskLoad> {
        let mounts = self.mount_usages();

        let (read, write) = match (self.io_source)() {
            Ok((read_bytes, written_bytes)) => {
                let now = Instant::now();
                (
                    Some(io_counter(&mut self.read, read_bytes, now)),
                    Some(io_counter(&mut self.write, written_bytes, now)),
                )
            }
            Err(e) => {
                log::warn!(target: "resolver::task::disk", "disk I/O counters unavailable: {}", e);
                self.read.reset();
                self.write.reset();
                (None, None)
            }
        };

        Ok(DiskLoad {
            mounts,
            read,
            write,
        })
    }
}

fn mount_usage(fs_type: &str, total: u64, available: u64) -> MountUsage {
    let used = total.saturating_sub(available);
    MountUsage {
        fs_type: fs_type.trim().to_lowercase(),
        util: decimal(percent(used, total), 1),
        used: mb_floor(used),
        free: mb_floor(available),
    }
}

/// Feed a cumulative byte counter into its meter; speed in MiB/s
fn io_counter(meter: &mut RateMeter, bytes: u64, now: Instant) -> IoCounter {
    meter.update_at(bytes, now);
    IoCounter {
        bytes: mb_floor(bytes),
        speed: decimal(mb(meter.speed()), 2),
    }
}
