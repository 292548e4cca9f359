//! Metric tasks, one per snapshot category.
//!
//! Static facts: [`HardwareTask`], [`ReleaseTask`], [`LoginTask`].
//! Fast loop: [`UptimeTask`].
//! Monitor loop: [`CpuLoadTask`], [`MemoryLoadTask`], [`GpuLoadTask`],
//! [`DiskLoadTask`], [`NetworkLoadTask`], [`ThermalsTask`].

mod cpu;
mod disk;
mod gpu;
mod hardware;
mod login;
mod memory;
mod network;
mod release;
mod thermals;
mod uptime;

pub use cpu::CpuLoadTask;
pub use disk::DiskLoadTask;
pub use gpu::GpuLoadTask;
pub use hardware::HardwareTask;
pub use login::LoginTask;
pub use memory::MemoryLoadTask;
pub use network::{NetworkLoadTask, PublicIpLookup};
pub use release::ReleaseTask;
pub use thermals::ThermalsTask;
pub use uptime::UptimeTask;

use std::sync::Arc;

use parking_lot::Mutex;

use super::gpu::GpuHandle;

/// GPU handle shared by the gpu-load and thermals tasks of the monitor loop
pub type SharedGpu = Arc<Mutex<GpuHandle>>;

pub fn shared_gpu(handle: GpuHandle) -> SharedGpu {
    Arc::new(Mutex::new(handle))
}
