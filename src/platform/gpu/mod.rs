//! GPU-specific platform code.
//!
//! Provides GPU metrics collection via NVML.

mod nvidia;

pub use nvidia::NvidiaGpuProvider;

use crate::core::resolver::gpu::GpuProvider;
use crate::error::Result;

/// Attempt to get an available GPU provider
///
/// Returns error if no supported GPU is available.
pub fn get_gpu_provider() -> Result<Box<dyn GpuProvider>> {
    let provider = NvidiaGpuProvider::new()?;
    Ok(Box::new(provider))
}
