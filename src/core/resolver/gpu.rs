use crate::error::{ResolverError, Result};

/// Raw reading from a GPU driver query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GpuReading {
    pub name: String,
    pub utilization_percent: f64,
    pub memory_used_bytes: u64,
    pub memory_total_bytes: u64,
    pub temperature_celsius: Option<f64>,
}

impl GpuReading {
    pub fn memory_free_bytes(&self) -> u64 {
        self.memory_total_bytes.saturating_sub(self.memory_used_bytes)
    }
}

/// Trait for GPU metrics providers
///
/// This trait abstracts the driver query so tasks can be exercised without
/// real hardware. Implementations are provided in the platform layer.
pub trait GpuProvider: Send {
    /// Query the GPU once
    fn read(&mut self) -> Result<GpuReading>;
}

/// Lazily (re)initialized GPU handle shared by the tasks of one loop.
///
/// A failed initialization is retried on the next read, so a driver that
/// comes up after the daemon is picked up without a restart.
pub struct GpuHandle {
    provider: Option<Box<dyn GpuProvider>>,
    factory: fn() -> Result<Box<dyn GpuProvider>>,
}

impl GpuHandle {
    /// Handle backed by the platform's GPU detection
    pub fn detect() -> Self {
        Self {
            provider: None,
            factory: crate::platform::gpu::get_gpu_provider,
        }
    }

    /// Handle around an already constructed provider
    pub fn with_provider(provider: Box<dyn GpuProvider>) -> Self {
        Self {
            provider: Some(provider),
            factory: crate::platform::gpu::get_gpu_provider,
        }
    }

    pub fn read(&mut self) -> Result<GpuReading> {
        if self.provider.is_none() {
            self.provider = Some((self.factory)()?);
        }

        self.provider
            .as_mut()
            .ok_or_else(|| ResolverError::gpu_not_available("GPU provider not initialized"))?
            .read()
    }
}
