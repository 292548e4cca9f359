// Platform-specific code module

pub mod gpu;
pub mod input;
pub mod linux;

// Re-exports for cleaner imports
pub use gpu::get_gpu_provider;
pub use input::open_source;
