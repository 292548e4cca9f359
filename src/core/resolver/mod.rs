// Telemetry resolver: tasks, collector loops and snapshot publishing

pub mod collector;
pub mod daemon;
pub mod gpu;
pub mod liveness;
pub mod meter;
pub mod runner;
pub mod shutdown;
pub mod snapshot;
pub mod tasks;
pub mod writer;

// Re-export commonly used items
pub use collector::{
    BoxedTask, CollectorGroup, CollectorLoop, MonitorGroup, MonitorTasks, StaticGroup,
    UptimeGroup,
};
pub use daemon::{Resolver, ResolverHandle};
pub use gpu::{GpuHandle, GpuProvider, GpuReading};
pub use liveness::LivenessFlag;
pub use meter::RateMeter;
pub use runner::{MetricTask, TaskRunner};
pub use shutdown::ShutdownCoordinator;
pub use writer::SnapshotWriter;
