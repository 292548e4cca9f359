//! Collector loops.
//!
//! A [`CollectorGroup`] runs its fixed set of tasks sequentially through a
//! [`TaskRunner`] and merges the results into one snapshot document. A
//! [`CollectorLoop`] repeats that on a cadence, on its own thread, and hands
//! every document to the [`SnapshotWriter`].

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::core::config::ResolverConfig;
use crate::core::listeners::ListenerCounters;
use crate::error::Result;

use super::gpu::GpuHandle;
use super::liveness::LivenessFlag;
use super::runner::{MetricTask, TaskRunner};
use super::snapshot::{
    now_timestamp, CpuLoad, DiskLoad, GpuLoad, HardwareInfo, Loads, LoginInfo, MemoryLoad,
    MonitorSnapshot, NetworkLoad, ReleaseInfo, StaticSnapshot, Thermals, Uptime,
    UptimeSnapshot,
};
use super::tasks::{
    shared_gpu, CpuLoadTask, DiskLoadTask, GpuLoadTask, HardwareTask, LoginTask,
    MemoryLoadTask, NetworkLoadTask, PublicIpLookup, ReleaseTask, ThermalsTask, UptimeTask,
};
use super::writer::SnapshotWriter;

/// Boxed task producing `T`
pub type BoxedTask<T> = Box<dyn MetricTask<Output = T>>;

/// A fixed group of tasks merged into one document per cycle
pub trait CollectorGroup: Send {
    type Snapshot: Serialize;

    /// Loop name used for the thread and log scope
    fn name(&self) -> &'static str;

    /// Run every task once; failed tasks leave their category absent
    fn collect(&mut self, runner: &TaskRunner) -> Self::Snapshot;
}

/// Hardware, release and login facts
pub struct StaticGroup {
    hardware: BoxedTask<HardwareInfo>,
    release: BoxedTask<ReleaseInfo>,
    login: BoxedTask<LoginInfo>,
}

impl StaticGroup {
    pub fn new(
        hardware: BoxedTask<HardwareInfo>,
        release: BoxedTask<ReleaseInfo>,
        login: BoxedTask<LoginInfo>,
    ) -> Self {
        Self {
            hardware,
            release,
            login,
        }
    }
}

impl Default for StaticGroup {
    fn default() -> Self {
        Self::new(
            Box::new(HardwareTask::new(GpuHandle::detect())),
            Box::new(ReleaseTask::new()),
            Box::new(LoginTask::new()),
        )
    }
}

impl CollectorGroup for StaticGroup {
    type Snapshot = StaticSnapshot;

    fn name(&self) -> &'static str {
        "static"
    }

    fn collect(&mut self, runner: &TaskRunner) -> StaticSnapshot {
        StaticSnapshot {
            timestamp: now_timestamp(),
            hardware: runner.run(&mut self.hardware),
            release: runner.run(&mut self.release),
            login: runner.run(&mut self.login),
        }
    }
}

/// Uptime alone, for a live clock
pub struct UptimeGroup {
    uptime: BoxedTask<Uptime>,
}

impl UptimeGroup {
    pub fn new(uptime: BoxedTask<Uptime>) -> Self {
        Self { uptime }
    }
}

impl Default for UptimeGroup {
    fn default() -> Self {
        Self::new(Box::new(UptimeTask::new()))
    }
}

impl CollectorGroup for UptimeGroup {
    type Snapshot = UptimeSnapshot;

    fn name(&self) -> &'static str {
        "uptime"
    }

    fn collect(&mut self, runner: &TaskRunner) -> UptimeSnapshot {
        UptimeSnapshot {
            timestamp: now_timestamp(),
            uptime: runner.run(&mut self.uptime),
        }
    }
}

/// Tasks of the monitor loop
pub struct MonitorTasks {
    pub cpu: BoxedTask<CpuLoad>,
    pub memory: BoxedTask<MemoryLoad>,
    pub gpu: BoxedTask<GpuLoad>,
    pub disk: BoxedTask<DiskLoad>,
    pub thermals: BoxedTask<Thermals>,
    pub network: BoxedTask<NetworkLoad>,
}

impl MonitorTasks {
    pub fn from_config(config: &ResolverConfig) -> Self {
        let public_ip = config.public_ip.as_ref().and_then(|public_ip| {
            PublicIpLookup::new(public_ip)
                .map_err(|e| {
                    log::warn!(
                        target: "resolver::monitor",
                        "public ip lookup disabled: {}",
                        e
                    )
                })
                .ok()
        });

        // One GPU handle per loop, shared between load and temperature
        let gpu = shared_gpu(GpuHandle::detect());

        Self {
            cpu: Box::new(CpuLoadTask::new()),
            memory: Box::new(MemoryLoadTask::new()),
            gpu: Box::new(GpuLoadTask::new(gpu.clone())),
            disk: Box::new(DiskLoadTask::new(config.mountpoints.clone())),
            thermals: Box::new(ThermalsTask::new(config.cpu_sensor_labels.clone(), gpu)),
            network: Box::new(NetworkLoadTask::new(config.route_probe.clone(), public_ip)),
        }
    }
}

/// Loads, thermals, network and listener counters
pub struct MonitorGroup {
    tasks: MonitorTasks,
    counters: Option<Arc<ListenerCounters>>,
}

impl MonitorGroup {
    pub fn new(tasks: MonitorTasks, counters: Option<Arc<ListenerCounters>>) -> Self {
        Self { tasks, counters }
    }

    pub fn from_config(config: &ResolverConfig, counters: Option<Arc<ListenerCounters>>) -> Self {
        Self::new(MonitorTasks::from_config(config), counters)
    }
}

impl CollectorGroup for MonitorGroup {
    type Snapshot = MonitorSnapshot;

    fn name(&self) -> &'static str {
        "monitor"
    }

    fn collect(&mut self, runner: &TaskRunner) -> MonitorSnapshot {
        let tasks = &mut self.tasks;

        MonitorSnapshot {
            timestamp: now_timestamp(),
            loads: Loads {
                cpu: runner.run(&mut tasks.cpu),
                memory: runner.run(&mut tasks.memory),
                gpu: runner.run(&mut tasks.gpu),
                disk: runner.run(&mut tasks.disk),
            },
            thermals: runner.run(&mut tasks.thermals),
            network: runner.run(&mut tasks.network),
            listeners: self.counters.as_ref().map(|c| c.snapshot()),
        }
    }
}

/// Drives one group on its own thread until shutdown
pub struct CollectorLoop<G> {
    group: G,
    path: PathBuf,
    cadence: Option<Duration>,
    runner: TaskRunner,
    writer: SnapshotWriter,
}

impl<G: CollectorGroup + 'static> CollectorLoop<G> {
    /// Loop running a single cycle
    pub fn once(group: G, path: impl Into<PathBuf>) -> Self {
        Self {
            group,
            path: path.into(),
            cadence: None,
            runner: TaskRunner::new(),
            writer: SnapshotWriter::new(),
        }
    }

    /// Loop repeating every `cadence`
    pub fn every(group: G, path: impl Into<PathBuf>, cadence: Duration) -> Self {
        Self {
            cadence: Some(cadence),
            ..Self::once(group, path)
        }
    }

    pub fn with_writer(mut self, writer: SnapshotWriter) -> Self {
        self.writer = writer;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Collect and persist one document. A write failure is returned but
    /// leaves the previous document in place.
    pub fn run_once(&mut self) -> Result<()> {
        let started = Instant::now();
        let snapshot = self.group.collect(&self.runner);
        self.writer.write(&self.path, &snapshot)?;

        log::debug!(
            target: "resolver::collector",
            "{} cycle written to {} in {:?}",
            self.group.name(),
            self.path.display(),
            started.elapsed()
        );
        Ok(())
    }

    /// Run cycles until `liveness` goes down (or after one cycle without a
    /// cadence)
    pub fn run(mut self, liveness: &LivenessFlag) {
        let name = self.group.name();
        log::info!(target: "resolver::collector", "{} loop started", name);

        while liveness.is_alive() {
            if let Err(e) = self.run_once() {
                log::error!(
                    target: "resolver::collector",
                    "{} snapshot not written: {}",
                    name,
                    e
                );
            }

            match self.cadence {
                Some(cadence) => {
                    if !liveness.sleep(cadence) {
                        break;
                    }
                }
                None => break,
            }
        }

        log::info!(target: "resolver::collector", "{} loop finished", name);
    }

    pub fn spawn(self, liveness: Arc<LivenessFlag>) -> Result<JoinHandle<()>> {
        let handle = thread::Builder::new()
            .name(format!("collector-{}", self.group.name()))
            .spawn(move || self.run(&liveness))?;
        Ok(handle)
    }
}
