use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use resolverd::core::listeners::{InputEvent, ListenerCounters, MouseButton};
use resolverd::core::resolver::snapshot::{
    CpuLoad, DiskLoad, GpuLoad, HardwareInfo, LoginInfo, MemoryLoad, NetworkLoad, ReleaseInfo,
    Thermals, Uptime,
};
use resolverd::core::resolver::tasks::{shared_gpu, GpuLoadTask};
use resolverd::core::resolver::{
    CollectorLoop, GpuHandle, GpuProvider, GpuReading, LivenessFlag, MetricTask, MonitorGroup,
    MonitorTasks, StaticGroup, UptimeGroup,
};
use resolverd::error::{ResolverError, Result};
use serde_json::Value;
use tempfile::TempDir;

/// Task returning a fixed value
struct Fixed<T>(&'static str, T);

impl<T: Clone + Send> MetricTask for Fixed<T> {
    type Output = T;

    fn name(&self) -> &'static str {
        self.0
    }

    fn resolve(&mut self) -> Result<T> {
        Ok(self.1.clone())
    }
}

/// Task that always fails
struct Broken<T>(&'static str, std::marker::PhantomData<T>);

impl<T> Broken<T> {
    fn new(name: &'static str) -> Self {
        Self(name, std::marker::PhantomData)
    }
}

impl<T: Send> MetricTask for Broken<T> {
    type Output = T;

    fn name(&self) -> &'static str {
        self.0
    }

    fn resolve(&mut self) -> Result<T> {
        Err(ResolverError::sensor_unavailable(format!("{} sensor missing", self.0)))
    }
}

/// GPU whose first query fails
struct FlakyGpu {
    calls: Arc<AtomicUsize>,
}

impl GpuProvider for FlakyGpu {
    fn read(&mut self) -> Result<GpuReading> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            return Err(ResolverError::metric_collection("NVML_ERROR_TIMEOUT"));
        }
        Ok(GpuReading {
            name: "test gpu".into(),
            utilization_percent: 12.0,
            memory_used_bytes: 1024 * 1024 * 1024,
            memory_total_bytes: 4 * 1024 * 1024 * 1024,
            temperature_celsius: Some(50.0),
        })
    }
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn monitor_tasks(gpu: GpuLoadTask) -> MonitorTasks {
    MonitorTasks {
        cpu: Box::new(Fixed("cpu", CpuLoad { util: 3.5, clock: 2400 })),
        memory: Box::new(Fixed(
            "memory",
            MemoryLoad {
                util: 50.0,
                used: 8000,
                free: 8000,
            },
        )),
        gpu: Box::new(gpu),
        disk: Box::new(Fixed("disk", DiskLoad::default())),
        thermals: Box::new(Fixed(
            "thermals",
            Thermals {
                cpu: 45.5,
                gpu: None,
            },
        )),
        network: Box::new(Fixed("network", NetworkLoad::down())),
    }
}

#[test]
fn test_transient_gpu_failure_then_recovery() {
    let dir = TempDir::new().unwrap();
    let static_path = dir.path().join("static.json");
    let monitor_path = dir.path().join("monitor.json");

    let hardware = HardwareInfo {
        board: Some("x570 aorus elite".into()),
        ..Default::default()
    };
    let static_group = StaticGroup::new(
        Box::new(Fixed("hardware", hardware)),
        Box::new(Fixed("release", ReleaseInfo::default())),
        Box::new(Fixed("login", LoginInfo::default())),
    );
    CollectorLoop::once(static_group, &static_path).run(&LivenessFlag::new());
    let static_before = fs::read_to_string(&static_path).unwrap();

    let calls = Arc::new(AtomicUsize::new(0));
    let gpu = shared_gpu(GpuHandle::with_provider(Box::new(FlakyGpu {
        calls: calls.clone(),
    })));
    let group = MonitorGroup::new(monitor_tasks(GpuLoadTask::new(gpu)), None);
    let mut monitor = CollectorLoop::every(group, &monitor_path, Duration::from_secs(1));

    monitor.run_once().unwrap();
    let first = read_json(&monitor_path);
    assert!(first["loads"]["gpu"].is_null());
    assert_eq!(first["loads"]["cpu"]["clock"], 2400);

    monitor.run_once().unwrap();
    let second = read_json(&monitor_path);
    assert_eq!(second["loads"]["gpu"]["util"], 12.0);
    assert_eq!(second["loads"]["gpu"]["used"], 1024);
    assert_eq!(second["loads"]["gpu"]["free"], 3072);

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(fs::read_to_string(&static_path).unwrap(), static_before);
}

#[test]
fn test_all_tasks_failing_still_writes_valid_documents() {
    let dir = TempDir::new().unwrap();
    let static_path = dir.path().join("static.json");
    let monitor_path = dir.path().join("monitor.json");

    let static_group = StaticGroup::new(
        Box::new(Broken::<HardwareInfo>::new("hardware")),
        Box::new(Broken::<ReleaseInfo>::new("release")),
        Box::new(Broken::<LoginInfo>::new("login")),
    );
    CollectorLoop::once(static_group, &static_path).run(&LivenessFlag::new());

    let doc = read_json(&static_path);
    assert!(doc["hardware"].is_null());
    assert!(doc["release"].is_null());
    assert!(doc["login"].is_null());

    let tasks = MonitorTasks {
        cpu: Box::new(Broken::<CpuLoad>::new("cpu")),
        memory: Box::new(Broken::<MemoryLoad>::new("memory")),
        gpu: Box::new(Broken::<GpuLoad>::new("gpu")),
        disk: Box::new(Broken::<DiskLoad>::new("disk")),
        thermals: Box::new(Broken::<Thermals>::new("thermals")),
        network: Box::new(Broken::<NetworkLoad>::new("network")),
    };
    let mut monitor = CollectorLoop::once(MonitorGroup::new(tasks, None), &monitor_path);
    monitor.run_once().unwrap();

    let doc = read_json(&monitor_path);
    for category in ["cpu", "memory", "gpu", "disk"] {
        assert!(doc["loads"][category].is_null(), "{} should be null", category);
    }
    assert!(doc["thermals"].is_null());
    assert!(doc["network"].is_null());
}

#[test]
fn test_listener_counters_are_snapshotted_not_reset() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("monitor.json");

    let counters = Arc::new(ListenerCounters::new());
    counters.record(&InputEvent::KeyPress);
    counters.record(&InputEvent::ButtonPress(MouseButton::Right));
    counters.record(&InputEvent::Scroll { dx: 0, dy: -4 });

    let calls = Arc::new(AtomicUsize::new(1));
    let gpu = shared_gpu(GpuHandle::with_provider(Box::new(FlakyGpu { calls })));
    let group = MonitorGroup::new(monitor_tasks(GpuLoadTask::new(gpu)), Some(counters.clone()));
    let mut monitor = CollectorLoop::once(group, &path);

    monitor.run_once().unwrap();
    monitor.run_once().unwrap();

    let doc = read_json(&path);
    assert_eq!(doc["listeners"]["keyboard"]["press"], 1);
    assert_eq!(doc["listeners"]["mouse"]["right"], 1);
    assert_eq!(doc["listeners"]["mouse"]["scroll_y"], 4);
    assert_eq!(counters.snapshot().keyboard.press, 1);
}

#[test]
fn test_loop_exits_promptly_on_shutdown() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("uptime.json");
    let liveness = Arc::new(LivenessFlag::new());

    let group = UptimeGroup::new(Box::new(Fixed("uptime", Uptime::default())));
    let cadence = Duration::from_secs(30);
    let handle = CollectorLoop::every(group, &path, cadence)
        .spawn(liveness.clone())
        .unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    while !path.exists() && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(10));
    }
    assert!(path.exists());

    let started = Instant::now();
    liveness.shutdown();
    handle.join().unwrap();
    assert!(started.elapsed() < cadence);
}
