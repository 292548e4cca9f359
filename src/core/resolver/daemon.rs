//! Daemon start/stop contract.

use std::sync::Arc;
use std::thread::JoinHandle;

use crate::core::config::ResolverConfig;
use crate::core::listeners::{InputListener, ListenerCounters, ListenerKind};
use crate::error::Result;
use crate::platform::input;

use super::collector::{CollectorLoop, MonitorGroup, StaticGroup, UptimeGroup};
use super::liveness::LivenessFlag;
use super::shutdown::ShutdownCoordinator;
use super::writer::ensure_dir;

pub struct Resolver;

impl Resolver {
    /// Validate `config`, start the listeners and spawn the three collector
    /// loops. Only an invalid config, an unusable data directory or a failed
    /// thread spawn is fatal.
    pub fn start(config: ResolverConfig) -> Result<ResolverHandle> {
        config.validate()?;
        ensure_dir(&config.data_dir)?;

        let liveness = Arc::new(LivenessFlag::new());
        let counters = Arc::new(ListenerCounters::new());

        let listeners = if config.listeners {
            start_listeners(&counters, &liveness)
        } else {
            Vec::new()
        };

        let coordinator = Arc::new(ShutdownCoordinator::new(liveness.clone(), listeners.clone()));
        let mut handle = ResolverHandle {
            coordinator,
            listeners,
            loops: Vec::new(),
        };

        let monitor_counters = config.listeners.then(|| counters.clone());
        let spawned = spawn_loops(&config, monitor_counters, &liveness, &mut handle.loops);
        if let Err(e) = spawned {
            handle.stop();
            handle.join();
            return Err(e);
        }

        log::info!(
            target: "resolver",
            "publishing snapshots to {}",
            config.data_dir.display()
        );
        Ok(handle)
    }
}

fn start_listeners(
    counters: &Arc<ListenerCounters>,
    liveness: &Arc<LivenessFlag>,
) -> Vec<Arc<InputListener>> {
    let mut listeners = Vec::new();

    for kind in [ListenerKind::Keyboard, ListenerKind::Mouse] {
        let source = match input::open_source(kind) {
            Ok(source) => source,
            Err(e) => {
                log::warn!(target: "resolver::listener", "{} listener unavailable: {}", kind, e);
                continue;
            }
        };

        let listener = Arc::new(InputListener::new(
            kind,
            source,
            counters.clone(),
            liveness.clone(),
        ));
        if let Err(e) = listener.start() {
            log::error!(target: "resolver::listener", "{} listener failed to start: {}", kind, e);
        }
        listeners.push(listener);
    }

    listeners
}

fn spawn_loops(
    config: &ResolverConfig,
    counters: Option<Arc<ListenerCounters>>,
    liveness: &Arc<LivenessFlag>,
    loops: &mut Vec<(&'static str, JoinHandle<()>)>,
) -> Result<()> {
    let handle = CollectorLoop::once(StaticGroup::default(), config.static_path())
        .spawn(liveness.clone())?;
    loops.push(("static", handle));

    let handle = CollectorLoop::every(
        UptimeGroup::default(),
        config.uptime_path(),
        config.uptime_interval,
    )
    .spawn(liveness.clone())?;
    loops.push(("uptime", handle));

    let handle = CollectorLoop::every(
        MonitorGroup::from_config(config, counters),
        config.monitor_path(),
        config.monitor_interval,
    )
    .spawn(liveness.clone())?;
    loops.push(("monitor", handle));

    Ok(())
}

/// Running daemon
pub struct ResolverHandle {
    coordinator: Arc<ShutdownCoordinator>,
    listeners: Vec<Arc<InputListener>>,
    loops: Vec<(&'static str, JoinHandle<()>)>,
}

impl ResolverHandle {
    pub fn liveness(&self) -> &Arc<LivenessFlag> {
        self.coordinator.liveness()
    }

    pub fn coordinator(&self) -> &Arc<ShutdownCoordinator> {
        &self.coordinator
    }

    /// Route process termination signals to this daemon
    pub fn install_signal_handler(&self) -> Result<()> {
        self.coordinator.install()
    }

    /// Request shutdown without waiting
    pub fn stop(&self) {
        self.coordinator.request();
    }

    /// Wait for every loop and listener to observe shutdown
    pub fn join(&mut self) {
        for (name, handle) in self.loops.drain(..) {
            if handle.join().is_err() {
                log::error!(target: "resolver", "{} loop panicked", name);
            }
        }

        for listener in &self.listeners {
            listener.join();
        }

        log::info!(target: "resolver", "all loops stopped");
    }
}
