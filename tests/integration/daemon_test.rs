use std::fs;
use std::time::{Duration, Instant};

use resolverd::core::config::ResolverConfig;
use resolverd::core::resolver::Resolver;
use serde_json::Value;
use tempfile::TempDir;

fn quiet_config(dir: &TempDir) -> ResolverConfig {
    ResolverConfig {
        data_dir: dir.path().join("snapshots"),
        uptime_interval: Duration::from_millis(50),
        monitor_interval: Duration::from_millis(100),
        public_ip: None,
        listeners: false,
        ..Default::default()
    }
}

fn wait_for_file(path: &std::path::Path) -> bool {
    let deadline = Instant::now() + Duration::from_secs(10);
    while Instant::now() < deadline {
        if path.exists() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    false
}

#[test]
fn test_daemon_publishes_all_documents_and_stops() {
    let dir = TempDir::new().unwrap();
    let config = quiet_config(&dir);

    let mut handle = Resolver::start(config.clone()).unwrap();

    for path in [config.static_path(), config.uptime_path(), config.monitor_path()] {
        assert!(wait_for_file(&path), "{} never written", path.display());
        let doc: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(doc["timestamp"].is_i64());
    }

    let uptime: Value =
        serde_json::from_str(&fs::read_to_string(config.uptime_path()).unwrap()).unwrap();
    assert!(uptime.get("uptime").is_some());

    let monitor: Value =
        serde_json::from_str(&fs::read_to_string(config.monitor_path()).unwrap()).unwrap();
    assert!(monitor["listeners"].is_null());

    let started = Instant::now();
    handle.stop();
    handle.join();
    assert!(!handle.liveness().is_alive());
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[test]
fn test_unusable_data_dir_is_fatal() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("snapshots");
    fs::write(&blocker, "not a directory").unwrap();

    let config = quiet_config(&dir);
    assert!(Resolver::start(config).is_err());
}

#[test]
fn test_invalid_config_is_fatal() {
    let dir = TempDir::new().unwrap();
    let config = ResolverConfig {
        monitor_interval: Duration::ZERO,
        ..quiet_config(&dir)
    };
    assert!(Resolver::start(config).is_err());
    assert!(!dir.path().join("snapshots").exists());
}
