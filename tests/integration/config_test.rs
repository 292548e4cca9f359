use std::path::PathBuf;
use std::time::Duration;

use resolverd::core::config::{PublicIpConfig, ResolverConfig, MAX_PUBLIC_IP_TIMEOUT};

#[test]
fn test_config_default() {
    let config = ResolverConfig::default();
    assert!(!config.debug);
    assert!(config.listeners);
    assert_eq!(config.uptime_interval, Duration::from_secs(1));
    assert_eq!(config.monitor_interval, Duration::from_secs(2));
    assert_eq!(
        config.public_ip.as_ref().map(|p| p.timeout),
        Some(MAX_PUBLIC_IP_TIMEOUT)
    );
}

#[test]
fn test_snapshot_files_live_in_data_dir() {
    let config = ResolverConfig {
        data_dir: PathBuf::from("/var/lib/widgets"),
        ..Default::default()
    };

    assert_eq!(config.static_path(), PathBuf::from("/var/lib/widgets/static.json"));
    assert_eq!(config.uptime_path(), PathBuf::from("/var/lib/widgets/uptime.json"));
    assert_eq!(config.monitor_path(), PathBuf::from("/var/lib/widgets/monitor.json"));
}

#[test]
fn test_config_validation() {
    let empty_mounts = ResolverConfig {
        mountpoints: Vec::new(),
        ..Default::default()
    };
    assert!(empty_mounts.validate().is_err());

    let zero_uptime = ResolverConfig {
        uptime_interval: Duration::ZERO,
        ..Default::default()
    };
    assert!(zero_uptime.validate().is_err());

    let zero_timeout = ResolverConfig {
        public_ip: Some(PublicIpConfig {
            timeout: Duration::ZERO,
            ..Default::default()
        }),
        ..Default::default()
    };
    assert!(zero_timeout.validate().is_err());

    let no_lookup = ResolverConfig {
        public_ip: None,
        ..Default::default()
    };
    assert!(no_lookup.validate().is_ok());
}

#[test]
fn test_config_deserializes_from_json() {
    let json = r#"{
        "data_dir": "/tmp/resolverd",
        "uptime_interval": 500,
        "monitor_interval": 3000,
        "mountpoints": ["/"],
        "route_probe": "1.1.1.1",
        "public_ip": null,
        "cpu_sensor_labels": ["package id"],
        "listeners": false
    }"#;

    let config: ResolverConfig = serde_json::from_str(json).unwrap();
    assert!(!config.debug);
    assert!(config.log_file.is_none());
    assert_eq!(config.monitor_interval, Duration::from_secs(3));
    assert_eq!(config.route_probe, "1.1.1.1");
    assert!(config.validate().is_ok());
}
