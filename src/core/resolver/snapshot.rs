//! Snapshot documents published for the external renderer.
//!
//! Each collector loop owns one document type. Categories whose task
//! failed in a cycle are `None` and serialize as `null`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::listeners::ListenerSnapshot;

/// Facts resolved once at daemon start
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaticSnapshot {
    pub timestamp: i64,
    pub hardware: Option<HardwareInfo>,
    pub release: Option<ReleaseInfo>,
    pub login: Option<LoginInfo>,
}

/// Fast-loop document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UptimeSnapshot {
    pub timestamp: i64,
    pub uptime: Option<Uptime>,
}

/// Monitor-loop document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonitorSnapshot {
    pub timestamp: i64,
    pub loads: Loads,
    pub thermals: Option<Thermals>,
    pub network: Option<NetworkLoad>,
    pub listeners: Option<ListenerSnapshot>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HardwareInfo {
    pub board: Option<String>,
    pub cpu: CpuInfo,
    pub gpu: Option<GpuInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CpuInfo {
    pub name: Option<String>,
    pub arch: Option<String>,
    pub endian: Option<String>,
    pub cores: Option<usize>,
    pub threads: usize,
    /// Max clock in MHz
    pub clock: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GpuInfo {
    pub name: Option<String>,
    /// Total memory in MiB
    pub memory: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReleaseInfo {
    pub name: Option<String>,
    pub version: Option<String>,
    pub codename: Option<String>,
    pub arch: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoginInfo {
    pub user: Option<String>,
    pub host: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Uptime {
    pub hours: u64,
    pub mins: u64,
    pub secs: u64,
}

impl Uptime {
    /// Decompose raw seconds into whole hours, minutes and seconds
    pub fn from_secs(raw: f64) -> Self {
        let total = raw.max(0.0).floor() as u64;
        Self {
            hours: total / 3600,
            mins: (total % 3600) / 60,
            secs: total % 60,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Loads {
    pub cpu: Option<CpuLoad>,
    pub memory: Option<MemoryLoad>,
    pub gpu: Option<GpuLoad>,
    pub disk: Option<DiskLoad>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CpuLoad {
    /// Utilization percent, one decimal
    pub util: f64,
    /// Current clock in MHz
    pub clock: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryLoad {
    pub util: f64,
    /// MiB, floored
    pub used: u64,
    pub free: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GpuLoad {
    pub util: f64,
    /// MiB as reported by the driver
    pub used: u64,
    pub free: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiskLoad {
    /// Usage keyed by mountpoint ("/", "/home")
    #[serde(flatten)]
    pub mounts: BTreeMap<String, MountUsage>,
    /// System-wide I/O; `null` when the kernel counters are unreadable
    pub read: Option<IoCounter>,
    pub write: Option<IoCounter>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MountUsage {
    #[serde(rename = "type")]
    pub fs_type: String,
    pub util: f64,
    pub used: u64,
    pub free: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IoCounter {
    /// Cumulative MiB
    pub bytes: u64,
    /// MiB per second
    pub speed: f64,
}

/// Network state; only `up` is present when there is no default route
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkLoad {
    pub up: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_ip: Option<String>,
    /// Cumulative MiB sent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sent: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recv: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packets_sent: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packets_recv: Option<u64>,
    /// Mbit/s
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upspeed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub downspeed: Option<f64>,
}

impl NetworkLoad {
    pub fn down() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Thermals {
    /// Mean of the CPU die sensors, one decimal
    pub cpu: f64,
    pub gpu: Option<f64>,
}

/// Current unix timestamp for a cycle
pub fn now_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_uptime_decomposition() {
        assert_eq!(
            Uptime::from_secs(3661.0),
            Uptime { hours: 1, mins: 1, secs: 1 }
        );
        assert_eq!(
            Uptime::from_secs(59.99),
            Uptime { hours: 0, mins: 0, secs: 59 }
        );
        assert_eq!(
            Uptime::from_secs(90_000.0),
            Uptime { hours: 25, mins: 0, secs: 0 }
        );
    }

    #[test]
    fn test_network_down_serializes_up_only() {
        let value = serde_json::to_value(NetworkLoad::down()).unwrap();
        assert_eq!(value, json!({"up": false}));
    }

    #[test]
    fn test_empty_monitor_snapshot_is_all_null() {
        let value = serde_json::to_value(MonitorSnapshot::default()).unwrap();
        assert_eq!(value["loads"]["gpu"], Value::Null);
        assert_eq!(value["thermals"], Value::Null);
        assert_eq!(value["network"], Value::Null);
    }

    #[test]
    fn test_disk_mounts_flatten() {
        let mut mounts = BTreeMap::new();
        mounts.insert(
            "/".to_string(),
            MountUsage {
                fs_type: "ext4".into(),
                util: 42.0,
                used: 100,
                free: 138,
            },
        );
        let disk = DiskLoad {
            mounts,
            ..Default::default()
        };

        let value = serde_json::to_value(&disk).unwrap();
        assert_eq!(value["/"]["type"], "ext4");
        assert_eq!(value["read"], Value::Null);
    }
}
