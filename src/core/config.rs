use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ResolverError, Result};

/// Upper bound for the public address lookup so it never stalls a cycle
pub const MAX_PUBLIC_IP_TIMEOUT: Duration = Duration::from_secs(2);

pub const STATIC_FILE: &str = "static.json";
pub const UPTIME_FILE: &str = "uptime.json";
pub const MONITOR_FILE: &str = "monitor.json";

/// Public IP lookup settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicIpConfig {
    pub url: String,
    #[serde(with = "duration_ms")]
    pub timeout: Duration,
}

impl Default for PublicIpConfig {
    fn default() -> Self {
        Self {
            url: "https://ident.me/".to_string(),
            timeout: MAX_PUBLIC_IP_TIMEOUT,
        }
    }
}

/// Runtime settings of the resolver daemon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Directory receiving the snapshot files
    pub data_dir: PathBuf,
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub log_file: Option<PathBuf>,
    #[serde(with = "duration_ms")]
    pub uptime_interval: Duration,
    #[serde(with = "duration_ms")]
    pub monitor_interval: Duration,
    pub mountpoints: Vec<String>,
    /// Address whose route decides whether the network is up
    pub route_probe: String,
    /// `None` disables the outbound lookup
    pub public_ip: Option<PublicIpConfig>,
    /// Case-insensitive label fragments identifying CPU die sensors
    pub cpu_sensor_labels: Vec<String>,
    pub listeners: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            data_dir: Self::default_data_dir(),
            debug: false,
            log_file: None,
            uptime_interval: Duration::from_secs(1),
            monitor_interval: Duration::from_secs(2),
            mountpoints: vec!["/".to_string(), "/home".to_string()],
            route_probe: "8.8.8.8".to_string(),
            public_ip: Some(PublicIpConfig::default()),
            cpu_sensor_labels: vec!["tdie".to_string(), "tccd".to_string()],
            listeners: true,
        }
    }
}

impl ResolverConfig {
    /// `$XDG_CONFIG_HOME/resolverd`, or a relative directory when the
    /// platform has no config dir
    pub fn default_data_dir() -> PathBuf {
        dirs::config_dir()
            .map(|dir| dir.join("resolverd"))
            .unwrap_or_else(|| PathBuf::from(".resolverd"))
    }

    pub fn static_path(&self) -> PathBuf {
        self.data_dir.join(STATIC_FILE)
    }

    pub fn uptime_path(&self) -> PathBuf {
        self.data_dir.join(UPTIME_FILE)
    }

    pub fn monitor_path(&self) -> PathBuf {
        self.data_dir.join(MONITOR_FILE)
    }

    /// Reject settings the collector loops cannot honor
    pub fn validate(&self) -> Result<()> {
        if self.uptime_interval.is_zero() {
            return Err(ResolverError::config("uptime interval must be greater than zero"));
        }

        if self.monitor_interval.is_zero() {
            return Err(ResolverError::config("monitor interval must be greater than zero"));
        }

        if self.mountpoints.is_empty() {
            return Err(ResolverError::config("at least one mountpoint must be monitored"));
        }

        if self.route_probe.trim().is_empty() {
            return Err(ResolverError::config("route probe address must not be empty"));
        }

        if let Some(public_ip) = &self.public_ip {
            if public_ip.timeout.is_zero() || public_ip.timeout > MAX_PUBLIC_IP_TIMEOUT {
                return Err(ResolverError::config(format!(
                    "public ip timeout must be within (0, {}ms], got {}ms",
                    MAX_PUBLIC_IP_TIMEOUT.as_millis(),
                    public_ip.timeout.as_millis()
                )));
            }
        }

        Ok(())
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = ResolverConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.mountpoints, vec!["/", "/home"]);
        assert!(config.data_dir.ends_with("resolverd"));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let config = ResolverConfig {
            monitor_interval: Duration::ZERO,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_public_ip_timeout_bounded() {
        let mut config = ResolverConfig::default();
        config.public_ip = Some(PublicIpConfig {
            timeout: Duration::from_secs(5),
            ..Default::default()
        });
        assert!(config.validate().is_err());

        config.public_ip = Some(PublicIpConfig {
            timeout: Duration::from_millis(800),
            ..Default::default()
        });
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_snapshot_paths() {
        let config = ResolverConfig {
            data_dir: PathBuf::from("/tmp/resolverd"),
            ..Default::default()
        };
        assert_eq!(config.monitor_path(), PathBuf::from("/tmp/resolverd/monitor.json"));
        assert_eq!(config.static_path(), PathBuf::from("/tmp/resolverd/static.json"));
    }

    #[test]
    fn test_config_json_roundtrip_uses_millis() {
        let config = ResolverConfig::default();
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["monitor_interval"], 2000);
        let back: ResolverConfig = serde_json::from_value(value).unwrap();
        assert_eq!(back, config);
    }
}
