use std::io;
use thiserror::Error;

/// Custom error type for the resolver daemon
#[derive(Error, Debug)]
pub enum ResolverError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Sensor unavailable: {0}")]
    SensorUnavailable(String),

    #[error("GPU not available: {0}")]
    GpuNotAvailable(String),

    #[error("Metric collection failed: {0}")]
    MetricCollection(String),

    #[error("Command failed: {0}")]
    Command(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Snapshot write failed: {0}")]
    Snapshot(String),

    #[error("Signal handler error: {0}")]
    Signal(#[from] ctrlc::Error),
}

/// Result type alias for the resolver
pub type Result<T> = std::result::Result<T, ResolverError>;

impl ResolverError {
    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        ResolverError::Config(msg.into())
    }

    /// Create a sensor unavailable error
    pub fn sensor_unavailable<S: Into<String>>(msg: S) -> Self {
        ResolverError::SensorUnavailable(msg.into())
    }

    pub fn gpu_not_available<S: Into<String>>(msg: S) -> Self {
        ResolverError::GpuNotAvailable(msg.into())
    }

    pub fn metric_collection<S: Into<String>>(msg: S) -> Self {
        ResolverError::MetricCollection(msg.into())
    }

    pub fn command<S: Into<String>>(msg: S) -> Self {
        ResolverError::Command(msg.into())
    }

    pub fn parse<S: Into<String>>(msg: S) -> Self {
        ResolverError::Parse(msg.into())
    }

    pub fn snapshot<S: Into<String>>(msg: S) -> Self {
        ResolverError::Snapshot(msg.into())
    }

    /// Whether the failure means the sensor is missing on this host
    /// rather than a transient read error.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            ResolverError::SensorUnavailable(_) | ResolverError::GpuNotAvailable(_)
        )
    }
}
