use sysinfo::System;

use crate::core::resolver::runner::MetricTask;
use crate::core::resolver::snapshot::ReleaseInfo;
use crate::error::{ResolverError, Result};
use crate::platform::linux::{self, OsRelease};
use crate::utils::units::text;

/// Distribution name, version, codename and machine architecture
#[derive(Debug, Default)]
pub struct ReleaseTask;

impl ReleaseTask {
    pub fn new() -> Self {
        Self
    }
}

impl MetricTask for ReleaseTask {
    type Output = ReleaseInfo;

    fn name(&self) -> &'static str {
        "release"
    }

    fn resolve(&mut self) -> Result<ReleaseInfo> {
        let os_release = linux::read_os_release().unwrap_or_else(|e| {
            log::debug!(target: "resolver::task::release", "os-release: {}", e);
            OsRelease::default()
        });

        let info = release_info(os_release, System::name(), System::os_version());
        if info.name.is_none() {
            return Err(ResolverError::sensor_unavailable(
                "operating system name could not be determined",
            ));
        }

        Ok(info)
    }
}

fn release_info(
    os_release: OsRelease,
    fallback_name: Option<String>,
    fallback_version: Option<String>,
) -> ReleaseInfo {
    ReleaseInfo {
        name: os_release.name.or(fallback_name).and_then(text),
        version: os_release.version.or(fallback_version).and_then(text),
        codename: os_release.codename.and_then(text),
        arch: text(std::env::consts::ARCH),
    }
}
