use sysinfo::System;

use crate::core::resolver::runner::MetricTask;
use crate::core::resolver::snapshot::LoginInfo;
use crate::error::{ResolverError, Result};
use crate::platform::linux;
use crate::utils::units::text;

/// Current user and host name
#[derive(Debug, Default)]
pub struct LoginTask;

impl LoginTask {
    pub fn new() -> Self {
        Self
    }
}

impl MetricTask for LoginTask {
    type Output = LoginInfo;

    fn name(&self) -> &'static str {
        "login"
    }

    fn resolve(&mut self) -> Result<LoginInfo> {
        let info = LoginInfo {
            user: linux::current_user().and_then(text),
            host: System::host_name().and_then(text),
        };

        if info.user.is_none() && info.host.is_none() {
            return Err(ResolverError::sensor_unavailable(
                "neither user nor host name available",
            ));
        }

        Ok(info)
    }
}
