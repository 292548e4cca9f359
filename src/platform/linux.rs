//! Linux-specific readers for procfs, sysfs and libc facilities.
//!
//! Parsers are plain functions over text so they can be tested on any
//! host; the readers around them are only functional on Linux.

use std::fs;
use std::path::Path;
use std::process::Command;

use crate::error::{ResolverError, Result};

const BOARD_NAME_PATH: &str = "/sys/devices/virtual/dmi/id/board_name";
const CPU_MAX_FREQ_PATH: &str = "/sys/devices/system/cpu/cpu0/cpufreq/cpuinfo_max_freq";
const OS_RELEASE_PATH: &str = "/etc/os-release";
const PROC_UPTIME_PATH: &str = "/proc/uptime";
const PROC_DISKSTATS_PATH: &str = "/proc/diskstats";
const SYS_BLOCK_DIR: &str = "/sys/block";

const SECTOR_SIZE: u64 = 512;

/// Motherboard name from DMI
pub fn read_board_name() -> Result<String> {
    let name = fs::read_to_string(BOARD_NAME_PATH)
        .map_err(|e| ResolverError::sensor_unavailable(format!("{}: {}", BOARD_NAME_PATH, e)))?;
    Ok(name.trim().to_string())
}

/// Max CPU clock in MHz, from cpufreq (reported in kHz)
pub fn read_cpu_max_mhz() -> Result<u64> {
    let raw = fs::read_to_string(CPU_MAX_FREQ_PATH).map_err(|e| {
        ResolverError::sensor_unavailable(format!("{}: {}", CPU_MAX_FREQ_PATH, e))
    })?;
    let khz: f64 = raw
        .trim()
        .parse()
        .map_err(|_| ResolverError::parse(format!("invalid cpu max freq: {:?}", raw.trim())))?;
    Ok((khz / 1000.0).round() as u64)
}

/// Fields of interest from os-release
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OsRelease {
    pub name: Option<String>,
    pub version: Option<String>,
    pub codename: Option<String>,
}

pub fn read_os_release() -> Result<OsRelease> {
    let content = fs::read_to_string(OS_RELEASE_PATH)?;
    Ok(parse_os_release(&content))
}

pub fn parse_os_release(content: &str) -> OsRelease {
    let mut release = OsRelease::default();

    for line in content.lines() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = value.trim().trim_matches('"').trim_matches('\'').to_string();
        if value.is_empty() {
            continue;
        }

        match key.trim() {
            "NAME" => release.name = Some(value),
            "VERSION_ID" => release.version = Some(value),
            "VERSION_CODENAME" => release.codename = Some(value),
            // Older releases only carry the codename here
            "UBUNTU_CODENAME" if release.codename.is_none() => release.codename = Some(value),
            _ => {}
        }
    }

    release
}

/// Raw uptime in seconds, via sysinfo(2) with /proc/uptime as fallback
pub fn read_uptime_secs() -> Result<f64> {
    #[cfg(target_os = "linux")]
    {
        let mut info: libc::sysinfo = unsafe { std::mem::zeroed() };
        // SAFETY: `info` is a properly sized, writable sysinfo struct
        if unsafe { libc::sysinfo(&mut info) } == 0 {
            return validate_uptime(info.uptime as f64);
        }
        log::debug!(
            target: "resolver::task::uptime",
            "sysinfo(2) failed, falling back to {}",
            PROC_UPTIME_PATH
        );
    }

    let content = fs::read_to_string(PROC_UPTIME_PATH)?;
    parse_proc_uptime(&content)
}

pub fn parse_proc_uptime(content: &str) -> Result<f64> {
    let first = content
        .split_whitespace()
        .next()
        .ok_or_else(|| ResolverError::parse("empty uptime file"))?;

    let secs: f64 = first
        .parse()
        .map_err(|_| ResolverError::parse(format!("non numeric uptime: {:?}", first)))?;

    validate_uptime(secs)
}

/// Negative or non-finite uptime is a failed read, never clamped
pub fn validate_uptime(secs: f64) -> Result<f64> {
    if !secs.is_finite() || secs < 0.0 {
        return Err(ResolverError::parse(format!("invalid uptime value: {}", secs)));
    }

    Ok(secs)
}

/// System-wide cumulative (read, written) bytes across physical disks
pub fn read_disk_io() -> Result<(u64, u64)> {
    let content = fs::read_to_string(PROC_DISKSTATS_PATH)?;
    Ok(parse_diskstats(&content, |name| {
        Path::new(SYS_BLOCK_DIR).join(name).exists()
    }))
}

/// Sum sectors read/written over whole disks accepted by `is_disk`.
/// Virtual devices (loop, ram, device-mapper) are always skipped to avoid
/// counting the same I/O twice.
pub fn parse_diskstats<F>(content: &str, is_disk: F) -> (u64, u64)
where
    F: Fn(&str) -> bool,
{
    let mut read = 0u64;
    let mut written = 0u64;

    for line in content.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 10 {
            continue;
        }

        let name = fields[2];
        if ["loop", "ram", "zram", "dm-"]
            .iter()
            .any(|prefix| name.starts_with(prefix))
        {
            continue;
        }
        if !is_disk(name) {
            continue;
        }

        let sectors_read: u64 = fields[5].parse().unwrap_or(0);
        let sectors_written: u64 = fields[9].parse().unwrap_or(0);

        read = read.saturating_add(sectors_read.saturating_mul(SECTOR_SIZE));
        written = written.saturating_add(sectors_written.saturating_mul(SECTOR_SIZE));
    }

    (read, written)
}

/// Active route towards a probe address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub interface: String,
    pub local_ip: Option<String>,
}

/// Look up the route to `probe` via `ip route get`.
/// `Ok(None)` means the host currently has no route.
pub fn route_get(probe: &str) -> Result<Option<Route>> {
    let output = Command::new("ip")
        .args(["route", "get", probe])
        .output()
        .map_err(|e| ResolverError::command(format!("failed to run ip route: {}", e)))?;

    if !output.status.success() || !output.stderr.is_empty() {
        log::debug!(
            target: "resolver::task::network",
            "no route to {}: {}",
            probe,
            String::from_utf8_lossy(&output.stderr).trim()
        );
        return Ok(None);
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    if stdout.trim().is_empty() {
        return Err(ResolverError::command("ip route returned no output"));
    }

    parse_route(&stdout)
        .map(Some)
        .ok_or_else(|| ResolverError::parse(format!("unexpected ip route output: {:?}", stdout.trim())))
}

/// Extract the interface (`dev`) and local address (`src`) of a route line
pub fn parse_route(output: &str) -> Option<Route> {
    let mut tokens = output.split_whitespace();
    let mut interface = None;
    let mut local_ip = None;

    while let Some(token) = tokens.next() {
        match token {
            "dev" => interface = tokens.next().map(str::to_string),
            "src" => local_ip = tokens.next().map(str::to_string),
            _ => {}
        }
    }

    interface.map(|interface| Route {
        interface,
        local_ip,
    })
}

/// Name of the user running the daemon
pub fn current_user() -> Option<String> {
    ["USER", "LOGNAME"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|v| !v.trim().is_empty())
        .or_else(passwd_name)
}

#[cfg(unix)]
fn passwd_name() -> Option<String> {
    use std::ffi::CStr;

    let mut buf = vec![0 as libc::c_char; 4096];
    let mut pwd: libc::passwd = unsafe { std::mem::zeroed() };
    let mut result: *mut libc::passwd = std::ptr::null_mut();

    // SAFETY: all pointers reference live, correctly sized buffers owned here
    let rc = unsafe {
        libc::getpwuid_r(
            libc::getuid(),
            &mut pwd,
            buf.as_mut_ptr(),
            buf.len(),
            &mut result,
        )
    };

    if rc != 0 || result.is_null() || pwd.pw_name.is_null() {
        return None;
    }

    // SAFETY: getpwuid_r succeeded, so pw_name points into `buf`
    let name = unsafe { CStr::from_ptr(pwd.pw_name) };
    Some(name.to_string_lossy().into_owned())
}

#[cfg(not(unix))]
fn passwd_name() -> Option<String> {
    None
}
