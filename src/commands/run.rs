//! `run` command handler.
//!
//! Starts the resolver in the foreground and blocks until SIGINT/SIGTERM.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};

use crate::core::config::ResolverConfig;
use crate::core::resolver::Resolver;

/// The `run` subcommand and its flags
pub fn command() -> Command {
    Command::new("run")
        .about("Run the resolver in the foreground until SIGINT/SIGTERM")
        .arg(
            Arg::new("debug")
                .short('d')
                .long("debug")
                .help("Enable debug logging")
                .action(ArgAction::SetTrue)
        )
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .value_name("DIR")
                .help("Directory receiving the snapshot files")
                .value_parser(value_parser!(PathBuf))
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .value_name("FILE")
                .help("Append log output to FILE instead of stderr")
                .value_parser(value_parser!(PathBuf))
        )
        .arg(
            Arg::new("interval")
                .short('i')
                .long("interval")
                .value_name("MS")
                .help("Monitor loop cadence in milliseconds")
                .value_parser(value_parser!(u64))
        )
        .arg(
            Arg::new("uptime-interval")
                .long("uptime-interval")
                .value_name("MS")
                .help("Uptime loop cadence in milliseconds")
                .value_parser(value_parser!(u64))
        )
        .arg(
            Arg::new("public-ip-timeout")
                .long("public-ip-timeout")
                .value_name("MS")
                .help("Public IP lookup timeout in milliseconds (at most 2000)")
                .value_parser(value_parser!(u64))
                .conflicts_with("no-public-ip")
        )
        .arg(
            Arg::new("no-public-ip")
                .long("no-public-ip")
                .help("Skip the outbound public IP lookup")
                .action(ArgAction::SetTrue)
        )
        .arg(
            Arg::new("no-listeners")
                .long("no-listeners")
                .help("Do not count keyboard and mouse activity")
                .action(ArgAction::SetTrue)
        )
}

/// Execute the run command
pub fn execute(matches: &ArgMatches) -> Result<()> {
    let config = config_from_matches(matches);

    crate::init_logging(config.debug, config.log_file.as_deref())
        .context("Failed to initialize logging")?;

    let mut handle = match Resolver::start(config) {
        Ok(handle) => handle,
        Err(e) => {
            log::error!(target: "resolver", "startup failed: {}", e);
            return Err(e).context("Failed to start resolver");
        }
    };

    if let Err(e) = handle.install_signal_handler() {
        handle.stop();
        handle.join();
        return Err(e).context("Failed to install signal handlers");
    }

    handle.join();
    Ok(())
}

/// Build the daemon settings from the command line, on top of the defaults
pub fn config_from_matches(matches: &ArgMatches) -> ResolverConfig {
    let mut config = ResolverConfig::default();

    config.debug = matches.get_flag("debug");

    if let Some(dir) = matches.get_one::<PathBuf>("data-dir") {
        config.data_dir = dir.clone();
    }

    config.log_file = matches.get_one::<PathBuf>("log-file").cloned();

    if let Some(ms) = matches.get_one::<u64>("interval") {
        config.monitor_interval = Duration::from_millis(*ms);
    }

    if let Some(ms) = matches.get_one::<u64>("uptime-interval") {
        config.uptime_interval = Duration::from_millis(*ms);
    }

    if matches.get_flag("no-public-ip") {
        config.public_ip = None;
    } else if let (Some(public_ip), Some(ms)) = (
        config.public_ip.as_mut(),
        matches.get_one::<u64>("public-ip-timeout"),
    ) {
        public_ip.timeout = Duration::from_millis(*ms);
    }

    config.listeners = !matches.get_flag("no-listeners");

    config
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> ResolverConfig {
        let matches = command().try_get_matches_from(args).unwrap();
        config_from_matches(&matches)
    }

    #[test]
    fn test_defaults_without_flags() {
        let config = parse(&["run"]);
        assert_eq!(config, ResolverConfig::default());
    }

    #[test]
    fn test_flags_override_defaults() {
        let config = parse(&[
            "run",
            "--debug",
            "--data-dir",
            "/tmp/widgets",
            "--interval",
            "5000",
            "--uptime-interval",
            "500",
            "--public-ip-timeout",
            "800",
            "--no-listeners",
        ]);

        assert!(config.debug);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/widgets"));
        assert_eq!(config.monitor_interval, Duration::from_secs(5));
        assert_eq!(config.uptime_interval, Duration::from_millis(500));
        assert_eq!(
            config.public_ip.map(|p| p.timeout),
            Some(Duration::from_millis(800))
        );
        assert!(!config.listeners);
    }

    #[test]
    fn test_no_public_ip() {
        assert!(parse(&["run", "--no-public-ip"]).public_ip.is_none());
    }

    #[test]
    fn test_oversized_timeout_fails_validation() {
        let config = parse(&["run", "--public-ip-timeout", "5000"]);
        assert!(config.validate().is_err());
    }
}
