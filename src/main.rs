use anyhow::Result;
use clap::{Arg, Command};

use resolverd::commands;

fn main() -> Result<()> {
    let matches = Command::new("resolverd")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Publishes hardware and system telemetry snapshots for desktop widgets")
        .disable_version_flag(true)
        .arg(
            Arg::new("version")
                .short('v')
                .short_alias('V')
                .long("version")
                .help("Print version information")
                .action(clap::ArgAction::SetTrue)
        )
        .subcommand(commands::run::command())
        .get_matches();

    if matches.get_flag("version") {
        println!("resolverd version {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    match matches.subcommand() {
        Some(("run", sub_matches)) => {
            commands::run(sub_matches)?;
        }
        _ => {
            println!("resolverd: telemetry resolver daemon");
            println!("Use 'resolverd run' to start it or 'resolverd --help' for more information.");
        }
    }

    Ok(())
}
