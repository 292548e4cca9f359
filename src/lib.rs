// resolverd library - Public API

// Re-export error types
pub mod error;
pub use error::{ResolverError, Result};

// Module declarations
pub mod commands;
pub mod core;
pub mod platform;
pub mod utils;

// Re-export commonly used types
pub use crate::core::config::ResolverConfig;
pub use crate::core::resolver::{Resolver, ResolverHandle};

use std::fs::OpenOptions;
use std::path::Path;

/// Initialize logging.
///
/// Info by default, Debug when `debug` is set; `RUST_LOG` overrides both.
/// With a `log_file` the output is appended there instead of stderr.
pub fn init_logging(debug: bool, log_file: Option<&Path>) -> Result<()> {
    let level = if debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    let mut builder = env_logger::Builder::new();
    builder.filter_level(level).parse_default_env();

    if let Some(path) = log_file {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder
        .try_init()
        .map_err(|e| ResolverError::config(format!("logger already initialized: {}", e)))
}
