//! Logging initialization and configuration.
//!
//! Uses the `tracing` ecosystem with an optional stderr layer (pretty or
//! JSON) and an optional plain-text log file.

use std::fs::OpenOptions;
use std::sync::Mutex;

use pdfimages_core::config::LoggingConfig;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the logging subsystem from the `logging` config section.
///
/// # Notes
///
/// - Console output goes to stderr so it interleaves with the progress bar
/// - The RUST_LOG environment variable overrides the configured level
/// - The log file is appended to and never carries ANSI colour codes
pub fn init(config: &LoggingConfig) -> anyhow::Result<()> {
    let level = config.tracing_level().unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let console = config.console.then(|| {
        if config.format == "json" {
            fmt::layer().json().with_writer(std::io::stderr).boxed()
        } else {
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .with_ansi(true)
                .boxed()
        }
    });

    let file = match &config.file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| anyhow::anyhow!("Cannot open log file {:?}: {e}", path))?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init()?;
    Ok(())
}
