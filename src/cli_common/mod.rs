//! Shared CLI helpers
//!
//! - logging initialisation
//! - colored status messages
//! - output formatting

use anyhow::Result;
use colored::Colorize;
use std::path::Path;
use tracing_subscriber::EnvFilter;

pub mod output;

pub use output::{OutputFormat, OutputWriter};

/// Verbosity selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
}

impl Verbosity {
    pub fn from_flags(verbose: bool, quiet: bool) -> Self {
        match (verbose, quiet) {
            (true, _) => Verbosity::Verbose,
            (false, true) => Verbosity::Quiet,
            (false, false) => Verbosity::Normal,
        }
    }

    fn level(self) -> tracing::Level {
        match self {
            Verbosity::Quiet => tracing::Level::WARN,
            Verbosity::Normal => tracing::Level::INFO,
            Verbosity::Verbose => tracing::Level::DEBUG,
        }
    }
}

/// Initialises logging to stderr; `RUST_LOG` directives are honoured
pub fn init_logging(verbosity: Verbosity) -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive(verbosity.level().into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialise logging: {}", e))?;

    Ok(())
}

pub fn print_success(message: &str) {
    println!("{} {}", "✅".green(), message.green());
}

pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠️".yellow(), message.yellow());
}

/// Fails when `path` does not exist
pub fn validate_path(path: &Path, description: &str) -> Result<()> {
    if !path.exists() {
        return Err(anyhow::anyhow!(
            "{} does not exist: {}",
            description,
            path.display()
        ));
    }
    Ok(())
}

/// Human-readable duration
pub fn format_duration(duration: std::time::Duration) -> String {
    let secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if secs == 0 {
        format!("{}ms", millis)
    } else if secs < 60 {
        format!("{}.{:03}s", secs, millis)
    } else {
        let mins = secs / 60;
        let secs = secs % 60;
        format!("{}m {}s", mins, secs)
    }
}
