//! Diagnostics go to stderr so rendered documentation can be piped from stdout.

use anyhow::{anyhow, Result};
use std::io;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

const LOG_FILTER: &str = "RUST_LOG";

#[derive(Debug, Default, Clone, Copy)]
pub struct LogOptions {
    /// Number of `-v` flags.
    pub verbosity: u8,
    pub quiet: bool,
}

impl LogOptions {
    /// Explicit flags win over `RUST_LOG`.
    fn level_override(self) -> Option<LevelFilter> {
        if self.quiet {
            return Some(LevelFilter::OFF);
        }
        match self.verbosity {
            0 => None,
            1 => Some(LevelFilter::DEBUG),
            _ => Some(LevelFilter::TRACE),
        }
    }
}

fn env_filter(options: LogOptions) -> Result<EnvFilter> {
    if let Some(level) = options.level_override() {
        return Ok(EnvFilter::new(level.to_string()));
    }
    match std::env::var_os(LOG_FILTER) {
        Some(_) => EnvFilter::try_from_default_env()
            .map_err(|e| anyhow!("invalid `{LOG_FILTER}` provided: {e}")),
        None => Ok(EnvFilter::new("info")),
    }
}

/// `RUST_LOG` sets the minimum level when no flag does; default is `info`.
pub fn init_tracing_subscriber(options: LogOptions) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(options)?)
        .with_ansi(false)
        .with_file(false)
        .with_line_number(false)
        .without_time()
        .with_target(false)
        .with_writer(io::stderr)
        .try_init()
        .map_err(|e| anyhow!("failed to install log subscriber: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_environment() {
        let level = |verbosity, quiet| LogOptions { verbosity, quiet }.level_override();
        assert_eq!(level(0, false), None);
        assert_eq!(level(1, false), Some(LevelFilter::DEBUG));
        assert_eq!(level(3, false), Some(LevelFilter::TRACE));
        assert_eq!(level(2, true), Some(LevelFilter::OFF));
    }
}
