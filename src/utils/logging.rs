//! Logging setup for the binary

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable text
    Pretty,
    /// JSON lines for log shippers
    Json,
}

impl LogFormat {
    pub fn from_flag(json: bool) -> Self {
        if json {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }
}

/// Build the filter: `RUST_LOG` wins, then `level` (a level name or a full directive)
pub fn build_filter(level: &str) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(level).map_err(|e| anyhow!("Invalid log level '{}': {}", level, e))
}

/// Install the global subscriber. Logs go to stderr so stdout stays parseable.
pub fn init_logging(level: &str, format: LogFormat) -> Result<()> {
    let filter = build_filter(level)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let installed = match format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|e| anyhow!("Failed to initialize logging: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_flag() {
        assert_eq!(LogFormat::from_flag(true), LogFormat::Json);
        assert_eq!(LogFormat::from_flag(false), LogFormat::Pretty);
    }

    #[test]
    fn test_filter_accepts_directives() {
        std::env::remove_var("RUST_LOG");
        assert!(build_filter("debug").is_ok());
        assert!(build_filter("stillcast=trace,warn").is_ok());
    }
}
