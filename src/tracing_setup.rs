//! Tracing infrastructure.
//!
//! Structured logging for the capture pipeline using the `tracing` and
//! `tracing-subscriber` crates: leveled events, environment-based filtering
//! through `RUST_LOG`, and pretty or compact output.
//!
//! # Example
//! ```no_run
//! use framestack::{config::CaptureConfig, tracing_setup};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CaptureConfig::load()?;
//! tracing_setup::init_from_config(&config)?;
//! tracing::info!("Capture starting");
//! # Ok(())
//! # }
//! ```

use crate::config::CaptureConfig;
use crate::error::{AppResult, FramestackError};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Output format for tracing.
#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    /// Default format with full event fields (for development).
    Pretty,
    /// Compact single-line format (for production).
    Compact,
}

/// Tracing configuration options.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Log level (trace, debug, info, warn, error).
    pub level: Level,
    /// Output format.
    pub format: OutputFormat,
    /// Whether to enable ANSI colors.
    pub with_ansi: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: OutputFormat::Pretty,
            with_ansi: true,
        }
    }
}

impl TracingConfig {
    /// Create tracing config from a loaded capture configuration.
    pub fn from_capture_config(config: &CaptureConfig) -> AppResult<Self> {
        Ok(Self {
            level: parse_log_level(&config.application.log_level)?,
            ..Default::default()
        })
    }

    /// Create tracing config with a custom level.
    pub fn new(level: Level) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    /// Set output format.
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Enable or disable ANSI colors.
    pub fn with_ansi(mut self, enabled: bool) -> Self {
        self.with_ansi = enabled;
        self
    }
}

/// Parse a log level name.
pub fn parse_log_level(level: &str) -> AppResult<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        other => Err(FramestackError::Configuration(format!(
            "Invalid log level '{}'",
            other
        ))),
    }
}

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level when set. Fails if
/// a global subscriber is already installed.
pub fn init(config: &TracingConfig) -> AppResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.to_string()));

    let result = match config.format {
        OutputFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(config.with_ansi)
            .try_init(),
        OutputFormat::Compact => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(config.with_ansi)
            .compact()
            .try_init(),
    };

    result.map_err(|e| {
        FramestackError::Configuration(format!("Failed to initialize tracing: {}", e))
    })
}

/// Initialize tracing from a loaded capture configuration.
pub fn init_from_config(config: &CaptureConfig) -> AppResult<()> {
    init(&TracingConfig::from_capture_config(config)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_level_names() {
        assert_eq!(parse_log_level("trace").unwrap(), Level::TRACE);
        assert_eq!(parse_log_level("INFO").unwrap(), Level::INFO);
        assert_eq!(parse_log_level("Error").unwrap(), Level::ERROR);
    }

    #[test]
    fn rejects_unknown_level_names() {
        assert!(parse_log_level("verbose").is_err());
        assert!(parse_log_level("").is_err());
    }

    #[test]
    fn default_config_is_info_pretty() {
        let config = TracingConfig::default();
        assert_eq!(config.level, Level::INFO);
        assert!(config.with_ansi);
    }
}
