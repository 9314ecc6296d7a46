//! Configuration loading for capture sessions.
//!
//! Configuration is loaded from:
//! 1. a TOML file (base configuration)
//! 2. environment variables (prefixed with `FRAMESTACK_`)
//!
//! # Example
//! ```no_run
//! use framestack::config::CaptureConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CaptureConfig::load()?;
//! config.validate()?;
//! let reduction = config.build_reduction()?;
//! # Ok(())
//! # }
//! ```

use crate::error::{AppResult, FramestackError};
use crate::reduce::{Axis, AxisSum, Reduction, SpectralBin};
use crate::storage::FlushPolicy;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level capture configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Application settings.
    #[serde(default)]
    pub application: ApplicationSettings,
    /// Reduction selection and parameters.
    #[serde(default)]
    pub reduction: ReductionSettings,
    /// Scratch store and artifact placement.
    pub storage: StorageSettings,
}

/// Application-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationSettings {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ApplicationSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Reduction selection.
///
/// `kind` picks the transform; the remaining fields parameterize it and are
/// ignored by kinds that do not use them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReductionSettings {
    /// Reduction kind: `axis_sum` or `spectral_bin`.
    #[serde(default = "default_kind")]
    pub kind: String,
    /// Axis collapsed by `axis_sum`: `columns` or `rows`.
    #[serde(default = "default_axis")]
    pub axis: String,
    /// Columns per bin for `spectral_bin`.
    #[serde(default = "default_bin_factor")]
    pub bin_factor: u32,
}

impl Default for ReductionSettings {
    fn default() -> Self {
        Self {
            kind: default_kind(),
            axis: default_axis(),
            bin_factor: default_bin_factor(),
        }
    }
}

/// Storage placement and durability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Directory receiving the scratch store and the artifact.
    pub output_dir: PathBuf,
    /// Base name for `<base_name>.temp` and `<base_name>.tiff`.
    #[serde(default = "default_base_name")]
    pub base_name: String,
    /// Scratch flush policy: `every_row` or `batched`.
    #[serde(default = "default_flush")]
    pub flush: String,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_kind() -> String {
    "axis_sum".to_string()
}

fn default_axis() -> String {
    "columns".to_string()
}

fn default_bin_factor() -> u32 {
    8
}

fn default_base_name() -> String {
    "capture".to_string()
}

fn default_flush() -> String {
    "every_row".to_string()
}

impl CaptureConfig {
    /// Load configuration from `config/framestack.toml` and environment
    /// variables.
    ///
    /// Environment variables override file values with the `FRAMESTACK_`
    /// prefix, e.g. `FRAMESTACK_APPLICATION_LOG_LEVEL=debug`.
    pub fn load() -> AppResult<Self> {
        Self::load_from("config/framestack.toml")
    }

    /// Load configuration from a specific file path.
    pub fn load_from<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let config: Self = Figment::new()
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("FRAMESTACK_").split("_"))
            .extract()?;
        Ok(config)
    }

    /// Validate configuration after loading.
    pub fn validate(&self) -> AppResult<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.application.log_level.as_str()) {
            return Err(FramestackError::Configuration(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.application.log_level,
                valid_levels.join(", ")
            )));
        }

        let valid_kinds = ["axis_sum", "spectral_bin"];
        if !valid_kinds.contains(&self.reduction.kind.as_str()) {
            return Err(FramestackError::Configuration(format!(
                "Invalid reduction kind '{}'. Must be one of: {}",
                self.reduction.kind,
                valid_kinds.join(", ")
            )));
        }

        let valid_axes = ["columns", "rows"];
        if !valid_axes.contains(&self.reduction.axis.as_str()) {
            return Err(FramestackError::Configuration(format!(
                "Invalid reduction axis '{}'. Must be one of: {}",
                self.reduction.axis,
                valid_axes.join(", ")
            )));
        }

        if self.reduction.bin_factor == 0 {
            return Err(FramestackError::Configuration(
                "bin_factor must be at least 1".to_string(),
            ));
        }

        let valid_flush = ["every_row", "batched"];
        if !valid_flush.contains(&self.storage.flush.as_str()) {
            return Err(FramestackError::Configuration(format!(
                "Invalid flush policy '{}'. Must be one of: {}",
                self.storage.flush,
                valid_flush.join(", ")
            )));
        }

        if self.storage.base_name.is_empty() {
            return Err(FramestackError::Configuration(
                "base_name must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Build the configured reduction.
    ///
    /// The result is deterministic for a given configuration and must be
    /// constructed before the first frame is processed.
    pub fn build_reduction(&self) -> AppResult<Box<dyn Reduction>> {
        match self.reduction.kind.as_str() {
            "axis_sum" => {
                let axis = match self.reduction.axis.as_str() {
                    "columns" => Axis::Columns,
                    "rows" => Axis::Rows,
                    other => {
                        return Err(FramestackError::Configuration(format!(
                            "Invalid reduction axis '{}'",
                            other
                        )))
                    }
                };
                Ok(Box::new(AxisSum::new(axis)))
            }
            "spectral_bin" => Ok(Box::new(SpectralBin::new(self.reduction.bin_factor)?)),
            other => Err(FramestackError::Configuration(format!(
                "Invalid reduction kind '{}'",
                other
            ))),
        }
    }

    /// The configured scratch flush policy.
    pub fn flush_policy(&self) -> AppResult<FlushPolicy> {
        match self.storage.flush.as_str() {
            "every_row" => Ok(FlushPolicy::EveryRow),
            "batched" => Ok(FlushPolicy::Batched),
            other => Err(FramestackError::Configuration(format!(
                "Invalid flush policy '{}'",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> CaptureConfig {
        CaptureConfig {
            application: ApplicationSettings::default(),
            reduction: ReductionSettings::default(),
            storage: StorageSettings {
                output_dir: PathBuf::from("data"),
                base_name: "capture".to_string(),
                flush: "every_row".to_string(),
            },
        }
    }

    #[test]
    fn default_config_validates() {
        let config = test_config();
        assert!(config.validate().is_ok());
        assert_eq!(config.build_reduction().unwrap().name(), "axis_sum_columns");
        assert_eq!(config.flush_policy().unwrap(), FlushPolicy::EveryRow);
    }

    #[test]
    fn rejects_unknown_reduction_kind() {
        let mut config = test_config();
        config.reduction.kind = "median".to_string();
        assert!(config.validate().is_err());
        assert!(config.build_reduction().is_err());
    }

    #[test]
    fn rejects_invalid_log_level() {
        let mut config = test_config();
        config.application.log_level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_bin_factor() {
        let mut config = test_config();
        config.reduction.bin_factor = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn builds_spectral_bin_reduction() {
        let mut config = test_config();
        config.reduction.kind = "spectral_bin".to_string();
        config.reduction.bin_factor = 4;
        assert_eq!(config.build_reduction().unwrap().name(), "spectral_bin");
    }

    #[test]
    fn loads_from_toml_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("framestack.toml");
        std::fs::write(
            &path,
            r#"
[application]
log_level = "debug"

[reduction]
kind = "spectral_bin"
bin_factor = 16

[storage]
output_dir = "/tmp/captures"
base_name = "run42"
"#,
        )
        .unwrap();

        let config = CaptureConfig::load_from(&path).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.application.log_level, "debug");
        assert_eq!(config.reduction.bin_factor, 16);
        assert_eq!(config.storage.base_name, "run42");
        assert_eq!(config.storage.flush, "every_row");
    }
}
