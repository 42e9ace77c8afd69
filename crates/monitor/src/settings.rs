//! Runtime settings
//!
//! Layered with the `config` crate: built-in defaults, then an optional
//! file, then `CHEW_` environment variables (`__` between nested keys,
//! e.g. `CHEW_DETECTOR__SMOOTHING_WINDOW=7`).

use chew_detect::{DetectError, DetectorConfig};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::MonitorError;

/// Monitor settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Session refresh period (milliseconds)
    pub tick_interval_ms: u64,

    /// Frames buffered ahead of the detector
    pub frame_queue_capacity: usize,

    /// Max log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Emit JSON log lines
    pub log_json: bool,

    pub detector: DetectorConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            frame_queue_capacity: 64,
            log_level: "info".to_string(),
            log_json: false,
            detector: DetectorConfig::default(),
        }
    }
}

impl Settings {
    /// Load defaults, the file at `path` if given, then the environment
    pub fn load(path: Option<&Path>) -> Result<Self, MonitorError> {
        let mut builder = Self::defaults()?;
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        Self::build(builder)
    }

    /// Load defaults overlaid with a TOML document, then the environment
    pub fn from_toml(toml: &str) -> Result<Self, MonitorError> {
        let builder = Self::defaults()?.add_source(File::from_str(toml, FileFormat::Toml));
        Self::build(builder)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn validate(&self) -> Result<(), MonitorError> {
        if self.tick_interval_ms == 0 {
            return Err(DetectError::Config("tick_interval_ms must be positive".into()).into());
        }
        if self.frame_queue_capacity == 0 {
            return Err(DetectError::Config("frame_queue_capacity must be positive".into()).into());
        }
        self.detector.validate()?;
        Ok(())
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, MonitorError> {
        Ok(Config::builder().add_source(Config::try_from(&Settings::default())?))
    }

    fn build(builder: ConfigBuilder<DefaultState>) -> Result<Self, MonitorError> {
        let settings: Settings = builder
            .add_source(
                Environment::with_prefix("CHEW")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }
}
