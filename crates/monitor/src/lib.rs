//! Chew Monitor Runtime
//!
//! Runs the chew detector against a live frame stream:
//! - Synchronous `ChewMonitor` (pipeline + session + clock)
//! - Async `MonitorService` with a single-consumer frame queue and a 1 s tick
//! - Snapshot and feedback watch channels
//! - Layered settings and logging setup

pub mod clock;
pub mod engine;
pub mod service;
pub mod settings;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use engine::{ChewMonitor, MonitorSnapshot};
pub use service::MonitorService;
pub use settings::Settings;

use chew_detect::DetectError;
use session::SessionError;
use std::str::FromStr;
use thiserror::Error;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Monitor error types
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error(transparent)]
    Detect(#[from] DetectError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("Frame queue full; frame dropped")]
    QueueFull,

    #[error("Monitor service stopped")]
    Stopped,

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

/// Initialize logging
pub fn init_logging(level: &str, json: bool) -> Result<(), MonitorError> {
    let level = Level::from_str(level).map_err(|e| MonitorError::Logging(e.to_string()))?;

    let result = if json {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .with_target(true)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    } else {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .with_target(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    };

    result.map_err(|e| MonitorError::Logging(e.to_string()))
}
