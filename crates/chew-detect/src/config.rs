//! Detector configuration

use face_landmarks::{index, RatioMode};
use serde::{Deserialize, Serialize};

use crate::DetectError;

/// Largest accepted smoothing window or peak half-window (samples)
pub const MAX_WINDOW: usize = 1_024;

/// Hysteresis detector thresholds (relative openness, baseline = 1.0)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HysteresisConfig {
    /// Smoothed openness above which the jaw counts as open
    pub open_threshold: f64,

    /// Smoothed openness below which an open jaw counts as closed
    pub close_threshold: f64,

    /// Minimum time between two counted chews (milliseconds)
    pub cooldown_ms: u64,
}

impl Default for HysteresisConfig {
    fn default() -> Self {
        Self {
            open_threshold: 1.05,
            close_threshold: 1.01,
            cooldown_ms: 200,
        }
    }
}

/// Local-peak detector parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeakConfig {
    /// Samples on each side of a peak candidate
    pub half_window: usize,

    /// Minimum height above the preceding minimum
    pub min_peak_diff: f64,

    /// Minimum time between two counted chews (milliseconds)
    pub min_interval_ms: u64,
}

impl Default for PeakConfig {
    fn default() -> Self {
        Self {
            half_window: 5,
            min_peak_diff: 0.015,
            min_interval_ms: 400,
        }
    }
}

/// Event detection strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DetectorStrategy {
    /// Count on the open -> closed edge of a two-threshold state machine
    Hysteresis(HysteresisConfig),
    /// Count local maxima with enough prominence
    Peak(PeakConfig),
}

impl Default for DetectorStrategy {
    fn default() -> Self {
        DetectorStrategy::Peak(PeakConfig::default())
    }
}

/// Head-motion gate configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionGateConfig {
    /// Drop frames when head motion is too large
    pub enabled: bool,

    /// Landmark whose depth is tracked
    pub reference_landmark: usize,

    /// Multiplier applied to the raw depth delta
    pub scale_factor: f64,

    /// Scaled depth delta above which a frame is dropped
    pub stability_threshold: f64,
}

impl Default for MotionGateConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            reference_landmark: index::CHIN,
            scale_factor: 100.0,
            stability_threshold: 0.3,
        }
    }
}

/// Chew detection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Openness ratio definition
    pub ratio: RatioMode,

    /// Moving-average window (samples)
    pub smoothing_window: usize,

    /// Head-motion gate
    pub motion: MotionGateConfig,

    /// Event detection strategy
    pub strategy: DetectorStrategy,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            ratio: RatioMode::default(),
            smoothing_window: 5,
            motion: MotionGateConfig::default(),
            strategy: DetectorStrategy::default(),
        }
    }
}

impl DetectorConfig {
    /// Peak detector with default thresholds
    pub fn peak() -> Self {
        Self {
            strategy: DetectorStrategy::Peak(PeakConfig::default()),
            ..Default::default()
        }
    }

    /// Hysteresis detector with default thresholds
    pub fn hysteresis() -> Self {
        Self {
            strategy: DetectorStrategy::Hysteresis(HysteresisConfig::default()),
            ..Default::default()
        }
    }

    /// Check thresholds and window sizes
    pub fn validate(&self) -> Result<(), DetectError> {
        if self.smoothing_window == 0 {
            return Err(DetectError::Config("smoothing_window must be at least 1".into()));
        }
        if self.smoothing_window > MAX_WINDOW {
            return Err(DetectError::Config(format!(
                "smoothing_window {} exceeds {}",
                self.smoothing_window, MAX_WINDOW
            )));
        }
        if !self.motion.scale_factor.is_finite() || !self.motion.stability_threshold.is_finite() {
            return Err(DetectError::Config("motion gate values must be finite".into()));
        }

        match &self.strategy {
            DetectorStrategy::Hysteresis(h) => h.validate(),
            DetectorStrategy::Peak(p) => p.validate(),
        }
    }
}

impl HysteresisConfig {
    pub fn validate(&self) -> Result<(), DetectError> {
        if !self.open_threshold.is_finite() || !self.close_threshold.is_finite() {
            return Err(DetectError::Config("hysteresis thresholds must be finite".into()));
        }
        if self.close_threshold >= self.open_threshold {
            return Err(DetectError::Config(format!(
                "close_threshold {} must be below open_threshold {}",
                self.close_threshold, self.open_threshold
            )));
        }
        Ok(())
    }
}

impl PeakConfig {
    pub fn validate(&self) -> Result<(), DetectError> {
        if self.half_window == 0 {
            return Err(DetectError::Config("half_window must be at least 1".into()));
        }
        if self.half_window > MAX_WINDOW {
            return Err(DetectError::Config(format!(
                "half_window {} exceeds {}",
                self.half_window, MAX_WINDOW
            )));
        }
        if !self.min_peak_diff.is_finite() {
            return Err(DetectError::Config("min_peak_diff must be finite".into()));
        }
        Ok(())
    }
}
