//! Baseline calibration
//!
//! The baseline is the openness ratio at rest, captured when tracking
//! starts. Every later ratio is divided by it so the detectors work on a
//! relative scale where 1.0 means "as closed as at start".

use tracing::{debug, info};

use crate::DetectError;

/// Caches the latest ratio and holds the session baseline
#[derive(Debug, Clone, Default)]
pub struct BaselineCalibrator {
    /// Most recent well-formed ratio seen since the last reset
    latest: Option<f64>,
    baseline: Option<f64>,
}

impl BaselineCalibrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember the ratio of the newest frame
    pub fn observe(&mut self, ratio: f64) {
        if ratio.is_finite() && ratio > 0.0 {
            self.latest = Some(ratio);
        } else {
            debug!("Ignoring malformed ratio {}", ratio);
        }
    }

    /// Capture the cached ratio as the baseline
    pub fn calibrate(&mut self) -> Result<f64, DetectError> {
        let ratio = self.latest.ok_or(DetectError::NoFaceDetected)?;
        self.calibrate_with(ratio)
    }

    /// Capture an explicit ratio as the baseline
    pub fn calibrate_with(&mut self, ratio: f64) -> Result<f64, DetectError> {
        if !ratio.is_finite() || ratio <= 0.0 {
            return Err(DetectError::NoFaceDetected);
        }
        info!("Baseline captured: {:.4}", ratio);
        self.baseline = Some(ratio);
        Ok(ratio)
    }

    /// Express a ratio relative to the baseline
    pub fn normalize(&self, ratio: f64) -> Option<f64> {
        self.baseline.map(|base| ratio / base)
    }

    pub fn baseline(&self) -> Option<f64> {
        self.baseline
    }

    pub fn latest(&self) -> Option<f64> {
        self.latest
    }

    pub fn is_calibrated(&self) -> bool {
        self.baseline.is_some()
    }

    /// Forget both the baseline and the cached ratio
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
