//! Chew Event Detection
//!
//! Turns a stream of face landmark frames into discrete chew events:
//! - Mouth-openness ratio per frame
//! - Baseline calibration at tracking start
//! - Moving-average smoothing
//! - Head-motion gating
//! - Hysteresis or peak event detection with a refractory period

pub mod analysis;
pub mod baseline;
pub mod config;
pub mod detector;
pub mod motion;
pub mod smoothing;

pub use analysis::{FrameOutcome, PipelineStats};
pub use baseline::BaselineCalibrator;
pub use config::{DetectorConfig, DetectorStrategy, HysteresisConfig, MotionGateConfig, PeakConfig};
pub use detector::{
    build_detector, ChewEvent, DetectorState, EventDetector, HysteresisDetector, JawState,
    PeakDetector,
};
pub use motion::{GateDecision, MotionGate};
pub use smoothing::SmoothingFilter;

use face_landmarks::{LandmarkError, LandmarkFrame, RatioExtractor};
use thiserror::Error;
use tracing::{debug, info};

/// Detection error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DetectError {
    #[error("No face detected; face the camera before starting")]
    NoFaceDetected,

    #[error(transparent)]
    Landmarks(#[from] LandmarkError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Per-frame chew detection pipeline
///
/// Frames must be fed in arrival order: the smoothing window and detector
/// state are order-sensitive.
pub struct ChewPipeline {
    config: DetectorConfig,
    extractor: RatioExtractor,
    calibrator: BaselineCalibrator,
    smoothing: SmoothingFilter,
    motion_gate: MotionGate,
    detector: Box<dyn EventDetector>,
    stats: PipelineStats,
}

impl ChewPipeline {
    /// Create a new pipeline with configuration
    pub fn new(config: DetectorConfig) -> Result<Self, DetectError> {
        config.validate()?;
        let detector = build_detector(&config.strategy)?;
        info!(
            "Chew pipeline created: {} over {}-sample window",
            detector.name(),
            config.smoothing_window
        );

        let extractor = RatioExtractor::new(config.ratio);
        debug!("Ratio reads landmarks {:?}", extractor.required_indices());

        Ok(Self {
            extractor,
            calibrator: BaselineCalibrator::new(),
            smoothing: SmoothingFilter::new(config.smoothing_window)?,
            motion_gate: MotionGate::new(config.motion.clone()),
            detector,
            stats: PipelineStats::default(),
            config,
        })
    }

    /// Cache a frame's ratio for later calibration without detecting
    pub fn observe(&mut self, frame: Option<&LandmarkFrame>) -> FrameOutcome {
        let Some(frame) = self.face(frame) else {
            return FrameOutcome::NoFace;
        };
        match self.ratio_of(frame) {
            Ok(ratio) => FrameOutcome::Observed { ratio },
            Err(e) => self.skip(e),
        }
    }

    /// Run a frame through gating, smoothing and detection
    pub fn process(&mut self, frame: Option<&LandmarkFrame>, timestamp_ms: u64) -> FrameOutcome {
        let Some(frame) = self.face(frame) else {
            return FrameOutcome::NoFace;
        };
        let ratio = match self.ratio_of(frame) {
            Ok(ratio) => ratio,
            Err(e) => return self.skip(e),
        };

        let Some(relative) = self.calibrator.normalize(ratio) else {
            return FrameOutcome::Observed { ratio };
        };

        let decision = match self.motion_gate.check(frame) {
            Ok(decision) => decision,
            Err(e) => return self.skip(e),
        };
        if let GateDecision::Rejected { motion } = decision {
            self.stats.frames_gated += 1;
            return FrameOutcome::Gated { ratio, motion };
        }

        self.smoothing.push(relative);
        let smoothed = self.smoothing.current_average().unwrap_or(relative);
        let event = self.detector.on_sample(smoothed, timestamp_ms);

        self.stats.frames_accepted += 1;
        if event.is_some() {
            self.stats.events += 1;
        }

        FrameOutcome::Accepted {
            ratio,
            relative,
            smoothed,
            event,
        }
    }

    /// Capture the baseline from the latest frame and start a fresh detection run
    pub fn calibrate(&mut self) -> Result<f64, DetectError> {
        let baseline = self.calibrator.calibrate()?;
        self.restart_detection();
        Ok(baseline)
    }

    /// Capture an explicit baseline and start a fresh detection run
    pub fn calibrate_with(&mut self, ratio: f64) -> Result<f64, DetectError> {
        let baseline = self.calibrator.calibrate_with(ratio)?;
        self.restart_detection();
        Ok(baseline)
    }

    /// Clear baseline, cached ratio, windows and counters
    pub fn reset(&mut self) {
        self.calibrator.reset();
        self.restart_detection();
        self.stats = PipelineStats::default();
        debug!("Chew pipeline reset");
    }

    pub fn baseline(&self) -> Option<f64> {
        self.calibrator.baseline()
    }

    pub fn is_calibrated(&self) -> bool {
        self.calibrator.is_calibrated()
    }

    pub fn detector_state(&self) -> DetectorState {
        self.detector.state()
    }

    pub fn detector_name(&self) -> &'static str {
        self.detector.name()
    }

    /// Smoothing window contents, oldest first
    pub fn smoothing_window(&self) -> Vec<f64> {
        self.smoothing.values()
    }

    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    fn restart_detection(&mut self) {
        self.smoothing.reset();
        self.motion_gate.reset();
        self.detector.reset();
    }

    /// Count the frame and filter out frames without a face
    fn face<'a>(&mut self, frame: Option<&'a LandmarkFrame>) -> Option<&'a LandmarkFrame> {
        self.stats.frames_seen += 1;
        let face = frame.filter(|f| !f.is_empty());
        if face.is_none() {
            self.stats.frames_without_face += 1;
        }
        face
    }

    fn ratio_of(&mut self, frame: &LandmarkFrame) -> Result<f64, LandmarkError> {
        let ratio = self.extractor.extract(frame)?;
        self.calibrator.observe(ratio);
        Ok(ratio)
    }

    fn skip(&mut self, error: LandmarkError) -> FrameOutcome {
        debug!("Frame skipped: {}", error);
        self.stats.frames_skipped += 1;
        FrameOutcome::Skipped(error)
    }
}
