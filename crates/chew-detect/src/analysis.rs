//! Per-frame pipeline results

use face_landmarks::LandmarkError;
use serde::{Deserialize, Serialize};

use crate::detector::ChewEvent;

/// What the pipeline did with one frame
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    /// No face in the frame; nothing changed
    NoFace,

    /// Frame unusable (missing landmarks, degenerate geometry); state kept
    Skipped(LandmarkError),

    /// Ratio cached for calibration only (not tracking)
    Observed { ratio: f64 },

    /// Dropped by the motion gate before smoothing
    Gated { ratio: f64, motion: f64 },

    /// Frame reached the detector
    Accepted {
        ratio: f64,
        /// Ratio divided by the baseline
        relative: f64,
        /// Moving average fed to the detector
        smoothed: f64,
        event: Option<ChewEvent>,
    },
}

impl FrameOutcome {
    /// Event fired by this frame, if any
    pub fn event(&self) -> Option<ChewEvent> {
        match self {
            FrameOutcome::Accepted { event, .. } => *event,
            _ => None,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, FrameOutcome::Accepted { .. })
    }
}

/// Frame counters since the pipeline was created or reset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStats {
    pub frames_seen: u64,
    pub frames_without_face: u64,
    pub frames_skipped: u64,
    pub frames_gated: u64,
    pub frames_accepted: u64,
    pub events: u64,
}

impl PipelineStats {
    /// Fraction of tracked frames dropped by the motion gate
    pub fn gated_ratio(&self) -> f64 {
        let tracked = self.frames_gated + self.frames_accepted;
        if tracked == 0 {
            return 0.0;
        }
        self.frames_gated as f64 / tracked as f64
    }
}
