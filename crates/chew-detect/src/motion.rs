//! Head-motion gate
//!
//! Nodding or leaning changes the apparent jaw distance as much as chewing
//! does. The gate watches the depth of one reference landmark and drops any
//! frame where it jumps, before the frame reaches smoothing or detection.

use face_landmarks::{LandmarkError, LandmarkFrame};
use tracing::debug;

use crate::config::MotionGateConfig;

/// Gate verdict for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GateDecision {
    /// Head steady enough; `motion` is the scaled depth delta
    Accepted { motion: f64 },
    /// Head moved; the frame must not touch detector state
    Rejected { motion: f64 },
}

impl GateDecision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, GateDecision::Accepted { .. })
    }
}

/// Depth-delta motion gate
#[derive(Debug, Clone)]
pub struct MotionGate {
    config: MotionGateConfig,
    /// Reference depth of the previous frame
    last_depth: Option<f64>,
}

impl MotionGate {
    pub fn new(config: MotionGateConfig) -> Self {
        Self {
            config,
            last_depth: None,
        }
    }

    /// Judge a frame by its reference landmark depth
    pub fn check(&mut self, frame: &LandmarkFrame) -> Result<GateDecision, LandmarkError> {
        let depth = frame.landmark(self.config.reference_landmark)?.z;
        Ok(self.check_depth(depth))
    }

    /// Judge a raw reference depth.
    ///
    /// The reference follows every observed frame, so once the head settles
    /// in a new position frames are admitted again.
    pub fn check_depth(&mut self, depth: f64) -> GateDecision {
        let motion = match self.last_depth.replace(depth) {
            Some(previous) => (depth - previous).abs() * self.config.scale_factor,
            None => 0.0,
        };

        if self.config.enabled && motion > self.config.stability_threshold {
            debug!(
                "Frame gated: motion {:.3} > {:.3}",
                motion, self.config.stability_threshold
            );
            GateDecision::Rejected { motion }
        } else {
            GateDecision::Accepted { motion }
        }
    }

    /// Forget the reference depth
    pub fn reset(&mut self) {
        self.last_depth = None;
    }

    pub fn config(&self) -> &MotionGateConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_frame_accepted() {
        let mut gate = MotionGate::new(MotionGateConfig::default());
        assert_eq!(gate.check_depth(-0.08), GateDecision::Accepted { motion: 0.0 });
    }

    #[test]
    fn test_large_depth_jump_rejected() {
        let mut gate = MotionGate::new(MotionGateConfig::default());
        gate.check_depth(-0.050);

        // 0.001 * 100 = 0.1, below 0.3
        assert!(gate.check_depth(-0.051).is_accepted());
        // 0.01 * 100 = 1.0, above 0.3
        assert!(!gate.check_depth(-0.061).is_accepted());
    }

    #[test]
    fn test_reference_follows_rejected_frames() {
        let mut gate = MotionGate::new(MotionGateConfig::default());
        gate.check_depth(0.0);
        assert!(!gate.check_depth(0.02).is_accepted());
        // Head settled at the new depth
        assert!(gate.check_depth(0.0201).is_accepted());
    }

    #[test]
    fn test_disabled_gate_accepts_everything() {
        let mut gate = MotionGate::new(MotionGateConfig {
            enabled: false,
            ..Default::default()
        });
        gate.check_depth(0.0);
        assert!(gate.check_depth(0.5).is_accepted());
    }

    #[test]
    fn test_missing_reference_landmark() {
        let mut gate = MotionGate::new(MotionGateConfig::default());
        let frame = LandmarkFrame::sparse(&[(0, Default::default())]);
        assert!(matches!(
            gate.check(&frame),
            Err(LandmarkError::MissingLandmarks { index: 152, .. })
        ));
    }
}
