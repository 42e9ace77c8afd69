//! Chew event detectors
//!
//! Both strategies consume the smoothed relative-openness stream and apply
//! their refractory period on sample timestamps, never on frame counts, so
//! uneven frame arrival does not change what gets counted.

mod hysteresis;
mod peak;

pub use hysteresis::{HysteresisDetector, JawState};
pub use peak::PeakDetector;

use serde::{Deserialize, Serialize};

use crate::config::DetectorStrategy;
use crate::DetectError;

/// One counted chew
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChewEvent {
    /// Timestamp of the sample that fired the event (milliseconds)
    pub timestamp_ms: u64,
    /// Peak openness (hysteresis) or peak prominence (peak detector)
    pub amplitude: f64,
}

/// Inspectable detector state
#[derive(Debug, Clone, PartialEq)]
pub enum DetectorState {
    Hysteresis {
        jaw: JawState,
        last_event_ms: Option<u64>,
    },
    Peak {
        samples: Vec<f64>,
        last_event_ms: Option<u64>,
    },
}

/// Turns a smoothed sample stream into discrete chew events
pub trait EventDetector: Send {
    /// Feed one smoothed sample
    fn on_sample(&mut self, value: f64, timestamp_ms: u64) -> Option<ChewEvent>;

    /// Return to the initial state
    fn reset(&mut self);

    /// Snapshot of the internal state
    fn state(&self) -> DetectorState;

    fn name(&self) -> &'static str;
}

/// Build the detector selected by configuration
pub fn build_detector(strategy: &DetectorStrategy) -> Result<Box<dyn EventDetector>, DetectError> {
    Ok(match strategy {
        DetectorStrategy::Hysteresis(config) => Box::new(HysteresisDetector::new(config.clone())?),
        DetectorStrategy::Peak(config) => Box::new(PeakDetector::new(config.clone())?),
    })
}

/// Refractory check shared by both strategies
fn cooldown_elapsed(last_event_ms: Option<u64>, timestamp_ms: u64, cooldown_ms: u64) -> bool {
    last_event_ms.map_or(true, |last| timestamp_ms.saturating_sub(last) >= cooldown_ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{HysteresisConfig, PeakConfig};

    #[test]
    fn test_build_by_strategy() {
        let detector = build_detector(&DetectorStrategy::Peak(PeakConfig::default())).unwrap();
        assert_eq!(detector.name(), "PeakDetector");

        let detector =
            build_detector(&DetectorStrategy::Hysteresis(HysteresisConfig::default())).unwrap();
        assert_eq!(detector.name(), "HysteresisDetector");
    }

    #[test]
    fn test_cooldown_elapsed() {
        assert!(cooldown_elapsed(None, 0, 200));
        assert!(!cooldown_elapsed(Some(1000), 1199, 200));
        assert!(cooldown_elapsed(Some(1000), 1200, 200));
        // Out-of-order timestamps never fire inside the cooldown
        assert!(!cooldown_elapsed(Some(1000), 900, 200));
    }
}
