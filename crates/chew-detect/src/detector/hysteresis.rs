//! Two-threshold jaw state machine

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{cooldown_elapsed, ChewEvent, DetectorState, EventDetector};
use crate::config::HysteresisConfig;
use crate::DetectError;

/// Jaw position as seen by the hysteresis detector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum JawState {
    #[default]
    Closed,
    Open,
}

/// Counts a chew on every open -> closed transition outside the cooldown
#[derive(Debug, Clone)]
pub struct HysteresisDetector {
    config: HysteresisConfig,
    state: JawState,
    /// Highest value seen during the current open phase
    open_peak: f64,
    last_event_ms: Option<u64>,
}

impl HysteresisDetector {
    pub fn new(config: HysteresisConfig) -> Result<Self, DetectError> {
        config.validate()?;
        Ok(Self {
            config,
            state: JawState::Closed,
            open_peak: 0.0,
            last_event_ms: None,
        })
    }

    pub fn jaw_state(&self) -> JawState {
        self.state
    }
}

impl EventDetector for HysteresisDetector {
    fn on_sample(&mut self, value: f64, timestamp_ms: u64) -> Option<ChewEvent> {
        match self.state {
            JawState::Closed => {
                if value > self.config.open_threshold {
                    self.state = JawState::Open;
                    self.open_peak = value;
                }
                None
            }
            JawState::Open => {
                self.open_peak = self.open_peak.max(value);
                if value >= self.config.close_threshold {
                    return None;
                }

                self.state = JawState::Closed;
                if !cooldown_elapsed(self.last_event_ms, timestamp_ms, self.config.cooldown_ms) {
                    debug!("Chew at {}ms suppressed by cooldown", timestamp_ms);
                    return None;
                }

                self.last_event_ms = Some(timestamp_ms);
                debug!("Chew at {}ms (peak {:.3})", timestamp_ms, self.open_peak);
                Some(ChewEvent {
                    timestamp_ms,
                    amplitude: self.open_peak,
                })
            }
        }
    }

    fn reset(&mut self) {
        self.state = JawState::Closed;
        self.open_peak = 0.0;
        self.last_event_ms = None;
    }

    fn state(&self) -> DetectorState {
        DetectorState::Hysteresis {
            jaw: self.state,
            last_event_ms: self.last_event_ms,
        }
    }

    fn name(&self) -> &'static str {
        "HysteresisDetector"
    }
}
