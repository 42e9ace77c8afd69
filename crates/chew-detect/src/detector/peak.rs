//! Windowed local-peak detector
//!
//! Keeps the last `2W + 1` samples. Once full, the middle sample is a peak
//! when it strictly exceeds everything on both sides; its prominence is its
//! height above the lowest of the `W` samples before it. Events therefore
//! lag the signal by `W` samples.

use ring_buffer::RingBuffer;
use tracing::debug;

use super::{cooldown_elapsed, ChewEvent, DetectorState, EventDetector};
use crate::config::PeakConfig;
use crate::DetectError;

/// Counts prominent local maxima outside the minimum interval
#[derive(Debug, Clone)]
pub struct PeakDetector {
    config: PeakConfig,
    samples: RingBuffer<f64>,
    last_event_ms: Option<u64>,
}

impl PeakDetector {
    pub fn new(config: PeakConfig) -> Result<Self, DetectError> {
        config.validate()?;
        let capacity = config
            .half_window
            .checked_mul(2)
            .and_then(|n| n.checked_add(1))
            .ok_or_else(|| DetectError::Config("peak window overflows".into()))?;
        let samples = RingBuffer::new(capacity)
            .map_err(|e| DetectError::Config(format!("peak window: {}", e)))?;
        Ok(Self {
            config,
            samples,
            last_event_ms: None,
        })
    }

    /// Prominence of the middle sample if it is a strict local maximum
    fn middle_peak(&self) -> Option<f64> {
        let w = self.config.half_window;
        let candidate = *self.samples.get(w)?;

        let max_before = self.samples.iter().take(w).copied().fold(f64::NEG_INFINITY, f64::max);
        let max_after = self.samples.iter().skip(w + 1).copied().fold(f64::NEG_INFINITY, f64::max);
        if candidate <= max_before || candidate <= max_after {
            return None;
        }

        let min_before = self.samples.iter().take(w).copied().fold(f64::INFINITY, f64::min);
        Some(candidate - min_before)
    }
}

impl EventDetector for PeakDetector {
    fn on_sample(&mut self, value: f64, timestamp_ms: u64) -> Option<ChewEvent> {
        self.samples.push(value);
        if !self.samples.is_full() {
            return None;
        }

        let prominence = self.middle_peak()?;
        if prominence <= self.config.min_peak_diff {
            return None;
        }
        if !cooldown_elapsed(self.last_event_ms, timestamp_ms, self.config.min_interval_ms) {
            debug!("Peak at {}ms suppressed by minimum interval", timestamp_ms);
            return None;
        }

        self.last_event_ms = Some(timestamp_ms);
        debug!("Chew at {}ms (prominence {:.4})", timestamp_ms, prominence);
        Some(ChewEvent {
            timestamp_ms,
            amplitude: prominence,
        })
    }

    fn reset(&mut self) {
        self.samples.clear();
        self.last_event_ms = None;
    }

    fn state(&self) -> DetectorState {
        DetectorState::Peak {
            samples: self.samples.to_vec(),
            last_event_ms: self.last_event_ms,
        }
    }

    fn name(&self) -> &'static str {
        "PeakDetector"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector(half_window: usize, min_peak_diff: f64, min_interval_ms: u64) -> PeakDetector {
        PeakDetector::new(PeakConfig {
            half_window,
            min_peak_diff,
            min_interval_ms,
        })
        .unwrap()
    }

    /// Feed samples 100ms apart, returning event timestamps
    fn run(detector: &mut PeakDetector, values: &[f64]) -> Vec<u64> {
        values
            .iter()
            .enumerate()
            .filter_map(|(i, &v)| detector.on_sample(v, i as u64 * 100))
            .map(|e| e.timestamp_ms)
            .collect()
    }

    #[test]
    fn test_single_peak_fires_after_half_window() {
        let mut d = detector(2, 0.015, 400);
        let events = run(&mut d, &[1.0, 1.0, 1.1, 1.0, 1.0]);

        // Peak sits in the middle once the fifth sample arrives
        assert_eq!(events, vec![400]);
    }

    #[test]
    fn test_huge_half_window_is_a_config_error() {
        let result = PeakDetector::new(PeakConfig {
            half_window: usize::MAX / 2 + 1,
            ..Default::default()
        });
        assert!(matches!(result, Err(DetectError::Config(_))));
    }

    #[test]
    fn test_no_event_until_window_full() {
        let mut d = detector(5, 0.015, 400);
        let events = run(&mut d, &[1.0, 1.2, 1.0, 1.2, 1.0, 1.2, 1.0, 1.2, 1.0, 1.2]);
        assert!(events.is_empty());
    }

    #[test]
    fn test_small_prominence_ignored() {
        let mut d = detector(2, 0.015, 400);
        assert!(run(&mut d, &[1.0, 1.0, 1.01, 1.0, 1.0]).is_empty());
    }

    #[test]
    fn test_plateau_is_not_a_peak() {
        let mut d = detector(1, 0.015, 0);
        assert!(run(&mut d, &[1.0, 1.1, 1.1, 1.0]).is_empty());
    }

    #[test]
    fn test_minimum_interval() {
        let mut d = detector(1, 0.015, 400);
        // Peaks at samples 1, 3 and 6; detected one sample later
        let events = run(&mut d, &[1.0, 1.1, 1.0, 1.1, 1.0, 1.0, 1.1, 1.0]);

        // 200 fires, 400 is only 200ms later, 700 is 500ms later
        assert_eq!(events, vec![200, 700]);
    }

    #[test]
    fn test_prominence_against_preceding_minimum() {
        let mut d = detector(2, 0.05, 0);
        let mut event = None;
        for (i, v) in [0.95, 1.0, 1.08, 1.02, 1.01].iter().enumerate() {
            event = d.on_sample(*v, i as u64 * 100).or(event);
        }

        let event = event.unwrap();
        assert!((event.amplitude - 0.13).abs() < 1e-9);
    }

    #[test]
    fn test_reset_clears_window() {
        let mut d = detector(2, 0.015, 400);
        run(&mut d, &[1.0, 1.0, 1.1, 1.0, 1.0]);
        d.reset();

        assert_eq!(
            d.state(),
            DetectorState::Peak {
                samples: vec![],
                last_event_ms: None
            }
        );
    }
}
