//! Synchronous chew monitor
//!
//! Ties the detection pipeline to the session aggregator and a clock.
//! Frames reach the detector only while tracking; otherwise they just
//! refresh the ratio cached for the next calibration.

use chew_detect::{ChewPipeline, DetectorConfig, FrameOutcome, PipelineStats};
use face_landmarks::LandmarkFrame;
use feedback::{map_feedback, FeedbackState};
use serde::Serialize;
use session::{
    SessionAggregator, SessionError, SessionRecord, SessionSink, SessionStats, TrackingStatus,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::MonitorError;

/// Session state published to observers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MonitorSnapshot {
    pub status: TrackingStatus,
    pub stats: SessionStats,
    /// Changes on every start, pause and reset
    pub generation: u64,
}

/// Chew monitor: pipeline, session and clock
pub struct ChewMonitor {
    pipeline: ChewPipeline,
    session: SessionAggregator,
    clock: Arc<dyn Clock>,
}

impl ChewMonitor {
    pub fn new(config: DetectorConfig, clock: Arc<dyn Clock>) -> Result<Self, MonitorError> {
        Ok(Self {
            pipeline: ChewPipeline::new(config)?,
            session: SessionAggregator::new(),
            clock,
        })
    }

    /// Feed one camera frame (`None` when no face was found)
    pub fn push_frame(
        &mut self,
        frame: Option<&LandmarkFrame>,
        timestamp_ms: u64,
    ) -> FrameOutcome {
        if !self.session.is_tracking() {
            return self.pipeline.observe(frame);
        }

        let outcome = self.pipeline.process(frame, timestamp_ms);
        if let Some(event) = outcome.event() {
            if let Some(stats) = self.session.record_event() {
                debug!(
                    "Chew #{} at {}ms (amplitude {:.3})",
                    stats.chew_count, event.timestamp_ms, event.amplitude
                );
            }
        }
        outcome
    }

    /// Calibrate on the latest frame and start or resume tracking
    pub fn start(&mut self) -> Result<SessionStats, MonitorError> {
        if self.session.is_tracking() {
            warn!("Start requested while already tracking");
            return Err(SessionError::InvalidState {
                operation: "start",
                status: TrackingStatus::Tracking,
            }
            .into());
        }

        let baseline = self.pipeline.calibrate()?;
        let stats = self.session.start(self.clock.now_ms())?;
        info!("Tracking with baseline {:.4} ({})", baseline, self.pipeline.detector_name());
        Ok(stats)
    }

    pub fn pause(&mut self) -> Result<SessionStats, MonitorError> {
        Ok(self.session.pause(self.clock.now_ms())?)
    }

    /// Zero the session and forget the baseline
    pub fn reset(&mut self) -> SessionStats {
        self.pipeline.reset();
        self.session.reset()
    }

    /// Periodic refresh; `None` unless tracking
    pub fn tick(&mut self) -> Option<SessionStats> {
        self.session.tick(self.clock.now_ms())
    }

    /// End the session: stop the clock, hand the record to `sink`, reset
    pub fn finish(
        &mut self,
        sink: Option<&dyn SessionSink>,
    ) -> Result<SessionRecord, MonitorError> {
        let now = self.clock.now_ms();
        match self.session.status() {
            TrackingStatus::Idle => {
                return Err(SessionError::InvalidState {
                    operation: "finish",
                    status: TrackingStatus::Idle,
                }
                .into());
            }
            TrackingStatus::Tracking => {
                self.session.pause(now)?;
            }
            TrackingStatus::Paused => {}
        }

        let record = self.session.record(now);
        if let Some(sink) = sink {
            sink.accept(record)?;
        }
        info!(
            "Session finished: {} chews in {}s ({} per minute, {:.0}% of frames gated)",
            record.chew_count,
            record.elapsed_time,
            record.pace,
            self.pipeline.stats().gated_ratio() * 100.0
        );

        self.reset();
        Ok(record)
    }

    pub fn snapshot(&self) -> MonitorSnapshot {
        MonitorSnapshot {
            status: self.session.status(),
            stats: self.session.stats(),
            generation: self.session.generation(),
        }
    }

    /// Feedback for the current pace and status
    pub fn feedback(&self) -> FeedbackState {
        map_feedback(self.session.stats().pace, self.session.is_tracking())
    }

    pub fn stats(&self) -> SessionStats {
        self.session.stats()
    }

    pub fn status(&self) -> TrackingStatus {
        self.session.status()
    }

    pub fn is_tracking(&self) -> bool {
        self.session.is_tracking()
    }

    pub fn generation(&self) -> u64 {
        self.session.generation()
    }

    pub fn baseline(&self) -> Option<f64> {
        self.pipeline.baseline()
    }

    pub fn pipeline_stats(&self) -> PipelineStats {
        self.pipeline.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chew_detect::{DetectError, DetectorStrategy, HysteresisConfig};
    use face_landmarks::{index, Landmark};
    use feedback::FeedbackKind;
    use storage::{HistoryRepository, TimeOfDay};

    fn frame(ratio: f64) -> LandmarkFrame {
        LandmarkFrame::sparse(&[
            (index::GLABELLA, Landmark::new(0.5, 0.3, 0.0)),
            (index::CHIN, Landmark::new(0.5, 0.3 + 0.4 * ratio, 0.0)),
            (index::LEFT_CHEEK, Landmark::new(0.3, 0.5, 0.0)),
            (index::RIGHT_CHEEK, Landmark::new(0.7, 0.5, 0.0)),
        ])
    }

    fn monitor() -> (ChewMonitor, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(0));
        let config = DetectorConfig {
            smoothing_window: 1,
            strategy: DetectorStrategy::Hysteresis(HysteresisConfig {
                open_threshold: 1.05,
                close_threshold: 1.0,
                cooldown_ms: 200,
            }),
            ..DetectorConfig::hysteresis()
        };
        (ChewMonitor::new(config, clock.clone()).unwrap(), clock)
    }

    /// Feed alternating closed/open frames at 500ms spacing
    fn chew(monitor: &mut ChewMonitor, clock: &ManualClock, ratios: &[f64]) {
        for &ratio in ratios {
            clock.advance(500);
            monitor.push_frame(Some(&frame(ratio)), clock.now_ms());
        }
    }

    #[test]
    fn test_start_without_face_fails() {
        let (mut monitor, _) = monitor();
        monitor.push_frame(None, 0);

        assert!(matches!(
            monitor.start(),
            Err(MonitorError::Detect(DetectError::NoFaceDetected))
        ));
        assert_eq!(monitor.status(), TrackingStatus::Idle);
    }

    #[test]
    fn test_counts_chews_and_pace() {
        let (mut monitor, clock) = monitor();
        monitor.push_frame(Some(&frame(1.0)), 0);
        monitor.start().unwrap();
        assert_eq!(monitor.feedback().message, "Start eating!");

        chew(&mut monitor, &clock, &[0.9, 1.1, 0.9, 1.1, 0.9]);
        assert_eq!(monitor.stats().chew_count, 2);

        clock.set(30_000);
        let stats = monitor.tick().unwrap();
        assert_eq!(stats.elapsed_seconds, 30);
        assert_eq!(stats.pace, 4);
        assert_eq!(monitor.feedback().kind, FeedbackKind::Sunny);
    }

    #[test]
    fn test_frames_ignored_while_paused() {
        let (mut monitor, clock) = monitor();
        monitor.push_frame(Some(&frame(1.0)), 0);
        monitor.start().unwrap();
        chew(&mut monitor, &clock, &[1.1, 0.9]);
        monitor.pause().unwrap();

        chew(&mut monitor, &clock, &[1.1, 0.9, 1.1, 0.9]);
        assert_eq!(monitor.stats().chew_count, 1);
        assert_eq!(monitor.feedback().kind, FeedbackKind::Waiting);

        // Resume recalibrates on the latest frame and keeps counting
        monitor.push_frame(Some(&frame(1.0)), clock.now_ms());
        monitor.start().unwrap();
        chew(&mut monitor, &clock, &[1.1, 0.9]);
        assert_eq!(monitor.stats().chew_count, 2);
    }

    #[test]
    fn test_double_start_keeps_state() {
        let (mut monitor, clock) = monitor();
        monitor.push_frame(Some(&frame(1.0)), 0);
        monitor.start().unwrap();
        chew(&mut monitor, &clock, &[1.1]);

        assert!(matches!(
            monitor.start(),
            Err(MonitorError::Session(SessionError::InvalidState { .. }))
        ));

        // Open phase survives the rejected start
        chew(&mut monitor, &clock, &[0.9]);
        assert_eq!(monitor.stats().chew_count, 1);
    }

    #[test]
    fn test_reset_clears_baseline() {
        let (mut monitor, clock) = monitor();
        monitor.push_frame(Some(&frame(1.0)), 0);
        monitor.start().unwrap();
        chew(&mut monitor, &clock, &[1.1, 0.9]);

        assert_eq!(monitor.reset(), SessionStats::default());
        assert_eq!(monitor.baseline(), None);
        assert_eq!(monitor.reset(), SessionStats::default());
        assert!(matches!(monitor.start(), Err(MonitorError::Detect(_))));
    }

    #[test]
    fn test_finish_hands_record_to_sink() {
        let (mut monitor, clock) = monitor();
        let history = HistoryRepository::new();
        let sink: &dyn SessionSink = &history;

        assert!(monitor.finish(Some(sink)).is_err());

        monitor.push_frame(Some(&frame(1.0)), 0);
        monitor.start().unwrap();
        chew(&mut monitor, &clock, &[1.1, 0.9, 1.1, 0.9]);
        clock.set(60_000);

        let record = monitor.finish(Some(sink)).unwrap();
        assert_eq!(
            record,
            SessionRecord {
                chew_count: 2,
                elapsed_time: 60,
                pace: 2
            }
        );
        assert_eq!(monitor.status(), TrackingStatus::Idle);

        let stored = history.history(TimeOfDay::All).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].record, record);
    }
}
