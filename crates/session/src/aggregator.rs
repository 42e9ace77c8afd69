//! Session Aggregator Implementation

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::stats::{compute_pace, SessionRecord, SessionStats};
use crate::SessionError;

/// Session lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingStatus {
    #[default]
    Idle,
    Tracking,
    Paused,
}

/// Session clock and chew counter
///
/// All operations take the current clock reading in milliseconds; the
/// aggregator never reads a clock itself.
#[derive(Debug, Clone, Default)]
pub struct SessionAggregator {
    status: TrackingStatus,
    stats: SessionStats,
    /// Clock reading at start, shifted back by the accumulated offset
    start_time_ms: u64,
    /// Tracked time accumulated before the last pause
    accumulated_ms: u64,
    /// Bumped on every lifecycle change
    generation: u64,
}

impl SessionAggregator {
    /// Create an idle aggregator
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from idle, or resume from paused
    pub fn start(&mut self, now_ms: u64) -> Result<SessionStats, SessionError> {
        match self.status {
            TrackingStatus::Tracking => {
                warn!("Start requested while already tracking");
                return Err(self.invalid("start"));
            }
            TrackingStatus::Idle => {
                self.stats = SessionStats::default();
                self.accumulated_ms = 0;
                info!("Tracking started");
            }
            TrackingStatus::Paused => {
                info!("Tracking resumed after {}ms", self.accumulated_ms);
            }
        }

        self.start_time_ms = now_ms.saturating_sub(self.accumulated_ms);
        self.status = TrackingStatus::Tracking;
        self.generation += 1;
        Ok(self.refresh(now_ms))
    }

    /// Stop the clock, keeping the count for a later resume
    pub fn pause(&mut self, now_ms: u64) -> Result<SessionStats, SessionError> {
        if self.status != TrackingStatus::Tracking {
            warn!("Pause requested while {:?}", self.status);
            return Err(self.invalid("pause"));
        }

        let stats = self.refresh(now_ms);
        self.accumulated_ms = now_ms.saturating_sub(self.start_time_ms);
        self.status = TrackingStatus::Paused;
        self.generation += 1;
        info!(
            "Tracking paused: {} chews in {}s",
            stats.chew_count, stats.elapsed_seconds
        );
        Ok(stats)
    }

    /// Zero everything and return to idle
    pub fn reset(&mut self) -> SessionStats {
        if self.status != TrackingStatus::Idle || self.stats != SessionStats::default() {
            info!("Session reset");
        }
        self.status = TrackingStatus::Idle;
        self.stats = SessionStats::default();
        self.start_time_ms = 0;
        self.accumulated_ms = 0;
        self.generation += 1;
        self.stats
    }

    /// Periodic refresh of elapsed time and pace; `None` unless tracking
    pub fn tick(&mut self, now_ms: u64) -> Option<SessionStats> {
        if self.status != TrackingStatus::Tracking {
            return None;
        }
        Some(self.refresh(now_ms))
    }

    /// Count one chew; ignored unless tracking
    pub fn record_event(&mut self) -> Option<SessionStats> {
        if self.status != TrackingStatus::Tracking {
            debug!("Chew event ignored while {:?}", self.status);
            return None;
        }
        self.stats.chew_count += 1;
        Some(self.stats)
    }

    /// Final record of the session so far
    pub fn record(&mut self, now_ms: u64) -> SessionRecord {
        if self.status == TrackingStatus::Tracking {
            self.refresh(now_ms);
        }
        self.stats.to_record()
    }

    /// Tracked time in milliseconds
    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        match self.status {
            TrackingStatus::Idle => 0,
            TrackingStatus::Tracking => now_ms.saturating_sub(self.start_time_ms),
            TrackingStatus::Paused => self.accumulated_ms,
        }
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn status(&self) -> TrackingStatus {
        self.status
    }

    pub fn is_tracking(&self) -> bool {
        self.status == TrackingStatus::Tracking
    }

    /// Lifecycle generation; changes on every start, pause and reset
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn refresh(&mut self, now_ms: u64) -> SessionStats {
        let elapsed_seconds = now_ms.saturating_sub(self.start_time_ms) / 1000;
        self.stats.elapsed_seconds = elapsed_seconds;
        self.stats.pace = compute_pace(self.stats.chew_count, elapsed_seconds);
        self.stats
    }

    fn invalid(&self, operation: &'static str) -> SessionError {
        SessionError::InvalidState {
            operation,
            status: self.status,
        }
    }
}
