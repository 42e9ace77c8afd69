//! Feedback Mapping Implementation

use serde::Serialize;
use tracing::debug;

/// Lowest pace (chews per minute) shown as rain
pub const RAIN_MIN_PACE: u32 = 50;

/// Paces above this are shown as storm
pub const STORM_ABOVE_PACE: u32 = 70;

/// Feedback category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackKind {
    /// Not tracking
    Waiting,
    /// Good pace, or not started eating yet
    Sunny,
    /// A little fast
    Rain,
    /// Far too fast
    Storm,
}

/// Category plus the text shown for it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeedbackState {
    pub kind: FeedbackKind,
    pub label: &'static str,
    pub message: &'static str,
}

impl FeedbackState {
    const WAITING: Self = Self::new(
        FeedbackKind::Waiting,
        "Waiting",
        "Press start to begin tracking",
    );
    const STORM: Self = Self::new(FeedbackKind::Storm, "Storm", "Way too fast! Slow down!");
    const RAIN: Self = Self::new(FeedbackKind::Rain, "Rain", "A little fast");
    const SUNNY: Self = Self::new(FeedbackKind::Sunny, "Sunny", "Great pace, keep it up!");
    const START_EATING: Self = Self::new(FeedbackKind::Sunny, "Sunny", "Start eating!");

    const fn new(kind: FeedbackKind, label: &'static str, message: &'static str) -> Self {
        Self {
            kind,
            label,
            message,
        }
    }
}

impl Default for FeedbackState {
    fn default() -> Self {
        Self::WAITING
    }
}

/// Map pace and tracking status to feedback; first matching rule wins
pub fn map_feedback(pace: u32, is_tracking: bool) -> FeedbackState {
    if !is_tracking {
        FeedbackState::WAITING
    } else if pace > STORM_ABOVE_PACE {
        FeedbackState::STORM
    } else if pace >= RAIN_MIN_PACE {
        FeedbackState::RAIN
    } else if pace > 0 {
        FeedbackState::SUNNY
    } else {
        FeedbackState::START_EATING
    }
}

/// Remembers the last published feedback and reports only changes
#[derive(Debug, Clone, Default)]
pub struct FeedbackTracker {
    current: FeedbackState,
    changes: usize,
}

impl FeedbackTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute feedback; `Some` when it differs from the last state
    pub fn update(&mut self, pace: u32, is_tracking: bool) -> Option<FeedbackState> {
        let next = map_feedback(pace, is_tracking);
        if next == self.current {
            return None;
        }

        debug!("Feedback {:?} -> {:?} (pace {})", self.current.kind, next.kind, pace);
        self.current = next;
        self.changes += 1;
        Some(next)
    }

    pub fn current(&self) -> FeedbackState {
        self.current
    }

    /// Number of changes reported so far
    pub fn changes(&self) -> usize {
        self.changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thresholds() {
        assert_eq!(map_feedback(71, true).kind, FeedbackKind::Storm);
        assert_eq!(map_feedback(70, true).kind, FeedbackKind::Rain);
        assert_eq!(map_feedback(50, true).kind, FeedbackKind::Rain);
        assert_eq!(map_feedback(49, true).kind, FeedbackKind::Sunny);
        assert_eq!(map_feedback(1, true).kind, FeedbackKind::Sunny);
    }

    #[test]
    fn test_zero_pace_encourages() {
        let idle = map_feedback(0, true);
        let good = map_feedback(30, true);

        assert_eq!(idle.kind, FeedbackKind::Sunny);
        assert_eq!(idle.message, "Start eating!");
        assert_ne!(idle.message, good.message);
    }

    #[test]
    fn test_not_tracking_waits_regardless_of_pace() {
        for pace in [0, 30, 60, 200] {
            assert_eq!(map_feedback(pace, false).kind, FeedbackKind::Waiting);
        }
    }

    #[test]
    fn test_new_tracker_already_waiting() {
        let tracker = FeedbackTracker::new();
        assert_eq!(tracker.current(), map_feedback(0, false));
        assert_eq!(tracker.changes(), 0);
    }

    #[test]
    fn test_tracker_reports_changes_only() {
        let mut tracker = FeedbackTracker::new();
        assert_eq!(tracker.update(0, false), None);

        assert_eq!(tracker.update(0, true).map(|f| f.message), Some("Start eating!"));
        assert_eq!(tracker.update(20, true).map(|f| f.kind), Some(FeedbackKind::Sunny));
        assert_eq!(tracker.update(35, true), None);
        assert_eq!(tracker.update(55, true).map(|f| f.kind), Some(FeedbackKind::Rain));
        assert_eq!(tracker.update(55, false).map(|f| f.kind), Some(FeedbackKind::Waiting));
        assert_eq!(tracker.changes(), 4);
    }

    #[test]
    fn test_serialized_kind() {
        let json = serde_json::to_string(&map_feedback(80, true)).unwrap();
        assert!(json.contains(r#""kind":"storm""#));
    }
}
