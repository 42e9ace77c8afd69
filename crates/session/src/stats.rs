//! Session statistics and the end-of-session record

use serde::{Deserialize, Serialize};

use crate::SessionError;

/// Live session statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    /// Chews counted since the session started
    pub chew_count: u64,
    /// Whole seconds of tracked time
    pub elapsed_seconds: u64,
    /// Chews per minute
    pub pace: u32,
}

impl SessionStats {
    /// Elapsed time as `m:ss`
    pub fn elapsed_display(&self) -> String {
        format!("{}:{:02}", self.elapsed_seconds / 60, self.elapsed_seconds % 60)
    }

    pub fn to_record(&self) -> SessionRecord {
        SessionRecord {
            chew_count: self.chew_count,
            elapsed_time: self.elapsed_seconds,
            pace: self.pace,
        }
    }
}

/// Flat record handed over when a session ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub chew_count: u64,
    /// Elapsed seconds
    pub elapsed_time: u64,
    pub pace: u32,
}

/// Receiver of finished session records
pub trait SessionSink: Send + Sync {
    fn accept(&self, record: SessionRecord) -> Result<(), SessionError>;
}

/// Chews per minute, rounded; zero until a full second has elapsed
pub fn compute_pace(chew_count: u64, elapsed_seconds: u64) -> u32 {
    if elapsed_seconds == 0 {
        return 0;
    }
    (chew_count as f64 / elapsed_seconds as f64 * 60.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_pace() {
        assert_eq!(compute_pace(6, 30), 12);
        assert_eq!(compute_pace(100, 0), 0);
        assert_eq!(compute_pace(0, 45), 0);
        // 7 / 9 * 60 = 46.67
        assert_eq!(compute_pace(7, 9), 47);
    }

    #[test]
    fn test_elapsed_display() {
        let stats = SessionStats {
            elapsed_seconds: 125,
            ..Default::default()
        };
        assert_eq!(stats.elapsed_display(), "2:05");
    }

    #[test]
    fn test_record_wire_format() {
        let record = SessionStats {
            chew_count: 42,
            elapsed_seconds: 90,
            pace: 28,
        }
        .to_record();

        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"chewCount":42,"elapsedTime":90,"pace":28}"#);
    }

    proptest! {
        #[test]
        fn prop_pace_zero_without_elapsed_time(count in 0u64..100_000) {
            prop_assert_eq!(compute_pace(count, 0), 0);
        }

        #[test]
        fn prop_pace_grows_with_count(count in 0u64..10_000, elapsed in 1u64..36_000) {
            prop_assert!(compute_pace(count + 1, elapsed) >= compute_pace(count, elapsed));
        }
    }
}
