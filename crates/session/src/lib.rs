//! Tracking Session Aggregation
//!
//! Owns the session clock (start, pause/resume, reset), the chew counter
//! and the pace derived from them.

mod aggregator;
mod stats;

pub use aggregator::{SessionAggregator, TrackingStatus};
pub use stats::{compute_pace, SessionRecord, SessionSink, SessionStats};

use thiserror::Error;

/// Session error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Cannot {operation} while {status:?}")]
    InvalidState {
        operation: &'static str,
        status: TrackingStatus,
    },

    #[error("Session sink rejected record: {0}")]
    Sink(String),
}
