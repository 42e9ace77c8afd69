//! Pace Feedback
//!
//! Maps the chewing pace to a weather-style category with a short message.

mod mapper;

pub use mapper::{
    map_feedback, FeedbackKind, FeedbackState, FeedbackTracker, RAIN_MIN_PACE, STORM_ABOVE_PACE,
};
