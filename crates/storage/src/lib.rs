//! Storage Layer
//!
//! Keeps finished sessions with their rating and provides the history
//! views and the level computed from the cumulative chew count.

mod level;
mod repository;

pub use level::LevelInfo;
pub use repository::{HistoryRepository, SessionEntry, TimeOfDay, DEFAULT_MAX_ENTRIES};

use thiserror::Error;

/// Storage errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("Lock error: {0}")]
    Lock(String),
    #[error("Rating {0} outside 1..=5")]
    InvalidRating(u8),
    #[error("Record not found")]
    NotFound,
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Chew total exceeds u64")]
    Overflow,
}
