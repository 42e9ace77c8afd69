//! Fixed-Capacity Ring Buffer
//!
//! Provides the bounded FIFO used for signal smoothing windows and
//! peak-detection sample windows. Eviction is strictly oldest-first.

mod buffer;

pub use buffer::RingBuffer;

use thiserror::Error;

/// Ring buffer construction errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RingBufferError {
    #[error("Ring buffer capacity must be greater than zero")]
    ZeroCapacity,
}
