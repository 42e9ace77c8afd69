//! Moving-average smoothing of the relative openness stream

use ring_buffer::RingBuffer;

use crate::DetectError;

/// Fixed-window moving average filter
#[derive(Debug, Clone)]
pub struct SmoothingFilter {
    window: RingBuffer<f64>,
}

impl SmoothingFilter {
    /// Create a filter averaging the last `window_size` samples
    pub fn new(window_size: usize) -> Result<Self, DetectError> {
        let window = RingBuffer::new(window_size)
            .map_err(|e| DetectError::Config(format!("smoothing window: {}", e)))?;
        Ok(Self { window })
    }

    /// Add a sample, evicting the oldest when the window is full
    pub fn push(&mut self, value: f64) {
        self.window.push(value);
    }

    /// Mean of the held samples, `None` while empty
    pub fn current_average(&self) -> Option<f64> {
        self.window.mean()
    }

    /// Held samples, oldest first
    pub fn values(&self) -> Vec<f64> {
        self.window.to_vec()
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    pub fn window_size(&self) -> usize {
        self.window.capacity()
    }

    pub fn reset(&mut self) {
        self.window.clear();
    }
}
