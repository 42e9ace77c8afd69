//! Ring Buffer Implementation

use crate::RingBufferError;

/// Fixed-capacity FIFO ring buffer
///
/// Storage is allocated once at construction. Pushing into a full buffer
/// evicts the oldest sample and hands it back to the caller.
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    /// Pre-allocated storage
    storage: Box<[Option<T>]>,
    /// Capacity of the buffer
    capacity: usize,
    /// Next write position
    head: usize,
    /// Number of samples currently held
    len: usize,
    /// Total samples written (for statistics)
    total_written: usize,
}

impl<T> RingBuffer<T> {
    /// Create a new ring buffer with given capacity
    pub fn new(capacity: usize) -> Result<Self, RingBufferError> {
        if capacity == 0 {
            return Err(RingBufferError::ZeroCapacity);
        }

        let storage: Vec<Option<T>> = (0..capacity).map(|_| None).collect();
        Ok(Self {
            storage: storage.into_boxed_slice(),
            capacity,
            head: 0,
            len: 0,
            total_written: 0,
        })
    }

    /// Push a sample, returning the evicted oldest sample if the buffer was full
    pub fn push(&mut self, item: T) -> Option<T> {
        let evicted = if self.len == self.capacity {
            self.storage[self.head].take()
        } else {
            self.len += 1;
            None
        };

        self.storage[self.head] = Some(item);
        self.head = (self.head + 1) % self.capacity;
        self.total_written += 1;

        evicted
    }

    /// Get the number of samples currently in the buffer
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Check if buffer is full
    pub fn is_full(&self) -> bool {
        self.len == self.capacity
    }

    /// Get the buffer capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get fill ratio (0.0 to 1.0)
    pub fn fill_ratio(&self) -> f64 {
        self.len as f64 / self.capacity as f64
    }

    /// Sample at `index`, counted from the oldest held sample
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len {
            return None;
        }
        let oldest = (self.head + self.capacity - self.len) % self.capacity;
        self.storage[(oldest + index) % self.capacity].as_ref()
    }

    /// Most recently pushed sample
    pub fn latest(&self) -> Option<&T> {
        self.len.checked_sub(1).and_then(|i| self.get(i))
    }

    /// Iterate from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        (0..self.len).filter_map(move |i| self.get(i))
    }

    /// Get total samples written (for statistics)
    pub fn total_written(&self) -> usize {
        self.total_written
    }

    /// Clear the buffer
    pub fn clear(&mut self) {
        for slot in self.storage.iter_mut() {
            *slot = None;
        }
        self.head = 0;
        self.len = 0;
    }
}

impl<T: Clone> RingBuffer<T> {
    /// Read the last N samples (most recent first)
    pub fn read_last(&self, count: usize) -> Vec<T> {
        let count = count.min(self.len);
        (0..count)
            .filter_map(|i| self.get(self.len - 1 - i))
            .cloned()
            .collect()
    }

    /// Copy out all samples, oldest first
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }
}

impl RingBuffer<f64> {
    /// Arithmetic mean of the held samples
    pub fn mean(&self) -> Option<f64> {
        if self.is_empty() {
            return None;
        }
        Some(self.iter().sum::<f64>() / self.len as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_zero_capacity_rejected() {
        assert_eq!(
            RingBuffer::<f64>::new(0).unwrap_err(),
            RingBufferError::ZeroCapacity
        );
    }

    #[test]
    fn test_push_and_read() {
        let mut buffer = RingBuffer::new(10).unwrap();

        for i in 0..5 {
            buffer.push(i * 100);
        }

        assert_eq!(buffer.len(), 5);

        let samples = buffer.read_last(3);
        assert_eq!(samples, vec![400, 300, 200]);
        assert_eq!(buffer.latest(), Some(&400));
        assert_eq!(buffer.get(0), Some(&0));
    }

    #[test]
    fn test_overwrite_oldest() {
        let mut buffer = RingBuffer::new(5).unwrap();

        let mut evicted = Vec::new();
        for i in 0..8 {
            if let Some(old) = buffer.push(i) {
                evicted.push(old);
            }
        }

        assert!(buffer.is_full());
        assert_eq!(buffer.len(), 5);
        assert_eq!(buffer.to_vec(), vec![3, 4, 5, 6, 7]);
        assert_eq!(evicted, vec![0, 1, 2]);
        assert_eq!(buffer.total_written(), 8);
    }

    #[test]
    fn test_mean() {
        let mut buffer = RingBuffer::new(3).unwrap();
        assert_eq!(buffer.mean(), None);

        buffer.push(1.0);
        buffer.push(2.0);
        assert!((buffer.mean().unwrap() - 1.5).abs() < 1e-12);

        buffer.push(3.0);
        buffer.push(7.0);
        // Window holds 2, 3, 7
        assert!((buffer.mean().unwrap() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_clear() {
        let mut buffer = RingBuffer::new(4).unwrap();
        for i in 0..6 {
            buffer.push(i);
        }
        buffer.clear();

        assert!(buffer.is_empty());
        assert_eq!(buffer.latest(), None);
        assert_eq!(buffer.fill_ratio(), 0.0);

        buffer.push(42);
        assert_eq!(buffer.to_vec(), vec![42]);
    }

    proptest! {
        #[test]
        fn prop_keeps_last_capacity_samples(
            capacity in 1usize..16,
            values in proptest::collection::vec(any::<i32>(), 0..64),
        ) {
            let mut buffer = RingBuffer::new(capacity).unwrap();
            for &v in &values {
                buffer.push(v);
            }

            prop_assert!(buffer.len() <= capacity);
            let skip = values.len().saturating_sub(capacity);
            prop_assert_eq!(buffer.to_vec(), values[skip..].to_vec());
        }
    }
}
