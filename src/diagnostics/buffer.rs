// SPDX-License-Identifier: MPL-2.0
//! Bounded ring buffer for diagnostic events.

use std::collections::VecDeque;

pub use crate::domain::newtypes::{buffer_capacity_bounds, BufferCapacity};

/// Fixed-capacity FIFO that drops its oldest element when full.
///
/// # Example
///
/// ```
/// use iced_detect::diagnostics::CircularBuffer;
///
/// let mut buffer = CircularBuffer::with_raw_capacity(2);
/// buffer.push("staged");
/// buffer.push("submitted");
/// buffer.push("downloaded");
///
/// let kept: Vec<_> = buffer.iter().copied().collect();
/// assert_eq!(kept, vec!["submitted", "downloaded"]);
/// ```
#[derive(Debug, Clone)]
pub struct CircularBuffer<T> {
    data: VecDeque<T>,
    capacity: usize,
}

impl<T> CircularBuffer<T> {
    #[must_use]
    pub fn new(capacity: BufferCapacity) -> Self {
        Self::with_raw_capacity(capacity.value())
    }

    /// Creates a buffer without the configured bounds, for tests.
    #[must_use]
    pub fn with_raw_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            data: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends `item`, evicting the oldest element if at capacity.
    /// Returns the evicted element.
    pub fn push(&mut self, item: T) -> Option<T> {
        let evicted = if self.data.len() >= self.capacity {
            self.data.pop_front()
        } else {
            None
        };
        self.data.push_back(item);
        evicted
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }

    /// Most recent element.
    #[must_use]
    pub fn latest(&self) -> Option<&T> {
        self.data.back()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }
}
