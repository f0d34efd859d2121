// SPDX-License-Identifier: MPL-2.0
//! Full-screen review carousel.
//!
//! A [`Carousel`] holds an ordered list of viewable items and tracks which one,
//! if any, is currently shown full-screen. Navigation wraps around, so the
//! first and last items are adjacent.

use std::fmt;

/// Errors raised by carousel operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarouselError {
    /// `open` was called with an index outside `[0, len)`.
    IndexOutOfRange { index: usize, len: usize },
}

impl fmt::Display for CarouselError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CarouselError::IndexOutOfRange { index, len } => {
                write!(f, "Carousel index {index} out of range (len {len})")
            }
        }
    }
}

impl std::error::Error for CarouselError {}

/// Snapshot of the carousel state for rendering navigation controls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CarouselInfo {
    /// Position of the full-screen item (0-indexed), if open.
    pub position: Option<usize>,
    /// Total number of items.
    pub total: usize,
}

impl CarouselInfo {
    /// Whether an item is currently shown full-screen.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.position.is_some()
    }

    /// Whether next/previous would move to a different item.
    #[must_use]
    pub fn can_navigate(&self) -> bool {
        self.is_open() && self.total > 1
    }
}

/// Ordered items plus the index of the item shown full-screen.
///
/// Invariant: `active` is `None` or a valid index into `items`.
#[derive(Debug, Clone, PartialEq)]
pub struct Carousel<T> {
    items: Vec<T>,
    active: Option<usize>,
}

impl<T> Carousel<T> {
    /// Creates a closed carousel over `items`.
    #[must_use]
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            active: None,
        }
    }

    /// Returns the items in display order.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Returns the number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if there is nothing to show.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns `true` if an item is shown full-screen.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.active.is_some()
    }

    /// Returns the index of the full-screen item, if open.
    #[must_use]
    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    /// Returns the full-screen item, if open.
    #[must_use]
    pub fn active_item(&self) -> Option<&T> {
        self.active.and_then(|index| self.items.get(index))
    }

    /// Shows the item at `index` full-screen.
    ///
    /// # Errors
    ///
    /// Returns [`CarouselError::IndexOutOfRange`] if `index` is not a valid
    /// position; the current state is left untouched.
    pub fn open(&mut self, index: usize) -> Result<&T, CarouselError> {
        let len = self.items.len();
        match self.items.get(index) {
            Some(item) => {
                self.active = Some(index);
                Ok(item)
            }
            None => Err(CarouselError::IndexOutOfRange { index, len }),
        }
    }

    /// Leaves full-screen mode. Always succeeds.
    pub fn close(&mut self) {
        self.active = None;
    }

    /// Moves to the next item, wrapping from the last to the first.
    ///
    /// Returns `None` (and does nothing) when closed.
    pub fn next(&mut self) -> Option<&T> {
        let current = self.active?;
        let next = (current + 1) % self.items.len();
        self.active = Some(next);
        self.items.get(next)
    }

    /// Moves to the previous item, wrapping from the first to the last.
    ///
    /// Returns `None` (and does nothing) when closed.
    pub fn previous(&mut self) -> Option<&T> {
        let current = self.active?;
        let len = self.items.len();
        let previous = (current + len - 1) % len;
        self.active = Some(previous);
        self.items.get(previous)
    }

    /// Appends an item; the full-screen selection is unaffected.
    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    /// Removes the item at `index`, keeping the selection valid.
    ///
    /// Items before the active one shift the selection down so the same item
    /// stays on screen. Removing the active item shows its successor (or the
    /// new last item); removing the final item closes the carousel.
    pub fn remove_item(&mut self, index: usize) -> Option<T> {
        if index >= self.items.len() {
            return None;
        }
        let removed = self.items.remove(index);

        self.active = match self.active {
            _ if self.items.is_empty() => None,
            Some(active) if index < active => Some(active - 1),
            Some(active) if index == active => Some(active.min(self.items.len() - 1)),
            other => other,
        };

        Some(removed)
    }

    /// Keeps only the items matching `keep`, preserving the selection where possible.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&T) -> bool,
    {
        let mut index = 0;
        while index < self.items.len() {
            if keep(&self.items[index]) {
                index += 1;
            } else {
                self.remove_item(index);
            }
        }
    }

    /// Replaces all items, clamping the selection into the new range.
    pub fn set_items(&mut self, items: Vec<T>) {
        self.items = items;
        self.active = match self.active {
            _ if self.items.is_empty() => None,
            Some(active) => Some(active.min(self.items.len() - 1)),
            None => None,
        };
    }

    /// Returns a snapshot for rendering navigation controls.
    #[must_use]
    pub fn info(&self) -> CarouselInfo {
        CarouselInfo {
            position: self.active,
            total: self.items.len(),
        }
    }
}

impl<T> Default for Carousel<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
