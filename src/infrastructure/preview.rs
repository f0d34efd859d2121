// SPDX-License-Identifier: MPL-2.0
//! iced adapter implementing the [`PreviewAllocator`] trait.
//!
//! Each staged image gets its own [`Handle`] built from the payload bytes.
//! Handles created from bytes carry a unique id, so two stagings of the same
//! file never share a renderer cache entry. Dropping the last clone lets the
//! renderer evict the decoded texture on its next trim.
//!
//! [`PreviewAllocator`]: crate::application::port::PreviewAllocator

use iced::widget::image::Handle;

use crate::application::port::PreviewAllocator;
use crate::domain::media::SourcePayload;

/// Creates iced image handles for staged images.
#[derive(Debug, Default)]
pub struct IcedPreviewAllocator {
    live: usize,
}

impl IcedPreviewAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of handles acquired and not yet released.
    #[must_use]
    pub fn live(&self) -> usize {
        self.live
    }
}

impl PreviewAllocator for IcedPreviewAllocator {
    type Handle = Handle;

    fn acquire(&mut self, source: &SourcePayload) -> Handle {
        self.live += 1;
        Handle::from_bytes(source.bytes().to_vec())
    }

    fn release(&mut self, handle: Handle) {
        self.live = self.live.saturating_sub(1);
        drop(handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_acquire_yields_a_distinct_handle() {
        let mut allocator = IcedPreviewAllocator::new();
        let source = SourcePayload::new("a.png", vec![1, 2, 3]);

        let first = allocator.acquire(&source);
        let second = allocator.acquire(&source);
        assert_ne!(first.id(), second.id());
        assert_eq!(allocator.live(), 2);

        allocator.release(first);
        allocator.release(second);
        assert_eq!(allocator.live(), 0);
    }
}
