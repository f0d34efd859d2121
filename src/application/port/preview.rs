// SPDX-License-Identifier: MPL-2.0
//! Preview resource port definition.
//!
//! This module defines the [`PreviewAllocator`] trait: the source of the
//! revocable display handles attached to staged image files.
//!
//! # Design Notes
//!
//! - `acquire` never caches: every call yields a fresh handle
//! - `release` consumes the handle, so a handle cannot be released twice
//! - Only the staging store calls these methods

use crate::domain::media::SourcePayload;
use std::fmt;

// =============================================================================
// PreviewAllocator Trait
// =============================================================================

/// Port for creating and invalidating local preview handles.
///
/// # Example
///
/// ```ignore
/// use iced_detect::application::port::PreviewAllocator;
/// use iced_detect::domain::media::SourcePayload;
///
/// fn preview_then_drop(allocator: &mut impl PreviewAllocator, source: &SourcePayload) {
///     let handle = allocator.acquire(source);
///     // ... render it ...
///     allocator.release(handle);
/// }
/// ```
pub trait PreviewAllocator {
    /// Handle type rendered by the view.
    type Handle: fmt::Debug;

    /// Creates a new display handle for `source`.
    fn acquire(&mut self, source: &SourcePayload) -> Self::Handle;

    /// Invalidates a handle previously returned by [`acquire`](Self::acquire).
    ///
    /// Views must stop referencing the handle before this is called.
    fn release(&mut self, handle: Self::Handle);
}
