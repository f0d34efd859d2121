// SPDX-License-Identifier: MPL-2.0
//! Range-checked configuration values.
//!
//! Each newtype clamps on construction so call sites never re-validate.

use std::time::Duration;

/// Diagnostics buffer bounds (100 to 10000 events).
pub mod buffer_capacity_bounds {
    pub const MIN: usize = 100;
    pub const MAX: usize = 10_000;
    pub const DEFAULT: usize = 1000;
}

/// Request timeout bounds in seconds. Detection on large batches is slow,
/// so the default is generous.
pub mod request_timeout_bounds {
    pub const MIN_SECS: u64 = 5;
    pub const MAX_SECS: u64 = 900;
    pub const DEFAULT_SECS: u64 = 120;
}

/// Number of diagnostic events kept in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferCapacity(usize);

impl BufferCapacity {
    /// Creates a capacity, clamping to the valid range.
    #[must_use]
    pub fn new(value: usize) -> Self {
        Self(value.clamp(buffer_capacity_bounds::MIN, buffer_capacity_bounds::MAX))
    }

    #[must_use]
    pub fn value(self) -> usize {
        self.0
    }
}

impl Default for BufferCapacity {
    fn default() -> Self {
        Self(buffer_capacity_bounds::DEFAULT)
    }
}

/// Timeout applied to every request sent to the processing server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTimeout(u64);

impl RequestTimeout {
    /// Creates a timeout in seconds, clamping to the valid range.
    #[must_use]
    pub fn from_secs(secs: u64) -> Self {
        Self(secs.clamp(
            request_timeout_bounds::MIN_SECS,
            request_timeout_bounds::MAX_SECS,
        ))
    }

    #[must_use]
    pub fn secs(self) -> u64 {
        self.0
    }

    #[must_use]
    pub fn as_duration(self) -> Duration {
        Duration::from_secs(self.0)
    }
}

impl Default for RequestTimeout {
    fn default() -> Self {
        Self(request_timeout_bounds::DEFAULT_SECS)
    }
}
