// SPDX-License-Identifier: MPL-2.0
//! Diagnostics: an in-memory activity log that can be dumped as JSON.
//!
//! - [`CircularBuffer`]: ring buffer with configurable capacity
//! - [`DiagnosticEvent`]: user actions, operation outcomes, warnings, errors
//! - [`DiagnosticsCollector`] / [`DiagnosticsHandle`]: storage and its sender

mod buffer;
mod collector;
mod events;

pub use buffer::{buffer_capacity_bounds, BufferCapacity, CircularBuffer};
pub use collector::{
    DiagnosticReport, DiagnosticsCollector, DiagnosticsHandle, ExportError, SerializableEvent,
};
pub use events::{AppOperation, DiagnosticEvent, DiagnosticEventKind, UserAction};
