// SPDX-License-Identifier: MPL-2.0
//! Diagnostics collector and the handle used to feed it.
//!
//! The collector owns the ring buffer. Other components log through a
//! [`DiagnosticsHandle`], which sends over a bounded channel and drops the
//! event when the channel is full so the UI never blocks on diagnostics.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Utc};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use serde::Serialize;

use super::{
    AppOperation, BufferCapacity, CircularBuffer, DiagnosticEvent, DiagnosticEventKind, UserAction,
};

const CHANNEL_CAPACITY: usize = 100;

// =============================================================================
// DiagnosticsHandle
// =============================================================================

/// Cheap, cloneable sender of diagnostic events.
#[derive(Clone, Debug)]
pub struct DiagnosticsHandle {
    event_tx: Sender<DiagnosticEvent>,
}

impl DiagnosticsHandle {
    pub fn log_action(&self, action: UserAction) {
        self.log_action_with_details(action, None);
    }

    pub fn log_action_with_details(&self, action: UserAction, details: Option<String>) {
        self.send(DiagnosticEventKind::UserAction { action, details });
    }

    pub fn log_operation(&self, operation: AppOperation) {
        self.send(DiagnosticEventKind::Operation { operation });
    }

    pub fn log_warning(&self, message: impl Into<String>) {
        self.send(DiagnosticEventKind::Warning {
            message: message.into(),
        });
    }

    pub fn log_error(&self, message: impl Into<String>) {
        self.send(DiagnosticEventKind::Error {
            message: message.into(),
        });
    }

    /// Logs a user action, reporting whether the collector accepted it.
    ///
    /// # Errors
    ///
    /// Returns `TrySendError::Full` when the channel is full and
    /// `TrySendError::Disconnected` once the collector is gone.
    pub fn try_log_action(&self, action: UserAction) -> Result<(), TrySendError<DiagnosticEvent>> {
        self.event_tx
            .try_send(DiagnosticEvent::new(DiagnosticEventKind::UserAction {
                action,
                details: None,
            }))
    }

    fn send(&self, kind: DiagnosticEventKind) {
        match self.event_tx.try_send(DiagnosticEvent::new(kind)) {
            Ok(()) | Err(TrySendError::Full(_) | TrySendError::Disconnected(_)) => {}
        }
    }
}

// =============================================================================
// Export
// =============================================================================

/// Errors when writing a diagnostics report.
#[derive(Debug)]
pub enum ExportError {
    Io(io::Error),
    Serialization(serde_json::Error),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Io(e) => write!(f, "I/O error: {e}"),
            ExportError::Serialization(e) => write!(f, "Serialization error: {e}"),
        }
    }
}

impl std::error::Error for ExportError {}

impl From<io::Error> for ExportError {
    fn from(e: io::Error) -> Self {
        ExportError::Io(e)
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(e: serde_json::Error) -> Self {
        ExportError::Serialization(e)
    }
}

/// Exported report layout.
#[derive(Debug, Serialize)]
pub struct DiagnosticReport {
    pub generated_at: String,
    pub app_version: String,
    pub collection_started_at: String,
    pub collection_duration_ms: u64,
    pub event_count: usize,
    pub events: Vec<SerializableEvent>,
}

/// Event with its offset from the start of collection.
#[derive(Debug, Serialize)]
pub struct SerializableEvent {
    pub offset_ms: u64,
    #[serde(flatten)]
    pub kind: DiagnosticEventKind,
}

/// Writes to a sibling temporary file, then renames it over `path`.
fn write_atomic(path: &Path, content: &str) -> io::Result<()> {
    let temp_path = path.with_extension("json.tmp");
    std::fs::write(&temp_path, content)?;
    if let Err(e) = std::fs::rename(&temp_path, path) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(e);
    }
    Ok(())
}

// =============================================================================
// DiagnosticsCollector
// =============================================================================

/// Receives events and keeps the most recent ones.
#[derive(Debug)]
pub struct DiagnosticsCollector {
    buffer: CircularBuffer<DiagnosticEvent>,
    event_rx: Receiver<DiagnosticEvent>,
    event_tx: Sender<DiagnosticEvent>,
    started_at: Instant,
    started_at_utc: DateTime<Utc>,
}

impl DiagnosticsCollector {
    #[must_use]
    pub fn new(capacity: BufferCapacity) -> Self {
        let (event_tx, event_rx) = bounded(CHANNEL_CAPACITY);
        Self {
            buffer: CircularBuffer::new(capacity),
            event_rx,
            event_tx,
            started_at: Instant::now(),
            started_at_utc: Utc::now(),
        }
    }

    #[must_use]
    pub fn handle(&self) -> DiagnosticsHandle {
        DiagnosticsHandle {
            event_tx: self.event_tx.clone(),
        }
    }

    /// Moves queued events into the buffer. Call on every update tick.
    pub fn process_pending(&mut self) {
        while let Ok(event) = self.event_rx.try_recv() {
            self.buffer.push(event);
        }
    }

    /// Logs directly, bypassing the channel.
    pub fn log_action(&mut self, action: UserAction) {
        self.log_action_with_details(action, None);
    }

    pub fn log_action_with_details(&mut self, action: UserAction, details: Option<String>) {
        self.buffer
            .push(DiagnosticEvent::new(DiagnosticEventKind::UserAction { action, details }));
    }

    pub fn log_warning(&mut self, message: impl Into<String>) {
        self.buffer.push(DiagnosticEvent::new(DiagnosticEventKind::Warning {
            message: message.into(),
        }));
    }

    /// Logs directly, bypassing the channel.
    pub fn log_operation(&mut self, operation: AppOperation) {
        self.buffer
            .push(DiagnosticEvent::new(DiagnosticEventKind::Operation { operation }));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DiagnosticEvent> {
        self.buffer.iter()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    #[allow(clippy::cast_possible_truncation)] // millisecond offsets fit in u64
    fn build_report(&self) -> DiagnosticReport {
        let events: Vec<SerializableEvent> = self
            .buffer
            .iter()
            .map(|event| SerializableEvent {
                offset_ms: event
                    .timestamp
                    .saturating_duration_since(self.started_at)
                    .as_millis() as u64,
                kind: event.kind.clone(),
            })
            .collect();

        DiagnosticReport {
            generated_at: Utc::now().to_rfc3339(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            collection_started_at: self.started_at_utc.to_rfc3339(),
            collection_duration_ms: self.started_at.elapsed().as_millis() as u64,
            event_count: events.len(),
            events,
        }
    }

    /// Serializes the buffer as a pretty JSON report.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn export_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.build_report())
    }

    /// Writes the report to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError`] on serialization or filesystem failure.
    pub fn export_to_file(&self, path: impl AsRef<Path>) -> Result<PathBuf, ExportError> {
        let path = path.as_ref();
        let json = self.export_json()?;
        write_atomic(path, &json)?;
        Ok(path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn handle_events_arrive_after_processing() {
        let mut collector = DiagnosticsCollector::new(BufferCapacity::default());
        let handle = collector.handle();

        handle.log_action(UserAction::SubmitBatch);
        handle.log_warning("cleanup failed");
        assert!(collector.is_empty());

        collector.process_pending();
        assert_eq!(collector.len(), 2);
    }

    #[test]
    fn full_channel_drops_instead_of_blocking() {
        let mut collector = DiagnosticsCollector::new(BufferCapacity::default());
        let handle = collector.handle();
        for _ in 0..(CHANNEL_CAPACITY + 10) {
            handle.log_action(UserAction::NavigateNext);
        }
        collector.process_pending();
        assert_eq!(collector.len(), CHANNEL_CAPACITY);
    }

    #[test]
    fn try_log_reports_a_full_channel() {
        let collector = DiagnosticsCollector::new(BufferCapacity::default());
        let handle = collector.handle();
        for _ in 0..CHANNEL_CAPACITY {
            handle
                .try_log_action(UserAction::NavigateNext)
                .expect("room in channel");
        }
        assert!(matches!(
            handle.try_log_action(UserAction::NavigateNext),
            Err(TrySendError::Full(_))
        ));
    }

    #[test]
    fn try_log_reports_a_dropped_collector() {
        let collector = DiagnosticsCollector::new(BufferCapacity::default());
        let handle = collector.handle();
        drop(collector);
        assert!(matches!(
            handle.try_log_action(UserAction::SubmitBatch),
            Err(TrySendError::Disconnected(_))
        ));
    }

    #[test]
    fn direct_logging_skips_the_channel() {
        let mut collector = DiagnosticsCollector::new(BufferCapacity::default());
        collector.log_operation(AppOperation::CleanupCompleted);
        assert_eq!(collector.len(), 1);
    }

    #[test]
    fn export_contains_events_and_version() {
        let mut collector = DiagnosticsCollector::new(BufferCapacity::default());
        collector.log_operation(AppOperation::FilesStaged {
            count: 3,
            images: 2,
        });

        let json = collector.export_json().expect("export");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(value["event_count"], 1);
        assert_eq!(value["app_version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(value["events"][0]["type"], "operation");
        assert_eq!(value["events"][0]["operation"]["operation"], "files_staged");
    }

    #[test]
    fn export_to_file_writes_report() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("report.json");
        let collector = DiagnosticsCollector::new(BufferCapacity::default());

        let written = collector.export_to_file(&path).expect("written");
        assert_eq!(written, path);
        assert!(std::fs::read_to_string(&path)
            .expect("readable")
            .contains("event_count"));
        assert!(!path.with_extension("json.tmp").exists());
    }
}
