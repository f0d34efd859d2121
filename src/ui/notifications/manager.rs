// SPDX-License-Identifier: MPL-2.0
//! Notification queue and lifecycle.
//!
//! At most [`MAX_VISIBLE`] toasts are shown; the rest wait in FIFO order and
//! are promoted as visible ones are dismissed or expire.

use super::notification::{Notification, NotificationId, Severity};
use crate::diagnostics::DiagnosticsHandle;
use std::collections::VecDeque;

/// Maximum number of notifications visible at once.
pub const MAX_VISIBLE: usize = 3;

/// Prefix shared by the i18n keys of upload failures.
const UPLOAD_ERROR_PREFIX: &str = "upload-error-";

#[derive(Debug, Clone)]
pub enum Message {
    Dismiss(NotificationId),
    /// Periodic check of auto-dismiss timers.
    Tick,
}

#[derive(Debug, Default)]
pub struct Manager {
    /// Newest first.
    visible: VecDeque<Notification>,
    queue: VecDeque<Notification>,
    diagnostics: Option<DiagnosticsHandle>,
}

impl Manager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Warnings and errors pushed after this call are also logged.
    pub fn set_diagnostics(&mut self, handle: DiagnosticsHandle) {
        self.diagnostics = Some(handle);
    }

    pub fn push(&mut self, notification: Notification) {
        if let Some(handle) = &self.diagnostics {
            let detail = describe(&notification);
            match notification.severity() {
                Severity::Warning => handle.log_warning(detail),
                Severity::Error => handle.log_error(detail),
                Severity::Success | Severity::Info => {}
            }
        }

        if self.visible.len() < MAX_VISIBLE {
            self.visible.push_front(notification);
        } else {
            self.queue.push_back(notification);
        }
    }

    /// Returns `true` if the notification was found.
    pub fn dismiss(&mut self, id: NotificationId) -> bool {
        if let Some(pos) = self.visible.iter().position(|n| n.id() == id) {
            self.visible.remove(pos);
            self.promote_from_queue();
            return true;
        }
        if let Some(pos) = self.queue.iter().position(|n| n.id() == id) {
            self.queue.remove(pos);
            return true;
        }
        false
    }

    pub fn tick(&mut self) {
        let before = self.visible.len();
        self.visible.retain(|n| !n.should_auto_dismiss());
        if self.visible.len() < before {
            self.promote_from_queue();
        }
    }

    pub fn handle_message(&mut self, message: &Message) {
        match message {
            Message::Dismiss(id) => {
                self.dismiss(*id);
            }
            Message::Tick => self.tick(),
        }
    }

    pub fn visible(&self) -> impl Iterator<Item = &Notification> {
        self.visible.iter()
    }

    #[must_use]
    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }

    #[must_use]
    pub fn queued_count(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn has_notifications(&self) -> bool {
        !self.visible.is_empty() || !self.queue.is_empty()
    }

    /// Drops stale upload failures once a submission succeeds.
    pub fn clear_upload_errors(&mut self) {
        let before = self.visible.len();
        self.visible
            .retain(|n| !n.message_key().starts_with(UPLOAD_ERROR_PREFIX));
        self.queue
            .retain(|n| !n.message_key().starts_with(UPLOAD_ERROR_PREFIX));
        if self.visible.len() < before {
            self.promote_from_queue();
        }
    }

    fn promote_from_queue(&mut self) {
        while self.visible.len() < MAX_VISIBLE {
            match self.queue.pop_front() {
                Some(notification) => self.visible.push_back(notification),
                None => break,
            }
        }
    }
}

/// Key plus arguments, e.g. `download-error-save (detail=disk full)`.
fn describe(notification: &Notification) -> String {
    if notification.message_args().is_empty() {
        return notification.message_key().to_string();
    }
    let args: Vec<String> = notification
        .message_args()
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect();
    format!("{} ({})", notification.message_key(), args.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{BufferCapacity, DiagnosticEventKind, DiagnosticsCollector};

    #[test]
    fn overflow_is_queued_then_promoted() {
        let mut manager = Manager::new();
        let first = Notification::info("first");
        let first_id = first.id();
        manager.push(first);
        for i in 1..=MAX_VISIBLE {
            manager.push(Notification::info(format!("n-{i}")));
        }
        assert_eq!(manager.visible_count(), MAX_VISIBLE);
        assert_eq!(manager.queued_count(), 1);

        assert!(manager.dismiss(first_id));
        assert_eq!(manager.visible_count(), MAX_VISIBLE);
        assert_eq!(manager.queued_count(), 0);
    }

    #[test]
    fn dismissing_unknown_id_is_false() {
        let mut manager = Manager::new();
        let stray = Notification::info("stray").id();
        assert!(!manager.dismiss(stray));
    }

    #[test]
    fn tick_keeps_errors() {
        let mut manager = Manager::new();
        manager.push(Notification::error("upload-error-failed"));
        manager.handle_message(&Message::Tick);
        assert_eq!(manager.visible_count(), 1);
    }

    #[test]
    fn upload_errors_are_cleared_on_success() {
        let mut manager = Manager::new();
        manager.push(Notification::error("upload-error-failed"));
        manager.push(Notification::warning("cleanup-error-failed"));
        manager.push(Notification::error("upload-error-failed"));
        manager.push(Notification::error("download-error-empty"));

        manager.clear_upload_errors();
        let keys: Vec<_> = manager.visible().map(Notification::message_key).collect();
        assert_eq!(keys.len(), 2);
        assert!(keys.iter().all(|k| !k.starts_with(UPLOAD_ERROR_PREFIX)));
        assert!(!manager.has_notifications() || manager.queued_count() == 0);
    }

    #[test]
    fn warnings_and_errors_reach_diagnostics() {
        let mut collector = DiagnosticsCollector::new(BufferCapacity::default());
        let mut manager = Manager::new();
        manager.set_diagnostics(collector.handle());

        manager.push(Notification::success("upload-success"));
        manager.push(Notification::warning("cleanup-error-failed"));
        manager.push(Notification::error("download-error-save").with_arg("detail", "disk full"));
        collector.process_pending();

        let kinds: Vec<_> = collector.iter().map(|e| e.kind.clone()).collect();
        assert_eq!(kinds.len(), 2);
        assert_eq!(
            kinds[1],
            DiagnosticEventKind::Error {
                message: "download-error-save (detail=disk full)".to_string()
            }
        );
    }
}
