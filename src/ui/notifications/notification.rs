// SPDX-License-Identifier: MPL-2.0
//! Notification data: what to say, how loudly, and for how long.

use crate::ui::design_tokens::palette;
use iced::Color;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Unique identifier for a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NotificationId(u64);

impl NotificationId {
    fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Severity level determines display duration and visual styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    /// Green, 3s.
    #[default]
    Success,
    /// Blue, 3s.
    Info,
    /// Orange, 6s. Used for cleanup failures the user can ignore.
    Warning,
    /// Red, stays until dismissed.
    Error,
}

impl Severity {
    #[must_use]
    pub fn color(self) -> Color {
        match self {
            Severity::Success => palette::SUCCESS_500,
            Severity::Info => palette::INFO_500,
            Severity::Warning => palette::WARNING_500,
            Severity::Error => palette::ERROR_500,
        }
    }

    /// Leading glyph of the toast.
    #[must_use]
    pub fn glyph(self) -> &'static str {
        match self {
            Severity::Success => "✓",
            Severity::Info => "i",
            Severity::Warning => "!",
            Severity::Error => "✕",
        }
    }

    /// `None` means manual dismiss.
    #[must_use]
    pub fn auto_dismiss_duration(self) -> Option<Duration> {
        match self {
            Severity::Success | Severity::Info => Some(Duration::from_secs(3)),
            Severity::Warning => Some(Duration::from_secs(6)),
            Severity::Error => None,
        }
    }
}

/// A toast message, resolved through i18n at render time.
#[derive(Debug, Clone)]
pub struct Notification {
    id: NotificationId,
    severity: Severity,
    message_key: String,
    message_args: Vec<(String, String)>,
    created_at: Instant,
    custom_dismiss_duration: Option<Duration>,
}

impl Notification {
    pub fn new(severity: Severity, message_key: impl Into<String>) -> Self {
        Self {
            id: NotificationId::next(),
            severity,
            message_key: message_key.into(),
            message_args: Vec::new(),
            created_at: Instant::now(),
            custom_dismiss_duration: None,
        }
    }

    pub fn success(message_key: impl Into<String>) -> Self {
        Self::new(Severity::Success, message_key)
    }

    pub fn info(message_key: impl Into<String>) -> Self {
        Self::new(Severity::Info, message_key)
    }

    pub fn warning(message_key: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message_key)
    }

    pub fn error(message_key: impl Into<String>) -> Self {
        Self::new(Severity::Error, message_key)
    }

    /// Adds a Fluent argument (`{ $key }` in the message).
    #[must_use]
    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.message_args.push((key.into(), value.into()));
        self
    }

    /// Overrides the severity's auto-dismiss delay.
    #[must_use]
    pub fn auto_dismiss(mut self, duration: Duration) -> Self {
        self.custom_dismiss_duration = Some(duration);
        self
    }

    #[must_use]
    pub fn id(&self) -> NotificationId {
        self.id
    }

    #[must_use]
    pub fn severity(&self) -> Severity {
        self.severity
    }

    #[must_use]
    pub fn message_key(&self) -> &str {
        &self.message_key
    }

    #[must_use]
    pub fn message_args(&self) -> &[(String, String)] {
        &self.message_args
    }

    /// Whether the toast has been visible long enough to go away.
    #[must_use]
    pub fn is_expired_at(&self, now: Instant) -> bool {
        self.custom_dismiss_duration
            .or_else(|| self.severity.auto_dismiss_duration())
            .is_some_and(|limit| now.saturating_duration_since(self.created_at) >= limit)
    }

    #[must_use]
    pub fn should_auto_dismiss(&self) -> bool {
        self.is_expired_at(Instant::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        assert_ne!(Notification::info("a").id(), Notification::info("a").id());
    }

    #[test]
    fn errors_never_expire() {
        let notification = Notification::error("upload-error-failed");
        let much_later = Instant::now() + Duration::from_secs(3600);
        assert!(!notification.is_expired_at(much_later));
    }

    #[test]
    fn warnings_outlive_successes() {
        let success = Notification::success("x");
        let warning = Notification::warning("x");
        let at = Instant::now() + Duration::from_secs(4);
        assert!(success.is_expired_at(at));
        assert!(!warning.is_expired_at(at));
    }

    #[test]
    fn custom_duration_overrides_severity() {
        let notification = Notification::error("x").auto_dismiss(Duration::from_secs(1));
        assert!(notification.is_expired_at(Instant::now() + Duration::from_secs(2)));
    }

    #[test]
    fn builder_collects_arguments() {
        let notification = Notification::error("download-error-save")
            .with_arg("detail", "disk full")
            .with_arg("name", "processed_images.zip");
        assert_eq!(notification.message_key(), "download-error-save");
        assert_eq!(notification.message_args().len(), 2);
    }

    #[test]
    fn severity_colors_are_distinct() {
        let colors = [
            Severity::Success.color(),
            Severity::Info.color(),
            Severity::Warning.color(),
            Severity::Error.color(),
        ];
        for (i, a) in colors.iter().enumerate() {
            for b in &colors[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
