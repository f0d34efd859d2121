// SPDX-License-Identifier: MPL-2.0
//! Toast notifications.
//!
//! - [`notification`] - `Notification` and `Severity`
//! - [`manager`] - queue and dismissal timing
//! - [`toast`] - rendering
//!
//! ```ignore
//! manager.push(Notification::error("upload-error-failed").with_arg("reason", reason));
//! let overlay = Toast::view_overlay(&manager, &i18n).map(Message::Notification);
//! ```
//!
//! Success and info toasts last 3s, warnings 6s, errors stay until dismissed.
//! At most three are visible; the rest are queued.

mod manager;
mod notification;
mod toast;

pub use manager::{Manager, Message as NotificationMessage, MAX_VISIBLE};
pub use notification::{Notification, NotificationId, Severity};
pub use toast::Toast;
