// SPDX-License-Identifier: MPL-2.0
//! Top-level messages and runtime flags for the application.

use crate::application::download::{CleanupError, DownloadError};
use crate::application::port::ServiceError;
use crate::application::results::SessionId;
use crate::application::upload::{SubmissionReceipt, UploadError};
use crate::domain::results::{ArchiveKind, ArchivePayload, ResultItem};
use crate::infrastructure::files::ReadBatch;
use crate::ui::notifications;
use crate::ui::{results_page, upload_page};
use iced::keyboard::Key;
use std::path::PathBuf;
use std::time::Instant;

/// How a batch of files reached the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOrigin {
    Picker,
    Drop,
    CommandLine,
}

/// Top-level messages consumed by `App::update`. Page messages are forwarded;
/// the rest carry the results of asynchronous tasks.
#[derive(Debug, Clone)]
pub enum Message {
    Upload(upload_page::Message),
    Results(results_page::Message),
    Notification(notifications::NotificationMessage),
    /// Result of the file picker; `None` when cancelled.
    FilesPicked(Option<Vec<PathBuf>>),
    /// A file was dropped on the window.
    FileDropped(PathBuf),
    FilesRead {
        batch: ReadBatch,
        origin: StageOrigin,
    },
    /// The processing call returned.
    SubmissionFinished(Result<SubmissionReceipt, UploadError>),
    /// Switch to the results screen with this list.
    ProcessingComplete {
        results: Vec<ResultItem>,
        annotation_filenames: Vec<String>,
    },
    // The variants below answer requests made by a results session and are
    // dropped unless `session` is still the one on screen.
    ThumbnailLoaded {
        session: SessionId,
        index: usize,
        result: Result<Vec<u8>, ServiceError>,
    },
    ArchiveDownloaded {
        session: SessionId,
        kind: ArchiveKind,
        result: Result<ArchivePayload, DownloadError>,
    },
    /// Save dialog answer for a downloaded archive; `None` when cancelled.
    SaveLocationChosen {
        session: SessionId,
        payload: ArchivePayload,
        path: Option<PathBuf>,
    },
    ArchiveSaved {
        session: SessionId,
        kind: ArchiveKind,
        size_bytes: u64,
        result: Result<PathBuf, DownloadError>,
    },
    CleanupFinished {
        session: SessionId,
        result: Result<(), CleanupError>,
    },
    /// Unhandled key press, for carousel navigation.
    KeyPressed(Key),
    /// Window close was requested (user clicked X or pressed Alt+F4).
    WindowCloseRequested(iced::window::Id),
    /// The cleanup sent on close returned; the window closes next.
    ExitCleanupFinished {
        window_id: iced::window::Id,
        result: Result<(), CleanupError>,
    },
    /// Periodic tick for notification auto-dismiss.
    Tick(Instant),
}

/// Runtime flags passed in from the CLI.
#[derive(Debug, Default)]
pub struct Flags {
    /// Optional locale override in BCP-47 form (e.g. `ru`, `en-US`).
    pub lang: Option<String>,
    /// Overrides `[server] base_url` for this run.
    pub server_url: Option<String>,
    /// Optional config directory override (for settings.toml).
    /// Takes precedence over `ICED_DETECT_CONFIG_DIR`.
    pub config_dir: Option<String>,
    /// Where to write the diagnostics report when the window closes.
    pub diagnostics_out: Option<PathBuf>,
    /// Files to stage on startup.
    pub files: Vec<PathBuf>,
}
