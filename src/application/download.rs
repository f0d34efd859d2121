// SPDX-License-Identifier: MPL-2.0
//! Archive download and server-side cleanup.
//!
//! Downloads of different archive kinds may run concurrently, but a second
//! request for a kind already being fetched is refused. Cleanup runs at most
//! once per results session and its failure never blocks navigation.

use crate::application::port::{ProcessingService, ServiceError};
use crate::domain::results::{ArchiveKind, ArchivePayload};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

// =============================================================================
// Errors
// =============================================================================

/// Errors surfaced by archive downloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadError {
    /// The request failed.
    Service(ServiceError),
    /// The server answered with an empty archive.
    EmptyPayload(ArchiveKind),
    /// This archive is already being downloaded.
    AlreadyInFlight(ArchiveKind),
    /// Writing the archive to disk failed.
    Save(String),
}

impl DownloadError {
    /// Returns the i18n message key for this error.
    #[must_use]
    pub fn i18n_key(&self) -> &'static str {
        match self {
            DownloadError::Service(_) => "download-error-failed",
            DownloadError::EmptyPayload(_) => "download-error-empty",
            DownloadError::AlreadyInFlight(_) => "download-error-in-flight",
            DownloadError::Save(_) => "download-error-save",
        }
    }
}

impl fmt::Display for DownloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadError::Service(err) => write!(f, "Download failed: {err}"),
            DownloadError::EmptyPayload(kind) => {
                write!(f, "Server returned an empty {}", kind.default_filename())
            }
            DownloadError::AlreadyInFlight(kind) => {
                write!(f, "{} is already downloading", kind.default_filename())
            }
            DownloadError::Save(msg) => write!(f, "Could not save archive: {msg}"),
        }
    }
}

impl std::error::Error for DownloadError {}

/// Errors surfaced by cleanup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupError {
    /// The request failed. Callers warn and carry on.
    Service(ServiceError),
}

impl CleanupError {
    /// Returns the i18n message key for this error.
    #[must_use]
    pub fn i18n_key(&self) -> &'static str {
        "cleanup-error-failed"
    }
}

impl fmt::Display for CleanupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CleanupError::Service(err) => write!(f, "Cleanup failed: {err}"),
        }
    }
}

impl std::error::Error for CleanupError {}

// =============================================================================
// Operations
// =============================================================================

/// Fetches one archive from the server.
///
/// # Errors
///
/// Returns [`DownloadError::Service`] on request failure and
/// [`DownloadError::EmptyPayload`] when the archive has no bytes.
pub async fn download_archive(
    service: Arc<dyn ProcessingService>,
    kind: ArchiveKind,
) -> Result<ArchivePayload, DownloadError> {
    let payload = service
        .download_archive(kind)
        .await
        .map_err(DownloadError::Service)?;

    if payload.bytes.is_empty() {
        return Err(DownloadError::EmptyPayload(kind));
    }
    Ok(payload)
}

/// Writes an archive to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`DownloadError::Save`] on any filesystem error.
pub async fn save_archive(payload: ArchivePayload, path: PathBuf) -> Result<PathBuf, DownloadError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| DownloadError::Save(e.to_string()))?;
    }
    tokio::fs::write(&path, &payload.bytes)
        .await
        .map_err(|e| DownloadError::Save(e.to_string()))?;
    Ok(path)
}

/// Default save location for `kind` inside `directory`.
#[must_use]
pub fn default_save_path(directory: &Path, kind: ArchiveKind) -> PathBuf {
    directory.join(kind.default_filename())
}

/// Asks the server to discard this session's files.
///
/// # Errors
///
/// Returns [`CleanupError::Service`] on request failure.
pub async fn cleanup(service: Arc<dyn ProcessingService>) -> Result<(), CleanupError> {
    service.cleanup().await.map_err(CleanupError::Service)
}

// =============================================================================
// DownloadOrchestrator
// =============================================================================

/// Lifecycle of the cleanup request for one results session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CleanupState {
    #[default]
    Pending,
    InFlight,
    Done,
}

/// Ensures the cleanup request is sent at most once.
#[derive(Debug, Default)]
pub struct CleanupGuard {
    state: CleanupState,
}

impl CleanupGuard {
    /// Claims the cleanup request. Returns `false` if it was already sent.
    pub fn claim(&mut self) -> bool {
        if self.state == CleanupState::Pending {
            self.state = CleanupState::InFlight;
            true
        } else {
            false
        }
    }

    /// Records that cleanup finished, whatever its outcome.
    pub fn finish(&mut self) {
        self.state = CleanupState::Done;
    }

    #[must_use]
    pub fn state(&self) -> CleanupState {
        self.state
    }
}

/// Bookkeeping for downloads and cleanup of one results session.
#[derive(Debug, Default)]
pub struct DownloadOrchestrator {
    downloading: HashSet<ArchiveKind>,
    cleanup: CleanupGuard,
}

impl DownloadOrchestrator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `kind` as downloading.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::AlreadyInFlight`] if it already is.
    pub fn begin_download(&mut self, kind: ArchiveKind) -> Result<(), DownloadError> {
        if self.downloading.insert(kind) {
            Ok(())
        } else {
            Err(DownloadError::AlreadyInFlight(kind))
        }
    }

    pub fn finish_download(&mut self, kind: ArchiveKind) {
        self.downloading.remove(&kind);
    }

    #[must_use]
    pub fn is_downloading(&self, kind: ArchiveKind) -> bool {
        self.downloading.contains(&kind)
    }

    /// See [`CleanupGuard::claim`].
    pub fn begin_cleanup(&mut self) -> bool {
        self.cleanup.claim()
    }

    pub fn finish_cleanup(&mut self) {
        self.cleanup.finish();
    }

    #[must_use]
    pub fn cleanup_state(&self) -> CleanupState {
        self.cleanup.state()
    }
}
