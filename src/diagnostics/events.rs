// SPDX-License-Identifier: MPL-2.0
//! Diagnostic event types.
//!
//! Events describe what the user did and what the staging, upload and
//! download flows produced. File contents are never recorded; file names
//! appear only in free-form `details`.

use std::time::Instant;

use serde::{Deserialize, Serialize};

/// User-initiated actions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum UserAction {
    // ==========================================================================
    // Staging
    // ==========================================================================
    /// Files picked through the file dialog.
    PickFiles,

    /// Files dropped onto the window.
    DropFiles,

    /// A staged file removed by the user.
    RemoveStagedFile,

    /// Batch submission requested.
    SubmitBatch,

    // ==========================================================================
    // Review
    // ==========================================================================
    /// Full-screen view opened.
    OpenCarousel {
        /// Index of the item opened.
        index: usize,
    },

    CloseCarousel,

    NavigateNext,

    NavigatePrevious,

    /// Archive download requested.
    DownloadArchive {
        /// `images` or `annotations`.
        archive: String,
    },

    /// Back from results to a fresh upload screen.
    ReturnToUpload,
}

/// Outcomes of application operations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum AppOperation {
    /// Files entered the staging store.
    FilesStaged {
        count: usize,
        /// How many of them received a preview.
        images: usize,
    },

    /// Staging store emptied.
    StagingCleared {
        /// Preview handles released.
        released: usize,
    },

    /// Submission answered successfully.
    SubmissionCompleted {
        files: usize,
        results: usize,
        duration_ms: u64,
    },

    /// Archive saved to disk.
    ArchiveSaved { archive: String, size_bytes: u64 },

    /// Server confirmed cleanup.
    CleanupCompleted,
}

/// A captured event with its monotonic timestamp.
#[derive(Debug, Clone)]
pub struct DiagnosticEvent {
    pub timestamp: Instant,
    pub kind: DiagnosticEventKind,
}

impl DiagnosticEvent {
    #[must_use]
    pub fn new(kind: DiagnosticEventKind) -> Self {
        Self {
            timestamp: Instant::now(),
            kind,
        }
    }
}

/// Category and payload of a diagnostic event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiagnosticEventKind {
    UserAction {
        action: UserAction,
        #[serde(skip_serializing_if = "Option::is_none")]
        details: Option<String>,
    },

    Operation {
        operation: AppOperation,
    },

    /// Non-blocking problem (cleanup failure, unreadable dropped file...).
    Warning {
        message: String,
    },

    /// Failure the user was told about.
    Error {
        message: String,
    },
}
