// SPDX-License-Identifier: MPL-2.0
//! Processing service port definition.
//!
//! This module defines the [`ProcessingService`] trait covering every call the
//! client makes to the detection server: batch processing, result fetch,
//! archive download and session cleanup.
//!
//! # Design Notes
//!
//! - Methods return `'static` boxed futures so callers can hand them to
//!   `iced::Task::perform` without borrowing the service
//! - The trait is `Send + Sync` and shared as `Arc<dyn ProcessingService>`
//! - Errors are [`ServiceError`]; orchestrators wrap them into their own
//!   user-facing conditions

use crate::domain::results::{ArchiveKind, ArchivePayload};
use futures_util::future::BoxFuture;
use std::fmt;
use std::sync::Arc;

// =============================================================================
// ServiceError
// =============================================================================

/// Failures at the network boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The server could not be reached (DNS, refused connection, TLS...).
    Unreachable(String),

    /// The request did not complete within the configured timeout.
    Timeout,

    /// The server answered with a non-success status.
    Status {
        /// HTTP status code.
        code: u16,
        /// Response body or reason phrase, for diagnostics.
        detail: String,
    },

    /// The server answered but the body was not what the client expected.
    InvalidResponse(String),
}

impl ServiceError {
    /// Returns the i18n message key for this error.
    #[must_use]
    pub fn i18n_key(&self) -> &'static str {
        match self {
            ServiceError::Unreachable(_) => "error-service-unreachable",
            ServiceError::Timeout => "error-service-timeout",
            ServiceError::Status { .. } => "error-service-status",
            ServiceError::InvalidResponse(_) => "error-service-invalid-response",
        }
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::Unreachable(msg) => write!(f, "Server unreachable: {msg}"),
            ServiceError::Timeout => write!(f, "Request timed out"),
            ServiceError::Status { code, detail } => {
                write!(f, "Server returned HTTP {code}: {detail}")
            }
            ServiceError::InvalidResponse(msg) => write!(f, "Invalid server response: {msg}"),
        }
    }
}

impl std::error::Error for ServiceError {}

/// Future returned by every [`ProcessingService`] call.
pub type ServiceFuture<T> = BoxFuture<'static, Result<T, ServiceError>>;

// =============================================================================
// Request / Response Types
// =============================================================================

/// One file of a multipart submission.
#[derive(Debug, Clone)]
pub struct UploadPart {
    /// File name sent to the server.
    pub name: String,
    /// MIME type of the part.
    pub mime: &'static str,
    /// Content, shared with the staging entry it came from.
    pub bytes: Arc<Vec<u8>>,
}

/// Successful answer of the processing call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessingResponse {
    /// Output image file names.
    pub filenames: Vec<String>,
    /// Output annotation (JSON) file names.
    pub annotation_filenames: Vec<String>,
}

// =============================================================================
// ProcessingService Trait
// =============================================================================

/// Port for the remote detection service.
pub trait ProcessingService: Send + Sync {
    /// Submits all parts in one request and returns the produced file names.
    fn process(&self, parts: Vec<UploadPart>) -> ServiceFuture<ProcessingResponse>;

    /// Returns the session-scoped URL an output file is served from.
    fn result_url(&self, filename: &str) -> String;

    /// Fetches the bytes of one output image.
    fn fetch_result(&self, filename: &str) -> ServiceFuture<Vec<u8>>;

    /// Requests a server-built archive.
    ///
    /// An empty body is returned as-is; deciding whether it is an error is
    /// up to the caller.
    fn download_archive(&self, kind: ArchiveKind) -> ServiceFuture<ArchivePayload>;

    /// Asks the server to discard this session's files. Idempotent.
    fn cleanup(&self) -> ServiceFuture<()>;
}
