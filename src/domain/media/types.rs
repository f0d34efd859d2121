// SPDX-License-Identifier: MPL-2.0
//! Core payload types for the domain layer.
//!
//! These types represent raw local files without any presentation
//! dependencies. Presentation turns image payloads into framework handles.

use std::path::Path;
use std::sync::Arc;

/// File extensions staged as images (previewable, rendered in the grid).
pub const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "tiff", "tif", "webp", "bmp", "ico",
];

/// Broad media category used to group staged entries for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MimeCategory {
    /// Raster image that gets a preview handle.
    Image,
    /// Anything else (PDF, DOCX, ...). Never gets a preview handle.
    Document,
}

impl MimeCategory {
    /// Classifies a file name by its extension alone.
    ///
    /// Names without an extension are treated as documents; callers that
    /// hold the bytes may refine this with content sniffing.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match extension_of(name) {
            Some(ext) if IMAGE_EXTENSIONS.contains(&ext.as_str()) => MimeCategory::Image,
            _ => MimeCategory::Document,
        }
    }

    /// Returns `true` for image payloads.
    #[must_use]
    pub fn is_image(self) -> bool {
        matches!(self, MimeCategory::Image)
    }
}

/// Returns the MIME type sent along with a payload in a multipart upload.
#[must_use]
pub fn mime_type_for(name: &str) -> &'static str {
    match extension_of(name).as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("tif" | "tiff") => "image/tiff",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("ico") => "image/x-icon",
        Some("pdf") => "application/pdf",
        Some("doc") => "application/msword",
        Some("docx") => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
        Some("json") => "application/json",
        Some("zip") => "application/zip",
        _ => "application/octet-stream",
    }
}

fn extension_of(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|s| s.to_str())
        .map(str::to_lowercase)
}

/// A raw local file as picked or dropped by the user.
///
/// The bytes are shared so that building an upload payload does not copy
/// the staged data; the staging entry remains the owner of record.
#[derive(Debug, Clone)]
pub struct SourcePayload {
    name: String,
    bytes: Arc<Vec<u8>>,
}

impl SourcePayload {
    /// Creates a payload from a display name and its content.
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes: Arc::new(bytes),
        }
    }

    /// Returns the file name (no directory components).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the raw content.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the shared reference to the content.
    #[must_use]
    pub fn bytes_arc(&self) -> Arc<Vec<u8>> {
        Arc::clone(&self.bytes)
    }

    /// Returns the payload size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if the payload has no content.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
