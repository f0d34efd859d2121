// SPDX-License-Identifier: MPL-2.0
//! Local file reading for staging.
//!
//! Paths come from the picker dialog, window drops or the command line. Each
//! readable file becomes a [`SourcePayload`]; unreadable ones are reported
//! individually so one bad path never discards the rest of a selection.

use crate::domain::media::SourcePayload;
use std::path::{Path, PathBuf};

/// A path that could not be turned into a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadFailure {
    pub name: String,
    pub reason: String,
}

/// Result of reading a batch of paths, in input order.
#[derive(Debug, Clone, Default)]
pub struct ReadBatch {
    pub payloads: Vec<SourcePayload>,
    pub failures: Vec<ReadFailure>,
}

impl ReadBatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty() && self.failures.is_empty()
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Reads every path. Directories and unreadable files land in `failures`.
pub async fn read_payloads(paths: Vec<PathBuf>) -> ReadBatch {
    let mut batch = ReadBatch::default();

    for path in paths {
        let name = display_name(&path);

        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_dir() => {
                batch.failures.push(ReadFailure {
                    name,
                    reason: "is a directory".to_string(),
                });
                continue;
            }
            Ok(_) => {}
            Err(err) => {
                batch.failures.push(ReadFailure {
                    name,
                    reason: err.to_string(),
                });
                continue;
            }
        }

        match tokio::fs::read(&path).await {
            Ok(bytes) => batch.payloads.push(SourcePayload::new(name, bytes)),
            Err(err) => batch.failures.push(ReadFailure {
                name,
                reason: err.to_string(),
            }),
        }
    }

    batch
}

/// Opens the multi-select picker. `None` when the user cancels.
pub async fn pick_files(start_dir: Option<PathBuf>) -> Option<Vec<PathBuf>> {
    let mut dialog = rfd::AsyncFileDialog::new();
    if let Some(dir) = start_dir.filter(|d| d.exists()) {
        dialog = dialog.set_directory(&dir);
    }

    dialog.pick_files().await.map(|handles| {
        handles
            .into_iter()
            .map(|handle| handle.path().to_path_buf())
            .collect()
    })
}

/// Opens the save dialog for an archive. `None` when the user cancels.
pub async fn choose_save_path(start_dir: PathBuf, suggested_name: String) -> Option<PathBuf> {
    let mut dialog = rfd::AsyncFileDialog::new().set_file_name(&suggested_name);
    if start_dir.exists() {
        dialog = dialog.set_directory(&start_dir);
    }
    dialog.save_file().await.map(|handle| handle.path().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn reads_files_in_order_and_reports_failures() {
        let dir = tempdir().expect("temp dir");
        let a = dir.path().join("a.png");
        let b = dir.path().join("b.pdf");
        std::fs::write(&a, b"png").expect("write a");
        std::fs::write(&b, b"pdf").expect("write b");
        let missing = dir.path().join("missing.jpg");

        let batch = read_payloads(vec![a, missing, b, dir.path().to_path_buf()]).await;

        let names: Vec<_> = batch.payloads.iter().map(SourcePayload::name).collect();
        assert_eq!(names, ["a.png", "b.pdf"]);
        assert_eq!(batch.payloads[1].bytes(), b"pdf");

        assert_eq!(batch.failures.len(), 2);
        assert_eq!(batch.failures[0].name, "missing.jpg");
        assert_eq!(batch.failures[1].reason, "is a directory");
    }

    #[tokio::test]
    async fn empty_input_gives_empty_batch() {
        assert!(read_payloads(Vec::new()).await.is_empty());
    }
}
