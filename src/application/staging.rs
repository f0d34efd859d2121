// SPDX-License-Identifier: MPL-2.0
//! File staging store.
//!
//! Holds the ordered set of files picked or dropped by the user until they
//! are submitted. Image entries own a preview handle obtained from a
//! [`PreviewAllocator`]; the store is the only place those handles are
//! acquired and released.
//!
//! Every removal path gives the handle back exactly once: [`StagingStore::remove`],
//! [`StagingStore::clear`] and dropping the store.

use crate::application::port::PreviewAllocator;
use crate::domain::media::{MimeCategory, SourcePayload};
use std::fmt;
use std::path::Path;

/// Identifier of a staged entry, unique within its store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StagedFileId(u64);

impl fmt::Display for StagedFileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Errors reported by staging operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagingError {
    /// No entry with this id is staged. Nothing was changed.
    UnknownEntry(StagedFileId),
}

impl fmt::Display for StagingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StagingError::UnknownEntry(id) => write!(f, "No staged file with id {id}"),
        }
    }
}

impl std::error::Error for StagingError {}

/// One file waiting for submission.
#[derive(Debug)]
pub struct StagedFile<H> {
    id: StagedFileId,
    source: SourcePayload,
    preview: Option<H>,
    category: MimeCategory,
}

impl<H> StagedFile<H> {
    #[must_use]
    pub fn id(&self) -> StagedFileId {
        self.id
    }

    #[must_use]
    pub fn source(&self) -> &SourcePayload {
        &self.source
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        self.source.name()
    }

    #[must_use]
    pub fn category(&self) -> MimeCategory {
        self.category
    }

    /// The preview handle, present only for unreleased image entries.
    #[must_use]
    pub fn preview(&self) -> Option<&H> {
        self.preview.as_ref()
    }
}

/// Display grouping returned by [`StagingStore::partition`].
#[derive(Debug)]
pub struct Partition<'a, H> {
    /// Entries with a preview handle, in staging order.
    pub images: Vec<&'a StagedFile<H>>,
    /// Entries without one, in staging order.
    pub documents: Vec<&'a StagedFile<H>>,
}

/// Classifies a payload, sniffing the content when the name has no extension.
#[must_use]
pub fn classify(source: &SourcePayload) -> MimeCategory {
    let by_name = MimeCategory::from_name(source.name());
    if by_name.is_image() {
        return by_name;
    }

    let has_extension = Path::new(source.name()).extension().is_some();
    if !has_extension && image_rs::guess_format(source.bytes()).is_ok() {
        MimeCategory::Image
    } else {
        MimeCategory::Document
    }
}

/// Ordered set of files pending submission.
pub struct StagingStore<A: PreviewAllocator> {
    allocator: A,
    entries: Vec<StagedFile<A::Handle>>,
    next_id: u64,
}

impl<A: PreviewAllocator> StagingStore<A> {
    /// Creates an empty store backed by `allocator`.
    pub fn new(allocator: A) -> Self {
        Self {
            allocator,
            entries: Vec::new(),
            next_id: 0,
        }
    }

    /// Appends `sources` in arrival order and returns the new ids.
    ///
    /// Image payloads get a preview handle immediately. Duplicate names are
    /// staged as distinct entries.
    pub fn add<I>(&mut self, sources: I) -> Vec<StagedFileId>
    where
        I: IntoIterator<Item = SourcePayload>,
    {
        let mut added = Vec::new();
        for source in sources {
            let category = classify(&source);
            let preview = category
                .is_image()
                .then(|| self.allocator.acquire(&source));

            let id = StagedFileId(self.next_id);
            self.next_id += 1;

            self.entries.push(StagedFile {
                id,
                source,
                preview,
                category,
            });
            added.push(id);
        }
        added
    }

    /// Removes one entry and releases its preview.
    ///
    /// # Errors
    ///
    /// Returns [`StagingError::UnknownEntry`] if `id` is not staged; the
    /// store is left unchanged.
    pub fn remove(&mut self, id: StagedFileId) -> Result<SourcePayload, StagingError> {
        let index = self
            .position(id)
            .ok_or(StagingError::UnknownEntry(id))?;

        // Drop the entry from the sequence before its handle is invalidated.
        let mut entry = self.entries.remove(index);
        if let Some(handle) = entry.preview.take() {
            self.allocator.release(handle);
        }
        Ok(entry.source)
    }

    /// Releases every preview and empties the store.
    ///
    /// Returns the number of handles released.
    pub fn clear(&mut self) -> usize {
        let entries = std::mem::take(&mut self.entries);
        let mut released = 0;
        for mut entry in entries {
            if let Some(handle) = entry.preview.take() {
                self.allocator.release(handle);
                released += 1;
            }
        }
        released
    }

    /// Splits the entries into image-like and document-like groups.
    #[must_use]
    pub fn partition(&self) -> Partition<'_, A::Handle> {
        let (images, documents) = self
            .entries
            .iter()
            .partition(|entry| entry.preview.is_some());
        Partition { images, documents }
    }

    /// Returns the entries in staging order.
    pub fn iter(&self) -> impl Iterator<Item = &StagedFile<A::Handle>> {
        self.entries.iter()
    }

    #[must_use]
    pub fn get(&self, id: StagedFileId) -> Option<&StagedFile<A::Handle>> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: StagedFileId) -> bool {
        self.position(id).is_some()
    }

    #[must_use]
    pub fn position(&self, id: StagedFileId) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of preview handles currently held by staged entries.
    #[must_use]
    pub fn outstanding_previews(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.preview.is_some())
            .count()
    }

    /// Sum of all staged payload sizes.
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.entries
            .iter()
            .map(|entry| entry.source.len() as u64)
            .sum()
    }

    /// Returns the allocator, for inspection.
    #[must_use]
    pub fn allocator(&self) -> &A {
        &self.allocator
    }
}

impl<A: PreviewAllocator> Drop for StagingStore<A> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<A: PreviewAllocator> fmt::Debug for StagingStore<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StagingStore")
            .field("len", &self.entries.len())
            .field("outstanding_previews", &self.outstanding_previews())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{CountingAllocator, PreviewLedger};

    fn payload(name: &str) -> SourcePayload {
        SourcePayload::new(name, b"fake data".to_vec())
    }

    fn store() -> (StagingStore<CountingAllocator>, PreviewLedger) {
        let allocator = CountingAllocator::new();
        let ledger = allocator.ledger();
        (StagingStore::new(allocator), ledger)
    }

    #[test]
    fn new_store_is_empty() {
        let (store, ledger) = store();
        assert!(store.is_empty());
        assert_eq!(store.outstanding_previews(), 0);
        assert_eq!(ledger.acquired(), 0);
    }

    #[test]
    fn add_preserves_arrival_order_and_allows_duplicates() {
        let (mut store, _ledger) = store();
        let ids = store.add(vec![payload("x.png"), payload("a.png"), payload("x.png")]);

        assert_eq!(ids.len(), 3);
        assert_ne!(ids[0], ids[2]);
        let names: Vec<_> = store.iter().map(StagedFile::display_name).collect();
        assert_eq!(names, vec!["x.png", "a.png", "x.png"]);
    }

    #[test]
    fn add_appends_and_never_replaces() {
        let (mut store, _ledger) = store();
        store.add(vec![payload("a.png")]);
        store.add(vec![payload("b.png")]);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn only_images_acquire_previews() {
        let (mut store, ledger) = store();
        store.add(vec![payload("a.png"), payload("b.pdf"), payload("c.jpg")]);

        assert_eq!(ledger.acquired(), 2);
        assert_eq!(store.outstanding_previews(), 2);
        let doc = store.iter().nth(1).expect("second entry");
        assert!(doc.preview().is_none());
        assert_eq!(doc.category(), MimeCategory::Document);
    }

    #[test]
    fn partition_groups_and_preserves_order() {
        let (mut store, _ledger) = store();
        store.add(vec![payload("a.png"), payload("b.pdf"), payload("c.jpg")]);

        let partition = store.partition();
        let images: Vec<_> = partition.images.iter().map(|e| e.display_name()).collect();
        let documents: Vec<_> = partition
            .documents
            .iter()
            .map(|e| e.display_name())
            .collect();
        assert_eq!(images, vec!["a.png", "c.jpg"]);
        assert_eq!(documents, vec!["b.pdf"]);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn remove_releases_preview_once() {
        let (mut store, ledger) = store();
        let ids = store.add(vec![payload("a.png"), payload("b.png")]);

        let removed = store.remove(ids[0]).expect("staged id");
        assert_eq!(removed.name(), "a.png");
        assert_eq!(ledger.released(), 1);
        assert_eq!(ledger.double_releases(), 0);
        assert!(!store.contains(ids[0]));
    }

    #[test]
    fn remove_document_releases_nothing() {
        let (mut store, ledger) = store();
        let ids = store.add(vec![payload("b.pdf")]);
        store.remove(ids[0]).expect("staged id");
        assert_eq!(ledger.released(), 0);
    }

    #[test]
    fn remove_unknown_id_is_reported_and_harmless() {
        let (mut store, ledger) = store();
        let ids = store.add(vec![payload("a.png")]);
        store.remove(ids[0]).expect("staged id");

        assert_eq!(store.remove(ids[0]).err(), Some(StagingError::UnknownEntry(ids[0])));
        assert_eq!(ledger.released(), 1);
    }

    #[test]
    fn clear_releases_everything() {
        let (mut store, ledger) = store();
        store.add(vec![payload("a.png"), payload("b.pdf"), payload("c.jpg")]);

        assert_eq!(store.clear(), 2);
        assert!(store.is_empty());
        assert_eq!(ledger.outstanding(), 0);
    }

    #[test]
    fn clear_then_add_nothing_is_empty() {
        let (mut store, ledger) = store();
        store.add(vec![payload("a.png")]);
        store.clear();
        store.add(Vec::new());

        assert!(store.is_empty());
        assert_eq!(store.outstanding_previews(), 0);
        assert_eq!(ledger.outstanding(), 0);
    }

    #[test]
    fn drop_releases_remaining_previews() {
        let (mut store, ledger) = store();
        store.add(vec![payload("a.png"), payload("c.jpg")]);
        drop(store);

        assert_eq!(ledger.acquired(), 2);
        assert_eq!(ledger.released(), 2);
    }

    #[test]
    fn handle_accounting_holds_for_mixed_sequences() {
        let (mut store, ledger) = store();
        let names = ["a.png", "b.pdf", "c.jpg", "d.gif", "e.txt", "f.bmp"];

        for round in 0..4 {
            let ids = store.add(names.iter().map(|n| payload(n)));
            for (i, id) in ids.iter().enumerate() {
                if (i + round) % 3 == 0 {
                    store.remove(*id).expect("staged id");
                }
            }

            let staged_images = store
                .iter()
                .filter(|e| e.category() == MimeCategory::Image)
                .count();
            assert_eq!(ledger.acquired(), staged_images + ledger.released());
            assert_eq!(ledger.outstanding(), staged_images);
            assert_eq!(ledger.double_releases(), 0);
        }
    }

    #[test]
    fn extensionless_png_is_sniffed_as_image() {
        let png_magic = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
        let source = SourcePayload::new("camera-dump", png_magic);
        assert_eq!(classify(&source), MimeCategory::Image);

        let text = SourcePayload::new("notes", b"plain text".to_vec());
        assert_eq!(classify(&text), MimeCategory::Document);
    }

    #[test]
    fn total_bytes_sums_payloads() {
        let (mut store, _ledger) = store();
        store.add(vec![
            SourcePayload::new("a.png", vec![0; 10]),
            SourcePayload::new("b.pdf", vec![0; 5]),
        ]);
        assert_eq!(store.total_bytes(), 15);
    }
}
