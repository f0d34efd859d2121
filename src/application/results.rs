// SPDX-License-Identifier: MPL-2.0
//! Results review session.
//!
//! Created from a successful submission and dropped when the user leaves the
//! results screen. Holds the result carousel, the thumbnail fetch state of
//! each item and the download/cleanup bookkeeping.

use crate::application::download::DownloadOrchestrator;
use crate::application::upload::SubmissionReceipt;
use crate::domain::carousel::{Carousel, CarouselError};
use crate::domain::results::ResultItem;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies one results session. Responses to requests started by a
/// session carry its id so late arrivals can be told apart from current ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

impl SessionId {
    fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Fetch state of one result thumbnail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThumbnailState<H> {
    Loading,
    Ready(H),
    Failed(String),
}

impl<H> ThumbnailState<H> {
    #[must_use]
    pub fn handle(&self) -> Option<&H> {
        match self {
            ThumbnailState::Ready(handle) => Some(handle),
            _ => None,
        }
    }
}

/// State of the results screen.
#[derive(Debug)]
pub struct ResultsSession<H> {
    id: SessionId,
    carousel: Carousel<ResultItem>,
    thumbnails: Vec<ThumbnailState<H>>,
    annotation_filenames: Vec<String>,
    downloads: DownloadOrchestrator,
}

impl<H> ResultsSession<H> {
    /// Builds a session with every thumbnail in the loading state.
    #[must_use]
    pub fn new(receipt: SubmissionReceipt) -> Self {
        let thumbnails = receipt
            .results
            .iter()
            .map(|_| ThumbnailState::Loading)
            .collect();
        Self {
            id: SessionId::next(),
            carousel: Carousel::new(receipt.results),
            thumbnails,
            annotation_filenames: receipt.annotation_filenames,
            downloads: DownloadOrchestrator::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn items(&self) -> &[ResultItem] {
        self.carousel.items()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.carousel.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.carousel.is_empty()
    }

    #[must_use]
    pub fn carousel(&self) -> &Carousel<ResultItem> {
        &self.carousel
    }

    /// Opens the full-screen view on `index`.
    ///
    /// # Errors
    ///
    /// Returns [`CarouselError::IndexOutOfRange`] if `index` is not a result.
    pub fn open(&mut self, index: usize) -> Result<&ResultItem, CarouselError> {
        self.carousel.open(index)
    }

    pub fn close(&mut self) {
        self.carousel.close();
    }

    pub fn next(&mut self) -> Option<&ResultItem> {
        self.carousel.next()
    }

    pub fn previous(&mut self) -> Option<&ResultItem> {
        self.carousel.previous()
    }

    #[must_use]
    pub fn thumbnail(&self, index: usize) -> Option<&ThumbnailState<H>> {
        self.thumbnails.get(index)
    }

    /// Stores a fetched thumbnail. Ignored when `index` is out of range.
    pub fn set_thumbnail(&mut self, index: usize, state: ThumbnailState<H>) {
        if let Some(slot) = self.thumbnails.get_mut(index) {
            *slot = state;
        }
    }

    /// Thumbnail of the item shown full-screen, if it is loaded.
    #[must_use]
    pub fn active_handle(&self) -> Option<&H> {
        self.carousel
            .active_index()
            .and_then(|index| self.thumbnails.get(index))
            .and_then(ThumbnailState::handle)
    }

    #[must_use]
    pub fn annotation_filenames(&self) -> &[String] {
        &self.annotation_filenames
    }

    #[must_use]
    pub fn downloads(&self) -> &DownloadOrchestrator {
        &self.downloads
    }

    pub fn downloads_mut(&mut self) -> &mut DownloadOrchestrator {
        &mut self.downloads
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(count: usize) -> ResultsSession<u32> {
        let results = (0..count)
            .map(|i| {
                let name = format!("annotated_{i}.png");
                ResultItem::new(name.clone(), format!("http://h/results/{name}"), None)
            })
            .collect();
        ResultsSession::new(SubmissionReceipt {
            results,
            annotation_filenames: vec!["0.json".into()],
        })
    }

    #[test]
    fn starts_closed_with_loading_thumbnails() {
        let session = session(3);
        assert_eq!(session.len(), 3);
        assert!(!session.carousel().is_open());
        assert_eq!(session.thumbnail(2), Some(&ThumbnailState::Loading));
        assert_eq!(session.annotation_filenames(), ["0.json".to_string()]);
    }

    #[test]
    fn navigation_wraps_over_results() {
        let mut session = session(4);
        session.open(0).expect("in range");
        for _ in 0..5 {
            session.next();
        }
        assert_eq!(session.carousel().active_index(), Some(1));
    }

    #[test]
    fn active_handle_follows_carousel() {
        let mut session = session(2);
        session.set_thumbnail(1, ThumbnailState::Ready(7));
        assert_eq!(session.active_handle(), None);

        session.open(1).expect("in range");
        assert_eq!(session.active_handle(), Some(&7));

        session.next();
        assert_eq!(session.active_handle(), None);
    }

    #[test]
    fn each_session_gets_its_own_id() {
        let first = session(1);
        let second = session(1);
        assert_ne!(first.id(), second.id());
        assert_eq!(first.id(), first.id());
    }

    #[test]
    fn out_of_range_thumbnail_is_ignored() {
        let mut session = session(1);
        session.set_thumbnail(5, ThumbnailState::Ready(1));
        assert_eq!(session.thumbnail(5), None);
    }
}
