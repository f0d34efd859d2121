// SPDX-License-Identifier: MPL-2.0
//! Upload orchestration.
//!
//! Turns the staging store contents into a single batch submission and maps
//! the server answer into [`ResultItem`]s. At most one submission may be in
//! flight; the staged entries are left untouched whatever the outcome.
//!
//! The work is split so the UI can run the network part on the iced runtime:
//!
//! 1. [`UploadOrchestrator::begin`] snapshots the store into a
//!    [`SubmissionTicket`] and marks the orchestrator busy
//! 2. [`SubmissionTicket::dispatch`] performs the request (`'static` future)
//! 3. [`UploadOrchestrator::complete`] clears the busy flag
//!
//! [`UploadOrchestrator::submit`] chains the three for callers that hold the
//! store across the await.

use crate::application::port::{PreviewAllocator, ProcessingService, ServiceError, UploadPart};
use crate::application::staging::StagingStore;
use crate::domain::media::mime_type_for;
use crate::domain::results::{correlate, ResultItem};
use std::fmt;
use std::sync::Arc;

/// Errors surfaced by the upload flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    /// The store was empty; no request was made.
    NothingStaged,
    /// A submission is already running; no request was made.
    AlreadyInFlight,
    /// The request failed or the answer was unusable.
    SubmissionFailed(ServiceError),
}

impl UploadError {
    /// Returns the i18n message key for this error.
    #[must_use]
    pub fn i18n_key(&self) -> &'static str {
        match self {
            UploadError::NothingStaged => "upload-error-nothing-staged",
            UploadError::AlreadyInFlight => "upload-error-in-flight",
            UploadError::SubmissionFailed(_) => "upload-error-failed",
        }
    }
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadError::NothingStaged => write!(f, "No files staged for upload"),
            UploadError::AlreadyInFlight => write!(f, "A submission is already in progress"),
            UploadError::SubmissionFailed(err) => write!(f, "Submission failed: {err}"),
        }
    }
}

impl std::error::Error for UploadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UploadError::SubmissionFailed(err) => Some(err),
            _ => None,
        }
    }
}

/// Successful submission outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionReceipt {
    /// Output images, correlated with the submitted files.
    pub results: Vec<ResultItem>,
    /// Annotation file names, kept for the archive download.
    pub annotation_filenames: Vec<String>,
}

/// Snapshot of the staged files for one request.
///
/// Owns shared references to the payload bytes, so the store may keep
/// changing while the request runs.
#[derive(Debug, Clone)]
pub struct SubmissionTicket {
    parts: Vec<UploadPart>,
}

impl SubmissionTicket {
    /// Number of files in the request.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Names of the submitted files, in staging order.
    #[must_use]
    pub fn source_names(&self) -> Vec<String> {
        self.parts.iter().map(|part| part.name.clone()).collect()
    }

    /// Sends the request and builds the receipt.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::SubmissionFailed`] on any service error, and
    /// also when the server reports success without a single output image.
    pub async fn dispatch(
        self,
        service: Arc<dyn ProcessingService>,
    ) -> Result<SubmissionReceipt, UploadError> {
        let source_names = self.source_names();
        let response = service
            .process(self.parts)
            .await
            .map_err(UploadError::SubmissionFailed)?;

        if response.filenames.is_empty() {
            return Err(UploadError::SubmissionFailed(ServiceError::InvalidResponse(
                "no output images".to_string(),
            )));
        }

        let results = correlate(&source_names, &response.filenames)
            .into_iter()
            .map(|(filename, source)| {
                let url = service.result_url(&filename);
                ResultItem::new(filename, url, source)
            })
            .collect();

        Ok(SubmissionReceipt {
            results,
            annotation_filenames: response.annotation_filenames,
        })
    }
}

/// Tracks whether a submission is running.
#[derive(Debug, Default)]
pub struct UploadOrchestrator {
    in_flight: bool,
}

impl UploadOrchestrator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a submission is running. The submit control is disabled
    /// while this is true.
    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Starts a submission of everything currently staged.
    ///
    /// # Errors
    ///
    /// - [`UploadError::AlreadyInFlight`] if a submission is running
    /// - [`UploadError::NothingStaged`] if the store is empty
    pub fn begin<A: PreviewAllocator>(
        &mut self,
        store: &StagingStore<A>,
    ) -> Result<SubmissionTicket, UploadError> {
        if self.in_flight {
            return Err(UploadError::AlreadyInFlight);
        }
        if store.is_empty() {
            return Err(UploadError::NothingStaged);
        }

        let parts = store
            .iter()
            .map(|entry| UploadPart {
                name: entry.display_name().to_string(),
                mime: mime_type_for(entry.display_name()),
                bytes: entry.source().bytes_arc(),
            })
            .collect();

        self.in_flight = true;
        Ok(SubmissionTicket { parts })
    }

    /// Marks the running submission as finished and passes the outcome on.
    pub fn complete<T>(&mut self, outcome: Result<T, UploadError>) -> Result<T, UploadError> {
        self.in_flight = false;
        outcome
    }

    /// Submits all staged files and waits for the answer.
    ///
    /// # Errors
    ///
    /// See [`begin`](Self::begin) and [`SubmissionTicket::dispatch`].
    pub async fn submit<A: PreviewAllocator>(
        &mut self,
        store: &StagingStore<A>,
        service: Arc<dyn ProcessingService>,
    ) -> Result<SubmissionReceipt, UploadError> {
        let ticket = self.begin(store)?;
        let outcome = ticket.dispatch(service).await;
        self.complete(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::port::ProcessingResponse;
    use crate::domain::media::SourcePayload;
    use crate::test_utils::{CountingAllocator, ScriptedService};

    fn staged(names: &[&str]) -> StagingStore<CountingAllocator> {
        let mut store = StagingStore::new(CountingAllocator::new());
        store.add(
            names
                .iter()
                .map(|n| SourcePayload::new(*n, b"bytes".to_vec())),
        );
        store
    }

    #[tokio::test]
    async fn empty_store_makes_no_request() {
        let store = staged(&[]);
        let service = ScriptedService::new();
        let mut orchestrator = UploadOrchestrator::new();

        let result = orchestrator.submit(&store, service.clone()).await;
        assert_eq!(result, Err(UploadError::NothingStaged));
        assert_eq!(service.process_calls(), 0);
        assert!(!orchestrator.is_in_flight());
    }

    #[tokio::test]
    async fn successful_submission_builds_results() {
        let store = staged(&["a.png", "b.jpg"]);
        let service = ScriptedService::new();
        service.push_process(Ok(ProcessingResponse {
            filenames: vec!["annotated_b.jpg".into(), "annotated_a.png".into()],
            annotation_filenames: vec!["a.json".into(), "b.json".into()],
        }));
        let mut orchestrator = UploadOrchestrator::new();

        let receipt = orchestrator
            .submit(&store, service.clone())
            .await
            .expect("submission succeeds");

        let names: Vec<_> = receipt.results.iter().map(ResultItem::filename).collect();
        assert_eq!(names, vec!["annotated_a.png", "annotated_b.jpg"]);
        assert_eq!(
            receipt.results[0].remote_url(),
            service.result_url("annotated_a.png")
        );
        assert_eq!(receipt.annotation_filenames.len(), 2);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn request_carries_every_staged_file() {
        let store = staged(&["a.png", "notes.pdf"]);
        let service = ScriptedService::new();
        service.push_process(Ok(ProcessingResponse {
            filenames: vec!["annotated_a.png".into()],
            annotation_filenames: Vec::new(),
        }));

        UploadOrchestrator::new()
            .submit(&store, service.clone())
            .await
            .expect("submission succeeds");

        let sent = service.last_submission();
        let sent: Vec<_> = sent.iter().map(|(name, mime)| (name.as_str(), *mime)).collect();
        assert_eq!(
            sent,
            vec![("a.png", "image/png"), ("notes.pdf", "application/pdf")]
        );
    }

    #[tokio::test]
    async fn failure_keeps_staging_intact() {
        let store = staged(&["a.png", "b.png"]);
        let service = ScriptedService::new();
        service.push_process(Err(ServiceError::Status {
            code: 500,
            detail: "boom".into(),
        }));
        let mut orchestrator = UploadOrchestrator::new();

        let result = orchestrator.submit(&store, service).await;
        assert!(matches!(result, Err(UploadError::SubmissionFailed(_))));
        assert_eq!(store.len(), 2);
        assert_eq!(store.outstanding_previews(), 2);
        assert!(!orchestrator.is_in_flight());
    }

    #[tokio::test]
    async fn empty_result_list_is_a_failure() {
        let store = staged(&["a.png"]);
        let service = ScriptedService::new();
        service.push_process(Ok(ProcessingResponse::default()));

        let result = UploadOrchestrator::new().submit(&store, service).await;
        assert!(matches!(
            result,
            Err(UploadError::SubmissionFailed(ServiceError::InvalidResponse(_)))
        ));
    }

    #[test]
    fn second_begin_is_rejected_while_in_flight() {
        let store = staged(&["a.png"]);
        let mut orchestrator = UploadOrchestrator::new();

        let ticket = orchestrator.begin(&store).expect("first begin");
        assert_eq!(ticket.len(), 1);
        assert!(orchestrator.is_in_flight());
        assert!(matches!(
            orchestrator.begin(&store),
            Err(UploadError::AlreadyInFlight)
        ));

        let _ = orchestrator.complete::<()>(Err(UploadError::NothingStaged));
        assert!(!orchestrator.is_in_flight());
        assert!(orchestrator.begin(&store).is_ok());
    }

    #[test]
    fn error_keys_are_stable() {
        assert_eq!(UploadError::NothingStaged.i18n_key(), "upload-error-nothing-staged");
        assert_eq!(
            UploadError::SubmissionFailed(ServiceError::Timeout).i18n_key(),
            "upload-error-failed"
        );
    }
}
