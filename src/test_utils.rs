// SPDX-License-Identifier: MPL-2.0
//! In-memory fakes for the application ports.
//!
//! [`CountingAllocator`] records every preview handle it issues and takes
//! back; [`ScriptedService`] answers processing calls from queues filled by
//! the test. Both are usable from unit tests and from `tests/`.

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use futures_util::future::{self, FutureExt};

use crate::application::port::{
    PreviewAllocator, ProcessingResponse, ProcessingService, ServiceError, ServiceFuture,
    UploadPart,
};
use crate::domain::media::SourcePayload;
use crate::domain::results::{ArchiveKind, ArchivePayload};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

// =============================================================================
// CountingAllocator
// =============================================================================

/// Handle issued by [`CountingAllocator`].
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct FakeHandle {
    pub serial: u64,
    pub source_name: String,
}

#[derive(Debug, Default)]
struct LedgerState {
    acquired: usize,
    released: usize,
    double_releases: usize,
    live: HashSet<u64>,
}

/// Shared view of a [`CountingAllocator`]'s bookkeeping.
///
/// Stays readable after the allocator has been moved into a store or the
/// store has been dropped.
#[derive(Debug, Clone, Default)]
pub struct PreviewLedger {
    state: Arc<Mutex<LedgerState>>,
}

impl PreviewLedger {
    #[must_use]
    pub fn acquired(&self) -> usize {
        lock(&self.state).acquired
    }

    #[must_use]
    pub fn released(&self) -> usize {
        lock(&self.state).released
    }

    /// Handles released while not live.
    #[must_use]
    pub fn double_releases(&self) -> usize {
        lock(&self.state).double_releases
    }

    /// Handles acquired and not yet released.
    #[must_use]
    pub fn outstanding(&self) -> usize {
        lock(&self.state).live.len()
    }
}

/// Allocator that issues numbered handles and counts releases.
#[derive(Debug, Default)]
pub struct CountingAllocator {
    next_serial: u64,
    ledger: PreviewLedger,
}

impl CountingAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn ledger(&self) -> PreviewLedger {
        self.ledger.clone()
    }
}

impl PreviewAllocator for CountingAllocator {
    type Handle = FakeHandle;

    fn acquire(&mut self, source: &SourcePayload) -> FakeHandle {
        let serial = self.next_serial;
        self.next_serial += 1;

        let mut state = lock(&self.ledger.state);
        state.acquired += 1;
        state.live.insert(serial);

        FakeHandle {
            serial,
            source_name: source.name().to_string(),
        }
    }

    fn release(&mut self, handle: FakeHandle) {
        let mut state = lock(&self.ledger.state);
        if state.live.remove(&handle.serial) {
            state.released += 1;
        } else {
            state.double_releases += 1;
        }
    }
}

// =============================================================================
// ScriptedService
// =============================================================================

#[derive(Debug, Default)]
struct Script {
    process: VecDeque<Result<ProcessingResponse, ServiceError>>,
    archives: VecDeque<Result<Vec<u8>, ServiceError>>,
    results: VecDeque<Result<Vec<u8>, ServiceError>>,
    cleanups: VecDeque<Result<(), ServiceError>>,
    process_calls: usize,
    archive_calls: usize,
    cleanup_calls: usize,
    last_submission: Vec<(String, &'static str)>,
}

/// Processing service answering from queued responses.
///
/// An empty queue answers with `ServiceError::Unreachable`, except cleanup
/// which succeeds.
#[derive(Debug, Default)]
pub struct ScriptedService {
    script: Mutex<Script>,
}

impl ScriptedService {
    pub const BASE_URL: &'static str = "http://scripted.test";

    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_process(&self, response: Result<ProcessingResponse, ServiceError>) {
        lock(&self.script).process.push_back(response);
    }

    pub fn push_archive(&self, bytes: Result<Vec<u8>, ServiceError>) {
        lock(&self.script).archives.push_back(bytes);
    }

    pub fn push_result(&self, bytes: Result<Vec<u8>, ServiceError>) {
        lock(&self.script).results.push_back(bytes);
    }

    pub fn push_cleanup(&self, outcome: Result<(), ServiceError>) {
        lock(&self.script).cleanups.push_back(outcome);
    }

    #[must_use]
    pub fn process_calls(&self) -> usize {
        lock(&self.script).process_calls
    }

    #[must_use]
    pub fn archive_calls(&self) -> usize {
        lock(&self.script).archive_calls
    }

    #[must_use]
    pub fn cleanup_calls(&self) -> usize {
        lock(&self.script).cleanup_calls
    }

    /// Name and MIME type of each part of the last processing request.
    #[must_use]
    pub fn last_submission(&self) -> Vec<(String, &'static str)> {
        lock(&self.script).last_submission.clone()
    }

    fn unscripted<T>() -> Result<T, ServiceError> {
        Err(ServiceError::Unreachable("no scripted response".to_string()))
    }
}

impl ProcessingService for ScriptedService {
    fn process(&self, parts: Vec<UploadPart>) -> ServiceFuture<ProcessingResponse> {
        let mut script = lock(&self.script);
        script.process_calls += 1;
        script.last_submission = parts.iter().map(|p| (p.name.clone(), p.mime)).collect();
        let answer = script.process.pop_front().unwrap_or_else(Self::unscripted);
        future::ready(answer).boxed()
    }

    fn result_url(&self, filename: &str) -> String {
        format!("{}/results/{filename}", Self::BASE_URL)
    }

    fn fetch_result(&self, _filename: &str) -> ServiceFuture<Vec<u8>> {
        let answer = lock(&self.script)
            .results
            .pop_front()
            .unwrap_or_else(Self::unscripted);
        future::ready(answer).boxed()
    }

    fn download_archive(&self, kind: ArchiveKind) -> ServiceFuture<ArchivePayload> {
        let mut script = lock(&self.script);
        script.archive_calls += 1;
        let answer = script
            .archives
            .pop_front()
            .unwrap_or_else(Self::unscripted)
            .map(|bytes| ArchivePayload {
                kind,
                bytes,
                suggested_filename: kind.default_filename().to_string(),
            });
        future::ready(answer).boxed()
    }

    fn cleanup(&self) -> ServiceFuture<()> {
        let mut script = lock(&self.script);
        script.cleanup_calls += 1;
        let answer = script.cleanups.pop_front().unwrap_or(Ok(()));
        future::ready(answer).boxed()
    }
}
