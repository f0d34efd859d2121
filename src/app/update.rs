// SPDX-License-Identifier: MPL-2.0
//! Message handlers for the application.
//!
//! Pages report what happened as events; the handlers here turn those into
//! tasks (file dialogs, HTTP calls, disk writes), notifications and
//! diagnostic events. Every network result comes back as a message and is
//! applied here, so in-memory state only changes inside `App::update`.

use super::message::StageOrigin;
use super::{Message, Screen};
use crate::application::download;
use crate::application::port::{ProcessingService, ServiceError};
use crate::application::results::SessionId;
use crate::application::upload::{SubmissionReceipt, UploadError};
use crate::diagnostics::{AppOperation, DiagnosticsCollector, UserAction};
use crate::domain::results::{ArchiveKind, ArchivePayload, ResultItem};
use crate::i18n::fluent::I18n;
use crate::infrastructure::files::{self, ReadBatch};
use crate::ui::carousel_view;
use crate::ui::notifications::{self, Notification};
use crate::ui::{results_page, upload_page};
use iced::keyboard::Key;
use iced::{window, Task};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Saved-archive toasts carry a path and stay up longer than other successes.
const SAVED_TOAST_DURATION: Duration = Duration::from_secs(6);

/// Bookkeeping for the submission in flight.
#[derive(Debug, Clone, Copy)]
pub struct PendingSubmission {
    pub started: Instant,
    pub files: usize,
}

/// Context for update operations containing mutable references to app state.
pub struct UpdateContext<'a> {
    pub i18n: &'a I18n,
    pub screen: &'a mut Screen,
    pub upload: &'a mut upload_page::State,
    pub results: &'a mut Option<results_page::State>,
    pub service: Option<&'a Arc<dyn ProcessingService>>,
    pub notifications: &'a mut notifications::Manager,
    pub diagnostics: &'a mut DiagnosticsCollector,
    pub download_dir: &'a Path,
    pub pending_submission: &'a mut Option<PendingSubmission>,
}

/// Localized description of a server failure.
pub fn describe_service_error(i18n: &I18n, error: &ServiceError) -> String {
    match error {
        ServiceError::Unreachable(detail) | ServiceError::InvalidResponse(detail) => {
            i18n.tr_with_args(error.i18n_key(), &[("detail", detail.as_str())])
        }
        ServiceError::Timeout => i18n.tr(error.i18n_key()),
        ServiceError::Status { code, detail } => {
            let code = code.to_string();
            i18n.tr_with_args(
                error.i18n_key(),
                &[("code", code.as_str()), ("detail", detail.as_str())],
            )
        }
    }
}

fn upload_error_notification(i18n: &I18n, error: &UploadError) -> Notification {
    match error {
        UploadError::SubmissionFailed(cause) => Notification::error(error.i18n_key())
            .with_arg("reason", describe_service_error(i18n, cause)),
        UploadError::NothingStaged | UploadError::AlreadyInFlight => {
            Notification::warning(error.i18n_key())
        }
    }
}

fn download_error_notification(i18n: &I18n, error: &download::DownloadError) -> Notification {
    use download::DownloadError;
    let archive = |kind: &ArchiveKind| i18n.tr(kind.i18n_key());
    match error {
        DownloadError::Service(cause) => Notification::error(error.i18n_key())
            .with_arg("detail", describe_service_error(i18n, cause)),
        DownloadError::EmptyPayload(kind) => {
            Notification::warning(error.i18n_key()).with_arg("archive", archive(kind))
        }
        DownloadError::AlreadyInFlight(kind) => {
            Notification::info(error.i18n_key()).with_arg("archive", archive(kind))
        }
        DownloadError::Save(detail) => {
            Notification::error(error.i18n_key()).with_arg("detail", detail.clone())
        }
    }
}

fn archive_label(kind: ArchiveKind) -> String {
    match kind {
        ArchiveKind::Images => "images".to_string(),
        ArchiveKind::Annotations => "annotations".to_string(),
    }
}

fn log_carousel_action(diagnostics: &mut DiagnosticsCollector, message: carousel_view::Message) {
    let action = match message {
        carousel_view::Message::Next => UserAction::NavigateNext,
        carousel_view::Message::Previous => UserAction::NavigatePrevious,
        carousel_view::Message::Close => UserAction::CloseCarousel,
    };
    diagnostics.log_action(action);
}

// =============================================================================
// Upload screen
// =============================================================================

pub fn handle_upload_message(
    ctx: &mut UpdateContext<'_>,
    message: upload_page::Message,
) -> Task<Message> {
    match &message {
        upload_page::Message::Carousel(nav) => log_carousel_action(ctx.diagnostics, *nav),
        upload_page::Message::OpenPreview(id) => {
            if let Some(index) = ctx.upload.store().position(*id) {
                ctx.diagnostics.log_action(UserAction::OpenCarousel { index });
            }
        }
        upload_page::Message::Submit => ctx.diagnostics.log_action(UserAction::SubmitBatch),
        _ => {}
    }

    match ctx.upload.update(message) {
        upload_page::Event::None => Task::none(),
        upload_page::Event::PickFiles => {
            ctx.diagnostics.log_action(UserAction::PickFiles);
            Task::perform(files::pick_files(None), Message::FilesPicked)
        }
        upload_page::Event::Removed(payload) => {
            ctx.diagnostics.log_action_with_details(
                UserAction::RemoveStagedFile,
                Some(payload.name().to_string()),
            );
            Task::none()
        }
        upload_page::Event::Cleared { released } => {
            ctx.diagnostics
                .log_operation(AppOperation::StagingCleared { released });
            Task::none()
        }
        upload_page::Event::Submit(ticket) => {
            let Some(service) = ctx.service.cloned() else {
                let outcome = ctx.upload.finish_submission(Err(UploadError::SubmissionFailed(
                    ServiceError::Unreachable("no server configured".to_string()),
                )));
                if let Err(err) = outcome {
                    ctx.notifications
                        .push(upload_error_notification(ctx.i18n, &err));
                }
                return Task::none();
            };

            *ctx.pending_submission = Some(PendingSubmission {
                started: Instant::now(),
                files: ticket.len(),
            });
            Task::perform(ticket.dispatch(service), Message::SubmissionFinished)
        }
        upload_page::Event::SubmitRejected(err) => {
            ctx.notifications
                .push(upload_error_notification(ctx.i18n, &err));
            Task::none()
        }
    }
}

pub fn handle_files_picked(paths: Option<Vec<PathBuf>>) -> Task<Message> {
    match paths {
        Some(paths) if !paths.is_empty() => read_files(paths, StageOrigin::Picker),
        _ => Task::none(),
    }
}

pub fn handle_file_dropped(ctx: &mut UpdateContext<'_>, path: PathBuf) -> Task<Message> {
    ctx.diagnostics.log_action_with_details(
        UserAction::DropFiles,
        Some(path.to_string_lossy().into_owned()),
    );
    read_files(vec![path], StageOrigin::Drop)
}

pub fn read_files(paths: Vec<PathBuf>, origin: StageOrigin) -> Task<Message> {
    Task::perform(files::read_payloads(paths), move |batch| Message::FilesRead {
        batch,
        origin,
    })
}

pub fn handle_files_read(
    ctx: &mut UpdateContext<'_>,
    batch: ReadBatch,
    origin: StageOrigin,
) -> Task<Message> {
    for failure in &batch.failures {
        ctx.notifications.push(
            Notification::warning("upload-read-error")
                .with_arg("name", failure.name.clone())
                .with_arg("reason", failure.reason.clone()),
        );
    }

    if batch.payloads.is_empty() {
        return Task::none();
    }

    // The submitted set is fixed once sent; late arrivals would be cleared
    // together with it on success.
    if ctx.upload.is_submitting() || *ctx.screen != Screen::Upload {
        ctx.notifications
            .push(Notification::warning("upload-error-in-flight"));
        return Task::none();
    }

    let summary = ctx.upload.stage(batch.payloads);
    ctx.diagnostics.log_operation(AppOperation::FilesStaged {
        count: summary.added,
        images: summary.images,
    });
    if origin == StageOrigin::CommandLine {
        ctx.notifications.push(
            Notification::info("upload-preloaded").with_arg("count", summary.added.to_string()),
        );
    }
    Task::none()
}

pub fn handle_submission_finished(
    ctx: &mut UpdateContext<'_>,
    result: Result<SubmissionReceipt, UploadError>,
) -> Task<Message> {
    let pending = ctx.pending_submission.take();
    let held_previews = ctx.upload.store().outstanding_previews();

    match ctx.upload.finish_submission(result) {
        Ok(receipt) => {
            ctx.notifications.clear_upload_errors();
            if let Some(pending) = pending {
                ctx.diagnostics
                    .log_operation(AppOperation::SubmissionCompleted {
                        files: pending.files,
                        results: receipt.results.len(),
                        duration_ms: u64::try_from(pending.started.elapsed().as_millis())
                            .unwrap_or(u64::MAX),
                    });
            }
            ctx.diagnostics.log_operation(AppOperation::StagingCleared {
                released: held_previews,
            });
            Task::done(Message::ProcessingComplete {
                results: receipt.results,
                annotation_filenames: receipt.annotation_filenames,
            })
        }
        Err(err) => {
            ctx.notifications
                .push(upload_error_notification(ctx.i18n, &err));
            Task::none()
        }
    }
}

// =============================================================================
// Results screen
// =============================================================================

pub fn handle_processing_complete(
    ctx: &mut UpdateContext<'_>,
    results: Vec<ResultItem>,
    annotation_filenames: Vec<String>,
) -> Task<Message> {
    let count = results.len();
    let page = results_page::State::new(SubmissionReceipt {
        results,
        annotation_filenames,
    });
    let session = page.id();
    let fetches: Vec<Task<Message>> = match ctx.service {
        Some(service) => page
            .session()
            .items()
            .iter()
            .enumerate()
            .map(|(index, item)| {
                Task::perform(service.fetch_result(item.filename()), move |result| {
                    Message::ThumbnailLoaded {
                        session,
                        index,
                        result,
                    }
                })
            })
            .collect(),
        None => Vec::new(),
    };

    *ctx.results = Some(page);
    *ctx.screen = Screen::Results;
    ctx.notifications
        .push(Notification::success("upload-success").with_arg("count", count.to_string()));

    Task::batch(fetches)
}

/// The results page, if `session` is the one on screen.
fn current_results(
    results: &mut Option<results_page::State>,
    session: SessionId,
) -> Option<&mut results_page::State> {
    results.as_mut().filter(|page| page.id() == session)
}

pub fn handle_thumbnail_loaded(
    ctx: &mut UpdateContext<'_>,
    session: SessionId,
    index: usize,
    result: Result<Vec<u8>, ServiceError>,
) -> Task<Message> {
    if let Some(results) = current_results(ctx.results, session) {
        if let Err(err) = &result {
            ctx.diagnostics
                .log_warning(format!("result {index} not fetched: {err}"));
        }
        results.thumbnail_loaded(index, result);
    }
    Task::none()
}

pub fn handle_results_message(
    ctx: &mut UpdateContext<'_>,
    message: results_page::Message,
) -> Task<Message> {
    let Some(results) = ctx.results.as_mut() else {
        return Task::none();
    };
    let session = results.id();

    match &message {
        results_page::Message::Open(index) => ctx
            .diagnostics
            .log_action(UserAction::OpenCarousel { index: *index }),
        results_page::Message::Carousel(nav) => log_carousel_action(ctx.diagnostics, *nav),
        results_page::Message::Download(kind) => {
            ctx.diagnostics.log_action(UserAction::DownloadArchive {
                archive: archive_label(*kind),
            });
        }
        results_page::Message::Back => ctx.diagnostics.log_action(UserAction::ReturnToUpload),
    }

    match results.update(message) {
        results_page::Event::None => Task::none(),
        results_page::Event::Download(kind) => match ctx.service.cloned() {
            Some(service) => Task::perform(download::download_archive(service, kind), move |result| {
                Message::ArchiveDownloaded {
                    session,
                    kind,
                    result,
                }
            }),
            None => {
                results.session_mut().downloads_mut().finish_download(kind);
                Task::none()
            }
        },
        results_page::Event::DownloadRejected(err) => {
            ctx.notifications
                .push(download_error_notification(ctx.i18n, &err));
            Task::none()
        }
        results_page::Event::Back { cleanup } => {
            // Navigation never waits for cleanup.
            *ctx.results = None;
            *ctx.screen = Screen::Upload;
            match (cleanup, ctx.service.cloned()) {
                (true, Some(service)) => {
                    Task::perform(download::cleanup(service), move |result| {
                        Message::CleanupFinished { session, result }
                    })
                }
                _ => Task::none(),
            }
        }
    }
}

pub fn handle_archive_downloaded(
    ctx: &mut UpdateContext<'_>,
    session: SessionId,
    kind: ArchiveKind,
    result: Result<ArchivePayload, download::DownloadError>,
) -> Task<Message> {
    // No save dialog for a session the user already left.
    if current_results(ctx.results, session).is_none() {
        return Task::none();
    }

    match result {
        Ok(payload) => {
            let start_dir = ctx.download_dir.to_path_buf();
            let suggested = payload.suggested_filename.clone();
            Task::perform(
                async move {
                    let path = files::choose_save_path(start_dir, suggested).await;
                    (payload, path)
                },
                move |(payload, path)| Message::SaveLocationChosen {
                    session,
                    payload,
                    path,
                },
            )
        }
        Err(err) => {
            finish_download(ctx, session, kind);
            ctx.notifications
                .push(download_error_notification(ctx.i18n, &err));
            Task::none()
        }
    }
}

pub fn handle_save_location_chosen(
    ctx: &mut UpdateContext<'_>,
    session: SessionId,
    payload: ArchivePayload,
    path: Option<PathBuf>,
) -> Task<Message> {
    let kind = payload.kind;
    if current_results(ctx.results, session).is_none() {
        return Task::none();
    }
    let Some(path) = path else {
        finish_download(ctx, session, kind);
        return Task::none();
    };

    let size_bytes = payload.bytes.len() as u64;
    Task::perform(download::save_archive(payload, path), move |result| {
        Message::ArchiveSaved {
            session,
            kind,
            size_bytes,
            result,
        }
    })
}

/// Reports the write even when the session has since been left; the file
/// exists either way.
pub fn handle_archive_saved(
    ctx: &mut UpdateContext<'_>,
    session: SessionId,
    kind: ArchiveKind,
    size_bytes: u64,
    result: Result<PathBuf, download::DownloadError>,
) -> Task<Message> {
    finish_download(ctx, session, kind);
    match result {
        Ok(path) => {
            ctx.diagnostics.log_operation(AppOperation::ArchiveSaved {
                archive: archive_label(kind),
                size_bytes,
            });
            ctx.notifications.push(
                Notification::success("results-saved")
                    .with_arg("path", path.to_string_lossy().into_owned())
                    .auto_dismiss(SAVED_TOAST_DURATION),
            );
        }
        Err(err) => {
            ctx.notifications
                .push(download_error_notification(ctx.i18n, &err));
        }
    }
    Task::none()
}

fn finish_download(ctx: &mut UpdateContext<'_>, session: SessionId, kind: ArchiveKind) {
    if let Some(results) = current_results(ctx.results, session) {
        results.session_mut().downloads_mut().finish_download(kind);
    }
}

pub fn handle_cleanup_finished(
    ctx: &mut UpdateContext<'_>,
    session: SessionId,
    result: Result<(), download::CleanupError>,
) -> Task<Message> {
    if let Some(results) = current_results(ctx.results, session) {
        results.session_mut().downloads_mut().finish_cleanup();
    }
    match result {
        Ok(()) => ctx.diagnostics.log_operation(AppOperation::CleanupCompleted),
        Err(download::CleanupError::Service(cause)) => {
            ctx.notifications.push(
                Notification::warning("cleanup-error-failed")
                    .with_arg("detail", describe_service_error(ctx.i18n, &cause)),
            );
        }
    }
    Task::none()
}

// =============================================================================
// Keyboard and window
// =============================================================================

pub fn handle_key_pressed(ctx: &mut UpdateContext<'_>, key: &Key) -> Task<Message> {
    let Some(nav) = carousel_view::key_message(key) else {
        return Task::none();
    };

    match *ctx.screen {
        Screen::Upload if ctx.upload.preview_carousel().is_open() => {
            handle_upload_message(ctx, upload_page::Message::Carousel(nav))
        }
        Screen::Results
            if ctx
                .results
                .as_ref()
                .is_some_and(|r| r.session().carousel().is_open()) =>
        {
            handle_results_message(ctx, results_page::Message::Carousel(nav))
        }
        _ => Task::none(),
    }
}

/// Sends a pending cleanup, writes the diagnostics report, then closes.
pub fn handle_window_close(
    ctx: &mut UpdateContext<'_>,
    window_id: window::Id,
    diagnostics_out: Option<&Path>,
) -> Task<Message> {
    let claimed = ctx
        .results
        .as_mut()
        .is_some_and(|r| r.session_mut().downloads_mut().begin_cleanup());

    match (claimed, ctx.service.cloned()) {
        (true, Some(service)) => Task::perform(download::cleanup(service), move |result| {
            Message::ExitCleanupFinished { window_id, result }
        }),
        _ => finish_exit(ctx, window_id, diagnostics_out),
    }
}

/// Records the outcome of the exit cleanup so it lands in the report.
pub fn handle_exit_cleanup_finished(
    ctx: &mut UpdateContext<'_>,
    window_id: window::Id,
    result: Result<(), download::CleanupError>,
    diagnostics_out: Option<&Path>,
) -> Task<Message> {
    match result {
        Ok(()) => ctx.diagnostics.log_operation(AppOperation::CleanupCompleted),
        Err(err) => ctx
            .diagnostics
            .log_warning(format!("cleanup on exit failed: {err}")),
    }
    finish_exit(ctx, window_id, diagnostics_out)
}

fn finish_exit(
    ctx: &mut UpdateContext<'_>,
    window_id: window::Id,
    diagnostics_out: Option<&Path>,
) -> Task<Message> {
    if let Some(path) = diagnostics_out {
        export_report(ctx.diagnostics, path);
    }
    window::close(window_id)
}

/// Writes the report to `path`. A failed write is logged to the collector.
fn export_report(diagnostics: &mut DiagnosticsCollector, path: &Path) -> bool {
    diagnostics.process_pending();
    match diagnostics.export_to_file(path) {
        Ok(_) => true,
        Err(err) => {
            diagnostics.log_warning(format!(
                "diagnostics report not written to {}: {err}",
                path.display()
            ));
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::download::{CleanupError, CleanupState, DownloadError};
    use crate::application::results::ThumbnailState;
    use crate::config::Config;
    use crate::diagnostics::{BufferCapacity, DiagnosticEventKind};
    use tempfile::tempdir;

    /// Owns everything an `UpdateContext` borrows.
    struct Harness {
        i18n: I18n,
        screen: Screen,
        upload: upload_page::State,
        results: Option<results_page::State>,
        notifications: notifications::Manager,
        diagnostics: DiagnosticsCollector,
        pending: Option<PendingSubmission>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                i18n: I18n::new(Some("en-US".to_string()), &Config::default()),
                screen: Screen::Upload,
                upload: upload_page::State::new(),
                results: None,
                notifications: notifications::Manager::new(),
                diagnostics: DiagnosticsCollector::new(BufferCapacity::default()),
                pending: None,
            }
        }

        fn ctx(&mut self) -> UpdateContext<'_> {
            UpdateContext {
                i18n: &self.i18n,
                screen: &mut self.screen,
                upload: &mut self.upload,
                results: &mut self.results,
                service: None,
                notifications: &mut self.notifications,
                diagnostics: &mut self.diagnostics,
                download_dir: Path::new("."),
                pending_submission: &mut self.pending,
            }
        }

        fn open_results(&mut self, name: &str) -> SessionId {
            let item = ResultItem::new(
                format!("annotated_{name}"),
                format!("http://h/results/annotated_{name}"),
                Some(name.to_string()),
            );
            let _ = handle_processing_complete(&mut self.ctx(), vec![item], Vec::new());
            self.results.as_ref().expect("on results screen").id()
        }

        fn page(&mut self) -> &mut results_page::State {
            self.results.as_mut().expect("on results screen")
        }
    }

    #[test]
    fn responses_for_a_left_session_are_dropped() {
        let mut harness = Harness::new();
        let stale = harness.open_results("a.png");
        let _ = handle_results_message(&mut harness.ctx(), results_page::Message::Back);
        let current = harness.open_results("b.png");
        assert_ne!(stale, current);
        harness
            .page()
            .session_mut()
            .downloads_mut()
            .begin_download(ArchiveKind::Images)
            .expect("not yet downloading");

        let _ = handle_thumbnail_loaded(&mut harness.ctx(), stale, 0, Ok(vec![1, 2, 3]));
        let _ = handle_archive_downloaded(
            &mut harness.ctx(),
            stale,
            ArchiveKind::Images,
            Err(DownloadError::EmptyPayload(ArchiveKind::Images)),
        );
        let _ = handle_archive_saved(
            &mut harness.ctx(),
            stale,
            ArchiveKind::Images,
            0,
            Err(DownloadError::Save("disk full".into())),
        );
        let _ = handle_cleanup_finished(&mut harness.ctx(), stale, Ok(()));

        let session = harness.page().session();
        assert!(matches!(session.thumbnail(0), Some(ThumbnailState::Loading)));
        assert!(session.downloads().is_downloading(ArchiveKind::Images));
        assert_eq!(session.downloads().cleanup_state(), CleanupState::Pending);
    }

    #[test]
    fn responses_for_the_current_session_are_applied() {
        let mut harness = Harness::new();
        let current = harness.open_results("a.png");
        harness
            .page()
            .session_mut()
            .downloads_mut()
            .begin_download(ArchiveKind::Annotations)
            .expect("not yet downloading");

        let _ = handle_thumbnail_loaded(
            &mut harness.ctx(),
            current,
            0,
            Err(ServiceError::Timeout),
        );
        let _ = handle_archive_saved(
            &mut harness.ctx(),
            current,
            ArchiveKind::Annotations,
            0,
            Err(DownloadError::Save("disk full".into())),
        );

        let session = harness.page().session();
        assert!(matches!(session.thumbnail(0), Some(ThumbnailState::Failed(_))));
        assert!(!session.downloads().is_downloading(ArchiveKind::Annotations));
    }

    #[test]
    fn failed_report_write_is_logged() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("missing").join("report.json");
        let mut diagnostics = DiagnosticsCollector::new(BufferCapacity::default());

        assert!(!export_report(&mut diagnostics, &path));
        assert!(diagnostics.iter().any(|event| matches!(
            &event.kind,
            DiagnosticEventKind::Warning { message } if message.contains("report.json")
        )));
    }

    #[test]
    fn exit_cleanup_failure_is_in_the_report() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("report.json");
        let mut harness = Harness::new();

        let _ = handle_exit_cleanup_finished(
            &mut harness.ctx(),
            window::Id::unique(),
            Err(CleanupError::Service(ServiceError::Timeout)),
            Some(&path),
        );

        let report = std::fs::read_to_string(&path).expect("report written");
        assert!(report.contains("cleanup on exit failed"));
    }

    #[test]
    fn status_errors_mention_the_code() {
        let i18n = I18n::new(Some("en-US".to_string()), &Config::default());
        let text = describe_service_error(
            &i18n,
            &ServiceError::Status {
                code: 503,
                detail: "busy".into(),
            },
        );
        assert!(text.contains("503"));
        assert!(!text.starts_with("MISSING"));
    }

    #[test]
    fn submission_failure_is_an_error_toast_with_reason() {
        let i18n = I18n::new(Some("en-US".to_string()), &Config::default());
        let toast = upload_error_notification(
            &i18n,
            &UploadError::SubmissionFailed(ServiceError::Timeout),
        );
        assert_eq!(toast.message_key(), "upload-error-failed");
        assert_eq!(toast.message_args()[0].0, "reason");
    }

    #[test]
    fn download_in_flight_is_informational() {
        let i18n = I18n::new(Some("en-US".to_string()), &Config::default());
        let toast = download_error_notification(
            &i18n,
            &download::DownloadError::AlreadyInFlight(ArchiveKind::Annotations),
        );
        assert_eq!(toast.severity(), notifications::Severity::Info);
    }
}
