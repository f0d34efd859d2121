// SPDX-License-Identifier: MPL-2.0
//! Application root state and orchestration between the upload and results
//! screens.
//!
//! `App` owns both pages, the processing service and the notification and
//! diagnostics plumbing. The result list travels from the upload flow to the
//! results screen only through [`Message::ProcessingComplete`].

mod message;
pub mod paths;
mod screen;
mod subscription;
mod update;
mod view;

pub use message::{Flags, Message, StageOrigin};
pub use screen::Screen;
pub use update::describe_service_error;

use crate::application::port::ProcessingService;
use crate::config::{self, Config};
use crate::diagnostics::DiagnosticsCollector;
use crate::i18n::fluent::I18n;
use crate::infrastructure::HttpProcessingService;
use crate::ui::notifications::{self, Notification};
use crate::ui::theming::ThemeMode;
use crate::ui::{results_page, upload_page};
use iced::{window, Element, Subscription, Task, Theme};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Root Iced application state.
pub struct App {
    pub i18n: I18n,
    screen: Screen,
    upload: upload_page::State,
    /// Present only while the results screen is shown.
    results: Option<results_page::State>,
    /// `None` when no usable server URL could be configured.
    service: Option<Arc<dyn ProcessingService>>,
    theme_mode: ThemeMode,
    notifications: notifications::Manager,
    diagnostics: DiagnosticsCollector,
    diagnostics_out: Option<PathBuf>,
    download_dir: PathBuf,
    pending_submission: Option<update::PendingSubmission>,
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("screen", &self.screen)
            .field("staged", &self.upload.store().len())
            .field("has_results", &self.results.is_some())
            .finish()
    }
}

pub const WINDOW_DEFAULT_HEIGHT: u32 = 720;
pub const WINDOW_DEFAULT_WIDTH: u32 = 960;
pub const MIN_WINDOW_HEIGHT: u32 = 480;
pub const MIN_WINDOW_WIDTH: u32 = 640;

/// Builds the window settings. Close requests are handled by the app so the
/// diagnostics report and a pending cleanup can run first.
pub fn window_settings() -> window::Settings {
    window::Settings {
        size: iced::Size::new(WINDOW_DEFAULT_WIDTH as f32, WINDOW_DEFAULT_HEIGHT as f32),
        min_size: Some(iced::Size::new(
            MIN_WINDOW_WIDTH as f32,
            MIN_WINDOW_HEIGHT as f32,
        )),
        exit_on_close_request: false,
        ..window::Settings::default()
    }
}

/// Entry point used by `main.rs` to launch the Iced application loop.
pub fn run(flags: Flags) -> iced::Result {
    use std::cell::RefCell;

    // iced 0.14 requires an `Fn` boot closure; flags are consumed once.
    let boot_state = RefCell::new(Some(flags));
    let boot = move || {
        let flags = boot_state.borrow_mut().take().unwrap_or_default();
        App::new(flags)
    };

    iced::application(boot, App::update, App::view)
        .title(App::title)
        .theme(App::theme)
        .window(window_settings())
        .subscription(App::subscription)
        .run()
}

/// Builds the HTTP service, falling back to the default URL when the
/// configured one is unusable.
fn build_service(
    config: &Config,
    url_override: Option<&str>,
    notifications: &mut notifications::Manager,
) -> Option<Arc<dyn ProcessingService>> {
    let timeout = config.server.request_timeout();
    let url = url_override.unwrap_or(&config.server.base_url);

    match HttpProcessingService::new(url, timeout) {
        Ok(service) => Some(Arc::new(service)),
        Err(err) => {
            notifications.push(
                Notification::warning("notification-server-url-invalid")
                    .with_arg("url", url.to_string())
                    .with_arg("detail", err.to_string()),
            );
            HttpProcessingService::new(config::DEFAULT_SERVER_URL, timeout)
                .ok()
                .map(|service| Arc::new(service) as Arc<dyn ProcessingService>)
        }
    }
}

impl App {
    /// Initializes application state and stages any files given on the
    /// command line.
    fn new(flags: Flags) -> (Self, Task<Message>) {
        paths::init_cli_overrides(flags.config_dir.clone());
        let (config, config_warning) = config::load();
        let i18n = I18n::new(flags.lang.clone(), &config);

        let diagnostics = DiagnosticsCollector::new(config.diagnostics.capacity());
        let mut notifications = notifications::Manager::new();
        notifications.set_diagnostics(diagnostics.handle());

        if let Some(key) = config_warning {
            notifications.push(Notification::warning(key));
        }

        let service = build_service(&config, flags.server_url.as_deref(), &mut notifications);

        let app = App {
            i18n,
            screen: Screen::Upload,
            upload: upload_page::State::new(),
            results: None,
            service,
            theme_mode: config.general.theme_mode,
            notifications,
            diagnostics,
            diagnostics_out: flags.diagnostics_out,
            download_dir: paths::default_download_dir(),
            pending_submission: None,
        };

        let task = if flags.files.is_empty() {
            Task::none()
        } else {
            update::read_files(flags.files, StageOrigin::CommandLine)
        };

        (app, task)
    }

    fn title(&self) -> String {
        let app_name = self.i18n.tr("window-title");
        match self.screen {
            Screen::Upload if !self.upload.store().is_empty() => {
                format!("({}) {app_name}", self.upload.store().len())
            }
            Screen::Upload => app_name,
            Screen::Results => format!("{} - {app_name}", self.i18n.tr("results-title")),
        }
    }

    fn theme(&self) -> Theme {
        self.theme_mode.iced_theme()
    }

    fn subscription(&self) -> Subscription<Message> {
        Subscription::batch([
            subscription::create_event_subscription(self.screen),
            subscription::create_tick_subscription(self.notifications.has_notifications()),
        ])
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        self.diagnostics.process_pending();

        let mut ctx = update::UpdateContext {
            i18n: &self.i18n,
            screen: &mut self.screen,
            upload: &mut self.upload,
            results: &mut self.results,
            service: self.service.as_ref(),
            notifications: &mut self.notifications,
            diagnostics: &mut self.diagnostics,
            download_dir: &self.download_dir,
            pending_submission: &mut self.pending_submission,
        };

        match message {
            Message::Upload(upload_message) => update::handle_upload_message(&mut ctx, upload_message),
            Message::Results(results_message) => {
                update::handle_results_message(&mut ctx, results_message)
            }
            Message::Notification(notification_message) => {
                ctx.notifications.handle_message(&notification_message);
                Task::none()
            }
            Message::FilesPicked(paths) => update::handle_files_picked(paths),
            Message::FileDropped(path) => update::handle_file_dropped(&mut ctx, path),
            Message::FilesRead { batch, origin } => {
                update::handle_files_read(&mut ctx, batch, origin)
            }
            Message::SubmissionFinished(result) => {
                update::handle_submission_finished(&mut ctx, result)
            }
            Message::ProcessingComplete {
                results,
                annotation_filenames,
            } => update::handle_processing_complete(&mut ctx, results, annotation_filenames),
            Message::ThumbnailLoaded {
                session,
                index,
                result,
            } => update::handle_thumbnail_loaded(&mut ctx, session, index, result),
            Message::ArchiveDownloaded {
                session,
                kind,
                result,
            } => update::handle_archive_downloaded(&mut ctx, session, kind, result),
            Message::SaveLocationChosen {
                session,
                payload,
                path,
            } => update::handle_save_location_chosen(&mut ctx, session, payload, path),
            Message::ArchiveSaved {
                session,
                kind,
                size_bytes,
                result,
            } => update::handle_archive_saved(&mut ctx, session, kind, size_bytes, result),
            Message::CleanupFinished { session, result } => {
                update::handle_cleanup_finished(&mut ctx, session, result)
            }
            Message::KeyPressed(key) => update::handle_key_pressed(&mut ctx, &key),
            Message::WindowCloseRequested(id) => {
                update::handle_window_close(&mut ctx, id, self.diagnostics_out.as_deref())
            }
            Message::ExitCleanupFinished { window_id, result } => {
                update::handle_exit_cleanup_finished(
                    &mut ctx,
                    window_id,
                    result,
                    self.diagnostics_out.as_deref(),
                )
            }
            Message::Tick(_) => {
                ctx.notifications.tick();
                Task::none()
            }
        }
    }

    fn view(&self) -> Element<'_, Message> {
        view::view(view::ViewContext {
            i18n: &self.i18n,
            screen: self.screen,
            upload: &self.upload,
            results: self.results.as_ref(),
            notifications: &self.notifications,
        })
    }
}
