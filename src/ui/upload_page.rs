// SPDX-License-Identifier: MPL-2.0
//! Upload screen: staged files, previews and submission.
//!
//! The page owns the [`StagingStore`] and therefore every preview handle. A
//! second [`Carousel`] lists the staged images for full-screen review; it
//! stores ids only and is kept in step with the store after every change.

use crate::application::staging::{StagedFile, StagedFileId, StagingStore};
use crate::application::upload::{SubmissionReceipt, SubmissionTicket, UploadError, UploadOrchestrator};
use crate::config::{PREVIEW_GRID_COLUMNS, PREVIEW_TILE_SIZE};
use crate::domain::carousel::Carousel;
use crate::domain::media::SourcePayload;
use crate::i18n::fluent::I18n;
use crate::infrastructure::IcedPreviewAllocator;
use crate::ui::carousel_view::{self, Slide};
use crate::ui::design_tokens::{sizing, spacing, typography};
use crate::ui::styles;
use iced::alignment::{Horizontal, Vertical};
use iced::widget::{button, image, scrollable, Column, Container, Row, Space, Text};
use iced::{ContentFit, Element, Length};

type Handle = image::Handle;

#[derive(Debug, Clone)]
pub enum Message {
    PickFiles,
    Remove(StagedFileId),
    ClearAll,
    OpenPreview(StagedFileId),
    Carousel(carousel_view::Message),
    Submit,
}

/// Effects the application must carry out.
#[derive(Debug)]
pub enum Event {
    None,
    PickFiles,
    Removed(SourcePayload),
    Cleared { released: usize },
    Submit(SubmissionTicket),
    SubmitRejected(UploadError),
}

/// Counts reported after staging a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageSummary {
    pub added: usize,
    pub images: usize,
}

pub struct ViewContext<'a> {
    pub i18n: &'a I18n,
}

pub struct State {
    store: StagingStore<IcedPreviewAllocator>,
    preview_carousel: Carousel<StagedFileId>,
    upload: UploadOrchestrator,
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("upload_page::State")
            .field("staged", &self.store.len())
            .field("submitting", &self.upload.is_in_flight())
            .finish()
    }
}

impl State {
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: StagingStore::new(IcedPreviewAllocator::new()),
            preview_carousel: Carousel::default(),
            upload: UploadOrchestrator::new(),
        }
    }

    #[must_use]
    pub fn store(&self) -> &StagingStore<IcedPreviewAllocator> {
        &self.store
    }

    #[must_use]
    pub fn preview_carousel(&self) -> &Carousel<StagedFileId> {
        &self.preview_carousel
    }

    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.upload.is_in_flight()
    }

    /// Stages a batch and appends its images to the preview carousel.
    pub fn stage(&mut self, payloads: Vec<SourcePayload>) -> StageSummary {
        let ids = self.store.add(payloads);
        let mut summary = StageSummary {
            added: ids.len(),
            images: 0,
        };
        for id in ids {
            let has_preview = self
                .store
                .get(id)
                .is_some_and(|entry| entry.preview().is_some());
            if has_preview {
                self.preview_carousel.push(id);
                summary.images += 1;
            }
        }
        summary
    }

    /// Releases the guard and, on success, empties the store.
    pub fn finish_submission(
        &mut self,
        outcome: Result<SubmissionReceipt, UploadError>,
    ) -> Result<SubmissionReceipt, UploadError> {
        let receipt = self.upload.complete(outcome)?;
        self.reset();
        Ok(receipt)
    }

    /// Releases every preview. Returns the number released.
    pub fn reset(&mut self) -> usize {
        self.preview_carousel.set_items(Vec::new());
        self.store.clear()
    }

    fn sync_carousel(&mut self) {
        let store = &self.store;
        self.preview_carousel.retain(|id| store.contains(*id));
    }

    pub fn update(&mut self, message: Message) -> Event {
        match message {
            Message::PickFiles => Event::PickFiles,
            Message::Remove(id) => {
                if self.upload.is_in_flight() {
                    return Event::None;
                }
                match self.store.remove(id) {
                    Ok(payload) => {
                        self.sync_carousel();
                        Event::Removed(payload)
                    }
                    Err(_) => Event::None,
                }
            }
            Message::ClearAll => {
                if self.upload.is_in_flight() || self.store.is_empty() {
                    return Event::None;
                }
                Event::Cleared {
                    released: self.reset(),
                }
            }
            Message::OpenPreview(id) => {
                if let Some(index) = self.preview_carousel.items().iter().position(|x| *x == id) {
                    let _ = self.preview_carousel.open(index);
                }
                Event::None
            }
            Message::Carousel(nav) => {
                match nav {
                    carousel_view::Message::Next => {
                        self.preview_carousel.next();
                    }
                    carousel_view::Message::Previous => {
                        self.preview_carousel.previous();
                    }
                    carousel_view::Message::Close => self.preview_carousel.close(),
                }
                Event::None
            }
            Message::Submit => match self.upload.begin(&self.store) {
                Ok(ticket) => {
                    self.preview_carousel.close();
                    Event::Submit(ticket)
                }
                Err(err) => Event::SubmitRejected(err),
            },
        }
    }

    #[must_use]
    #[allow(clippy::needless_pass_by_value)]
    pub fn view<'a>(&'a self, ctx: ViewContext<'a>) -> Element<'a, Message> {
        if let Some(view) = self.view_preview_carousel(ctx.i18n) {
            return view;
        }

        let i18n = ctx.i18n;
        let content = Column::new()
            .spacing(spacing::MD)
            .padding(spacing::LG)
            .push(Text::new(i18n.tr("upload-title")).size(typography::TITLE_LG))
            .push(self.view_toolbar(i18n))
            .push(self.view_status(i18n));

        let body: Element<'a, Message> = if self.store.is_empty() {
            Container::new(
                Text::new(i18n.tr("upload-drop-hint"))
                    .size(typography::BODY_LG)
                    .align_x(Horizontal::Center),
            )
            .width(Length::Fill)
            .height(Length::Fill)
            .align_x(Horizontal::Center)
            .align_y(Vertical::Center)
            .style(styles::container::drop_zone)
            .into()
        } else {
            scrollable(self.view_staged(i18n))
                .height(Length::Fill)
                .into()
        };

        content.push(body).height(Length::Fill).into()
    }

    fn view_preview_carousel<'a>(&'a self, i18n: &'a I18n) -> Option<Element<'a, Message>> {
        let id = *self.preview_carousel.active_item()?;
        let entry = self.store.get(id)?;
        let slide = entry.preview().map_or(Slide::Unavailable, Slide::Image);

        Some(
            carousel_view::view(carousel_view::ViewContext {
                i18n,
                slide,
                caption: entry.display_name(),
                info: self.preview_carousel.info(),
            })
            .map(Message::Carousel),
        )
    }

    fn view_toolbar<'a>(&'a self, i18n: &'a I18n) -> Element<'a, Message> {
        let submitting = self.upload.is_in_flight();
        let idle_with_files = !submitting && !self.store.is_empty();

        let add = button(Text::new(i18n.tr("upload-add-files")).size(typography::BODY))
            .height(Length::Fixed(sizing::BUTTON_HEIGHT))
            .style(styles::button::secondary)
            .on_press_maybe((!submitting).then_some(Message::PickFiles));

        let clear = button(Text::new(i18n.tr("upload-clear")).size(typography::BODY))
            .height(Length::Fixed(sizing::BUTTON_HEIGHT))
            .style(styles::button::secondary)
            .on_press_maybe(idle_with_files.then_some(Message::ClearAll));

        let submit_label = if submitting {
            i18n.tr("upload-submitting")
        } else {
            i18n.tr("upload-submit")
        };
        let submit = button(Text::new(submit_label).size(typography::BODY))
            .height(Length::Fixed(sizing::BUTTON_HEIGHT))
            .style(styles::button::primary)
            .on_press_maybe(idle_with_files.then_some(Message::Submit));

        Row::new()
            .spacing(spacing::SM)
            .align_y(Vertical::Center)
            .push(add)
            .push(clear)
            .push(Space::new().width(Length::Fill))
            .push(submit)
            .into()
    }

    fn view_status<'a>(&'a self, i18n: &'a I18n) -> Element<'a, Message> {
        let count = self.store.len().to_string();
        let size = format_size(self.store.total_bytes());
        let status = format!(
            "{} · {}",
            i18n.tr_with_args("upload-staged-count", &[("count", count.as_str())]),
            i18n.tr_with_args("upload-staged-size", &[("size", size.as_str())]),
        );
        Text::new(status).size(typography::CAPTION).into()
    }

    fn view_staged<'a>(&'a self, i18n: &'a I18n) -> Element<'a, Message> {
        let partition = self.store.partition();
        let mut column = Column::new().spacing(spacing::LG).width(Length::Fill);

        if !partition.images.is_empty() {
            let mut grid = Column::new().spacing(spacing::SM);
            for chunk in partition.images.chunks(PREVIEW_GRID_COLUMNS) {
                let row = chunk
                    .iter()
                    .fold(Row::new().spacing(spacing::SM), |row, entry| {
                        row.push(image_tile(*entry))
                    });
                grid = grid.push(row);
            }
            column = column
                .push(Text::new(i18n.tr("upload-section-images")).size(typography::TITLE_SM))
                .push(grid);
        }

        if !partition.documents.is_empty() {
            let list = partition
                .documents
                .iter()
                .fold(Column::new().spacing(spacing::XXS), |list, entry| {
                    list.push(document_row(*entry))
                });
            column = column
                .push(Text::new(i18n.tr("upload-section-documents")).size(typography::TITLE_SM))
                .push(list);
        }

        column.into()
    }
}

fn remove_button<'a>(id: StagedFileId) -> Element<'a, Message> {
    button(Text::new("✕").size(typography::CAPTION))
        .padding([0.0, spacing::XS])
        .style(styles::button::remove)
        .on_press(Message::Remove(id))
        .into()
}

fn image_tile(entry: &StagedFile<Handle>) -> Element<'_, Message> {
    let thumbnail: Element<'_, Message> = match entry.preview() {
        Some(handle) => image(handle.clone())
            .content_fit(ContentFit::Cover)
            .width(Length::Fixed(PREVIEW_TILE_SIZE))
            .height(Length::Fixed(PREVIEW_TILE_SIZE))
            .into(),
        None => Space::new()
            .width(Length::Fixed(PREVIEW_TILE_SIZE))
            .height(Length::Fixed(PREVIEW_TILE_SIZE))
            .into(),
    };

    let open = button(thumbnail)
        .padding(0)
        .style(styles::button::tile)
        .on_press(Message::OpenPreview(entry.id()));

    let caption = Row::new()
        .spacing(spacing::XXS)
        .align_y(Vertical::Center)
        .push(
            Text::new(entry.display_name())
                .size(typography::CAPTION)
                .width(Length::Fill),
        )
        .push(remove_button(entry.id()));

    Container::new(
        Column::new()
            .spacing(spacing::XXS)
            .width(Length::Fixed(PREVIEW_TILE_SIZE))
            .push(open)
            .push(caption),
    )
    .padding(spacing::XXS)
    .style(styles::container::tile)
    .into()
}

fn document_row(entry: &StagedFile<Handle>) -> Element<'_, Message> {
    let size = format_size(entry.source().len() as u64);
    Container::new(
        Row::new()
            .spacing(spacing::SM)
            .align_y(Vertical::Center)
            .push(Text::new("📄").size(typography::BODY))
            .push(
                Text::new(entry.display_name())
                    .size(typography::BODY)
                    .width(Length::Fill),
            )
            .push(Text::new(size).size(typography::CAPTION))
            .push(remove_button(entry.id())),
    )
    .height(Length::Fixed(sizing::DOCUMENT_ROW_HEIGHT))
    .padding([0.0, spacing::XS])
    .align_y(Vertical::Center)
    .style(styles::container::tile)
    .into()
}

/// Human-readable byte count, e.g. `1.5 MB`.
#[must_use]
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    #[allow(clippy::cast_precision_loss)]
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::port::ServiceError;

    fn payload(name: &str) -> SourcePayload {
        SourcePayload::new(name, vec![0; 8])
    }

    fn staged(names: &[&str]) -> State {
        let mut state = State::new();
        state.stage(names.iter().map(|n| payload(n)).collect());
        state
    }

    fn id_of(state: &State, name: &str) -> StagedFileId {
        state
            .store()
            .iter()
            .find(|e| e.display_name() == name)
            .map(StagedFile::id)
            .expect("staged")
    }

    #[test]
    fn staging_feeds_images_to_the_preview_carousel() {
        let mut state = State::new();
        let summary = state.stage(vec![payload("a.png"), payload("b.pdf"), payload("c.jpg")]);
        assert_eq!(summary, StageSummary { added: 3, images: 2 });
        assert_eq!(state.preview_carousel().len(), 2);
    }

    #[test]
    fn removing_an_image_keeps_carousel_in_step() {
        let mut state = staged(&["a.png", "b.png", "c.png"]);
        let b = id_of(&state, "b.png");
        state.update(Message::OpenPreview(b));
        assert_eq!(state.preview_carousel().active_index(), Some(1));

        let event = state.update(Message::Remove(b));
        assert!(matches!(event, Event::Removed(ref p) if p.name() == "b.png"));
        assert_eq!(state.preview_carousel().len(), 2);
        assert_eq!(state.preview_carousel().active_index(), Some(1));
        assert_eq!(state.store().allocator().live(), 2);
    }

    #[test]
    fn carousel_messages_wrap() {
        let mut state = staged(&["a.png", "b.png"]);
        let a = id_of(&state, "a.png");
        state.update(Message::OpenPreview(a));
        state.update(Message::Carousel(carousel_view::Message::Previous));
        assert_eq!(state.preview_carousel().active_index(), Some(1));
        state.update(Message::Carousel(carousel_view::Message::Close));
        assert!(!state.preview_carousel().is_open());
    }

    #[test]
    fn submit_locks_the_page_until_finished() {
        let mut state = staged(&["a.png", "b.pdf"]);
        let Event::Submit(ticket) = state.update(Message::Submit) else {
            panic!("expected a submission ticket");
        };
        assert_eq!(ticket.len(), 2);
        assert!(state.is_submitting());

        assert!(matches!(
            state.update(Message::Submit),
            Event::SubmitRejected(UploadError::AlreadyInFlight)
        ));
        let a = id_of(&state, "a.png");
        assert!(matches!(state.update(Message::Remove(a)), Event::None));
        assert_eq!(state.store().len(), 2);
    }

    #[test]
    fn failed_submission_keeps_everything_staged() {
        let mut state = staged(&["a.png", "b.jpg"]);
        let _ = state.update(Message::Submit);
        let outcome = state.finish_submission(Err(UploadError::SubmissionFailed(
            ServiceError::Timeout,
        )));
        assert!(outcome.is_err());
        assert!(!state.is_submitting());
        assert_eq!(state.store().len(), 2);
        assert_eq!(state.store().outstanding_previews(), 2);
    }

    #[test]
    fn successful_submission_releases_every_preview() {
        let mut state = staged(&["a.png", "b.jpg", "c.txt"]);
        let _ = state.update(Message::Submit);
        let receipt = state
            .finish_submission(Ok(SubmissionReceipt::default()))
            .expect("success");
        assert!(receipt.results.is_empty());
        assert!(state.store().is_empty());
        assert_eq!(state.store().allocator().live(), 0);
        assert!(state.preview_carousel().is_empty());
    }

    #[test]
    fn empty_submit_is_rejected() {
        let mut state = State::new();
        assert!(matches!(
            state.update(Message::Submit),
            Event::SubmitRejected(UploadError::NothingStaged)
        ));
    }

    #[test]
    fn clear_all_reports_released_previews() {
        let mut state = staged(&["a.png", "notes.txt"]);
        assert!(matches!(
            state.update(Message::ClearAll),
            Event::Cleared { released: 1 }
        ));
        assert!(matches!(state.update(Message::ClearAll), Event::None));
    }

    #[test]
    fn sizes_are_humanized() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
    }
}
