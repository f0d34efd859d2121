// SPDX-License-Identifier: MPL-2.0
//! Results screen: processed images, full-screen review and archive downloads.

use crate::application::download::{CleanupState, DownloadError};
use crate::application::port::ServiceError;
use crate::application::results::{ResultsSession, SessionId, ThumbnailState};
use crate::application::upload::SubmissionReceipt;
use crate::config::{PREVIEW_GRID_COLUMNS, PREVIEW_TILE_SIZE};
use crate::domain::results::{ArchiveKind, ResultItem};
use crate::i18n::fluent::I18n;
use crate::ui::carousel_view::{self, Slide};
use crate::ui::design_tokens::{palette, sizing, spacing, typography};
use crate::ui::styles;
use iced::alignment::Vertical;
use iced::widget::{button, image, scrollable, text, Column, Container, Row, Space, Text};
use iced::{ContentFit, Element, Length, Theme};

type Handle = image::Handle;

#[derive(Debug, Clone)]
pub enum Message {
    Open(usize),
    Carousel(carousel_view::Message),
    Download(ArchiveKind),
    Back,
}

#[derive(Debug)]
pub enum Event {
    None,
    Download(ArchiveKind),
    DownloadRejected(DownloadError),
    /// Leave the screen; `cleanup` is `true` when the cleanup request was
    /// claimed by this call and must be sent.
    Back { cleanup: bool },
}

pub struct ViewContext<'a> {
    pub i18n: &'a I18n,
}

#[derive(Debug)]
pub struct State {
    session: ResultsSession<Handle>,
}

impl State {
    #[must_use]
    pub fn new(receipt: SubmissionReceipt) -> Self {
        Self {
            session: ResultsSession::new(receipt),
        }
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.session.id()
    }

    #[must_use]
    pub fn session(&self) -> &ResultsSession<Handle> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut ResultsSession<Handle> {
        &mut self.session
    }

    /// Stores a fetched result image, or the reason it could not be fetched.
    pub fn thumbnail_loaded(&mut self, index: usize, result: Result<Vec<u8>, ServiceError>) {
        let state = match result {
            Ok(bytes) if !bytes.is_empty() => ThumbnailState::Ready(Handle::from_bytes(bytes)),
            Ok(_) => ThumbnailState::Failed("empty image".to_string()),
            Err(err) => ThumbnailState::Failed(err.to_string()),
        };
        self.session.set_thumbnail(index, state);
    }

    pub fn update(&mut self, message: Message) -> Event {
        match message {
            Message::Open(index) => {
                let _ = self.session.open(index);
                Event::None
            }
            Message::Carousel(nav) => {
                match nav {
                    carousel_view::Message::Next => {
                        self.session.next();
                    }
                    carousel_view::Message::Previous => {
                        self.session.previous();
                    }
                    carousel_view::Message::Close => self.session.close(),
                }
                Event::None
            }
            Message::Download(kind) => match self.session.downloads_mut().begin_download(kind) {
                Ok(()) => Event::Download(kind),
                Err(err) => Event::DownloadRejected(err),
            },
            Message::Back => {
                self.session.close();
                Event::Back {
                    cleanup: self.session.downloads_mut().begin_cleanup(),
                }
            }
        }
    }

    #[must_use]
    #[allow(clippy::needless_pass_by_value)]
    pub fn view<'a>(&'a self, ctx: ViewContext<'a>) -> Element<'a, Message> {
        let i18n = ctx.i18n;

        if let Some(item) = self.session.carousel().active_item() {
            let slide = match self
                .session
                .carousel()
                .active_index()
                .and_then(|index| self.session.thumbnail(index))
            {
                Some(ThumbnailState::Ready(handle)) => Slide::Image(handle),
                Some(ThumbnailState::Loading) => Slide::Loading,
                Some(ThumbnailState::Failed(_)) | None => Slide::Unavailable,
            };
            return carousel_view::view(carousel_view::ViewContext {
                i18n,
                slide,
                caption: caption(item),
                info: self.session.carousel().info(),
            })
            .map(Message::Carousel);
        }

        let count = self.session.len().to_string();
        let summary = Text::new(i18n.tr_with_args("results-count", &[("count", count.as_str())]))
            .size(typography::CAPTION);

        let mut grid = Column::new().spacing(spacing::SM);
        for (row_index, chunk) in self.session.items().chunks(PREVIEW_GRID_COLUMNS).enumerate() {
            let row = chunk
                .iter()
                .enumerate()
                .fold(Row::new().spacing(spacing::SM), |row, (offset, item)| {
                    let index = row_index * PREVIEW_GRID_COLUMNS + offset;
                    row.push(self.result_tile(index, item, i18n))
                });
            grid = grid.push(row);
        }

        Column::new()
            .spacing(spacing::MD)
            .padding(spacing::LG)
            .push(Text::new(i18n.tr("results-title")).size(typography::TITLE_LG))
            .push(self.view_toolbar(i18n))
            .push(summary)
            .push(scrollable(grid).height(Length::Fill))
            .height(Length::Fill)
            .into()
    }

    fn view_toolbar<'a>(&'a self, i18n: &'a I18n) -> Element<'a, Message> {
        let back = button(Text::new(format!("← {}", i18n.tr("results-back"))).size(typography::BODY))
            .height(Length::Fixed(sizing::BUTTON_HEIGHT))
            .style(styles::button::secondary)
            .on_press_maybe(
                (self.session.downloads().cleanup_state() == CleanupState::Pending)
                    .then_some(Message::Back),
            );

        let downloads = ArchiveKind::ALL.iter().fold(
            Row::new().spacing(spacing::SM),
            |row, kind| {
                let busy = self.session.downloads().is_downloading(*kind);
                let label = if busy {
                    i18n.tr("results-downloading")
                } else {
                    i18n.tr(kind.i18n_key())
                };
                row.push(
                    button(Text::new(label).size(typography::BODY))
                        .height(Length::Fixed(sizing::BUTTON_HEIGHT))
                        .style(styles::button::primary)
                        .on_press_maybe((!busy).then_some(Message::Download(*kind))),
                )
            },
        );

        Row::new()
            .spacing(spacing::SM)
            .align_y(Vertical::Center)
            .push(back)
            .push(Space::new().width(Length::Fill))
            .push(downloads)
            .into()
    }

    fn result_tile<'a>(
        &'a self,
        index: usize,
        item: &'a ResultItem,
        i18n: &'a I18n,
    ) -> Element<'a, Message> {
        let size = Length::Fixed(PREVIEW_TILE_SIZE);
        let body: Element<'a, Message> = match self.session.thumbnail(index) {
            Some(ThumbnailState::Ready(handle)) => image(handle.clone())
                .content_fit(ContentFit::Cover)
                .width(size)
                .height(size)
                .into(),
            Some(ThumbnailState::Loading) => Container::new(
                Text::new(i18n.tr("results-loading")).size(typography::CAPTION),
            )
            .center(size)
            .into(),
            Some(ThumbnailState::Failed(_)) | None => Container::new(
                Text::new(i18n.tr("results-unavailable"))
                    .size(typography::CAPTION)
                    .style(|_theme: &Theme| text::Style {
                        color: Some(palette::ERROR_500),
                    }),
            )
            .center(size)
            .into(),
        };

        let open = button(body)
            .padding(0)
            .style(styles::button::tile)
            .on_press(Message::Open(index));

        Container::new(
            Column::new()
                .spacing(spacing::XXS)
                .width(size)
                .push(open)
                .push(Text::new(caption(item)).size(typography::CAPTION)),
        )
        .padding(spacing::XXS)
        .style(styles::container::tile)
        .into()
    }
}

/// Source file name when known, otherwise the server's output name.
fn caption(item: &ResultItem) -> &str {
    item.source_name().unwrap_or(item.filename())
}
