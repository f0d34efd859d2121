// SPDX-License-Identifier: MPL-2.0
//! Full-screen carousel viewer.
//!
//! Stateless: the owning page keeps the [`Carousel`](crate::domain::carousel::Carousel)
//! and maps this module's [`Message`] into its own.

use crate::domain::carousel::CarouselInfo;
use crate::i18n::fluent::I18n;
use crate::ui::design_tokens::{palette, sizing, spacing, typography};
use crate::ui::styles;
use iced::alignment::{Horizontal, Vertical};
use iced::keyboard::{key::Named, Key};
use iced::widget::{button, image, text, Column, Container, Row, Space, Text};
use iced::{ContentFit, Element, Length, Theme};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    Next,
    Previous,
    Close,
}

/// What occupies the slide area.
#[derive(Debug, Clone, Copy)]
pub enum Slide<'a> {
    Image(&'a image::Handle),
    Loading,
    Unavailable,
}

pub struct ViewContext<'a> {
    pub i18n: &'a I18n,
    pub slide: Slide<'a>,
    pub caption: &'a str,
    pub info: CarouselInfo,
}

/// Maps a key press to a viewer message: arrows navigate, Escape closes.
#[must_use]
pub fn key_message(key: &Key) -> Option<Message> {
    match key {
        Key::Named(Named::ArrowRight) => Some(Message::Next),
        Key::Named(Named::ArrowLeft) => Some(Message::Previous),
        Key::Named(Named::Escape) => Some(Message::Close),
        _ => None,
    }
}

/// "3 / 7" position label; empty when closed.
#[must_use]
pub fn position_label(info: CarouselInfo) -> String {
    info.position
        .map(|index| format!("{} / {}", index + 1, info.total))
        .unwrap_or_default()
}

fn nav_button<'a>(glyph: &'a str, message: Message, enabled: bool) -> Element<'a, Message> {
    let label = Text::new(glyph)
        .size(typography::TITLE_LG)
        .align_x(Horizontal::Center);
    let mut nav = button(label)
        .width(Length::Fixed(sizing::NAV_ARROW_WIDTH))
        .padding(spacing::SM)
        .style(styles::button::overlay);
    if enabled {
        nav = nav.on_press(message);
    }
    nav.into()
}

#[must_use]
#[allow(clippy::needless_pass_by_value)]
pub fn view(ctx: ViewContext<'_>) -> Element<'_, Message> {
    let can_navigate = ctx.info.can_navigate();

    let slide: Element<'_, Message> = match ctx.slide {
        Slide::Image(handle) => image(handle.clone())
            .content_fit(ContentFit::Contain)
            .width(Length::Fill)
            .height(Length::Fill)
            .into(),
        Slide::Loading => Text::new(ctx.i18n.tr("carousel-loading"))
            .size(typography::BODY_LG)
            .into(),
        Slide::Unavailable => Text::new(ctx.i18n.tr("carousel-unavailable"))
            .size(typography::BODY_LG)
            .style(|_theme: &Theme| text::Style {
                color: Some(palette::GRAY_200),
            })
            .into(),
    };

    let close = button(Text::new("✕").size(typography::TITLE_SM))
        .padding([spacing::XXS, spacing::SM])
        .style(styles::button::overlay)
        .on_press(Message::Close);

    let header = Row::new()
        .align_y(Vertical::Center)
        .spacing(spacing::MD)
        .push(Text::new(ctx.caption).size(typography::BODY_LG))
        .push(Space::new().width(Length::Fill))
        .push(Text::new(position_label(ctx.info)).size(typography::BODY))
        .push(close);

    let stage = Row::new()
        .align_y(Vertical::Center)
        .spacing(spacing::SM)
        .push(nav_button("‹", Message::Previous, can_navigate))
        .push(
            Container::new(slide)
                .width(Length::Fill)
                .height(Length::Fill)
                .align_x(Horizontal::Center)
                .align_y(Vertical::Center),
        )
        .push(nav_button("›", Message::Next, can_navigate));

    let hint = Text::new(ctx.i18n.tr("carousel-keyboard-hint"))
        .size(typography::CAPTION)
        .style(|_theme: &Theme| text::Style {
            color: Some(palette::GRAY_200),
        });

    Container::new(
        Column::new()
            .spacing(spacing::SM)
            .push(header)
            .push(stage.height(Length::Fill))
            .push(Container::new(hint).center_x(Length::Fill)),
    )
    .width(Length::Fill)
    .height(Length::Fill)
    .padding(spacing::MD)
    .style(styles::container::scrim)
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrows_and_escape_are_mapped() {
        assert_eq!(
            key_message(&Key::Named(Named::ArrowRight)),
            Some(Message::Next)
        );
        assert_eq!(
            key_message(&Key::Named(Named::ArrowLeft)),
            Some(Message::Previous)
        );
        assert_eq!(key_message(&Key::Named(Named::Escape)), Some(Message::Close));
        assert_eq!(key_message(&Key::Character("a".into())), None);
    }

    #[test]
    fn position_label_is_one_based() {
        let info = CarouselInfo {
            position: Some(0),
            total: 4,
        };
        assert_eq!(position_label(info), "1 / 4");
        assert_eq!(position_label(CarouselInfo::default()), "");
    }
}
