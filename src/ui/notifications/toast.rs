// SPDX-License-Identifier: MPL-2.0
//! Toast rendering.

use super::manager::{Manager, Message};
use super::notification::Notification;
use crate::i18n::fluent::I18n;
use crate::ui::design_tokens::{border, opacity, palette, radius, shadow, sizing, spacing, typography};
use iced::widget::{button, container, text, Column, Container, Row, Text};
use iced::{alignment, Color, Element, Length, Theme};

/// Toast widget.
pub struct Toast;

impl Toast {
    /// Resolves the notification text in the current language.
    #[must_use]
    pub fn message_text(notification: &Notification, i18n: &I18n) -> String {
        if notification.message_args().is_empty() {
            return i18n.tr(notification.message_key());
        }
        let args: Vec<(&str, &str)> = notification
            .message_args()
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        i18n.tr_with_args(notification.message_key(), &args)
    }

    pub fn view<'a>(notification: &'a Notification, i18n: &'a I18n) -> Element<'a, Message> {
        let severity = notification.severity();
        let accent = severity.color();

        let glyph = Text::new(severity.glyph())
            .size(typography::TITLE_SM)
            .style(move |_theme: &Theme| text::Style {
                color: Some(accent),
            });

        let message = Text::new(Self::message_text(notification, i18n))
            .size(typography::BODY)
            .style(|theme: &Theme| text::Style {
                color: Some(theme.palette().text),
            });

        let dismiss = button(Text::new("×").size(typography::BODY_LG))
            .on_press(Message::Dismiss(notification.id()))
            .padding([0.0, spacing::XXS])
            .style(dismiss_button_style);

        let content = Row::new()
            .spacing(spacing::SM)
            .align_y(alignment::Vertical::Center)
            .push(Container::new(glyph).width(Length::Fixed(sizing::ICON_MD)))
            .push(Container::new(message).width(Length::Fill))
            .push(dismiss);

        Container::new(content)
            .width(Length::Fixed(sizing::TOAST_WIDTH))
            .padding(spacing::SM)
            .style(move |theme: &Theme| toast_container_style(theme, accent))
            .into()
    }

    /// Bottom-right stack of the visible toasts.
    pub fn view_overlay<'a>(manager: &'a Manager, i18n: &'a I18n) -> Element<'a, Message> {
        let toasts: Vec<Element<'a, Message>> = manager
            .visible()
            .map(|notification| Self::view(notification, i18n))
            .collect();

        if toasts.is_empty() {
            return Container::new(text(""))
                .width(Length::Shrink)
                .height(Length::Shrink)
                .into();
        }

        Container::new(
            Column::with_children(toasts)
                .spacing(spacing::XS)
                .align_x(alignment::Horizontal::Right),
        )
        .width(Length::Fill)
        .height(Length::Fill)
        .align_x(alignment::Horizontal::Right)
        .align_y(alignment::Vertical::Bottom)
        .padding(spacing::MD)
        .into()
    }
}

fn toast_container_style(theme: &Theme, accent: Color) -> container::Style {
    container::Style {
        background: Some(theme.extended_palette().background.base.color.into()),
        border: iced::Border {
            color: accent,
            width: border::WIDTH_MD,
            radius: radius::MD.into(),
        },
        shadow: shadow::MD,
        text_color: Some(theme.palette().text),
        ..Default::default()
    }
}

fn dismiss_button_style(theme: &Theme, status: button::Status) -> button::Style {
    let text_color = theme.extended_palette().background.base.text;
    let hover = |alpha: f32| button::Style {
        background: Some(
            Color {
                a: alpha,
                ..palette::GRAY_400
            }
            .into(),
        ),
        text_color,
        border: iced::Border {
            radius: radius::SM.into(),
            ..Default::default()
        },
        shadow: shadow::NONE,
        snap: true,
    };

    match status {
        button::Status::Hovered => hover(opacity::OVERLAY_SUBTLE),
        button::Status::Pressed => hover(opacity::OVERLAY_MEDIUM),
        button::Status::Active | button::Status::Disabled => button::Style {
            background: None,
            text_color,
            border: iced::Border::default(),
            shadow: shadow::NONE,
            snap: true,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn container_border_uses_accent() {
        let style = toast_container_style(&Theme::Dark, palette::WARNING_500);
        assert_eq!(style.border.color, palette::WARNING_500);
        assert!(style.background.is_some());
    }

    #[test]
    fn message_text_interpolates_arguments() {
        let i18n = I18n::new(Some("en-US".to_string()), &Config::default());
        let notification =
            Notification::error("download-error-save").with_arg("detail", "disk full");
        assert!(Toast::message_text(&notification, &i18n).contains("disk full"));
    }

    #[test]
    fn hovered_dismiss_button_has_background() {
        let style = dismiss_button_style(&Theme::Light, button::Status::Hovered);
        assert!(style.background.is_some());
        let idle = dismiss_button_style(&Theme::Light, button::Status::Active);
        assert!(idle.background.is_none());
    }
}
