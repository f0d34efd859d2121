// SPDX-License-Identifier: MPL-2.0
//! View rendering for the application.

use super::{Message, Screen};
use crate::i18n::fluent::I18n;
use crate::ui::notifications::{self, Toast};
use crate::ui::{results_page, upload_page};
use iced::widget::{Container, Stack, Text};
use iced::{Element, Length};

/// Context required to render the application view.
pub struct ViewContext<'a> {
    pub i18n: &'a I18n,
    pub screen: Screen,
    pub upload: &'a upload_page::State,
    pub results: Option<&'a results_page::State>,
    pub notifications: &'a notifications::Manager,
}

/// Renders the active screen with the toast overlay on top.
pub fn view(ctx: ViewContext<'_>) -> Element<'_, Message> {
    let i18n = ctx.i18n;

    let current_view: Element<'_, Message> = match (ctx.screen, ctx.results) {
        (Screen::Upload, _) => ctx
            .upload
            .view(upload_page::ViewContext { i18n })
            .map(Message::Upload),
        (Screen::Results, Some(results)) => results
            .view(results_page::ViewContext { i18n })
            .map(Message::Results),
        (Screen::Results, None) => Container::new(Text::new(i18n.tr("results-empty")))
            .center(Length::Fill)
            .into(),
    };

    let toasts = Toast::view_overlay(ctx.notifications, i18n).map(Message::Notification);

    Stack::new()
        .push(
            Container::new(current_view)
                .width(Length::Fill)
                .height(Length::Fill),
        )
        .push(toasts)
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}
