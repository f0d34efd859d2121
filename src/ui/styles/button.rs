// SPDX-License-Identifier: MPL-2.0
//! Button styles.

use crate::ui::design_tokens::{
    border, opacity,
    palette::{self, BLACK, WHITE},
    radius, shadow,
};
use iced::widget::button;
use iced::{Background, Border, Color, Theme};

fn disabled_style(theme: &Theme) -> button::Style {
    let is_light = matches!(theme, Theme::Light);
    button::Style {
        background: Some(Background::Color(if is_light {
            palette::GRAY_200
        } else {
            palette::GRAY_700
        })),
        text_color: palette::GRAY_400,
        border: Border {
            color: palette::GRAY_400,
            width: border::WIDTH_SM,
            radius: radius::SM.into(),
        },
        shadow: shadow::NONE,
        snap: true,
    }
}

/// Main call to action (Submit, downloads).
pub fn primary(theme: &Theme, status: button::Status) -> button::Style {
    match status {
        button::Status::Active | button::Status::Pressed => button::Style {
            background: Some(Background::Color(palette::PRIMARY_500)),
            text_color: WHITE,
            border: Border {
                color: palette::PRIMARY_600,
                width: border::WIDTH_SM,
                radius: radius::SM.into(),
            },
            shadow: shadow::SM,
            snap: true,
        },
        button::Status::Hovered => button::Style {
            background: Some(Background::Color(palette::PRIMARY_400)),
            text_color: WHITE,
            border: Border {
                color: palette::PRIMARY_500,
                width: border::WIDTH_SM,
                radius: radius::SM.into(),
            },
            shadow: shadow::MD,
            snap: true,
        },
        button::Status::Disabled => disabled_style(theme),
    }
}

/// Secondary actions (add files, clear, back).
pub fn secondary(theme: &Theme, status: button::Status) -> button::Style {
    let is_light = matches!(theme, Theme::Light);
    let (bg_color, text_color) = if is_light {
        (palette::GRAY_100, palette::GRAY_900)
    } else {
        (palette::GRAY_700, WHITE)
    };

    match status {
        button::Status::Active | button::Status::Pressed => button::Style {
            background: Some(Background::Color(bg_color)),
            text_color,
            border: Border {
                color: palette::GRAY_400,
                width: border::WIDTH_SM,
                radius: radius::SM.into(),
            },
            shadow: shadow::NONE,
            snap: true,
        },
        button::Status::Hovered => button::Style {
            background: Some(Background::Color(bg_color)),
            text_color,
            border: Border {
                color: palette::PRIMARY_500,
                width: border::WIDTH_SM,
                radius: radius::SM.into(),
            },
            shadow: shadow::SM,
            snap: true,
        },
        button::Status::Disabled => disabled_style(theme),
    }
}

/// Small remove button drawn over a preview tile.
pub fn remove(_theme: &Theme, status: button::Status) -> button::Style {
    let background = match status {
        button::Status::Hovered | button::Status::Pressed => palette::ERROR_500,
        _ => Color {
            a: opacity::OVERLAY_STRONG,
            ..BLACK
        },
    };

    button::Style {
        background: Some(Background::Color(background)),
        text_color: WHITE,
        border: Border {
            radius: radius::SM.into(),
            ..Default::default()
        },
        shadow: shadow::NONE,
        snap: true,
    }
}

/// Translucent controls on top of the full-screen viewer.
pub fn overlay(_theme: &Theme, status: button::Status) -> button::Style {
    let alpha = match status {
        button::Status::Hovered => opacity::OVERLAY_STRONG,
        button::Status::Pressed => opacity::SURFACE,
        _ => opacity::OVERLAY_MEDIUM,
    };

    button::Style {
        background: Some(Background::Color(Color { a: alpha, ..BLACK })),
        text_color: WHITE,
        border: Border {
            radius: radius::MD.into(),
            ..Default::default()
        },
        shadow: shadow::MD,
        snap: true,
    }
}

/// Preview tile acting as a button; no chrome of its own.
pub fn tile(theme: &Theme, status: button::Status) -> button::Style {
    let border_color = match status {
        button::Status::Hovered | button::Status::Pressed => palette::PRIMARY_500,
        _ => Color::TRANSPARENT,
    };

    button::Style {
        background: None,
        text_color: theme.palette().text,
        border: Border {
            color: border_color,
            width: border::WIDTH_MD,
            radius: radius::MD.into(),
        },
        shadow: shadow::NONE,
        snap: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_primary_is_grayed_out() {
        let style = primary(&Theme::Light, button::Status::Disabled);
        assert_eq!(style.text_color, palette::GRAY_400);
    }

    #[test]
    fn remove_turns_red_on_hover() {
        let style = remove(&Theme::Dark, button::Status::Hovered);
        assert_eq!(style.background, Some(Background::Color(palette::ERROR_500)));
    }

    #[test]
    fn tile_border_only_on_hover() {
        let idle = tile(&Theme::Dark, button::Status::Active);
        let hovered = tile(&Theme::Dark, button::Status::Hovered);
        assert_eq!(idle.border.color, Color::TRANSPARENT);
        assert_eq!(hovered.border.color, palette::PRIMARY_500);
    }
}
