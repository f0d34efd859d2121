// SPDX-License-Identifier: MPL-2.0
//! Container styles.

use crate::ui::design_tokens::{border, opacity, palette, radius};
use iced::widget::container;
use iced::{Background, Border, Color, Theme};

/// Surface behind a preview or result tile.
///
/// Derived from the theme background so tiles read well in light and dark
/// modes.
pub fn tile(theme: &Theme) -> container::Style {
    let base = theme.extended_palette().background.weak.color;

    container::Style {
        background: Some(Background::Color(Color {
            a: opacity::SURFACE,
            ..base
        })),
        border: Border {
            radius: radius::MD.into(),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Drop zone shown while nothing is staged.
pub fn drop_zone(theme: &Theme) -> container::Style {
    container::Style {
        background: None,
        border: Border {
            color: palette::GRAY_400,
            width: border::WIDTH_MD,
            radius: radius::MD.into(),
        },
        text_color: Some(theme.extended_palette().background.strong.text),
        ..Default::default()
    }
}

/// Full-screen backdrop of the carousel viewer.
pub fn scrim(_theme: &Theme) -> container::Style {
    container::Style {
        background: Some(Background::Color(Color {
            a: opacity::SCRIM,
            ..palette::BLACK
        })),
        text_color: Some(palette::WHITE),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scrim_is_translucent_black() {
        let style = scrim(&Theme::Light);
        let Some(Background::Color(color)) = style.background else {
            panic!("scrim must have a color background");
        };
        assert!(color.a < 1.0);
        assert_eq!(color.r, 0.0);
    }

    #[test]
    fn drop_zone_has_visible_border() {
        assert!(drop_zone(&Theme::Dark).border.width > 0.0);
    }
}
