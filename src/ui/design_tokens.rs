// SPDX-License-Identifier: MPL-2.0
//! Design tokens: the fixed scales every view draws from.
//!
//! ```
//! use iced_detect::ui::design_tokens::{opacity, palette, spacing};
//! use iced::Color;
//!
//! let scrim = Color { a: opacity::OVERLAY_STRONG, ..palette::BLACK };
//! let gap = spacing::MD;
//! # let _ = (scrim, gap);
//! ```

use iced::Color;

// ============================================================================
// Color Palette
// ============================================================================

pub mod palette {
    use super::Color;

    pub const BLACK: Color = Color::BLACK;
    pub const WHITE: Color = Color::WHITE;
    pub const GRAY_900: Color = Color::from_rgb(0.1, 0.1, 0.1);
    pub const GRAY_700: Color = Color::from_rgb(0.3, 0.3, 0.3);
    pub const GRAY_400: Color = Color::from_rgb(0.4, 0.4, 0.4);
    pub const GRAY_200: Color = Color::from_rgb(0.75, 0.75, 0.75);
    pub const GRAY_100: Color = Color::from_rgb(0.85, 0.85, 0.85);

    pub const PRIMARY_400: Color = Color::from_rgb(0.4, 0.7, 1.0);
    pub const PRIMARY_500: Color = Color::from_rgb(0.3, 0.6, 0.9);
    pub const PRIMARY_600: Color = Color::from_rgb(0.2, 0.5, 0.8);

    pub const ERROR_500: Color = Color::from_rgb(0.898, 0.224, 0.208);
    pub const WARNING_500: Color = Color::from_rgb(0.945, 0.651, 0.125);
    pub const SUCCESS_500: Color = Color::from_rgb(0.263, 0.702, 0.404);
    pub const INFO_500: Color = Color::from_rgb(0.392, 0.588, 1.0);
}

// ============================================================================
// Opacity Scale
// ============================================================================

pub mod opacity {
    pub const OVERLAY_SUBTLE: f32 = 0.2;
    pub const OVERLAY_MEDIUM: f32 = 0.5;
    pub const OVERLAY_STRONG: f32 = 0.7;
    /// Tile and panel surfaces over the window background.
    pub const SURFACE: f32 = 0.85;
    /// Full-screen viewer backdrop.
    pub const SCRIM: f32 = 0.92;
}

// ============================================================================
// Spacing Scale (8px grid)
// ============================================================================

pub mod spacing {
    pub const XXS: f32 = 4.0;
    pub const XS: f32 = 8.0;
    pub const SM: f32 = 12.0;
    pub const MD: f32 = 16.0;
    pub const LG: f32 = 24.0;
    pub const XL: f32 = 32.0;
}

// ============================================================================
// Component Sizes
// ============================================================================

pub mod sizing {
    pub const ICON_MD: f32 = 24.0;
    pub const BUTTON_HEIGHT: f32 = 36.0;
    pub const TOAST_WIDTH: f32 = 320.0;
    /// Width of the previous/next arrows in the full-screen viewer.
    pub const NAV_ARROW_WIDTH: f32 = 56.0;
    /// Height of a document row in the upload list.
    pub const DOCUMENT_ROW_HEIGHT: f32 = 32.0;
}

// ============================================================================
// Typography Scale
// ============================================================================

pub mod typography {
    /// Screen headings.
    pub const TITLE_LG: f32 = 28.0;
    /// Section headings.
    pub const TITLE_SM: f32 = 18.0;
    pub const BODY_LG: f32 = 16.0;
    pub const BODY: f32 = 14.0;
    /// File names under thumbnails, status line.
    pub const CAPTION: f32 = 12.0;
}

pub mod border {
    pub const WIDTH_SM: f32 = 1.0;
    pub const WIDTH_MD: f32 = 2.0;
}

pub mod radius {
    pub const SM: f32 = 4.0;
    pub const MD: f32 = 8.0;
}

pub mod shadow {
    use super::palette;
    use iced::{Shadow, Vector};

    pub const NONE: Shadow = Shadow {
        color: palette::BLACK,
        offset: Vector::ZERO,
        blur_radius: 0.0,
    };

    pub const SM: Shadow = Shadow {
        color: palette::BLACK,
        offset: Vector { x: 0.0, y: 1.0 },
        blur_radius: 3.0,
    };

    pub const MD: Shadow = Shadow {
        color: palette::BLACK,
        offset: Vector { x: 0.0, y: 4.0 },
        blur_radius: 8.0,
    };
}

// ============================================================================
// Compile-time Validation
// ============================================================================

const _: () = {
    assert!(spacing::XS > spacing::XXS);
    assert!(spacing::SM > spacing::XS);
    assert!(spacing::MD > spacing::SM);
    assert!(spacing::LG > spacing::MD);
    assert!(spacing::XL > spacing::LG);

    assert!(opacity::OVERLAY_SUBTLE < opacity::OVERLAY_MEDIUM);
    assert!(opacity::OVERLAY_MEDIUM < opacity::OVERLAY_STRONG);
    assert!(opacity::SCRIM < 1.0);

    assert!(typography::TITLE_LG > typography::TITLE_SM);
    assert!(typography::TITLE_SM > typography::BODY_LG);
    assert!(typography::BODY_LG > typography::BODY);
    assert!(typography::BODY > typography::CAPTION);

    assert!(border::WIDTH_MD > border::WIDTH_SM);
    assert!(radius::MD > radius::SM);
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spacing_follows_the_grid() {
        assert_eq!(spacing::MD, spacing::XS * 2.0);
        assert_eq!(spacing::XL, spacing::MD * 2.0);
    }

    #[test]
    fn semantic_colors_are_distinct() {
        assert_ne!(palette::ERROR_500, palette::WARNING_500);
        assert_ne!(palette::SUCCESS_500, palette::INFO_500);
    }
}
