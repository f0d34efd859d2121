// SPDX-License-Identifier: MPL-2.0
//! Light/dark theme selection.

use iced::Theme;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    Dark,
    /// Follow the desktop setting.
    #[default]
    System,
}

impl ThemeMode {
    /// Whether the effective theme is dark. System detection falls back to
    /// dark when the desktop cannot be queried.
    #[must_use]
    pub fn is_dark(self) -> bool {
        match self {
            ThemeMode::Light => false,
            ThemeMode::Dark => true,
            ThemeMode::System => !matches!(dark_light::detect(), Ok(dark_light::Mode::Light)),
        }
    }

    #[must_use]
    pub fn iced_theme(self) -> Theme {
        if self.is_dark() {
            Theme::Dark
        } else {
            Theme::Light
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_modes_map_to_iced_themes() {
        assert_eq!(ThemeMode::Light.iced_theme(), Theme::Light);
        assert_eq!(ThemeMode::Dark.iced_theme(), Theme::Dark);
    }

    #[test]
    fn system_mode_resolves_without_panicking() {
        let _ = ThemeMode::System.iced_theme();
    }

    #[test]
    fn serializes_lowercase() {
        #[derive(Serialize)]
        struct Wrapper {
            mode: ThemeMode,
        }
        let toml = toml::to_string(&Wrapper {
            mode: ThemeMode::System,
        })
        .expect("serialize");
        assert_eq!(toml.trim(), r#"mode = "system""#);
    }
}
