// SPDX-License-Identifier: MPL-2.0
//! Loading and saving user preferences in `settings.toml`.
//!
//! # Configuration Sections
//!
//! - `[general]` - Language and theme mode
//! - `[server]` - Detection server address and request timeout
//! - `[diagnostics]` - Activity log size
//!
//! # Path Resolution
//!
//! 1. Use `load_from_path()`/`save_to_path()` with explicit path
//! 2. `--config-dir` CLI argument
//! 3. `ICED_DETECT_CONFIG_DIR` environment variable
//! 4. Platform-specific config directory
//!
//! # Examples
//!
//! ```no_run
//! use iced_detect::config;
//!
//! let (mut config, _warning) = config::load();
//! config.server.base_url = "http://detector.lan:8000".to_string();
//! config::save(&config).expect("Failed to save config");
//! ```

pub mod defaults;

pub use defaults::*;

use crate::app::paths;
use crate::domain::newtypes::{BufferCapacity, RequestTimeout};
use crate::error::{Error, Result};
use crate::ui::theming::ThemeMode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "settings.toml";

// =============================================================================
// Section Structs
// =============================================================================

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct GeneralConfig {
    /// UI language code (e.g., "en-US", "ru").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Light, dark, or follow the system.
    #[serde(default, deserialize_with = "deserialize_theme_mode")]
    pub theme_mode: ThemeMode,
}

/// Detection server settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    /// Root URL of the detection server.
    #[serde(default = "default_server_url")]
    pub base_url: String,

    /// Per-request timeout in seconds. Clamped on use.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_server_url(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl ServerConfig {
    #[must_use]
    pub fn request_timeout(&self) -> RequestTimeout {
        RequestTimeout::from_secs(self.request_timeout_secs)
    }
}

/// Diagnostics settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiagnosticsConfig {
    /// Events kept in memory. Clamped on use.
    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: usize,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: DEFAULT_DIAGNOSTICS_BUFFER_CAPACITY,
        }
    }
}

impl DiagnosticsConfig {
    #[must_use]
    pub fn capacity(&self) -> BufferCapacity {
        BufferCapacity::new(self.buffer_capacity)
    }
}

// =============================================================================
// Main Config Struct (Sectioned)
// =============================================================================

/// Application configuration with logical sections.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
}

// =============================================================================
// Serde Default Functions
// =============================================================================

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_buffer_capacity() -> usize {
    DEFAULT_DIAGNOSTICS_BUFFER_CAPACITY
}

fn deserialize_theme_mode<'de, D>(deserializer: D) -> std::result::Result<ThemeMode, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    let raw = String::deserialize(deserializer)?;
    match raw.to_lowercase().as_str() {
        "light" => Ok(ThemeMode::Light),
        "dark" => Ok(ThemeMode::Dark),
        "system" => Ok(ThemeMode::System),
        other => Err(D::Error::custom(format!("invalid theme_mode: {other}"))),
    }
}

// =============================================================================
// Load / Save
// =============================================================================

fn get_config_path_with_override(base_dir: Option<PathBuf>) -> Option<PathBuf> {
    paths::get_app_config_dir_with_override(base_dir).map(|mut path| {
        path.push(CONFIG_FILE);
        path
    })
}

/// Loads the configuration from the default path.
///
/// Returns the config and an optional i18n warning key. A missing file is
/// not a warning; an unreadable one yields defaults plus a warning.
pub fn load() -> (Config, Option<String>) {
    load_with_override(None)
}

/// Loads the configuration from a custom directory.
pub fn load_with_override(base_dir: Option<PathBuf>) -> (Config, Option<String>) {
    if let Some(path) = get_config_path_with_override(base_dir) {
        if path.exists() {
            return match load_from_path(&path) {
                Ok(config) => (config, None),
                Err(_) => (
                    Config::default(),
                    Some("notification-config-load-error".to_string()),
                ),
            };
        }
    }
    (Config::default(), None)
}

/// Loads configuration from a specific path.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read and [`Error::Config`]
/// if it is not valid TOML for [`Config`].
pub fn load_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    Ok(config)
}

/// Saves the configuration to the default path.
///
/// # Errors
///
/// See [`save_to_path`].
pub fn save(config: &Config) -> Result<()> {
    save_with_override(config, None)
}

/// Saves the configuration to a custom directory.
///
/// # Errors
///
/// See [`save_to_path`].
pub fn save_with_override(config: &Config, base_dir: Option<PathBuf>) -> Result<()> {
    if let Some(path) = get_config_path_with_override(base_dir) {
        return save_to_path(config, &path);
    }
    Ok(())
}

/// Saves configuration to a specific path, creating parent directories.
///
/// # Errors
///
/// Returns an error if serialization or any filesystem operation fails.
pub fn save_to_path(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config).map_err(Error::from)?;
    fs::write(path, content)?;
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
