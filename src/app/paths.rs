// SPDX-License-Identifier: MPL-2.0
//! Application directory resolution.
//!
//! # Config Directory Resolution Order
//!
//! 1. **Explicit override** - parameter to [`get_app_config_dir_with_override`] (tests)
//! 2. **CLI argument** `--config-dir` - set via [`init_cli_overrides`]
//! 3. **Environment variable** `ICED_DETECT_CONFIG_DIR`
//! 4. **Platform default** - `dirs::config_dir()/IcedDetect`

use std::path::PathBuf;
use std::sync::OnceLock;

/// Application name used for directory naming.
const APP_NAME: &str = "IcedDetect";

/// Environment variable to override the config directory.
pub const ENV_CONFIG_DIR: &str = "ICED_DETECT_CONFIG_DIR";

static CLI_CONFIG_DIR: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Records the `--config-dir` argument. Only the first call has an effect.
pub fn init_cli_overrides(config_dir: Option<String>) {
    let _ = CLI_CONFIG_DIR.set(config_dir.map(PathBuf::from));
}

fn get_cli_config_dir() -> Option<PathBuf> {
    CLI_CONFIG_DIR.get().and_then(Clone::clone)
}

/// Returns the directory holding `settings.toml`.
///
/// Returns `None` if the platform has no config directory.
pub fn get_app_config_dir() -> Option<PathBuf> {
    get_app_config_dir_with_override(None)
}

/// Returns the config directory, preferring `override_path` when given.
pub fn get_app_config_dir_with_override(override_path: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(path) = override_path {
        return Some(path);
    }

    if let Some(path) = get_cli_config_dir() {
        return Some(path);
    }

    if let Ok(env_path) = std::env::var(ENV_CONFIG_DIR) {
        if !env_path.is_empty() {
            return Some(PathBuf::from(env_path));
        }
    }

    dirs::config_dir().map(|mut path| {
        path.push(APP_NAME);
        path
    })
}

/// Initial directory of the archive save dialog.
///
/// The user's Downloads folder, else their home, else the working directory.
#[must_use]
pub fn default_download_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(dirs::home_dir)
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Serializes tests that touch the process environment.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn explicit_override_wins() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let custom = PathBuf::from("/tmp/iced-detect-override");
        assert_eq!(
            get_app_config_dir_with_override(Some(custom.clone())),
            Some(custom)
        );
    }

    #[test]
    fn env_var_is_used_when_set() {
        let _lock = ENV_MUTEX.lock().unwrap();
        std::env::set_var(ENV_CONFIG_DIR, "/tmp/iced-detect-env");
        let resolved = get_app_config_dir();
        std::env::remove_var(ENV_CONFIG_DIR);

        assert_eq!(resolved, Some(PathBuf::from("/tmp/iced-detect-env")));
    }

    #[test]
    fn empty_env_var_falls_back_to_platform_dir() {
        let _lock = ENV_MUTEX.lock().unwrap();
        std::env::set_var(ENV_CONFIG_DIR, "");
        let resolved = get_app_config_dir();
        std::env::remove_var(ENV_CONFIG_DIR);

        if let Some(path) = resolved {
            assert!(path.ends_with(APP_NAME));
        }
    }

    #[test]
    fn default_download_dir_is_absolute_or_empty() {
        let dir = default_download_dir();
        assert!(dir.is_absolute() || dir.as_os_str().is_empty());
    }
}
