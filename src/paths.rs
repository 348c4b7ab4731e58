// SPDX-License-Identifier: MPL-2.0
//! Config directory resolution.
//!
//! # Resolution Order
//!
//! 1. **Explicit override** - parameter to [`get_app_config_dir_with_override`]
//!    (set from `--config-dir`, or by tests)
//! 2. **Environment variable** `LAUNCHER_L10N_CONFIG_DIR` (if non-empty)
//! 3. **Platform default** - via the `dirs` crate, with the application name appended

use std::path::PathBuf;

/// Application name used for directory naming.
const APP_NAME: &str = "dde-launcher";

/// Environment variable to override the config directory.
pub const ENV_CONFIG_DIR: &str = "LAUNCHER_L10N_CONFIG_DIR";

/// Returns the application config directory path.
///
/// Linux: `~/.config/dde-launcher/`. Returns `None` if no platform config
/// directory can be determined.
pub fn get_app_config_dir() -> Option<PathBuf> {
    get_app_config_dir_with_override(None)
}

/// Returns the application config directory path with an optional override.
pub fn get_app_config_dir_with_override(override_path: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(path) = override_path {
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
