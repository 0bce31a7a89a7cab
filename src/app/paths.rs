// SPDX-License-Identifier: MPL-2.0
//! Where `settings.toml` lives.
//!
//! An explicit override wins, then `--config-dir`, then
//! `MAGIC_CANVAS_CONFIG_DIR`, then the platform config directory.

use std::path::PathBuf;
use std::sync::OnceLock;

const APP_NAME: &str = "MagicCanvas";

pub const ENV_CONFIG_DIR: &str = "MAGIC_CANVAS_CONFIG_DIR";

static CLI_CONFIG_DIR: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Records `--config-dir`. Only the first call counts.
pub fn init_cli_overrides(config_dir: Option<String>) {
    if CLI_CONFIG_DIR.set(config_dir.map(PathBuf::from)).is_err() {
        tracing::debug!("config dir override already initialized");
    }
}

#[must_use]
pub fn get_app_config_dir() -> Option<PathBuf> {
    get_app_config_dir_with_override(None)
}

#[must_use]
pub fn get_app_config_dir_with_override(override_path: Option<PathBuf>) -> Option<PathBuf> {
    override_path
        .or_else(|| CLI_CONFIG_DIR.get().cloned().flatten())
        .or_else(|| {
            std::env::var_os(ENV_CONFIG_DIR)
                .filter(|value| !value.is_empty())
                .map(PathBuf::from)
        })
        .or_else(|| dirs::config_dir().map(|dir| dir.join(APP_NAME)))
}
