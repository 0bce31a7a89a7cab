// SPDX-License-Identifier: MPL-2.0
//! This module handles the application's configuration, including loading and saving
//! user preferences to a `settings.toml` file.
//!
//! # Configuration Sections
//!
//! - `[editor]` - Brush width and generation quality
//! - `[generation]` - Generation service endpoint, credentials and timeout
//! - `[export]` - Default export format and quality
//!
//! # Path Resolution
//!
//! The config file location can be customized for testing or portable deployments:
//! 1. Use `load_from_path()`/`save_to_path()` with explicit path
//! 2. Set `MAGIC_CANVAS_CONFIG_DIR` environment variable
//! 3. Falls back to platform-specific config directory
//!
//! # Examples
//!
//! ```no_run
//! use magic_canvas::app::config;
//!
//! // Load existing configuration (returns tuple with optional warning)
//! let (mut config, _warning) = config::load();
//!
//! // Modify a setting
//! config.editor.brush_width = Some(60);
//!
//! // Save the modified configuration
//! config::save(&config).expect("Failed to save config");
//! ```

pub mod defaults;

pub use defaults::*;

use crate::app::paths;
use crate::application::port::generation::GenerationQuality;
use crate::domain::editing::{BrushWidth, ExportQuality};
use crate::error::{Error, Result};
use crate::media::ExportFormat;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILE: &str = "settings.toml";

// =============================================================================
// Section Structs
// =============================================================================

/// Editing preferences.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EditorConfig {
    /// Brush diameter in canvas pixels.
    #[serde(default = "default_brush_width", skip_serializing_if = "Option::is_none")]
    pub brush_width: Option<u32>,

    /// Quality requested from the generation service.
    #[serde(
        default = "default_generation_quality",
        skip_serializing_if = "Option::is_none"
    )]
    pub generation_quality: Option<GenerationQuality>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            brush_width: default_brush_width(),
            generation_quality: default_generation_quality(),
        }
    }
}

impl EditorConfig {
    /// Brush width, clamped to the valid range.
    #[must_use]
    pub fn brush_width(&self) -> BrushWidth {
        BrushWidth::new(self.brush_width.unwrap_or(DEFAULT_BRUSH_WIDTH))
    }

    #[must_use]
    pub fn generation_quality(&self) -> GenerationQuality {
        self.generation_quality
            .unwrap_or(DEFAULT_GENERATION_QUALITY)
    }
}

/// Generation service connection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationConfig {
    /// Endpoint URL; generation is unavailable while unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Name of the environment variable holding the bearer token.
    ///
    /// The token itself is never written to disk.
    #[serde(default = "default_api_key_env", skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs", skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl GenerationConfig {
    /// Request timeout, clamped to the supported range.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        let secs = self
            .timeout_secs
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
            .clamp(MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }

    /// Reads the bearer token from the configured environment variable.
    #[must_use]
    pub fn api_key(&self) -> Option<String> {
        let name = self.api_key_env.as_deref().unwrap_or(DEFAULT_API_KEY_ENV);
        std::env::var(name).ok().filter(|key| !key.trim().is_empty())
    }
}

/// Export preferences.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportConfig {
    #[serde(default = "default_export_format", skip_serializing_if = "Option::is_none")]
    pub format: Option<ExportFormat>,

    /// Quality for lossy formats (1 to 100).
    #[serde(default = "default_export_quality", skip_serializing_if = "Option::is_none")]
    pub quality: Option<u8>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: default_export_format(),
            quality: default_export_quality(),
        }
    }
}

impl ExportConfig {
    #[must_use]
    pub fn format(&self) -> ExportFormat {
        self.format.unwrap_or(DEFAULT_EXPORT_FORMAT)
    }

    #[must_use]
    pub fn quality(&self) -> ExportQuality {
        ExportQuality::new(self.quality.unwrap_or(DEFAULT_EXPORT_QUALITY))
    }
}

// =============================================================================
// Main Config Struct (Sectioned)
// =============================================================================

/// Application configuration with logical sections.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub editor: EditorConfig,

    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub export: ExportConfig,
}

// =============================================================================
// Default Value Functions
// =============================================================================

fn default_brush_width() -> Option<u32> {
    Some(DEFAULT_BRUSH_WIDTH)
}

fn default_generation_quality() -> Option<GenerationQuality> {
    Some(DEFAULT_GENERATION_QUALITY)
}

fn default_api_key_env() -> Option<String> {
    Some(DEFAULT_API_KEY_ENV.to_string())
}

fn default_timeout_secs() -> Option<u64> {
    Some(DEFAULT_TIMEOUT_SECS)
}

fn default_export_format() -> Option<ExportFormat> {
    Some(DEFAULT_EXPORT_FORMAT)
}

fn default_export_quality() -> Option<u8> {
    Some(DEFAULT_EXPORT_QUALITY)
}

// =============================================================================
// Config Path Resolution
// =============================================================================

/// Returns the config file path with an optional override.
fn get_config_path_with_override(base_dir: Option<PathBuf>) -> Option<PathBuf> {
    paths::get_app_config_dir_with_override(base_dir).map(|mut path| {
        path.push(CONFIG_FILE);
        path
    })
}

// =============================================================================
// Load Functions
// =============================================================================

/// Loads the configuration from the default path.
///
/// Returns a tuple of (config, optional_warning). If loading fails, returns
/// default config with a warning message explaining what went wrong.
#[must_use]
pub fn load() -> (Config, Option<String>) {
    load_with_override(None)
}

/// Loads the configuration from a custom directory.
#[must_use]
pub fn load_with_override(base_dir: Option<PathBuf>) -> (Config, Option<String>) {
    if let Some(path) = get_config_path_with_override(base_dir) {
        if path.exists() {
            match load_from_path(&path) {
                Ok(config) => return (config, None),
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "ignoring unreadable settings");
                    return (
                        Config::default(),
                        Some(format!("Could not read {}: {err}", path.display())),
                    );
                }
            }
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

// =============================================================================
// Save Functions
// =============================================================================

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

/// Saves configuration to a specific path.
///
/// # Errors
///
/// Returns [`Error::Io`] on write failure and [`Error::Config`] if the
/// configuration cannot be serialized.
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
