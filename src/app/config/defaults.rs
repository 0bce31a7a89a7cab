// SPDX-License-Identifier: MPL-2.0
//! Centralized default values for all configuration constants.
//!
//! # Categories
//!
//! - **Editor**: Brush and generation quality
//! - **Generation**: Remote service connection
//! - **Export**: Output format and quality

use crate::application::port::generation::GenerationQuality;
use crate::domain::editing::newtypes::{brush_bounds, quality_bounds};
use crate::media::ExportFormat;

// ==========================================================================
// Editor Defaults
// ==========================================================================

/// Default brush diameter in canvas pixels.
pub const DEFAULT_BRUSH_WIDTH: u32 = brush_bounds::DEFAULT;

/// Default generation quality.
pub const DEFAULT_GENERATION_QUALITY: GenerationQuality = GenerationQuality::Medium;

// ==========================================================================
// Generation Defaults
// ==========================================================================

/// Environment variable holding the generation service bearer token.
pub const DEFAULT_API_KEY_ENV: &str = "MAGIC_CANVAS_API_KEY";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Minimum request timeout in seconds.
pub const MIN_TIMEOUT_SECS: u64 = 5;

/// Maximum request timeout in seconds.
pub const MAX_TIMEOUT_SECS: u64 = 600;

// ==========================================================================
// Export Defaults
// ==========================================================================

/// Default export format.
pub const DEFAULT_EXPORT_FORMAT: ExportFormat = ExportFormat::Png;

/// Default quality for lossy export formats.
pub const DEFAULT_EXPORT_QUALITY: u8 = quality_bounds::DEFAULT;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::editing::ExportQuality;

    #[test]
    fn timeout_default_is_within_bounds() {
        assert!((MIN_TIMEOUT_SECS..=MAX_TIMEOUT_SECS).contains(&DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn export_quality_default_is_valid() {
        assert_eq!(ExportQuality::new(DEFAULT_EXPORT_QUALITY).value(), DEFAULT_EXPORT_QUALITY);
    }
}
