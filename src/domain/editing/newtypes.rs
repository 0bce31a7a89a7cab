// SPDX-License-Identifier: MPL-2.0
//! Editing newtypes.
//!
//! This module provides type-safe wrappers for editing values,
//! ensuring they are always within valid ranges.

// =============================================================================
// Adjustment Bounds
// =============================================================================

/// Adjustment slider bounds (-50 to +50).
pub mod adjustment_bounds {
    /// Minimum adjustment value.
    pub const MIN: i32 = -50;
    /// Maximum adjustment value.
    pub const MAX: i32 = 50;
    /// Default (neutral) adjustment value.
    pub const DEFAULT: i32 = 0;
}

// =============================================================================
// AdjustmentValue
// =============================================================================

/// Warmth, exposure or saturation slider value, guaranteed to be within
/// the valid range (-50 to +50).
///
/// A value of 0 means no adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AdjustmentValue(i32);

impl AdjustmentValue {
    /// Creates a new adjustment value, clamping to the valid range.
    #[must_use]
    pub fn new(value: i32) -> Self {
        Self(value.clamp(adjustment_bounds::MIN, adjustment_bounds::MAX))
    }

    /// Returns the raw value.
    #[must_use]
    pub fn value(self) -> i32 {
        self.0
    }

    /// Returns whether this represents no adjustment (value is 0).
    #[must_use]
    pub fn is_neutral(self) -> bool {
        self.0 == adjustment_bounds::DEFAULT
    }

    /// Returns the value as a multiplicative factor (`1 + value / 100`).
    #[must_use]
    pub fn as_factor(self) -> f32 {
        1.0 + self.0 as f32 / 100.0
    }
}

// =============================================================================
// BrushWidth
// =============================================================================

/// Brush width bounds in canvas pixels (1 to 100).
pub mod brush_bounds {
    /// Minimum brush width.
    pub const MIN: u32 = 1;
    /// Maximum brush width.
    pub const MAX: u32 = 100;
    /// Default brush width.
    pub const DEFAULT: u32 = 40;
}

/// Mask brush width, guaranteed to be within 1–100 pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrushWidth(u32);

impl BrushWidth {
    /// Creates a new brush width, clamping to the valid range.
    #[must_use]
    pub fn new(value: u32) -> Self {
        Self(value.clamp(brush_bounds::MIN, brush_bounds::MAX))
    }

    /// Returns the raw width in pixels.
    #[must_use]
    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for BrushWidth {
    fn default() -> Self {
        Self(brush_bounds::DEFAULT)
    }
}

// =============================================================================
// FontSize
// =============================================================================

/// Text layer font size bounds in pixels (8 to 128).
pub mod font_size_bounds {
    /// Minimum font size.
    pub const MIN: u32 = 8;
    /// Maximum font size.
    pub const MAX: u32 = 128;
    /// Default font size for new layers.
    pub const DEFAULT: u32 = 48;
}

/// Font size of a text layer, guaranteed to be within 8–128 pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontSize(u32);

impl FontSize {
    /// Creates a new font size, clamping to the valid range.
    #[must_use]
    pub fn new(value: u32) -> Self {
        Self(value.clamp(font_size_bounds::MIN, font_size_bounds::MAX))
    }

    /// Returns the raw size in pixels.
    #[must_use]
    pub fn value(self) -> u32 {
        self.0
    }

    /// Returns the size as `f32` for layout math.
    #[must_use]
    pub fn as_f32(self) -> f32 {
        self.0 as f32
    }
}

impl Default for FontSize {
    fn default() -> Self {
        Self(font_size_bounds::DEFAULT)
    }
}

// =============================================================================
// ExportQuality
// =============================================================================

/// Export quality bounds (1 to 100).
pub mod quality_bounds {
    /// Minimum quality.
    pub const MIN: u8 = 1;
    /// Maximum quality.
    pub const MAX: u8 = 100;
    /// Default quality.
    pub const DEFAULT: u8 = 95;
}

/// Quality of a lossy export, guaranteed to be within 1–100.
///
/// Lossless formats ignore this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportQuality(u8);

impl ExportQuality {
    /// Creates a new export quality, clamping to the valid range.
    #[must_use]
    pub fn new(value: u8) -> Self {
        Self(value.clamp(quality_bounds::MIN, quality_bounds::MAX))
    }

    /// Returns the raw quality value.
    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for ExportQuality {
    fn default() -> Self {
        Self(quality_bounds::DEFAULT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjustment_value_clamps_values() {
        assert_eq!(AdjustmentValue::new(150).value(), 50);
        assert_eq!(AdjustmentValue::new(-150).value(), -50);
        assert_eq!(AdjustmentValue::new(25).value(), 25);
    }

    #[test]
    fn adjustment_value_factor() {
        assert!((AdjustmentValue::new(50).as_factor() - 1.5).abs() < f32::EPSILON);
        assert!((AdjustmentValue::new(-50).as_factor() - 0.5).abs() < f32::EPSILON);
        assert!((AdjustmentValue::default().as_factor() - 1.0).abs() < f32::EPSILON);
        assert!(AdjustmentValue::default().is_neutral());
    }

    #[test]
    fn brush_width_clamps_to_bounds() {
        assert_eq!(BrushWidth::new(0).value(), 1);
        assert_eq!(BrushWidth::new(500).value(), 100);
        assert_eq!(BrushWidth::default().value(), 40);
    }

    #[test]
    fn font_size_clamps_to_bounds() {
        assert_eq!(FontSize::new(2).value(), 8);
        assert_eq!(FontSize::new(400).value(), 128);
        assert_eq!(FontSize::new(64).value(), 64);
        assert_eq!(FontSize::default().value(), 48);
    }

    #[test]
    fn export_quality_clamps_to_bounds() {
        assert_eq!(ExportQuality::new(0).value(), 1);
        assert_eq!(ExportQuality::new(255).value(), 100);
        assert_eq!(ExportQuality::default().value(), 95);
    }
}
