// SPDX-License-Identifier: MPL-2.0
//! Color adjustments applied to generated previews.
//!
//! Exposure and saturation follow the CSS `brightness()` and `saturate()`
//! filter functions on straight-alpha channels, in that order. Warmth is a
//! uniform orange or blue wash composited with the overlay blend mode.

use crate::domain::editing::AdjustmentValue;
use crate::error::{Error, Result};
use tiny_skia::{BlendMode, Color, ColorU8, Paint, Pixmap, Rect, Transform};

/// Orange wash for positive warmth.
const WARM_TINT: (u8, u8, u8) = (255, 165, 0);
/// Blue wash for negative warmth.
const COOL_TINT: (u8, u8, u8) = (0, 150, 255);
/// Warmth value that maps to a fully opaque wash.
const WARMTH_ALPHA_DIVISOR: f32 = 150.0;

/// Warmth, exposure and saturation of the generated preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Adjustments {
    pub warmth: AdjustmentValue,
    pub exposure: AdjustmentValue,
    pub saturation: AdjustmentValue,
}

impl Adjustments {
    #[must_use]
    pub fn new(warmth: i32, exposure: i32, saturation: i32) -> Self {
        Self {
            warmth: AdjustmentValue::new(warmth),
            exposure: AdjustmentValue::new(exposure),
            saturation: AdjustmentValue::new(saturation),
        }
    }

    /// Returns true if any adjustment has been made (non-neutral values).
    #[must_use]
    pub fn has_changes(&self) -> bool {
        !self.warmth.is_neutral() || !self.exposure.is_neutral() || !self.saturation.is_neutral()
    }

    /// Reset adjustments to default values.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Returns an adjusted copy of `source`. The input is never modified.
///
/// # Errors
///
/// Returns [`Error::Surface`] if the wash rectangle cannot be built.
pub fn apply(source: &Pixmap, adjustments: &Adjustments) -> Result<Pixmap> {
    let mut output = source.clone();
    if !adjustments.has_changes() {
        return Ok(output);
    }

    if !adjustments.exposure.is_neutral() || !adjustments.saturation.is_neutral() {
        apply_color_filter(
            &mut output,
            adjustments.exposure.as_factor(),
            adjustments.saturation.as_factor(),
        );
    }

    if !adjustments.warmth.is_neutral() {
        apply_warmth(&mut output, adjustments.warmth)?;
    }

    Ok(output)
}

fn apply_color_filter(pixmap: &mut Pixmap, brightness: f32, saturation: f32) {
    let s = saturation;
    let matrix = [
        [0.213 + 0.787 * s, 0.715 - 0.715 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 + 0.285 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 - 0.715 * s, 0.072 + 0.928 * s],
    ];

    for pixel in pixmap.pixels_mut() {
        let color = pixel.demultiply();
        if color.alpha() == 0 {
            continue;
        }
        let rgb = [
            f32::from(color.red()) * brightness,
            f32::from(color.green()) * brightness,
            f32::from(color.blue()) * brightness,
        ];
        let channel = |row: [f32; 3]| -> u8 {
            let value = row[0] * rgb[0] + row[1] * rgb[1] + row[2] * rgb[2];
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let value = value.round().clamp(0.0, 255.0) as u8;
            value
        };
        *pixel = ColorU8::from_rgba(
            channel(matrix[0]),
            channel(matrix[1]),
            channel(matrix[2]),
            color.alpha(),
        )
        .premultiply();
    }
}

fn apply_warmth(pixmap: &mut Pixmap, warmth: AdjustmentValue) -> Result<()> {
    let value = warmth.value();
    let (r, g, b) = if value > 0 { WARM_TINT } else { COOL_TINT };
    let alpha = (value.unsigned_abs() as f32 / WARMTH_ALPHA_DIVISOR).clamp(0.0, 1.0);

    let rect = Rect::from_xywh(0.0, 0.0, pixmap.width() as f32, pixmap.height() as f32)
        .ok_or_else(|| Error::Surface("invalid warmth wash bounds".into()))?;

    let mut paint = Paint::default();
    let mut color = Color::from_rgba8(r, g, b, 255);
    color.set_alpha(alpha);
    paint.set_color(color);
    paint.blend_mode = BlendMode::Overlay;

    pixmap.fill_rect(rect, &paint, Transform::identity(), None);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(r: u8, g: u8, b: u8) -> Pixmap {
        let mut pixmap = Pixmap::new(4, 4).expect("pixmap");
        pixmap.fill(Color::from_rgba8(r, g, b, 255));
        pixmap
    }

    fn first_pixel(pixmap: &Pixmap) -> ColorU8 {
        pixmap.pixels()[0].demultiply()
    }

    #[test]
    fn adjustments_default_has_no_changes() {
        assert!(!Adjustments::default().has_changes());
        assert!(Adjustments::new(0, 5, 0).has_changes());
    }

    #[test]
    fn reset_clears_values() {
        let mut adjustments = Adjustments::new(10, -20, 30);
        adjustments.reset();
        assert_eq!(adjustments, Adjustments::default());
    }

    #[test]
    fn zero_adjustments_are_identity() {
        let source = solid(12, 130, 240);
        let output = apply(&source, &Adjustments::default()).expect("apply");
        assert_eq!(output.data(), source.data());
    }

    #[test]
    fn positive_exposure_brightens() {
        let output = apply(&solid(100, 100, 100), &Adjustments::new(0, 50, 0)).expect("apply");
        let pixel = first_pixel(&output);
        assert_eq!((pixel.red(), pixel.green(), pixel.blue()), (150, 150, 150));
    }

    #[test]
    fn negative_saturation_moves_toward_gray() {
        let output = apply(&solid(255, 0, 0), &Adjustments::new(0, 0, -50)).expect("apply");
        let pixel = first_pixel(&output);
        assert!(pixel.red() < 255);
        assert!(pixel.green() > 0);
        assert!(pixel.blue() > 0);
    }

    #[test]
    fn input_is_not_mutated() {
        let source = solid(50, 60, 70);
        let before = source.data().to_vec();
        let _ = apply(&source, &Adjustments::new(40, 40, 40)).expect("apply");
        assert_eq!(source.data(), before.as_slice());
    }

    #[test]
    fn warmth_shifts_red_blue_balance() {
        let warm = first_pixel(&apply(&solid(128, 128, 128), &Adjustments::new(50, 0, 0)).expect("apply"));
        assert!(warm.red() > warm.blue());

        let cool = first_pixel(&apply(&solid(128, 128, 128), &Adjustments::new(-50, 0, 0)).expect("apply"));
        assert!(cool.blue() > cool.red());
    }
}
