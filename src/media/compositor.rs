// SPDX-License-Identifier: MPL-2.0
//! Layer compositing for previews and exports.
//!
//! The compositor works at the *working resolution*: the generated result's
//! size when one exists, otherwise the base image's size. Everything else
//! (base, mask) is resampled to it, and the final surface is resampled to the
//! requested target size.

use crate::error::Result;
use crate::media::adjustment::{self, Adjustments};
use crate::media::export::{self, EncodedImage, ExportOptions};
use crate::media::mask::Mask;
use crate::media::raster::{new_surface, pixmap_to_rgba, resample, RasterImage};
use crate::media::text::{self, FontFamily, TextAlign, TextRun};
use tiny_skia::{
    BlendMode, Color, FilterQuality, Paint, Pixmap, PixmapPaint, Rect, Transform,
};

/// Attribution stamped on every export.
pub const ATTRIBUTION_TEXT: &str = "Created with Magic Canvas";

/// Replacement pixels returned by the generation service.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedResult {
    pub image: RasterImage,
    /// Whether the result replaces the whole frame rather than the masked region.
    pub is_full_image: bool,
}

impl GeneratedResult {
    #[must_use]
    pub fn new(image: RasterImage, is_full_image: bool) -> Self {
        Self {
            image,
            is_full_image,
        }
    }
}

/// Inputs of one composition.
#[derive(Debug, Clone, Copy)]
pub struct Layers<'a> {
    pub base: &'a RasterImage,
    pub generated: Option<&'a GeneratedResult>,
    pub mask: &'a Mask,
    pub adjustments: Adjustments,
}

impl<'a> Layers<'a> {
    #[must_use]
    pub fn new(base: &'a RasterImage, mask: &'a Mask) -> Self {
        Self {
            base,
            generated: None,
            mask,
            adjustments: Adjustments::default(),
        }
    }

    #[must_use]
    pub fn with_generated(mut self, generated: Option<&'a GeneratedResult>) -> Self {
        self.generated = generated;
        self
    }

    #[must_use]
    pub fn with_adjustments(mut self, adjustments: Adjustments) -> Self {
        self.adjustments = adjustments;
        self
    }

    /// Compositing resolution before the final resample.
    #[must_use]
    pub fn working_dimensions(&self) -> (u32, u32) {
        self.generated
            .map_or_else(|| self.base.dimensions(), |g| g.image.dimensions())
    }
}

fn draw_over(target: &mut Pixmap, layer: &Pixmap, blend_mode: BlendMode) {
    target.draw_pixmap(
        0,
        0,
        layer.as_ref(),
        &PixmapPaint {
            blend_mode,
            quality: FilterQuality::Bilinear,
            ..PixmapPaint::default()
        },
        Transform::identity(),
        None,
    );
}

/// Composites `layers` at the working resolution, then resamples to the target.
///
/// `background` fills the surface first; `None` keeps transparency.
///
/// # Errors
///
/// Returns [`crate::error::Error::Surface`] for zero or oversized surfaces and
/// propagates mask decoding failures.
pub fn compose(
    layers: &Layers<'_>,
    target_width: u32,
    target_height: u32,
    background: Option<Color>,
) -> Result<Pixmap> {
    let (width, height) = layers.working_dimensions();
    let mut surface = new_surface(width, height)?;
    if let Some(color) = background {
        surface.fill(color);
    }

    let full_image = layers.generated.is_some_and(|g| g.is_full_image);
    if !full_image {
        let base = resample(&layers.base.to_pixmap()?, width, height)?;
        draw_over(&mut surface, &base, BlendMode::SourceOver);
    }

    if let Some(generated) = layers.generated {
        let source = resample(&generated.image.to_pixmap()?, width, height)?;
        let mut adjusted = adjustment::apply(&source, &layers.adjustments)?;

        if generated.is_full_image {
            surface.fill(background.unwrap_or(Color::TRANSPARENT));
            draw_over(&mut surface, &adjusted, BlendMode::SourceOver);
        } else if let Mask::Bitmap(mask) = layers.mask {
            let clip = mask.to_pixmap(width, height)?;
            draw_over(&mut adjusted, &clip, BlendMode::DestinationIn);
            draw_over(&mut surface, &adjusted, BlendMode::SourceOver);
        } else {
            draw_over(&mut surface, &adjusted, BlendMode::SourceOver);
        }
    }

    resample(&surface, target_width, target_height)
}

/// Font size of the attribution for an output of the given size.
#[must_use]
pub fn attribution_font_size(width: u32, height: u32) -> f32 {
    let size = (width as f32 / 60.0).min(height as f32 / 60.0).max(12.0);
    size.round()
}

/// Stamps the attribution in the bottom-right corner.
///
/// # Errors
///
/// Returns an error if the text cannot be laid out.
pub fn stamp_attribution(pixmap: &mut Pixmap) -> Result<()> {
    let size = attribution_font_size(pixmap.width(), pixmap.height());
    let inset = size * 0.75;
    let run = TextRun {
        content: ATTRIBUTION_TEXT.to_string(),
        family: FontFamily::Inter,
        size,
        color: "#FFFFFF".to_string(),
        opacity: 0.5,
        bold: true,
        italic: false,
        align: TextAlign::Right,
        x: pixmap.width() as f32 - inset,
        y: pixmap.height() as f32 - inset,
    };
    text::draw(pixmap, &[run])
}

/// Renders the final export: composite, attribution, encode.
///
/// Lossy formats get a white background so no transparency survives.
///
/// # Errors
///
/// Returns [`crate::error::Error::Export`] if the encoder yields no data and
/// [`crate::error::Error::Surface`] if a surface cannot be allocated.
pub fn export(layers: &Layers<'_>, options: &ExportOptions) -> Result<EncodedImage> {
    let background = options
        .format
        .needs_opaque_background()
        .then_some(Color::WHITE);
    let mut surface = compose(layers, options.width, options.height, background)?;
    stamp_attribution(&mut surface)?;

    let bitmap = pixmap_to_rgba(&surface)?;
    let bytes = export::encode(&bitmap, options.format, options.quality)?;

    tracing::info!(
        format = options.format.extension(),
        width = options.width,
        height = options.height,
        bytes = bytes.len(),
        "export rendered"
    );

    Ok(EncodedImage {
        bytes,
        format: options.format,
    })
}

/// Before/after comparison: `after` left of the split line, `before` right of it.
///
/// `percent` is clamped to 0..=100 of the width of `before`.
///
/// # Errors
///
/// Returns [`crate::error::Error::Surface`] if a surface cannot be allocated.
pub fn compose_split(before: &Pixmap, after: &Pixmap, percent: f32) -> Result<Pixmap> {
    let (width, height) = (before.width(), before.height());
    let split = width as f32 * percent.clamp(0.0, 100.0) / 100.0;
    let clear = Paint {
        blend_mode: BlendMode::Clear,
        ..Paint::default()
    };

    let mut left = resample(after, width, height)?;
    if let Some(right_half) = Rect::from_xywh(split, 0.0, width as f32 - split, height as f32) {
        left.fill_rect(right_half, &clear, Transform::identity(), None);
    }

    let mut surface = before.clone();
    if let Some(left_half) = Rect::from_xywh(0.0, 0.0, split, height as f32) {
        surface.fill_rect(left_half, &clear, Transform::identity(), None);
    }
    draw_over(&mut surface, &left, BlendMode::SourceOver);
    Ok(surface)
}
