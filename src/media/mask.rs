// SPDX-License-Identifier: MPL-2.0
//! Mask authoring.
//!
//! The painter keeps one persistent surface at canvas size. Strokes paint
//! opaque black (or punch holes when erasing) and the alpha channel of the
//! surface is the selection. A selection with no visible pixel is always
//! reported as [`Mask::Empty`].

use crate::domain::editing::{BrushWidth, ExportQuality, Point};
use crate::error::{Error, Result};
use crate::media::export::{self, ExportFormat};
use crate::media::raster::{new_surface, pixmap_to_rgba, resample, rgba_to_pixmap};
use image_rs::RgbaImage;
use std::sync::Arc;
use tiny_skia::{
    BlendMode, LineCap, LineJoin, Paint, PathBuilder, Pixmap, PixmapPaint, Stroke, Transform,
};

/// Region selection for region-limited generation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Mask {
    /// No selection.
    #[default]
    Empty,
    /// A painted selection with at least one non-transparent pixel.
    Bitmap(MaskBitmap),
}

impl Mask {
    /// Builds a mask from an RGBA bitmap, normalizing a blank bitmap to
    /// [`Mask::Empty`].
    ///
    /// # Errors
    ///
    /// Returns an error if the bitmap cannot be PNG-encoded.
    pub fn from_rgba(image: &RgbaImage) -> Result<Self> {
        if image.pixels().all(|pixel| pixel[3] == 0) {
            return Ok(Mask::Empty);
        }
        let encoded = export::encode(image, ExportFormat::Png, ExportQuality::default())?;
        Ok(Mask::Bitmap(MaskBitmap {
            encoded: Arc::new(encoded),
            width: image.width(),
            height: image.height(),
        }))
    }

    /// Decodes an encoded mask image (any format the decoder supports).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] for undecodable bytes.
    pub fn from_encoded(bytes: &[u8]) -> Result<Self> {
        let image = image_rs::load_from_memory(bytes)?.to_rgba8();
        Self::from_rgba(&image)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Mask::Empty)
    }

    #[must_use]
    pub fn as_bitmap(&self) -> Option<&MaskBitmap> {
        match self {
            Mask::Empty => None,
            Mask::Bitmap(bitmap) => Some(bitmap),
        }
    }
}

/// PNG-encoded mask with its pixel dimensions.
///
/// Equality is exact equality of the encoded bytes.
#[derive(Debug, Clone)]
pub struct MaskBitmap {
    encoded: Arc<Vec<u8>>,
    width: u32,
    height: u32,
}

impl MaskBitmap {
    #[must_use]
    pub fn encoded_bytes(&self) -> &[u8] {
        &self.encoded
    }

    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Decodes the mask and resamples it to `width` x `height`.
    ///
    /// # Errors
    ///
    /// Returns an error if decoding fails or no surface can be allocated.
    pub fn to_pixmap(&self, width: u32, height: u32) -> Result<Pixmap> {
        let image = image_rs::load_from_memory(&self.encoded)?.to_rgba8();
        let pixmap = rgba_to_pixmap(&image)?;
        resample(&pixmap, width, height)
    }
}

impl PartialEq for MaskBitmap {
    fn eq(&self, other: &Self) -> bool {
        self.encoded == other.encoded
    }
}

impl Eq for MaskBitmap {}

/// Whether a stroke adds to or removes from the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BrushMode {
    #[default]
    Paint,
    Erase,
}

/// Brush configuration passed into each stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BrushSettings {
    pub mode: BrushMode,
    pub width: BrushWidth,
}

impl BrushSettings {
    #[must_use]
    pub fn new(mode: BrushMode, width: BrushWidth) -> Self {
        Self { mode, width }
    }
}

#[derive(Debug, Clone, Copy)]
struct ActiveStroke {
    last: Point,
    brush: BrushSettings,
}

/// Persistent mask surface at canvas size.
pub struct MaskPainter {
    surface: Pixmap,
    stroke: Option<ActiveStroke>,
}

impl MaskPainter {
    /// Creates a blank painter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Surface`] for zero or oversized dimensions.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Ok(Self {
            surface: new_surface(width, height)?,
            stroke: None,
        })
    }

    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.surface.width(), self.surface.height())
    }

    #[must_use]
    pub fn is_stroking(&self) -> bool {
        self.stroke.is_some()
    }

    /// Sets the stroke anchor. Nothing is drawn until the pointer moves.
    pub fn begin_stroke(&mut self, point: Point, brush: BrushSettings) {
        self.stroke = Some(ActiveStroke { last: point, brush });
    }

    /// Draws the segment from the previous point to `point`.
    ///
    /// Ignored when no stroke is active.
    pub fn continue_stroke(&mut self, point: Point) {
        let Some(active) = self.stroke.as_mut() else {
            return;
        };

        let mut builder = PathBuilder::new();
        builder.move_to(active.last.x, active.last.y);
        builder.line_to(point.x, point.y);
        let from = active.last;
        active.last = point;
        let brush = active.brush;

        let Some(path) = builder.finish() else {
            tracing::trace!(?from, ?point, "skipping degenerate mask segment");
            return;
        };

        let mut paint = Paint::default();
        paint.set_color_rgba8(0, 0, 0, 255);
        paint.anti_alias = true;
        paint.blend_mode = match brush.mode {
            BrushMode::Paint => BlendMode::SourceOver,
            BrushMode::Erase => BlendMode::DestinationOut,
        };

        let stroke = Stroke {
            width: brush.width.value() as f32,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Stroke::default()
        };

        self.surface
            .stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }

    /// Ends the stroke and snapshots the surface.
    ///
    /// # Errors
    ///
    /// Returns an error if the mask cannot be encoded.
    pub fn end_stroke(&mut self) -> Result<Mask> {
        self.stroke = None;
        self.snapshot()
    }

    /// Current selection, normalized to [`Mask::Empty`] when blank.
    ///
    /// # Errors
    ///
    /// Returns an error if the mask cannot be encoded.
    pub fn snapshot(&self) -> Result<Mask> {
        if self.surface.pixels().iter().all(|pixel| pixel.alpha() == 0) {
            return Ok(Mask::Empty);
        }
        Mask::from_rgba(&pixmap_to_rgba(&self.surface)?)
    }

    /// Replaces the surface content with `mask`, resampled to canvas size.
    ///
    /// # Errors
    ///
    /// Returns an error if the mask cannot be decoded.
    pub fn load(&mut self, mask: &Mask) -> Result<()> {
        self.stroke = None;
        self.surface.fill(tiny_skia::Color::TRANSPARENT);
        if let Mask::Bitmap(bitmap) = mask {
            let (width, height) = self.dimensions();
            let content = bitmap.to_pixmap(width, height)?;
            self.surface.draw_pixmap(
                0,
                0,
                content.as_ref(),
                &PixmapPaint::default(),
                Transform::identity(),
                None,
            );
        }
        Ok(())
    }

    /// Erases everything.
    pub fn clear(&mut self) {
        self.stroke = None;
        self.surface.fill(tiny_skia::Color::TRANSPARENT);
    }

    /// Resizes the surface, rescaling existing content.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Surface`] for zero or oversized dimensions.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        if width == 0 || height == 0 {
            return Err(Error::Surface(format!(
                "cannot resize mask surface to {width}x{height}"
            )));
        }
        self.surface = resample(&self.surface, width, height)?;
        Ok(())
    }
}

impl std::fmt::Debug for MaskPainter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaskPainter")
            .field("dimensions", &self.dimensions())
            .field("stroking", &self.is_stroking())
            .finish()
    }
}
