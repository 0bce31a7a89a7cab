// SPDX-License-Identifier: MPL-2.0
//! Canonical raster storage and surface conversions.
//!
//! A [`RasterImage`] keeps the source encoding next to the decoded bitmap so
//! it can be sent to the generation service without re-encoding. Both buffers
//! are shared, so clones are cheap and history entries never copy pixels.

use crate::domain::editing::ExportQuality;
use crate::error::{Error, Result};
use crate::media::export::{self, ExportFormat};
use image_rs::{imageops::FilterType, RgbaImage};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tiny_skia::{ColorU8, FilterQuality, Pixmap, PixmapPaint, Transform};

/// Immutable decoded image plus its encoded source.
#[derive(Clone)]
pub struct RasterImage {
    encoded: Arc<Vec<u8>>,
    mime: Arc<str>,
    bitmap: Arc<RgbaImage>,
}

impl RasterImage {
    /// Decodes encoded image bytes.
    ///
    /// When `mime` is empty the type is sniffed from the bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] for undecodable data or a zero-sized image.
    pub fn decode(bytes: Vec<u8>, mime: &str) -> Result<Self> {
        let decoded = image_rs::load_from_memory(&bytes)?.to_rgba8();
        if decoded.width() == 0 || decoded.height() == 0 {
            return Err(Error::Decode("image has zero width or height".into()));
        }

        let mime = if mime.trim().is_empty() {
            image_rs::guess_format(&bytes)
                .map(|format| format.to_mime_type())
                .unwrap_or("application/octet-stream")
                .to_string()
        } else {
            mime.trim().to_string()
        };

        tracing::debug!(
            width = decoded.width(),
            height = decoded.height(),
            %mime,
            "decoded raster"
        );

        Ok(Self {
            encoded: Arc::new(bytes),
            mime: Arc::from(mime),
            bitmap: Arc::new(decoded),
        })
    }

    /// Wraps a freshly rendered bitmap, encoding it in `format`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] for a zero-sized bitmap or an encoder error.
    pub fn from_bitmap(bitmap: RgbaImage, format: ExportFormat) -> Result<Self> {
        if bitmap.width() == 0 || bitmap.height() == 0 {
            return Err(Error::Decode("image has zero width or height".into()));
        }
        let encoded = export::encode(&bitmap, format, ExportQuality::default())?;
        Ok(Self {
            encoded: Arc::new(encoded),
            mime: Arc::from(format.mime_type()),
            bitmap: Arc::new(bitmap),
        })
    }

    /// Reads and decodes an image file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or decoded.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let mime = ExportFormat::from_path(path)
            .map(|format| format.mime_type())
            .unwrap_or_default();
        Self::decode(bytes, mime)
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.bitmap.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.bitmap.height()
    }

    /// Natural `(width, height)` in pixels.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.bitmap.dimensions()
    }

    #[must_use]
    pub fn mime(&self) -> &str {
        &self.mime
    }

    /// Source encoding as loaded or rendered.
    #[must_use]
    pub fn encoded_bytes(&self) -> &[u8] {
        &self.encoded
    }

    #[must_use]
    pub fn bitmap(&self) -> &RgbaImage {
        &self.bitmap
    }

    /// Premultiplied drawing surface holding the bitmap.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Surface`] if the surface cannot be allocated.
    pub fn to_pixmap(&self) -> Result<Pixmap> {
        rgba_to_pixmap(&self.bitmap)
    }

    /// Crops a rectangle in natural pixels into a new PNG-encoded raster.
    ///
    /// The rectangle is clamped to the image bounds and never collapses
    /// below one pixel.
    ///
    /// # Errors
    ///
    /// Returns an error if the cropped bitmap cannot be encoded.
    pub fn crop(&self, x: u32, y: u32, width: u32, height: u32) -> Result<Self> {
        let (img_width, img_height) = self.dimensions();
        let x = x.min(img_width.saturating_sub(1));
        let y = y.min(img_height.saturating_sub(1));
        let width = width.min(img_width - x).max(1);
        let height = height.min(img_height - y).max(1);

        let cropped = image_rs::imageops::crop_imm(self.bitmap.as_ref(), x, y, width, height)
            .to_image();
        Self::from_bitmap(cropped, ExportFormat::Png)
    }

    /// Bitmap resampled to exact dimensions (at least 1x1).
    #[must_use]
    pub fn resized(&self, width: u32, height: u32) -> RgbaImage {
        let (width, height) = (width.max(1), height.max(1));
        if (width, height) == self.dimensions() {
            return self.bitmap.as_ref().clone();
        }
        image_rs::imageops::resize(self.bitmap.as_ref(), width, height, FilterType::Triangle)
    }
}

impl PartialEq for RasterImage {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.encoded, &other.encoded) || self.encoded == other.encoded
    }
}

impl fmt::Debug for RasterImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RasterImage")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("mime", &self.mime)
            .field("encoded_len", &self.encoded.len())
            .finish()
    }
}

/// Allocates a transparent surface.
///
/// # Errors
///
/// Returns [`Error::Surface`] for zero or oversized dimensions.
pub fn new_surface(width: u32, height: u32) -> Result<Pixmap> {
    Pixmap::new(width, height).ok_or_else(|| {
        Error::Surface(format!("cannot allocate a {width}x{height} surface"))
    })
}

/// Converts straight-alpha RGBA into a premultiplied surface.
///
/// # Errors
///
/// Returns [`Error::Surface`] if the surface cannot be allocated.
pub fn rgba_to_pixmap(image: &RgbaImage) -> Result<Pixmap> {
    let mut pixmap = new_surface(image.width(), image.height())?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Ok(pixmap)
}

/// Converts a premultiplied surface back to straight-alpha RGBA.
///
/// # Errors
///
/// Returns [`Error::Surface`] if the buffer size does not match.
pub fn pixmap_to_rgba(pixmap: &Pixmap) -> Result<RgbaImage> {
    let mut raw = Vec::with_capacity(pixmap.data().len());
    for pixel in pixmap.pixels() {
        let color = pixel.demultiply();
        raw.extend_from_slice(&[color.red(), color.green(), color.blue(), color.alpha()]);
    }
    RgbaImage::from_raw(pixmap.width(), pixmap.height(), raw)
        .ok_or_else(|| Error::Surface("surface buffer size mismatch".into()))
}

/// Resamples a surface to exact dimensions with bilinear filtering.
///
/// # Errors
///
/// Returns [`Error::Surface`] if the target surface cannot be allocated.
pub fn resample(source: &Pixmap, width: u32, height: u32) -> Result<Pixmap> {
    if source.width() == width && source.height() == height {
        return Ok(source.clone());
    }
    let mut target = new_surface(width, height)?;
    let scale_x = width as f32 / source.width() as f32;
    let scale_y = height as f32 / source.height() as f32;
    target.draw_pixmap(
        0,
        0,
        source.as_ref(),
        &PixmapPaint {
            quality: FilterQuality::Bilinear,
            ..PixmapPaint::default()
        },
        Transform::from_scale(scale_x, scale_y),
        None,
    );
    Ok(target)
}
