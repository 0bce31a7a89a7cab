// SPDX-License-Identifier: MPL-2.0
//! Export encoding for composited images.
//!
//! This module encodes RGBA bitmaps to the supported export formats
//! (PNG, JPEG, WebP). JPEG and WebP are lossy and honor the requested
//! quality; PNG is lossless and keeps the alpha channel.

use crate::domain::editing::ExportQuality;
use crate::error::{Error, Result};
use image_rs::codecs::jpeg::JpegEncoder;
use image_rs::codecs::png::PngEncoder;
use image_rs::{DynamicImage, ExtendedColorType, ImageEncoder, RgbaImage};
use std::path::Path;

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportFormat {
    /// PNG format (lossless, alpha preserved).
    #[default]
    Png,
    /// JPEG format (lossy, opaque).
    Jpeg,
    /// WebP format (lossy).
    #[serde(rename = "webp")]
    WebP,
}

impl ExportFormat {
    /// Returns the file extension for this format.
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
            ExportFormat::WebP => "webp",
        }
    }

    /// Returns the MIME type for this format.
    #[must_use]
    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg => "image/jpeg",
            ExportFormat::WebP => "image/webp",
        }
    }

    /// Returns a human-readable description.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            ExportFormat::Png => "PNG (Lossless)",
            ExportFormat::Jpeg => "JPEG (Lossy)",
            ExportFormat::WebP => "WebP (Lossy)",
        }
    }

    /// Whether the quality setting affects the output.
    #[must_use]
    pub fn is_lossy(&self) -> bool {
        !matches!(self, ExportFormat::Png)
    }

    /// Whether the output needs an opaque backing fill before compositing.
    ///
    /// Only PNG keeps transparent pixels.
    #[must_use]
    pub fn needs_opaque_background(&self) -> bool {
        self.is_lossy()
    }

    /// Returns all supported formats.
    #[must_use]
    pub fn all() -> &'static [ExportFormat] {
        &[ExportFormat::Png, ExportFormat::Jpeg, ExportFormat::WebP]
    }

    /// Detects format from file extension.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<ExportFormat> {
        match ext.to_lowercase().as_str() {
            "png" => Some(ExportFormat::Png),
            "jpg" | "jpeg" => Some(ExportFormat::Jpeg),
            "webp" => Some(ExportFormat::WebP),
            _ => None,
        }
    }

    /// Detects format from a MIME type such as `image/jpeg`.
    #[must_use]
    pub fn from_mime(mime: &str) -> Option<ExportFormat> {
        match mime.trim().to_lowercase().as_str() {
            "image/png" => Some(ExportFormat::Png),
            "image/jpeg" | "image/jpg" => Some(ExportFormat::Jpeg),
            "image/webp" => Some(ExportFormat::WebP),
            _ => None,
        }
    }

    /// Detects format from file path extension.
    pub fn from_path(path: &Path) -> Option<ExportFormat> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }
}

/// Caller-selected export settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    pub format: ExportFormat,
    /// Output width in pixels, independent of the working resolution.
    pub width: u32,
    /// Output height in pixels, independent of the working resolution.
    pub height: u32,
    /// Lossy quality; ignored for PNG.
    pub quality: ExportQuality,
}

impl ExportOptions {
    #[must_use]
    pub fn new(format: ExportFormat, width: u32, height: u32) -> Self {
        Self {
            format,
            width,
            height,
            quality: ExportQuality::default(),
        }
    }

    #[must_use]
    pub fn with_quality(mut self, quality: ExportQuality) -> Self {
        self.quality = quality;
        self
    }
}

/// An encoded export ready to be written or downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub format: ExportFormat,
}

impl EncodedImage {
    /// Writes the encoded bytes to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, &self.bytes)?;
        Ok(())
    }
}

/// Encodes an RGBA bitmap to the requested format.
///
/// JPEG drops the alpha channel; callers are expected to have composited
/// an opaque background first.
///
/// # Errors
///
/// Returns [`Error::Export`] if the encoder fails or yields no data.
pub fn encode(image: &RgbaImage, format: ExportFormat, quality: ExportQuality) -> Result<Vec<u8>> {
    let (width, height) = image.dimensions();
    let mut bytes = Vec::new();

    match format {
        ExportFormat::Png => {
            PngEncoder::new(&mut bytes)
                .write_image(image.as_raw(), width, height, ExtendedColorType::Rgba8)
                .map_err(|e| Error::Export(format!("PNG encoding failed: {e}")))?;
        }
        ExportFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
            JpegEncoder::new_with_quality(&mut bytes, quality.value())
                .write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)
                .map_err(|e| Error::Export(format!("JPEG encoding failed: {e}")))?;
        }
        ExportFormat::WebP => {
            let encoder = webp::Encoder::from_rgba(image.as_raw(), width, height);
            bytes = encoder.encode(f32::from(quality.value())).to_vec();
        }
    }

    if bytes.is_empty() {
        return Err(Error::Export(format!(
            "{} encoder returned no data",
            format.description()
        )));
    }

    Ok(bytes)
}
