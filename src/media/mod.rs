// SPDX-License-Identifier: MPL-2.0
//! Pixel-level building blocks: rasters, masks, adjustments, compositing,
//! text rasterization and export encoding.
//!
//! Everything here is synchronous and free of project state; the editor
//! drives these functions and owns the results.

pub mod adjustment;
pub mod compositor;
pub mod export;
pub mod mask;
pub mod raster;
pub mod text;

// Re-export commonly used types
pub use adjustment::Adjustments;
pub use compositor::{GeneratedResult, Layers};
pub use export::{EncodedImage, ExportFormat, ExportOptions};
pub use mask::{BrushMode, BrushSettings, Mask, MaskBitmap, MaskPainter};
pub use raster::RasterImage;
pub use text::{FontFamily, TextAlign};
