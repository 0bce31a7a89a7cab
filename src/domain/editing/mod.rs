// SPDX-License-Identifier: MPL-2.0
//! Editing domain types.
//!
//! This module provides pure domain types for image editing operations:
//! - [`AdjustmentValue`]: Warmth/exposure/saturation slider value
//! - [`BrushWidth`]: Mask brush width
//! - [`FontSize`]: Text layer font size
//! - [`ExportQuality`]: Lossy export quality
//! - [`Point`] and [`CanvasSize`]: Display-canvas geometry

pub mod geometry;
pub mod newtypes;

pub use geometry::{CanvasSize, Point};
pub use newtypes::{AdjustmentValue, BrushWidth, ExportQuality, FontSize};
