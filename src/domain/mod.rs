// SPDX-License-Identifier: MPL-2.0
//! Domain layer - Core editing rules with ZERO external dependencies.
//!
//! This module contains pure value objects and geometry. It has no
//! dependencies on external crates (except `std`) so that it can be
//! tested in isolation.
//!
//! # Modules
//!
//! - [`editing`]: Editing value objects ([`AdjustmentValue`](editing::AdjustmentValue),
//!   [`BrushWidth`](editing::BrushWidth), [`FontSize`](editing::FontSize),
//!   [`ExportQuality`](editing::ExportQuality)) and canvas geometry

pub mod editing;
