// SPDX-License-Identifier: MPL-2.0
//! Port definitions (traits) for dependency inversion.
//!
//! This module defines abstract interfaces that infrastructure adapters implement.
//!
//! # Available Ports
//!
//! - [`generation`]: Remote image generation (inpaint, expand, restyle, ...)
//!
//! # Design Notes
//!
//! - Traits are `Send + Sync` so adapters can be shared across tasks
//! - Methods return `Result` with port-specific error types
//! - Async methods go through `async_trait` so the trait stays object safe
//!
//! # Example
//!
//! ```ignore
//! use magic_canvas::application::port::GenerationService;
//!
//! struct Offline;
//!
//! #[async_trait::async_trait]
//! impl GenerationService for Offline { /* ... */ }
//! ```

pub mod generation;

// Re-export main types for convenience
pub use generation::{
    GeneratedImage, GenerationError, GenerationQuality, GenerationRequest, GenerationService,
    ImagePayload,
};
