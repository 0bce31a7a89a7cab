// SPDX-License-Identifier: MPL-2.0
//! Infrastructure layer adapters.
//!
//! This module contains concrete implementations of the port traits defined in
//! `application::port`.
//!
//! # Available Adapters
//!
//! - [`http`]: Remote generation over JSON/HTTP (implements [`GenerationService`])
//!
//! [`GenerationService`]: crate::application::port::GenerationService

pub mod http;

// Re-export main types for convenience
pub use http::HttpGenerationClient;
