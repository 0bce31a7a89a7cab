// SPDX-License-Identifier: MPL-2.0
//! Application layer - Use cases and orchestration.
//!
//! - [`port`]: Trait definitions (interfaces) for dependency inversion
//! - [`generation`]: Generation operation catalog and request preparation
//!
//! # Dependency Rule
//!
//! - Application layer depends on the domain and media layers
//! - Infrastructure layer implements application layer ports
//! - The editor drives application layer services

pub mod generation;
pub mod port;
