// SPDX-License-Identifier: MPL-2.0
//! Application shell around the editing engine.
//!
//! - [`config`]: `settings.toml` persistence
//! - [`paths`]: config directory resolution
//! - [`batch`]: headless runs used by the command-line binary

pub mod batch;
pub mod config;
pub mod paths;

pub use batch::{BatchJob, BatchReport};
