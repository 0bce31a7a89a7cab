// SPDX-License-Identifier: MPL-2.0
//! `magic_canvas` is the compositing and history engine of a generative photo
//! editor.
//!
//! It authors masks, layers a generated result over the original image with
//! color adjustments, keeps a linear undo/redo history of image states, drives
//! crop, text and compare overlays, and renders the final export. Image
//! synthesis itself is delegated to a remote service behind the
//! [`application::port::GenerationService`] trait.

#![doc(html_root_url = "https://docs.rs/magic_canvas/0.1.0")]

pub mod app;
pub mod application;
pub mod domain;
pub mod editor;
pub mod error;
pub mod infrastructure;
pub mod media;
