// SPDX-License-Identifier: MPL-2.0
//! Generation service port definition.
//!
//! This module defines the [`GenerationService`] trait through which the
//! editor asks an external image model for replacement pixels.
//!
//! # Design Notes
//!
//! - One request per call; implementations never retry
//! - Cancellation of in-flight requests is not supported
//! - The trait is `Send + Sync` so a single client can be shared

use async_trait::async_trait;
use std::fmt;

// =============================================================================
// GenerationError
// =============================================================================

/// Errors that can occur while requesting a generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// No input image was provided.
    NoImage,

    /// The service is not configured (missing endpoint or credentials).
    NotConfigured(String),

    /// The request could not be delivered or timed out.
    Network(String),

    /// The service answered with an error status or message.
    Remote {
        /// HTTP status code, when the transport has one.
        status: Option<u16>,
        /// Message reported by the service.
        message: String,
    },

    /// The service answered but returned no usable image.
    InvalidResponse(String),
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationError::NoImage => write!(f, "No input image was provided"),
            GenerationError::NotConfigured(msg) => {
                write!(f, "Generation service is not configured: {msg}")
            }
            GenerationError::Network(msg) => write!(f, "Generation request failed: {msg}"),
            GenerationError::Remote {
                status: Some(status),
                message,
            } => write!(f, "Generation service error ({status}): {message}"),
            GenerationError::Remote {
                status: None,
                message,
            } => write!(f, "Generation service error: {message}"),
            GenerationError::InvalidResponse(msg) => {
                write!(f, "Invalid generation response: {msg}")
            }
        }
    }
}

impl std::error::Error for GenerationError {}

// =============================================================================
// Request / Response
// =============================================================================

/// Requested fidelity of a generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationQuality {
    Low,
    #[default]
    Medium,
    High,
}

impl GenerationQuality {
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            GenerationQuality::Low => "low",
            GenerationQuality::Medium => "medium",
            GenerationQuality::High => "high",
        }
    }

    /// Parses `low`, `medium` or `high` (case-insensitive).
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_lowercase().as_str() {
            "low" => Some(GenerationQuality::Low),
            "medium" => Some(GenerationQuality::Medium),
            "high" => Some(GenerationQuality::High),
            _ => None,
        }
    }
}

/// One encoded image sent to the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl ImagePayload {
    #[must_use]
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }
}

/// A fully prepared generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Operation key, e.g. `inpaint` or `style-noir`.
    pub operation: String,
    /// Natural-language instruction for the model.
    pub instruction: String,
    pub quality: GenerationQuality,
    /// Input images; the first one is the image being edited.
    pub images: Vec<ImagePayload>,
}

/// Image bytes returned by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub bytes: Vec<u8>,
    /// MIME type reported by the service, if any.
    pub mime_type: Option<String>,
}

// =============================================================================
// GenerationService Trait
// =============================================================================

/// Port for the external image generation model.
///
/// Infrastructure adapters implement this trait over a concrete transport.
///
/// # Example
///
/// ```ignore
/// use magic_canvas::application::port::generation::{GenerationService, GenerationError};
///
/// async fn run(service: &dyn GenerationService, request: GenerationRequest) {
///     match service.request(request).await {
///         Ok(image) => println!("received {} bytes", image.bytes.len()),
///         Err(GenerationError::Network(msg)) => eprintln!("offline: {msg}"),
///         Err(e) => eprintln!("{e}"),
///     }
/// }
/// ```
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Sends one request and waits for the resulting image.
    ///
    /// # Errors
    ///
    /// Returns a [`GenerationError`] if the request cannot be delivered, the
    /// service reports an error, or the response holds no image.
    async fn request(&self, request: GenerationRequest) -> Result<GeneratedImage, GenerationError>;

    /// Short name used in logs.
    fn name(&self) -> &str;
}
