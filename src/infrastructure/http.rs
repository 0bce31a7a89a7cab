// SPDX-License-Identifier: MPL-2.0
//! JSON/HTTP adapter for the generation port.
//!
//! Wire format:
//!
//! ```text
//! POST {endpoint}
//! { "operation": "...", "instruction": "...", "quality": "medium",
//!   "images": [ { "mime_type": "image/png", "data": "<base64>" } ] }
//!
//! 200 { "image": { "mime_type": "image/png", "data": "<base64>" } }
//!     { "error": "message" }
//! ```

use crate::application::port::generation::{
    GeneratedImage, GenerationError, GenerationQuality, GenerationRequest, GenerationService,
};
use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Longest slice of an error body quoted in messages.
const ERROR_BODY_PREVIEW: usize = 200;

#[derive(Debug, Serialize, Deserialize)]
struct WireImage {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct WireRequest<'a> {
    operation: &'a str,
    instruction: &'a str,
    quality: GenerationQuality,
    images: Vec<WireImage>,
}

#[derive(Debug, Default, Deserialize)]
struct WireResponse {
    #[serde(default)]
    image: Option<WireImage>,
    #[serde(default)]
    error: Option<String>,
}

/// Generation service reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpGenerationClient {
    http_client: reqwest::Client,
    endpoint: String,
    /// Bearer token; kept in memory only.
    api_key: Option<String>,
}

impl HttpGenerationClient {
    /// Creates a client for `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::NotConfigured`] for an empty endpoint and
    /// [`GenerationError::Network`] if the HTTP client cannot be built.
    pub fn new(
        endpoint: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        let endpoint = endpoint.trim();
        if endpoint.is_empty() {
            return Err(GenerationError::NotConfigured(
                "no generation endpoint set".into(),
            ));
        }

        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GenerationError::Network(format!("failed to build HTTP client: {e}")))?;

        debug!(
            endpoint,
            timeout_secs = timeout.as_secs(),
            authenticated = api_key.is_some(),
            "generation client ready"
        );

        Ok(Self {
            http_client,
            endpoint: endpoint.to_string(),
            api_key: api_key.filter(|key| !key.is_empty()),
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn parse_response(
        status: reqwest::StatusCode,
        body: &str,
    ) -> Result<GeneratedImage, GenerationError> {
        let parsed: Option<WireResponse> = serde_json::from_str(body).ok();

        if !status.is_success() {
            let message = parsed
                .and_then(|response| response.error)
                .unwrap_or_else(|| body.chars().take(ERROR_BODY_PREVIEW).collect());
            warn!(%status, "generation service returned an error status");
            return Err(GenerationError::Remote {
                status: Some(status.as_u16()),
                message,
            });
        }

        let response = parsed.ok_or_else(|| {
            GenerationError::InvalidResponse("response body is not valid JSON".into())
        })?;

        if let Some(message) = response.error {
            return Err(GenerationError::Remote {
                status: None,
                message,
            });
        }

        let image = response.image.ok_or_else(|| {
            GenerationError::InvalidResponse("no image was generated".into())
        })?;

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(image.data.as_bytes())
            .map_err(|e| GenerationError::InvalidResponse(format!("invalid base64 image: {e}")))?;
        if bytes.is_empty() {
            return Err(GenerationError::InvalidResponse("image data is empty".into()));
        }

        let mime_type = Some(image.mime_type).filter(|mime| !mime.trim().is_empty());
        Ok(GeneratedImage { bytes, mime_type })
    }
}

#[async_trait]
impl GenerationService for HttpGenerationClient {
    async fn request(&self, request: GenerationRequest) -> Result<GeneratedImage, GenerationError> {
        if request.images.is_empty() {
            return Err(GenerationError::NoImage);
        }

        let engine = base64::engine::general_purpose::STANDARD;
        let body = WireRequest {
            operation: &request.operation,
            instruction: &request.instruction,
            quality: request.quality,
            images: request
                .images
                .iter()
                .map(|image| WireImage {
                    mime_type: image.mime_type.clone(),
                    data: engine.encode(&image.bytes),
                })
                .collect(),
        };

        debug!(
            endpoint = %self.endpoint,
            operation = %request.operation,
            images = request.images.len(),
            "sending generation request"
        );

        let mut builder = self.http_client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.header("Authorization", format!("Bearer {key}"));
        }

        let response = builder
            .send()
            .await
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GenerationError::Network(format!("failed to read response: {e}")))?;

        Self::parse_response(status, &text)
    }

    fn name(&self) -> &str {
        "http"
    }
}
