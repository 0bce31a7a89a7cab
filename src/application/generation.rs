// SPDX-License-Identifier: MPL-2.0
//! Generation operation catalog.
//!
//! Each [`Operation`] knows its preconditions, how to prepare the input
//! images from the canonical raster and mask, and the instruction sent to the
//! model. Preparation is synchronous and never touches the network.

use crate::application::port::generation::{GenerationQuality, GenerationRequest, ImagePayload};
use crate::domain::editing::ExportQuality;
use crate::error::{ActionBlocked, Result};
use crate::media::export::{self, ExportFormat};
use crate::media::mask::{Mask, MaskBitmap};
use crate::media::raster::{new_surface, pixmap_to_rgba, RasterImage};
use tiny_skia::{BlendMode, PixmapPaint, Transform};

/// Scale of the transparent canvas used for expansion.
pub const EXPAND_FACTOR: f32 = 1.5;

/// Instruction used for magic erase.
pub const ERASE_PROMPT: &str = "Remove the object in the masked area";

// =============================================================================
// Presets
// =============================================================================

/// Artistic style presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StylePreset {
    Cinematic,
    Vintage,
    Noir,
    Cyberpunk,
    NeonGlow,
    Dreamy,
    HdrRealism,
    Render3d,
    Cartoon,
    Anime,
    OilPainting,
    Ghibli,
}

impl StylePreset {
    #[must_use]
    pub fn all() -> &'static [StylePreset] {
        &[
            StylePreset::Cinematic,
            StylePreset::Vintage,
            StylePreset::Noir,
            StylePreset::Cyberpunk,
            StylePreset::NeonGlow,
            StylePreset::Dreamy,
            StylePreset::HdrRealism,
            StylePreset::Render3d,
            StylePreset::Cartoon,
            StylePreset::Anime,
            StylePreset::OilPainting,
            StylePreset::Ghibli,
        ]
    }

    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            StylePreset::Cinematic => "cinematic",
            StylePreset::Vintage => "vintage",
            StylePreset::Noir => "noir",
            StylePreset::Cyberpunk => "cyberpunk",
            StylePreset::NeonGlow => "neon-glow",
            StylePreset::Dreamy => "dreamy",
            StylePreset::HdrRealism => "hdr-realism",
            StylePreset::Render3d => "3d-render",
            StylePreset::Cartoon => "cartoon",
            StylePreset::Anime => "anime",
            StylePreset::OilPainting => "oil-painting",
            StylePreset::Ghibli => "ghibli",
        }
    }

    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::all().iter().copied().find(|preset| preset.key() == key)
    }

    fn look(self) -> &'static str {
        match self {
            StylePreset::Cinematic => {
                "a cinematic film still with teal and orange grading, dramatic contrast and a soft vignette"
            }
            StylePreset::Vintage => {
                "a 1970s film photograph with warm faded tones, lowered contrast and fine grain"
            }
            StylePreset::Noir => "high-contrast black and white film noir with deep shadows",
            StylePreset::Cyberpunk => {
                "a cyberpunk scene lit by blue, pink and purple neon with a high-tech edge"
            }
            StylePreset::NeonGlow => "glowing, saturated neon highlights with an electric mood",
            StylePreset::Dreamy => "a soft pastel dream with gentle haze and slightly diffused focus",
            StylePreset::HdrRealism => {
                "a crisp HDR photograph with recovered shadows and highlights and strong local contrast"
            }
            StylePreset::Render3d => "a polished 3D CGI render with smooth surfaces and volumetric light",
            StylePreset::Cartoon => "a cartoon frame with simplified shapes, bold outlines and flat colors",
            StylePreset::Anime => "a Japanese anime illustration with cel shading and painterly backgrounds",
            StylePreset::OilPainting => "a classic oil painting with textured brushstrokes on canvas",
            StylePreset::Ghibli => {
                "a hand-painted animated film frame with a warm palette and a whimsical, nostalgic feel"
            }
        }
    }
}

/// Direction of the new key light for relighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelightDirection {
    Left,
    Right,
    Top,
    Frontal,
}

impl RelightDirection {
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            RelightDirection::Left => "from-left",
            RelightDirection::Right => "from-right",
            RelightDirection::Top => "from-top",
            RelightDirection::Frontal => "frontal",
        }
    }

    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        [
            RelightDirection::Left,
            RelightDirection::Right,
            RelightDirection::Top,
            RelightDirection::Frontal,
        ]
        .into_iter()
        .find(|direction| direction.key() == key)
    }

    fn description(self) -> &'static str {
        match self {
            RelightDirection::Left => "the left side of the frame",
            RelightDirection::Right => "the right side of the frame",
            RelightDirection::Top => "directly above the subject",
            RelightDirection::Frontal => "the front, slightly above the camera, like a soft ring light",
        }
    }
}

/// Strength of the background blur.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthBlurAmount {
    Subtle,
    Medium,
    Strong,
}

impl DepthBlurAmount {
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            DepthBlurAmount::Subtle => "subtle",
            DepthBlurAmount::Medium => "medium",
            DepthBlurAmount::Strong => "strong",
        }
    }

    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        [
            DepthBlurAmount::Subtle,
            DepthBlurAmount::Medium,
            DepthBlurAmount::Strong,
        ]
        .into_iter()
        .find(|amount| amount.key() == key)
    }
}

// =============================================================================
// Operation
// =============================================================================

/// A generation the user can request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Prompted edit: limited to the mask when one exists, otherwise a
    /// full-image edit.
    Inpaint { prompt: String },
    /// Remove whatever the mask covers.
    MagicErase,
    /// Outpaint onto a larger canvas.
    Expand,
    Upscale,
    RemoveBackground,
    Restore,
    Retouch,
    Colorize,
    AutoEnhance,
    Style(StylePreset),
    Relight(RelightDirection),
    /// Repose the subject after the project's pose reference image.
    PoseTransfer,
    DepthBlur(DepthBlurAmount),
}

impl Operation {
    /// Parses a command-line operation name such as `style:noir`.
    ///
    /// `Inpaint` takes its prompt from the caller, so `inpaint` maps to an
    /// empty prompt here.
    #[must_use]
    pub fn parse(name: &str, prompt: Option<&str>) -> Option<Self> {
        let (head, arg) = match name.split_once(':') {
            Some((head, arg)) => (head, Some(arg)),
            None => (name, None),
        };
        match (head, arg) {
            ("inpaint", None) => Some(Operation::Inpaint {
                prompt: prompt.unwrap_or_default().to_string(),
            }),
            ("magic-erase", None) => Some(Operation::MagicErase),
            ("expand", None) => Some(Operation::Expand),
            ("upscale", None) => Some(Operation::Upscale),
            ("remove-bg", None) => Some(Operation::RemoveBackground),
            ("restore", None) => Some(Operation::Restore),
            ("retouch", None) => Some(Operation::Retouch),
            ("colorize", None) => Some(Operation::Colorize),
            ("auto-enhance", None) => Some(Operation::AutoEnhance),
            ("style", Some(key)) => StylePreset::from_key(key).map(Operation::Style),
            ("relight", Some(key)) => RelightDirection::from_key(key).map(Operation::Relight),
            ("pose", None) => Some(Operation::PoseTransfer),
            ("blur", Some(key)) => DepthBlurAmount::from_key(key).map(Operation::DepthBlur),
            _ => None,
        }
    }

    /// Whether the result replaces the whole frame for the given mask.
    #[must_use]
    pub fn is_full_image(&self, mask: &Mask) -> bool {
        match self {
            Operation::Inpaint { .. } => mask.is_empty(),
            Operation::MagicErase => false,
            _ => true,
        }
    }

    /// Operation key sent to the service, e.g. `style-noir`.
    #[must_use]
    pub fn key(&self, mask: &Mask) -> String {
        match self {
            Operation::Inpaint { .. } if mask.is_empty() => "full-edit".to_string(),
            Operation::Inpaint { .. } => "inpaint".to_string(),
            Operation::MagicErase => "magic-erase".to_string(),
            Operation::Expand => "expand".to_string(),
            Operation::Upscale => "upscale".to_string(),
            Operation::RemoveBackground => "remove-bg".to_string(),
            Operation::Restore => "restore".to_string(),
            Operation::Retouch => "retouch".to_string(),
            Operation::Colorize => "colorize".to_string(),
            Operation::AutoEnhance => "auto-enhance".to_string(),
            Operation::Style(preset) => format!("style-{}", preset.key()),
            Operation::Relight(direction) => format!("relight-{}", direction.key()),
            Operation::PoseTransfer => "pose".to_string(),
            Operation::DepthBlur(amount) => format!("blur-{}", amount.key()),
        }
    }

    /// Checks the preconditions that do not depend on project state.
    ///
    /// # Errors
    ///
    /// Returns the blocking condition for a blank prompt, an erase without a
    /// mask or a pose transfer without a reference.
    pub fn check(&self, mask: &Mask, pose_reference: Option<&RasterImage>) -> Result<()> {
        match self {
            Operation::Inpaint { prompt } if prompt.trim().is_empty() => {
                Err(ActionBlocked::EmptyPrompt.into())
            }
            Operation::MagicErase if mask.is_empty() => Err(ActionBlocked::EmptyMask.into()),
            Operation::PoseTransfer if pose_reference.is_none() => {
                Err(ActionBlocked::MissingPoseReference.into())
            }
            _ => Ok(()),
        }
    }

    /// Instruction text for the model.
    #[must_use]
    pub fn instruction(&self, mask: &Mask, quality: GenerationQuality) -> String {
        let preserve = "Keep the subject, details and composition of the original image.";
        match self {
            Operation::Inpaint { prompt } if mask.is_empty() => format!(
                "Edit the whole image as described while keeping it believable and high quality. \
                 Instruction: \"{}\".{}",
                prompt.trim(),
                quality_suffix(quality)
            ),
            Operation::Inpaint { prompt } => inpaint_instruction(prompt.trim(), quality),
            Operation::MagicErase => inpaint_instruction(ERASE_PROMPT, quality),
            Operation::Expand => format!(
                "Fill the transparent border so it extends the photograph seamlessly. Continue the \
                 content, lighting, texture and perspective of the original. Return a fully opaque \
                 image.{}",
                quality_suffix(quality)
            ),
            Operation::Upscale => "Upscale this image to twice its resolution with sharper detail. \
                 Do not add, remove or change any content."
                .to_string(),
            Operation::RemoveBackground => "Remove the background and isolate the subject with \
                 clean edges. The background must be fully transparent."
                .to_string(),
            Operation::Restore => "Restore this old or damaged photograph: repair scratches, \
                 tears and noise, and recover faded detail without changing the content."
                .to_string(),
            Operation::Retouch => "Apply a subtle professional portrait retouch: even out skin, \
                 soften blemishes and brighten eyes while keeping a natural look."
                .to_string(),
            Operation::Colorize => "Colorize this black and white photograph with natural, \
                 historically plausible colors."
                .to_string(),
            Operation::AutoEnhance => "Enhance this photo automatically: balance brightness, \
                 contrast, saturation and sharpness for a vivid but natural result."
                .to_string(),
            Operation::Style(preset) => {
                format!("Restyle this image as {}. {preserve}", preset.look())
            }
            Operation::Relight(direction) => format!(
                "Relight this image realistically with the main light coming from {}. Redraw \
                 highlights and shadows to match. {preserve}",
                direction.description()
            ),
            Operation::PoseTransfer => "Repose the subject of the first image to match the pose \
                 in the second image. Keep the subject's identity, clothing, background and \
                 lighting from the first image."
                .to_string(),
            Operation::DepthBlur(amount) => format!(
                "Keep the main subject sharp and blur the background like a wide-aperture lens. \
                 Blur intensity: {}.",
                amount.key()
            ),
        }
    }
}

fn inpaint_instruction(prompt: &str, quality: GenerationQuality) -> String {
    format!(
        "Fill the transparent area of the image so it blends seamlessly with its surroundings, \
         matching lighting, texture, color and perspective. Return a fully opaque image. \
         Instruction: \"{prompt}\".{}",
        quality_suffix(quality)
    )
}

fn quality_suffix(quality: GenerationQuality) -> &'static str {
    match quality {
        GenerationQuality::Low => " A fast draft-quality result is acceptable.",
        GenerationQuality::Medium => "",
        GenerationQuality::High => " Produce a very high-detail, photorealistic result.",
    }
}

// =============================================================================
// Input preparation
// =============================================================================

/// Project state an operation reads when preparing its request.
#[derive(Debug, Clone, Copy)]
pub struct GenerationInputs<'a> {
    pub base: &'a RasterImage,
    pub mask: &'a Mask,
    pub pose_reference: Option<&'a RasterImage>,
    pub quality: GenerationQuality,
}

/// A checked request plus how its result is composited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedGeneration {
    pub request: GenerationRequest,
    pub full_image: bool,
}

/// Checks preconditions and builds the request for `operation`.
///
/// # Errors
///
/// Returns [`crate::error::Error::Blocked`] when a precondition fails and
/// surface or encoding errors from input preparation.
pub fn prepare(operation: &Operation, inputs: &GenerationInputs<'_>) -> Result<PreparedGeneration> {
    operation.check(inputs.mask, inputs.pose_reference)?;

    let base_payload = || {
        ImagePayload::new(
            inputs.base.encoded_bytes().to_vec(),
            inputs.base.mime().to_string(),
        )
    };

    let images = match (operation, inputs.mask) {
        (Operation::Inpaint { .. } | Operation::MagicErase, Mask::Bitmap(mask)) => {
            vec![png_payload(cut_out_mask(inputs.base, mask)?)]
        }
        (Operation::Expand, _) => vec![png_payload(expand_canvas(inputs.base)?)],
        (Operation::PoseTransfer, _) => {
            let mut images = vec![base_payload()];
            if let Some(reference) = inputs.pose_reference {
                images.push(ImagePayload::new(
                    reference.encoded_bytes().to_vec(),
                    reference.mime().to_string(),
                ));
            }
            images
        }
        _ => vec![base_payload()],
    };

    Ok(PreparedGeneration {
        request: GenerationRequest {
            operation: operation.key(inputs.mask),
            instruction: operation.instruction(inputs.mask, inputs.quality),
            quality: inputs.quality,
            images,
        },
        full_image: operation.is_full_image(inputs.mask),
    })
}

fn png_payload(bytes: Vec<u8>) -> ImagePayload {
    ImagePayload::new(bytes, ExportFormat::Png.mime_type())
}

/// Base image with the masked region made transparent, PNG-encoded.
///
/// # Errors
///
/// Returns an error if a surface cannot be allocated or encoding fails.
pub fn cut_out_mask(base: &RasterImage, mask: &MaskBitmap) -> Result<Vec<u8>> {
    let (width, height) = base.dimensions();
    let mut surface = base.to_pixmap()?;
    let clip = mask.to_pixmap(width, height)?;
    surface.draw_pixmap(
        0,
        0,
        clip.as_ref(),
        &PixmapPaint {
            blend_mode: BlendMode::DestinationOut,
            ..PixmapPaint::default()
        },
        Transform::identity(),
        None,
    );
    export::encode(
        &pixmap_to_rgba(&surface)?,
        ExportFormat::Png,
        ExportQuality::default(),
    )
}

/// Dimensions of the expansion canvas for a base of the given size.
#[must_use]
pub fn expanded_dimensions(width: u32, height: u32) -> (u32, u32) {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let scale = |v: u32| (v as f32 * EXPAND_FACTOR).floor().max(1.0) as u32;
    (scale(width), scale(height))
}

/// Base image centered on a transparent canvas 1.5 times its size.
///
/// The base is placed at one sixth of the canvas size from the top-left.
///
/// # Errors
///
/// Returns an error if a surface cannot be allocated or encoding fails.
pub fn expand_canvas(base: &RasterImage) -> Result<Vec<u8>> {
    let (width, height) = expanded_dimensions(base.width(), base.height());
    let mut surface = new_surface(width, height)?;
    #[allow(clippy::cast_possible_truncation)]
    let (offset_x, offset_y) = (
        (width as f32 / 6.0).round() as i32,
        (height as f32 / 6.0).round() as i32,
    );
    surface.draw_pixmap(
        offset_x,
        offset_y,
        base.to_pixmap()?.as_ref(),
        &PixmapPaint::default(),
        Transform::identity(),
        None,
    );
    export::encode(
        &pixmap_to_rgba(&surface)?,
        ExportFormat::Png,
        ExportQuality::default(),
    )
}
