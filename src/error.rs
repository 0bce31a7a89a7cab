// SPDX-License-Identifier: MPL-2.0
use crate::application::port::generation::GenerationError;
use std::fmt;

#[derive(Debug, Clone)]
pub enum Error {
    Io(String),
    Config(String),
    /// Image bytes could not be decoded into a bitmap.
    Decode(String),
    /// A drawing surface could not be allocated.
    Surface(String),
    /// Encoding the final export failed or produced no data.
    Export(String),
    /// The remote generation collaborator failed.
    Generation(GenerationError),
    /// The requested action is not available in the current state.
    Blocked(ActionBlocked),
}

/// Guard conditions that reject an action before any work is done.
///
/// These mirror the states in which an interactive client disables the
/// corresponding control, so they are never retried automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionBlocked {
    /// No canonical image is loaded.
    NoImage,
    /// The action needs a painted mask but the mask is empty.
    EmptyMask,
    /// A generation request is already in flight.
    Busy,
    /// A prompt-driven edit was requested with a blank prompt.
    EmptyPrompt,
    /// Pose transfer was requested without a reference image.
    MissingPoseReference,
    /// Accept was requested without a generated preview.
    NothingToAccept,
    /// Crop apply was requested while no crop box exists.
    NoCropBox,
    /// Text apply was requested with no text layers.
    NoTextLayers,
    /// The referenced text layer does not exist.
    UnknownTextLayer,
}

impl ActionBlocked {
    /// Short machine-readable key, used in logs.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            ActionBlocked::NoImage => "no-image",
            ActionBlocked::EmptyMask => "empty-mask",
            ActionBlocked::Busy => "busy",
            ActionBlocked::EmptyPrompt => "empty-prompt",
            ActionBlocked::MissingPoseReference => "missing-pose-reference",
            ActionBlocked::NothingToAccept => "nothing-to-accept",
            ActionBlocked::NoCropBox => "no-crop-box",
            ActionBlocked::NoTextLayers => "no-text-layers",
            ActionBlocked::UnknownTextLayer => "unknown-text-layer",
        }
    }
}

impl fmt::Display for ActionBlocked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionBlocked::NoImage => write!(f, "No image is loaded"),
            ActionBlocked::EmptyMask => write!(f, "This action requires a painted mask"),
            ActionBlocked::Busy => write!(f, "A generation is already in progress"),
            ActionBlocked::EmptyPrompt => write!(f, "Describe the edit before generating"),
            ActionBlocked::MissingPoseReference => {
                write!(f, "Pose transfer requires a reference image")
            }
            ActionBlocked::NothingToAccept => write!(f, "There is no generated result to accept"),
            ActionBlocked::NoCropBox => write!(f, "No crop area is selected"),
            ActionBlocked::NoTextLayers => write!(f, "There are no text layers to apply"),
            ActionBlocked::UnknownTextLayer => write!(f, "Text layer not found"),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O Error: {}", e),
            Error::Config(e) => write!(f, "Config Error: {}", e),
            Error::Decode(e) => write!(f, "Decode Error: {}", e),
            Error::Surface(e) => write!(f, "Surface Error: {}", e),
            Error::Export(e) => write!(f, "Export Error: {}", e),
            Error::Generation(e) => write!(f, "Generation Error: {}", e),
            Error::Blocked(e) => write!(f, "Action unavailable: {}", e),
        }
    }
}

impl std::error::Error for Error {}

impl From<GenerationError> for Error {
    fn from(err: GenerationError) -> Self {
        Error::Generation(err)
    }
}

impl From<ActionBlocked> for Error {
    fn from(err: ActionBlocked) -> Self {
        Error::Blocked(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<image_rs::ImageError> for Error {
    fn from(err: image_rs::ImageError) -> Self {
        Error::Decode(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
