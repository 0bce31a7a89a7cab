// SPDX-License-Identifier: MPL-2.0
//! Editor message/event types.

use crate::domain::editing::Point;
use crate::editor::text::TextLayerUpdate;
use crate::editor::Tool;
use crate::error::Error;
use crate::media::{Adjustments, BrushSettings};

/// Pointer interaction on the canvas, in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CanvasMessage {
    PointerPressed { position: Point },
    PointerMoved { position: Point },
    PointerReleased,
}

/// Modifier keys held during a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub control: bool,
    /// Cmd on macOS.
    pub meta: bool,
    pub shift: bool,
}

impl Modifiers {
    /// Platform command modifier (Ctrl or Cmd).
    #[must_use]
    pub fn command(self) -> bool {
        self.control || self.meta
    }
}

/// Raw keyboard input. `key` is the produced character, e.g. `"z"` or `"Z"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyboardMessage {
    KeyPressed { key: String, modifiers: Modifiers },
    KeyReleased { key: String },
}

/// Side panel and toolbar commands.
#[derive(Debug, Clone, PartialEq)]
pub enum SidebarMessage {
    SelectTool(Tool),
    SetBrush(BrushSettings),
    SetAdjustments(Adjustments),
    ToggleMaskVisibility,
    Undo,
    Redo,
    Accept,
    CancelGeneration,
    ApplyCrop,
    CancelCrop,
    SelectTextLayer(Option<String>),
    UpdateTextLayer { id: String, update: TextLayerUpdate },
    DeleteTextLayer(String),
    ApplyText,
}

/// Messages handled by [`crate::editor::Project::update`].
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Canvas(CanvasMessage),
    Keyboard(KeyboardMessage),
    Sidebar(SidebarMessage),
}

impl From<CanvasMessage> for Message {
    fn from(message: CanvasMessage) -> Self {
        Message::Canvas(message)
    }
}

impl From<KeyboardMessage> for Message {
    fn from(message: KeyboardMessage) -> Self {
        Message::Keyboard(message)
    }
}

impl From<SidebarMessage> for Message {
    fn from(message: SidebarMessage) -> Self {
        Message::Sidebar(message)
    }
}

/// Events propagated to the caller after a message was handled.
#[derive(Debug, Clone)]
pub enum Event {
    None,
    /// A finished stroke changed the mask and was committed to history.
    MaskCommitted,
    /// Undo or redo restored a snapshot.
    HistoryRestored,
    /// The canonical image was replaced (accept, crop or text apply).
    ImageReplaced,
    /// The eyedropper sampled a color, as `#RRGGBB`.
    ColorPicked(String),
    /// A press on empty canvas created a text layer.
    TextLayerCreated(String),
    /// The action could not be performed.
    Failed(Error),
}

impl Event {
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Event::None)
    }
}
