// SPDX-License-Identifier: MPL-2.0
//! Message routing helpers that keep the project facade slim.

use crate::domain::editing::Point;
use crate::editor::text::TextPress;
use crate::editor::{CanvasMessage, Event, KeyboardMessage, Modifiers, Project, SidebarMessage, Tool};
use crate::error::Result;

impl Project {
    pub(crate) fn handle_sidebar_message(&mut self, message: SidebarMessage) -> Result<Event> {
        match message {
            SidebarMessage::SelectTool(tool) => {
                self.set_tool(tool);
                Ok(Event::None)
            }
            SidebarMessage::SetBrush(brush) => {
                self.set_brush(brush);
                Ok(Event::None)
            }
            SidebarMessage::SetAdjustments(adjustments) => {
                self.set_adjustments(adjustments);
                Ok(Event::None)
            }
            SidebarMessage::ToggleMaskVisibility => {
                self.mask_visible = !self.mask_visible;
                Ok(Event::None)
            }
            SidebarMessage::Undo => Ok(restored(self.undo()?)),
            SidebarMessage::Redo => Ok(restored(self.redo()?)),
            SidebarMessage::Accept => {
                self.accept()?;
                Ok(Event::ImageReplaced)
            }
            SidebarMessage::CancelGeneration => {
                self.cancel_generation();
                Ok(Event::None)
            }
            SidebarMessage::ApplyCrop => {
                self.apply_crop()?;
                Ok(Event::ImageReplaced)
            }
            SidebarMessage::CancelCrop => {
                self.cancel_crop();
                Ok(Event::None)
            }
            SidebarMessage::SelectTextLayer(id) => {
                self.select_text_layer(id.as_deref());
                Ok(Event::None)
            }
            SidebarMessage::UpdateTextLayer { id, update } => {
                self.update_text_layer(&id, update)?;
                Ok(Event::None)
            }
            SidebarMessage::DeleteTextLayer(id) => {
                self.delete_text_layer(&id)?;
                Ok(Event::None)
            }
            SidebarMessage::ApplyText => {
                self.apply_text()?;
                Ok(Event::ImageReplaced)
            }
        }
    }

    pub(crate) fn handle_canvas_message(&mut self, message: CanvasMessage) -> Result<Event> {
        if self.raster.is_none() {
            return Ok(Event::None);
        }
        match message {
            CanvasMessage::PointerPressed { position } => self.pointer_pressed(position),
            CanvasMessage::PointerMoved { position } => {
                self.pointer_moved(position);
                Ok(Event::None)
            }
            CanvasMessage::PointerReleased => self.pointer_released(),
        }
    }

    fn pointer_pressed(&mut self, position: Point) -> Result<Event> {
        match self.tool {
            Tool::Crop => {
                self.crop.press(position);
                Ok(Event::None)
            }
            Tool::Text => match self.text.press(position, self.canvas) {
                TextPress::Created(id) => Ok(Event::TextLayerCreated(id)),
                TextPress::Selected(_) => Ok(Event::None),
            },
            Tool::Eyedropper => Ok(Event::ColorPicked(self.pick_color(position)?)),
            Tool::Inpaint | Tool::MagicErase | Tool::Expand => {
                if self.generated.is_some() {
                    self.compare.press(position, self.canvas);
                } else if self.tool.paints_mask() {
                    let brush = self.brush;
                    if let Some(painter) = self.painter.as_mut() {
                        painter.begin_stroke(position, brush);
                    }
                }
                Ok(Event::None)
            }
        }
    }

    fn pointer_moved(&mut self, position: Point) {
        match self.tool {
            Tool::Crop => self.crop.drag_to(position, self.canvas),
            Tool::Text => self.text.drag_to(position, self.canvas),
            Tool::Eyedropper => {}
            Tool::Inpaint | Tool::MagicErase | Tool::Expand => {
                if self.compare.is_sliding() {
                    self.compare.slide_to(position, self.canvas);
                } else if let Some(painter) = self.painter.as_mut() {
                    painter.continue_stroke(position);
                }
            }
        }
    }

    fn pointer_released(&mut self) -> Result<Event> {
        self.crop.release();
        self.text.release();
        self.compare.release();
        if self.finish_stroke()? {
            Ok(Event::MaskCommitted)
        } else {
            Ok(Event::None)
        }
    }

    pub(crate) fn handle_keyboard_message(&mut self, message: KeyboardMessage) -> Result<Event> {
        match message {
            KeyboardMessage::KeyPressed { key, modifiers } if modifiers.command() => {
                match shortcut(&key, modifiers) {
                    Some(Shortcut::Undo) => Ok(restored(self.undo()?)),
                    Some(Shortcut::Redo) => Ok(restored(self.redo()?)),
                    None => Ok(Event::None),
                }
            }
            KeyboardMessage::KeyPressed { key, .. } if key.eq_ignore_ascii_case("c") => {
                self.compare.hold(self.generated.is_some());
                Ok(Event::None)
            }
            KeyboardMessage::KeyReleased { key } if key.eq_ignore_ascii_case("c") => {
                self.compare.release_hold();
                Ok(Event::None)
            }
            _ => Ok(Event::None),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shortcut {
    Undo,
    Redo,
}

/// Ctrl/Cmd+Z undoes; Ctrl/Cmd+Y and Ctrl/Cmd+Shift+Z redo.
///
/// Letter case is ignored so caps lock does not change the meaning.
fn shortcut(key: &str, modifiers: Modifiers) -> Option<Shortcut> {
    match (key.to_ascii_lowercase().as_str(), modifiers.shift) {
        ("z", false) => Some(Shortcut::Undo),
        ("z", true) | ("y", _) => Some(Shortcut::Redo),
        _ => None,
    }
}

fn restored(changed: bool) -> Event {
    if changed {
        Event::HistoryRestored
    } else {
        Event::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(shift: bool) -> Modifiers {
        Modifiers {
            control: true,
            meta: false,
            shift,
        }
    }

    #[test]
    fn command_z_undoes() {
        assert_eq!(shortcut("z", command(false)), Some(Shortcut::Undo));
    }

    #[test]
    fn command_shift_z_and_command_y_redo() {
        assert_eq!(shortcut("Z", command(true)), Some(Shortcut::Redo));
        assert_eq!(shortcut("y", command(false)), Some(Shortcut::Redo));
    }

    #[test]
    fn meta_counts_as_command() {
        let modifiers = Modifiers {
            meta: true,
            ..Modifiers::default()
        };
        assert!(modifiers.command());
        assert_eq!(shortcut("z", modifiers), Some(Shortcut::Undo));
    }

    #[test]
    fn uppercase_z_without_shift_undoes() {
        assert_eq!(shortcut("Z", command(false)), Some(Shortcut::Undo));
        assert_eq!(shortcut("Y", command(false)), Some(Shortcut::Redo));
    }

    #[test]
    fn other_keys_are_ignored() {
        assert_eq!(shortcut("s", command(false)), None);
    }
}
