// SPDX-License-Identifier: MPL-2.0
//! Text overlay: layer creation, selection, dragging, editing and baking.
//!
//! Layer positions are percentages of the canvas so they survive canvas
//! resizes. Applying renders every layer at the image's natural resolution.

use crate::domain::editing::{CanvasSize, FontSize, Point};
use crate::editor::{Project, Tool};
use crate::error::{ActionBlocked, Result};
use crate::media::export::ExportFormat;
use crate::media::raster::{pixmap_to_rgba, RasterImage};
use crate::media::text::{self, FontFamily, TextAlign, TextRun};

/// Content of a freshly created layer.
pub const DEFAULT_TEXT: &str = "New Text";
/// Fill of a freshly created layer.
pub const DEFAULT_COLOR: &str = "#FFFFFF";

/// Estimated glyph advance as a fraction of the font size.
const CHAR_WIDTH_FACTOR: f32 = 0.6;
/// Estimated line height as a fraction of the font size.
const LINE_HEIGHT_FACTOR: f32 = 1.2;

/// A movable text element placed over the image.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLayer {
    pub id: String,
    pub content: String,
    pub family: FontFamily,
    pub size: FontSize,
    /// Any CSS color string.
    pub color: String,
    pub bold: bool,
    pub italic: bool,
    pub align: TextAlign,
    /// Horizontal position, percent of canvas width.
    pub x: f32,
    /// Vertical position, percent of canvas height.
    pub y: f32,
}

impl TextLayer {
    fn new(id: String, x: f32, y: f32) -> Self {
        Self {
            id,
            content: DEFAULT_TEXT.to_string(),
            family: FontFamily::default(),
            size: FontSize::default(),
            color: DEFAULT_COLOR.to_string(),
            bold: false,
            italic: false,
            align: TextAlign::default(),
            x: clamp_percent(x),
            y: clamp_percent(y),
        }
    }

    /// Canvas position of the layer's top-left corner.
    #[must_use]
    pub fn origin(&self, canvas: CanvasSize) -> Point {
        canvas.from_percent(self.x, self.y)
    }

    /// Whether `point` falls inside the estimated layout box.
    #[must_use]
    pub fn hit(&self, point: Point, canvas: CanvasSize) -> bool {
        let origin = self.origin(canvas);
        let size = self.size.as_f32();
        let chars = self.content.chars().count().max(1) as f32;
        let width = CHAR_WIDTH_FACTOR * size * chars;
        let height = LINE_HEIGHT_FACTOR * size;
        point.x >= origin.x
            && point.x <= origin.x + width
            && point.y >= origin.y
            && point.y <= origin.y + height
    }

    fn apply(&mut self, update: TextLayerUpdate) {
        let TextLayerUpdate {
            content,
            family,
            size,
            color,
            bold,
            italic,
            align,
            x,
            y,
        } = update;
        if let Some(content) = content {
            self.content = content;
        }
        if let Some(family) = family {
            self.family = family;
        }
        if let Some(size) = size {
            self.size = FontSize::new(size);
        }
        if let Some(color) = color {
            self.color = color;
        }
        if let Some(bold) = bold {
            self.bold = bold;
        }
        if let Some(italic) = italic {
            self.italic = italic;
        }
        if let Some(align) = align {
            self.align = align;
        }
        if let Some(x) = x {
            self.x = clamp_percent(x);
        }
        if let Some(y) = y {
            self.y = clamp_percent(y);
        }
    }

    /// Run for a surface of `width` x `height` natural pixels.
    ///
    /// The baseline sits one font size below the layer origin.
    pub(crate) fn to_run(&self, width: u32, height: u32) -> TextRun {
        let size = self.size.as_f32();
        TextRun {
            content: self.content.clone(),
            family: self.family,
            size,
            color: self.color.clone(),
            opacity: 1.0,
            bold: self.bold,
            italic: self.italic,
            align: self.align,
            x: self.x / 100.0 * width as f32,
            y: self.y / 100.0 * height as f32 + size,
        }
    }
}

fn clamp_percent(value: f32) -> f32 {
    value.clamp(0.0, 100.0)
}

/// Partial edit of a text layer; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextLayerUpdate {
    pub content: Option<String>,
    pub family: Option<FontFamily>,
    /// Clamped to the valid font size range.
    pub size: Option<u32>,
    pub color: Option<String>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub align: Option<TextAlign>,
    pub x: Option<f32>,
    pub y: Option<f32>,
}

/// Text drag state for the interactive overlay.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TextDragState {
    #[default]
    Idle,
    /// `offset` is the pointer position relative to the layer origin at press time.
    Dragging { id: String, offset: Point },
}

/// Result of a press on the text overlay.
#[derive(Debug, Clone, PartialEq)]
pub enum TextPress {
    /// An existing layer was selected and captured for dragging.
    Selected(String),
    /// A new layer was created at the press position.
    Created(String),
}

/// Text layers in creation order plus selection and drag state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextOverlay {
    layers: Vec<TextLayer>,
    selected: Option<String>,
    drag: TextDragState,
    next_id: u64,
}

impl TextOverlay {
    #[must_use]
    pub fn layers(&self) -> &[TextLayer] {
        &self.layers
    }

    #[must_use]
    pub fn layer(&self, id: &str) -> Option<&TextLayer> {
        self.layers.iter().find(|layer| layer.id == id)
    }

    #[must_use]
    pub fn selected(&self) -> Option<&TextLayer> {
        self.selected.as_deref().and_then(|id| self.layer(id))
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, TextDragState::Dragging { .. })
    }

    /// Adds a default layer at the given percentages and selects it.
    pub fn add(&mut self, x: f32, y: f32) -> String {
        self.next_id += 1;
        let id = format!("text_{}", self.next_id);
        self.layers.push(TextLayer::new(id.clone(), x, y));
        self.selected = Some(id.clone());
        id
    }

    /// Selects a layer, or clears the selection with `None`.
    ///
    /// Unknown ids clear the selection.
    pub fn select(&mut self, id: Option<&str>) {
        self.selected = id
            .filter(|id| self.layer(id).is_some())
            .map(str::to_string);
    }

    /// Applies a partial update.
    ///
    /// # Errors
    ///
    /// Returns [`ActionBlocked::UnknownTextLayer`] for an unknown id.
    pub fn update(&mut self, id: &str, update: TextLayerUpdate) -> Result<()> {
        let layer = self
            .layers
            .iter_mut()
            .find(|layer| layer.id == id)
            .ok_or(ActionBlocked::UnknownTextLayer)?;
        layer.apply(update);
        Ok(())
    }

    /// Removes a layer, clearing the selection if it was selected.
    ///
    /// # Errors
    ///
    /// Returns [`ActionBlocked::UnknownTextLayer`] for an unknown id.
    pub fn delete(&mut self, id: &str) -> Result<()> {
        let before = self.layers.len();
        self.layers.retain(|layer| layer.id != id);
        if self.layers.len() == before {
            return Err(ActionBlocked::UnknownTextLayer.into());
        }
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        }
        if matches!(&self.drag, TextDragState::Dragging { id: dragged, .. } if dragged == id) {
            self.drag = TextDragState::Idle;
        }
        Ok(())
    }

    /// Topmost layer under `point`.
    #[must_use]
    pub fn hit_test(&self, point: Point, canvas: CanvasSize) -> Option<&TextLayer> {
        self.layers
            .iter()
            .rev()
            .find(|layer| layer.hit(point, canvas))
    }

    /// Selects and captures the layer under `point`, or creates a new one.
    pub fn press(&mut self, point: Point, canvas: CanvasSize) -> TextPress {
        if let Some(layer) = self.hit_test(point, canvas) {
            let origin = layer.origin(canvas);
            let id = layer.id.clone();
            self.selected = Some(id.clone());
            self.drag = TextDragState::Dragging {
                id: id.clone(),
                offset: Point::new(point.x - origin.x, point.y - origin.y),
            };
            return TextPress::Selected(id);
        }
        let (x, y) = canvas.to_percent(point);
        TextPress::Created(self.add(x, y))
    }

    /// Moves the captured layer so it keeps its offset to the pointer.
    pub fn drag_to(&mut self, point: Point, canvas: CanvasSize) {
        let TextDragState::Dragging { id, offset } = &self.drag else {
            return;
        };
        let origin = Point::new(point.x - offset.x, point.y - offset.y);
        let (x, y) = canvas.to_percent(origin);
        if let Some(layer) = self.layers.iter_mut().find(|layer| &layer.id == id) {
            layer.x = clamp_percent(x);
            layer.y = clamp_percent(y);
        }
    }

    pub fn release(&mut self) {
        self.drag = TextDragState::Idle;
    }

    /// Removes every layer. Ids keep counting up.
    pub fn clear(&mut self) {
        self.layers.clear();
        self.selected = None;
        self.drag = TextDragState::Idle;
    }
}

impl Project {
    #[must_use]
    pub fn text_layers(&self) -> &[TextLayer] {
        self.text.layers()
    }

    #[must_use]
    pub fn selected_text_layer(&self) -> Option<&TextLayer> {
        self.text.selected()
    }

    /// Adds a default layer at canvas percentages and selects it.
    ///
    /// # Errors
    ///
    /// Returns [`ActionBlocked::NoImage`] when nothing is loaded.
    pub fn add_text_layer(&mut self, x_percent: f32, y_percent: f32) -> Result<String> {
        if self.raster.is_none() {
            return Err(ActionBlocked::NoImage.into());
        }
        Ok(self.text.add(x_percent, y_percent))
    }

    pub fn select_text_layer(&mut self, id: Option<&str>) {
        self.text.select(id);
    }

    /// Applies a partial update to a layer.
    ///
    /// # Errors
    ///
    /// Returns [`ActionBlocked::UnknownTextLayer`] for an unknown id.
    pub fn update_text_layer(&mut self, id: &str, update: TextLayerUpdate) -> Result<()> {
        self.text.update(id, update)
    }

    /// Deletes a layer.
    ///
    /// # Errors
    ///
    /// Returns [`ActionBlocked::UnknownTextLayer`] for an unknown id.
    pub fn delete_text_layer(&mut self, id: &str) -> Result<()> {
        self.text.delete(id)
    }

    /// Renders every layer into the canonical image at natural resolution,
    /// adopts the result and returns to the inpaint tool.
    ///
    /// # Errors
    ///
    /// Returns [`ActionBlocked::NoImage`] or [`ActionBlocked::NoTextLayers`]
    /// when unavailable, and rendering or encoding errors.
    pub fn apply_text(&mut self) -> Result<()> {
        let raster = self.raster.as_ref().ok_or(ActionBlocked::NoImage)?;
        if self.text.layers().is_empty() {
            return Err(ActionBlocked::NoTextLayers.into());
        }

        let (width, height) = raster.dimensions();
        let runs: Vec<TextRun> = self
            .text
            .layers()
            .iter()
            .map(|layer| layer.to_run(width, height))
            .collect();

        let mut surface = raster.to_pixmap()?;
        text::draw(&mut surface, &runs)?;
        let rendered = RasterImage::from_bitmap(pixmap_to_rgba(&surface)?, ExportFormat::Png)?;
        tracing::info!(layers = runs.len(), "text applied");

        self.text.clear();
        self.adopt_raster(rendered)?;
        self.tool = Tool::Inpaint;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas() -> CanvasSize {
        CanvasSize::new(1000.0, 500.0)
    }

    #[test]
    fn add_uses_defaults_and_sequential_ids() {
        let mut overlay = TextOverlay::default();
        let first = overlay.add(10.0, 20.0);
        let second = overlay.add(30.0, 40.0);
        assert_eq!(first, "text_1");
        assert_eq!(second, "text_2");

        let layer = overlay.layer(&first).expect("layer");
        assert_eq!(layer.content, DEFAULT_TEXT);
        assert_eq!(layer.family, FontFamily::Inter);
        assert_eq!(layer.size.value(), 48);
        assert_eq!(layer.color, DEFAULT_COLOR);
        assert_eq!(layer.align, TextAlign::Left);
        assert!(!layer.bold && !layer.italic);
        assert_eq!(overlay.selected().map(|l| l.id.as_str()), Some("text_2"));
    }

    #[test]
    fn update_clamps_font_size() {
        let mut overlay = TextOverlay::default();
        let id = overlay.add(0.0, 0.0);
        overlay
            .update(
                &id,
                TextLayerUpdate {
                    size: Some(500),
                    bold: Some(true),
                    ..TextLayerUpdate::default()
                },
            )
            .expect("update");
        let layer = overlay.layer(&id).expect("layer");
        assert_eq!(layer.size.value(), 128);
        assert!(layer.bold);
        assert_eq!(layer.content, DEFAULT_TEXT);
    }

    #[test]
    fn update_unknown_layer_fails() {
        let mut overlay = TextOverlay::default();
        let result = overlay.update("text_9", TextLayerUpdate::default());
        assert!(result.is_err());
    }

    #[test]
    fn delete_selected_layer_clears_selection_and_keeps_others() {
        let mut overlay = TextOverlay::default();
        let first = overlay.add(10.0, 10.0);
        let second = overlay.add(50.0, 50.0);
        let untouched = overlay.layer(&second).cloned();
        overlay.select(Some(&first));

        overlay.delete(&first).expect("delete");
        assert!(overlay.selected().is_none());
        assert_eq!(overlay.layers().len(), 1);
        assert_eq!(overlay.layer(&second).cloned(), untouched);
    }

    #[test]
    fn press_on_empty_space_creates_layer_at_percentages() {
        let mut overlay = TextOverlay::default();
        let press = overlay.press(Point::new(250.0, 100.0), canvas());
        let TextPress::Created(id) = press else {
            panic!("expected a new layer");
        };
        let layer = overlay.layer(&id).expect("layer");
        assert_eq!((layer.x, layer.y), (25.0, 20.0));
        assert!(!overlay.is_dragging());
    }

    #[test]
    fn press_on_layer_selects_and_drag_keeps_offset() {
        let mut overlay = TextOverlay::default();
        let id = overlay.add(10.0, 10.0);
        overlay.select(None);

        // Origin is (100, 50); press 20px right and 10px below it.
        let press = overlay.press(Point::new(120.0, 60.0), canvas());
        assert_eq!(press, TextPress::Selected(id.clone()));
        assert!(overlay.is_dragging());

        overlay.drag_to(Point::new(520.0, 260.0), canvas());
        let layer = overlay.layer(&id).expect("layer");
        assert_eq!((layer.x, layer.y), (50.0, 50.0));

        overlay.release();
        assert!(!overlay.is_dragging());
    }

    #[test]
    fn hit_box_uses_estimated_glyph_metrics() {
        let mut overlay = TextOverlay::default();
        let id = overlay.add(0.0, 0.0);
        // "New Text" is 8 chars at 48px: 230.4 x 57.6.
        let layer = overlay.layer(&id).expect("layer");
        assert!(layer.hit(Point::new(230.0, 57.0), canvas()));
        assert!(!layer.hit(Point::new(231.0, 10.0), canvas()));
        assert!(!layer.hit(Point::new(10.0, 58.0), canvas()));
    }

    #[test]
    fn drag_is_clamped_to_canvas() {
        let mut overlay = TextOverlay::default();
        let id = overlay.add(10.0, 10.0);
        overlay.press(Point::new(105.0, 55.0), canvas());
        overlay.drag_to(Point::new(-500.0, 9000.0), canvas());
        let layer = overlay.layer(&id).expect("layer");
        assert_eq!((layer.x, layer.y), (0.0, 100.0));
    }

    #[test]
    fn run_is_anchored_one_font_size_below_origin() {
        let layer = TextLayer::new("text_1".into(), 50.0, 25.0);
        let run = layer.to_run(800, 400);
        assert_eq!(run.x, 400.0);
        assert_eq!(run.y, 148.0);
    }
}
