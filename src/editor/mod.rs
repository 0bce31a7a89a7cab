// SPDX-License-Identifier: MPL-2.0
//! Editing project: canonical image, mask, preview, overlays and history.
//!
//! A [`Project`] is one explicit state value. Every operation mutates it in
//! place and the canonical raster only changes through [`Project::load_image`]
//! or by adopting a rendered result (accept, crop, text), each of which
//! commits one history entry.

use crate::domain::editing::{CanvasSize, Point};
use crate::error::{ActionBlocked, Error, Result};
use crate::media::compositor::{self, Layers};
use crate::media::{
    Adjustments, BrushSettings, EncodedImage, ExportOptions, Mask, MaskPainter, RasterImage,
};
use tiny_skia::{Pixmap, PixmapPaint, Transform};

pub mod compare;
pub mod crop;
pub mod generation;
pub mod history;
mod messages;
mod routing;
pub mod text;

pub use compare::CompareOverlay;
pub use crop::{CropBox, CropHandle, CropOverlay};
pub use generation::{GenerationOutcome, GenerationTicket};
pub use history::{History, HistoryEntry};
pub use messages::{
    CanvasMessage, Event, KeyboardMessage, Message, Modifiers, SidebarMessage,
};
pub use text::{TextLayer, TextLayerUpdate, TextOverlay};

/// Opacity of the mask overlay in previews.
const MASK_PREVIEW_OPACITY: f32 = 0.5;

/// Color reported by the eyedropper before anything was picked.
pub const DEFAULT_PICKED_COLOR: &str = "#FFFFFF";

/// Active canvas tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    #[default]
    Inpaint,
    MagicErase,
    Expand,
    Crop,
    Eyedropper,
    Text,
}

impl Tool {
    /// Whether pointer drags paint the mask with this tool.
    #[must_use]
    pub fn paints_mask(self) -> bool {
        matches!(self, Tool::Inpaint | Tool::MagicErase)
    }
}

/// State of one editing session.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug)]
pub struct Project {
    raster: Option<RasterImage>,
    mask: Mask,
    /// Canvas-sized surface backing `mask`; present while an image is loaded.
    painter: Option<MaskPainter>,
    generated: Option<compositor::GeneratedResult>,
    adjustments: Adjustments,
    history: History<HistoryEntry>,
    tool: Tool,
    brush: BrushSettings,
    canvas: CanvasSize,
    /// Container the canvas is fitted into, if any.
    container: Option<(f32, f32)>,
    crop: CropOverlay,
    text: TextOverlay,
    compare: CompareOverlay,
    mask_visible: bool,
    picked_color: String,
    pose_reference: Option<RasterImage>,
    busy: bool,
    epoch: u64,
}

impl Default for Project {
    fn default() -> Self {
        Self {
            raster: None,
            mask: Mask::Empty,
            painter: None,
            generated: None,
            adjustments: Adjustments::default(),
            history: History::new(),
            tool: Tool::default(),
            brush: BrushSettings::default(),
            canvas: CanvasSize::new(0.0, 0.0),
            container: None,
            crop: CropOverlay::default(),
            text: TextOverlay::default(),
            compare: CompareOverlay::default(),
            mask_visible: true,
            picked_color: DEFAULT_PICKED_COLOR.to_string(),
            pose_reference: None,
            busy: false,
            epoch: 0,
        }
    }
}

impl Project {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the state and emit an [`Event`] for the caller.
    ///
    /// Failures are reported as [`Event::Failed`] rather than returned.
    pub fn update(&mut self, message: Message) -> Event {
        let result = match message {
            Message::Canvas(msg) => self.handle_canvas_message(msg),
            Message::Keyboard(msg) => self.handle_keyboard_message(msg),
            Message::Sidebar(msg) => self.handle_sidebar_message(msg),
        };
        result.unwrap_or_else(|err| {
            tracing::warn!(error = %err, "action failed");
            Event::Failed(err)
        })
    }

    // ---------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------

    #[must_use]
    pub fn raster(&self) -> Option<&RasterImage> {
        self.raster.as_ref()
    }

    #[must_use]
    pub fn mask(&self) -> &Mask {
        &self.mask
    }

    #[must_use]
    pub fn adjustments(&self) -> Adjustments {
        self.adjustments
    }

    #[must_use]
    pub fn tool(&self) -> Tool {
        self.tool
    }

    #[must_use]
    pub fn brush(&self) -> BrushSettings {
        self.brush
    }

    #[must_use]
    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    #[must_use]
    pub fn compare(&self) -> &CompareOverlay {
        &self.compare
    }

    #[must_use]
    pub fn is_mask_visible(&self) -> bool {
        self.mask_visible
    }

    pub fn set_mask_visible(&mut self, visible: bool) {
        self.mask_visible = visible;
    }

    /// Last eyedropper sample as `#RRGGBB`.
    #[must_use]
    pub fn picked_color(&self) -> &str {
        &self.picked_color
    }

    // ---------------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------------

    /// Starts a new session on `raster` with a fresh history.
    ///
    /// Any in-flight generation becomes stale.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Surface`] if the mask surface cannot be allocated.
    pub fn load_image(&mut self, raster: RasterImage) -> Result<()> {
        self.history.reset();
        tracing::info!(
            width = raster.width(),
            height = raster.height(),
            mime = raster.mime(),
            "image loaded"
        );
        self.adopt_raster(raster)
    }

    /// Drops the image and every piece of session state.
    ///
    /// The container fit and the brush survive; in-flight generations
    /// become stale.
    pub fn new_project(&mut self) {
        let epoch = self.epoch + 1;
        let container = self.container;
        let brush = self.brush;
        *self = Self {
            epoch,
            container,
            brush,
            ..Self::default()
        };
        tracing::info!(epoch, "new project");
    }

    /// Replaces the canonical image with a rendered result and commits it.
    ///
    /// Preview, mask, adjustments, overlays and tool reset as for a fresh
    /// image. History is kept. Any in-flight generation becomes stale.
    pub(crate) fn adopt_raster(&mut self, raster: RasterImage) -> Result<()> {
        self.invalidate_generation();
        self.raster = Some(raster);
        self.mask = Mask::Empty;
        self.generated = None;
        self.adjustments.reset();
        self.text.clear();
        self.crop.deactivate();
        self.compare.reset();
        self.tool = Tool::Inpaint;
        self.reset_canvas()?;
        self.commit_snapshot();
        Ok(())
    }

    /// Recomputes the canvas for the current image and container, and
    /// rebuilds the mask surface at that size.
    pub(crate) fn reset_canvas(&mut self) -> Result<()> {
        let Some(raster) = self.raster.as_ref() else {
            self.painter = None;
            return Ok(());
        };
        let (width, height) = raster.dimensions();
        self.canvas = match self.container {
            Some((container_width, container_height)) => {
                CanvasSize::fit_within(width, height, container_width, container_height)
            }
            None => CanvasSize::natural(width, height),
        };

        let (surface_width, surface_height) = self.canvas.pixel_dimensions();
        let mut painter = MaskPainter::new(surface_width, surface_height)?;
        painter.load(&self.mask)?;
        self.painter = Some(painter);

        if self.crop.crop_box().is_some() {
            self.crop.deactivate();
            self.crop.activate(self.canvas);
        }
        tracing::debug!(
            canvas_width = self.canvas.width,
            canvas_height = self.canvas.height,
            "canvas reset"
        );
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Tools and settings
    // ---------------------------------------------------------------------

    /// Switches tools. Entering crop shows a full-canvas box; leaving it
    /// discards the box.
    pub fn set_tool(&mut self, tool: Tool) {
        if self.tool == tool {
            return;
        }
        if self.tool == Tool::Crop {
            self.crop.deactivate();
        }
        self.crop.release();
        self.text.release();
        if tool == Tool::Crop && self.raster.is_some() {
            self.crop.activate(self.canvas);
        }
        tracing::debug!(from = ?self.tool, to = ?tool, "tool changed");
        self.tool = tool;
    }

    pub fn set_brush(&mut self, brush: BrushSettings) {
        self.brush = brush;
    }

    /// Live adjustments for the preview; they are baked on accept.
    pub fn set_adjustments(&mut self, adjustments: Adjustments) {
        self.adjustments = adjustments;
    }

    /// Fits the canvas into a container of the given size.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Surface`] if the mask surface cannot be rebuilt.
    pub fn fit_canvas(&mut self, container_width: f32, container_height: f32) -> Result<()> {
        self.container = Some((container_width, container_height));
        self.reset_canvas()
    }

    // ---------------------------------------------------------------------
    // Mask
    // ---------------------------------------------------------------------

    /// Ends the active stroke and commits the mask if it changed.
    ///
    /// Returns whether a history entry was committed.
    pub(crate) fn finish_stroke(&mut self) -> Result<bool> {
        let Some(painter) = self.painter.as_mut() else {
            return Ok(false);
        };
        if !painter.is_stroking() {
            return Ok(false);
        }
        let mask = painter.end_stroke()?;
        if mask == self.mask {
            tracing::trace!("stroke left the mask unchanged");
            return Ok(false);
        }
        self.mask = mask;
        self.commit_snapshot();
        Ok(true)
    }

    /// Replaces the mask directly, e.g. with one loaded from disk.
    ///
    /// Commits a history entry when the mask changes.
    ///
    /// # Errors
    ///
    /// Returns [`ActionBlocked::NoImage`] when nothing is loaded and decode
    /// errors from the painter.
    pub fn set_mask(&mut self, mask: Mask) -> Result<()> {
        let painter = self.painter.as_mut().ok_or(ActionBlocked::NoImage)?;
        painter.load(&mask)?;
        let normalized = painter.snapshot()?;
        if normalized == self.mask {
            return Ok(());
        }
        self.mask = normalized;
        self.commit_snapshot();
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Eyedropper
    // ---------------------------------------------------------------------

    /// Samples the canonical image under a canvas point.
    ///
    /// # Errors
    ///
    /// Returns [`ActionBlocked::NoImage`] when nothing is loaded.
    pub fn pick_color(&mut self, point: Point) -> Result<String> {
        let raster = self.raster.as_ref().ok_or(ActionBlocked::NoImage)?;
        let (width, height) = raster.dimensions();
        let (x_percent, y_percent) = self.canvas.to_percent(point);
        let to_pixel = |percent: f32, size: u32| {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let value = (percent / 100.0 * size as f32).floor().max(0.0) as u32;
            value.min(size - 1)
        };
        let pixel = raster
            .bitmap()
            .get_pixel(to_pixel(x_percent, width), to_pixel(y_percent, height));
        let color = format!("#{:02X}{:02X}{:02X}", pixel[0], pixel[1], pixel[2]);
        self.picked_color.clone_from(&color);
        Ok(color)
    }

    // ---------------------------------------------------------------------
    // Rendering
    // ---------------------------------------------------------------------

    fn layers(&self) -> Option<Layers<'_>> {
        self.raster.as_ref().map(|raster| {
            Layers::new(raster, &self.mask)
                .with_generated(self.generated.as_ref())
                .with_adjustments(self.adjustments)
        })
    }

    /// Renders what the canvas shows at canvas size.
    ///
    /// With a preview, the slider splits the result from the original, or
    /// the original alone while compare is held. Without one, the mask is
    /// drawn translucent when visible. Text layers are drawn on top.
    ///
    /// # Errors
    ///
    /// Returns [`ActionBlocked::NoImage`] when nothing is loaded and surface
    /// errors.
    pub fn render_preview(&self) -> Result<Pixmap> {
        let layers = self.layers().ok_or(ActionBlocked::NoImage)?;
        let (width, height) = self.canvas.pixel_dimensions();
        let original = Layers::new(layers.base, layers.mask);

        let mut surface = if layers.generated.is_none() {
            let mut surface = compositor::compose(&original, width, height, None)?;
            if let (true, Mask::Bitmap(mask)) = (self.mask_visible, &self.mask) {
                let overlay = mask.to_pixmap(width, height)?;
                surface.draw_pixmap(
                    0,
                    0,
                    overlay.as_ref(),
                    &PixmapPaint {
                        opacity: MASK_PREVIEW_OPACITY,
                        ..PixmapPaint::default()
                    },
                    Transform::identity(),
                    None,
                );
            }
            surface
        } else if self.compare.is_holding() {
            compositor::compose(&original, width, height, None)?
        } else {
            let before = compositor::compose(&original, width, height, None)?;
            let after = compositor::compose(&layers, width, height, None)?;
            compositor::compose_split(&before, &after, self.compare.percent())?
        };

        let runs: Vec<_> = self
            .text
            .layers()
            .iter()
            .map(|layer| layer.to_run(width, height))
            .collect();
        if !runs.is_empty() {
            crate::media::text::draw(&mut surface, &runs)?;
        }
        Ok(surface)
    }

    /// Natural size of the export before any resize: the preview's size
    /// when one exists, otherwise the canonical image's.
    #[must_use]
    pub fn export_dimensions(&self) -> Option<(u32, u32)> {
        self.layers().map(|layers| layers.working_dimensions())
    }

    /// Renders and encodes the current composite with the attribution stamp.
    ///
    /// # Errors
    ///
    /// Returns [`ActionBlocked::NoImage`] when nothing is loaded,
    /// [`Error::Surface`] for invalid dimensions and [`Error::Export`] when
    /// encoding fails.
    pub fn export(&self, options: &ExportOptions) -> Result<EncodedImage> {
        let layers = self.layers().ok_or(ActionBlocked::NoImage)?;
        if options.width == 0 || options.height == 0 {
            return Err(Error::Surface(format!(
                "cannot export at {}x{}",
                options.width, options.height
            )));
        }
        compositor::export(&layers, options)
    }
}

#[cfg(test)]
mod tests;
