// SPDX-License-Identifier: MPL-2.0
//! Crop tool state and helpers.
//!
//! The crop box lives in canvas space. It exists only while the crop tool is
//! active and is mapped to natural pixels when applied.

use crate::domain::editing::{CanvasSize, Point};
use crate::editor::{Project, Tool};
use crate::error::{ActionBlocked, Result};

/// Smallest crop side in canvas pixels.
pub const MIN_CROP_SIZE: f32 = 20.0;
/// Pointer distance within which a handle is grabbed.
pub const HANDLE_HIT_RADIUS: f32 = 8.0;

/// Crop rectangle in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl CropBox {
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Box covering the whole canvas.
    #[must_use]
    pub fn full(canvas: CanvasSize) -> Self {
        Self::new(0.0, 0.0, canvas.width, canvas.height)
    }

    /// Clamps the box inside the canvas with a minimum side.
    ///
    /// Size is clamped before position so a box pushed past an edge keeps its
    /// size and slides back in.
    #[must_use]
    pub fn clamped(self, canvas: CanvasSize) -> Self {
        let mut clamped = self;
        clamped.width = MIN_CROP_SIZE.max(clamped.width.min(canvas.width - clamped.x));
        clamped.height = MIN_CROP_SIZE.max(clamped.height.min(canvas.height - clamped.y));
        clamped.x = 0.0_f32.max(clamped.x.min(canvas.width - clamped.width));
        clamped.y = 0.0_f32.max(clamped.y.min(canvas.height - clamped.height));
        // A box dragged past the left or top edge may still overhang after the shift.
        clamped.width = MIN_CROP_SIZE.max(clamped.width.min(canvas.width - clamped.x));
        clamped.height = MIN_CROP_SIZE.max(clamped.height.min(canvas.height - clamped.y));
        clamped
    }

    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }

    /// Canvas position of a handle.
    #[must_use]
    pub fn handle_position(&self, handle: CropHandle) -> Point {
        let (left, top) = (self.x, self.y);
        let (right, bottom) = (self.x + self.width, self.y + self.height);
        let (mid_x, mid_y) = (self.x + self.width / 2.0, self.y + self.height / 2.0);
        match handle {
            CropHandle::North => Point::new(mid_x, top),
            CropHandle::South => Point::new(mid_x, bottom),
            CropHandle::East => Point::new(right, mid_y),
            CropHandle::West => Point::new(left, mid_y),
            CropHandle::NorthEast => Point::new(right, top),
            CropHandle::NorthWest => Point::new(left, top),
            CropHandle::SouthEast => Point::new(right, bottom),
            CropHandle::SouthWest => Point::new(left, bottom),
        }
    }

    /// Box rescaled to natural pixels, as `(x, y, width, height)`.
    #[must_use]
    pub fn to_natural(&self, canvas: CanvasSize, natural: (u32, u32)) -> (u32, u32, u32, u32) {
        let scale_x = natural.0 as f32 / canvas.width;
        let scale_y = natural.1 as f32 / canvas.height;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let px = |v: f32| v.round().max(0.0) as u32;
        (
            px(self.x * scale_x),
            px(self.y * scale_y),
            px(self.width * scale_x).max(1),
            px(self.height * scale_y).max(1),
        )
    }
}

/// Position of a resize handle on the crop rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropHandle {
    North,
    South,
    East,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl CropHandle {
    /// Corners first so they win over the adjacent edges.
    const ALL: [CropHandle; 8] = [
        CropHandle::NorthWest,
        CropHandle::NorthEast,
        CropHandle::SouthWest,
        CropHandle::SouthEast,
        CropHandle::North,
        CropHandle::South,
        CropHandle::East,
        CropHandle::West,
    ];

    fn moves_top(self) -> bool {
        matches!(
            self,
            CropHandle::North | CropHandle::NorthEast | CropHandle::NorthWest
        )
    }

    fn moves_bottom(self) -> bool {
        matches!(
            self,
            CropHandle::South | CropHandle::SouthEast | CropHandle::SouthWest
        )
    }

    fn moves_left(self) -> bool {
        matches!(
            self,
            CropHandle::West | CropHandle::NorthWest | CropHandle::SouthWest
        )
    }

    fn moves_right(self) -> bool {
        matches!(
            self,
            CropHandle::East | CropHandle::NorthEast | CropHandle::SouthEast
        )
    }
}

/// Crop drag state for the interactive overlay.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum CropDragState {
    /// No active drag
    #[default]
    Idle,
    /// Pointer captured; `handle` is `None` when translating the whole box.
    Dragging {
        start: Point,
        start_box: CropBox,
        handle: Option<CropHandle>,
    },
}

/// Interactive crop overlay state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CropOverlay {
    crop_box: Option<CropBox>,
    drag: CropDragState,
}

impl CropOverlay {
    /// Shows the overlay, covering the full canvas when no box exists yet.
    pub fn activate(&mut self, canvas: CanvasSize) {
        if self.crop_box.is_none() {
            self.crop_box = Some(CropBox::full(canvas));
        }
    }

    /// Discards the box and any drag in progress.
    pub fn deactivate(&mut self) {
        self.crop_box = None;
        self.drag = CropDragState::Idle;
    }

    #[must_use]
    pub fn crop_box(&self) -> Option<CropBox> {
        self.crop_box
    }

    /// Replaces the box, clamped to the canvas.
    pub fn set_box(&mut self, crop_box: CropBox, canvas: CanvasSize) {
        self.crop_box = Some(crop_box.clamped(canvas));
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, CropDragState::Dragging { .. })
    }

    /// What a press at `point` would grab: `Some(Some(handle))` for a handle,
    /// `Some(None)` for the box interior, `None` for nothing.
    #[must_use]
    pub fn hit_test(&self, point: Point) -> Option<Option<CropHandle>> {
        let crop_box = self.crop_box?;
        if let Some(handle) = CropHandle::ALL
            .into_iter()
            .find(|&handle| crop_box.handle_position(handle).distance_to(point) <= HANDLE_HIT_RADIUS)
        {
            return Some(Some(handle));
        }
        crop_box.contains(point).then_some(None)
    }

    /// Starts a drag if the press hits a handle or the box.
    pub fn press(&mut self, point: Point) -> bool {
        let (Some(start_box), Some(handle)) = (self.crop_box, self.hit_test(point)) else {
            return false;
        };
        self.drag = CropDragState::Dragging {
            start: point,
            start_box,
            handle,
        };
        true
    }

    /// Applies the pointer delta since the press, then clamps.
    pub fn drag_to(&mut self, point: Point, canvas: CanvasSize) {
        let CropDragState::Dragging {
            start,
            start_box,
            handle,
        } = self.drag
        else {
            return;
        };
        let (dx, dy) = (point.x - start.x, point.y - start.y);
        let mut next = start_box;

        match handle {
            None => {
                next.x += dx;
                next.y += dy;
            }
            Some(handle) => {
                if handle.moves_left() {
                    next.x += dx;
                    next.width -= dx;
                }
                if handle.moves_right() {
                    next.width += dx;
                }
                if handle.moves_top() {
                    next.y += dy;
                    next.height -= dy;
                }
                if handle.moves_bottom() {
                    next.height += dy;
                }
            }
        }

        self.crop_box = Some(next.clamped(canvas));
    }

    /// Ends the drag.
    pub fn release(&mut self) {
        self.drag = CropDragState::Idle;
    }
}

impl Project {
    #[must_use]
    pub fn crop_box(&self) -> Option<CropBox> {
        self.crop.crop_box()
    }

    /// Sets the crop box directly (e.g. from numeric input).
    ///
    /// # Errors
    ///
    /// Returns [`ActionBlocked::NoImage`] when nothing is loaded.
    pub fn set_crop_box(&mut self, crop_box: CropBox) -> Result<()> {
        if self.raster.is_none() {
            return Err(ActionBlocked::NoImage.into());
        }
        if self.tool != Tool::Crop {
            self.set_tool(Tool::Crop);
        }
        self.crop.set_box(crop_box, self.canvas);
        Ok(())
    }

    /// Crops the canonical image to the box and adopts the result.
    ///
    /// # Errors
    ///
    /// Returns [`ActionBlocked::NoImage`] or [`ActionBlocked::NoCropBox`]
    /// when unavailable, and encoding errors from the crop.
    pub fn apply_crop(&mut self) -> Result<()> {
        let raster = self.raster.as_ref().ok_or(ActionBlocked::NoImage)?;
        let crop_box = self.crop.crop_box().ok_or(ActionBlocked::NoCropBox)?;

        let (x, y, width, height) = crop_box.to_natural(self.canvas, raster.dimensions());
        let cropped = raster.crop(x, y, width, height)?;
        tracing::info!(x, y, width, height, "crop applied");

        self.crop.deactivate();
        self.adopt_raster(cropped)
    }

    /// Discards the box and returns to the inpaint tool.
    pub fn cancel_crop(&mut self) {
        self.crop.deactivate();
        self.tool = Tool::Inpaint;
    }
}
