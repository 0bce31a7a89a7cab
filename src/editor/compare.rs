// SPDX-License-Identifier: MPL-2.0
//! Before/after comparison of a generated preview.

use crate::domain::editing::{CanvasSize, Point};

/// Slider position after a new result arrives.
pub const DEFAULT_SPLIT_PERCENT: f32 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompareDragState {
    #[default]
    Idle,
    Sliding,
}

/// Split slider plus the hold-to-compare flag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompareOverlay {
    percent: f32,
    drag: CompareDragState,
    holding: bool,
}

impl Default for CompareOverlay {
    fn default() -> Self {
        Self {
            percent: DEFAULT_SPLIT_PERCENT,
            drag: CompareDragState::Idle,
            holding: false,
        }
    }
}

impl CompareOverlay {
    /// Horizontal split position, percent of canvas width.
    #[must_use]
    pub fn percent(&self) -> f32 {
        self.percent
    }

    #[must_use]
    pub fn is_sliding(&self) -> bool {
        self.drag == CompareDragState::Sliding
    }

    /// Whether the original should be shown instead of the preview.
    #[must_use]
    pub fn is_holding(&self) -> bool {
        self.holding
    }

    pub fn set_percent(&mut self, percent: f32) {
        self.percent = percent.clamp(0.0, 100.0);
    }

    pub fn press(&mut self, point: Point, canvas: CanvasSize) {
        self.drag = CompareDragState::Sliding;
        self.slide_to(point, canvas);
    }

    /// Moves the split under the pointer while sliding.
    pub fn slide_to(&mut self, point: Point, canvas: CanvasSize) {
        if self.drag != CompareDragState::Sliding || canvas.width <= 0.0 {
            return;
        }
        self.set_percent(point.x / canvas.width * 100.0);
    }

    pub fn release(&mut self) {
        self.drag = CompareDragState::Idle;
    }

    /// Starts holding; ignored without a preview to compare against.
    pub fn hold(&mut self, has_preview: bool) {
        self.holding = has_preview;
    }

    pub fn release_hold(&mut self) {
        self.holding = false;
    }

    /// Back to the centered split with no drag or hold.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
