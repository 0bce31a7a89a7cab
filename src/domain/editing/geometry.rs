// SPDX-License-Identifier: MPL-2.0
//! Canvas-space geometry shared by the overlays and the mask painter.

/// A pointer position in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Distance to another point.
    #[must_use]
    pub fn distance_to(self, other: Point) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Size of the display canvas the user interacts with.
///
/// The canvas shows the canonical image scaled to fit its container, so its
/// size is generally not the image's natural size. All overlay coordinates
/// (crop box, mask strokes, text drags) live in this space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasSize {
    pub width: f32,
    pub height: f32,
}

impl CanvasSize {
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Canvas matching an image's natural size (1:1 display).
    #[must_use]
    pub fn natural(width: u32, height: u32) -> Self {
        Self::new(width as f32, height as f32)
    }

    /// Largest canvas with the image's aspect ratio that fits in the container.
    ///
    /// Degenerate inputs fall back to the natural size.
    #[must_use]
    pub fn fit_within(
        image_width: u32,
        image_height: u32,
        container_width: f32,
        container_height: f32,
    ) -> Self {
        if image_width == 0
            || image_height == 0
            || container_width <= 0.0
            || container_height <= 0.0
        {
            return Self::natural(image_width, image_height);
        }

        let image_aspect = image_width as f32 / image_height as f32;
        let container_aspect = container_width / container_height;

        if image_aspect > container_aspect {
            Self::new(container_width, container_width / image_aspect)
        } else {
            Self::new(container_height * image_aspect, container_height)
        }
    }

    /// Pixel dimensions of a surface backing this canvas (at least 1x1).
    #[must_use]
    pub fn pixel_dimensions(self) -> (u32, u32) {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let to_px = |v: f32| v.round().max(1.0) as u32;
        (to_px(self.width), to_px(self.height))
    }

    /// Converts a canvas point to percentages of the canvas size.
    #[must_use]
    pub fn to_percent(self, point: Point) -> (f32, f32) {
        (
            point.x / self.width * 100.0,
            point.y / self.height * 100.0,
        )
    }

    /// Converts percentages of the canvas size to a canvas point.
    #[must_use]
    pub fn from_percent(self, x_percent: f32, y_percent: f32) -> Point {
        Point::new(
            x_percent / 100.0 * self.width,
            y_percent / 100.0 * self.height,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_within_wide_image_fills_width() {
        let canvas = CanvasSize::fit_within(2000, 1000, 800.0, 600.0);
        assert_eq!(canvas, CanvasSize::new(800.0, 400.0));
    }

    #[test]
    fn fit_within_tall_image_fills_height() {
        let canvas = CanvasSize::fit_within(1000, 2000, 800.0, 600.0);
        assert_eq!(canvas, CanvasSize::new(300.0, 600.0));
    }

    #[test]
    fn fit_within_degenerate_container_uses_natural_size() {
        let canvas = CanvasSize::fit_within(640, 480, 0.0, 600.0);
        assert_eq!(canvas, CanvasSize::natural(640, 480));
    }

    #[test]
    fn percent_conversion_round_trips_through_canvas() {
        let canvas = CanvasSize::new(800.0, 600.0);
        let (x, y) = canvas.to_percent(Point::new(200.0, 150.0));
        assert_eq!((x, y), (25.0, 25.0));
        assert_eq!(canvas.from_percent(x, y), Point::new(200.0, 150.0));
    }

    #[test]
    fn pixel_dimensions_round_and_never_zero() {
        assert_eq!(CanvasSize::new(99.6, 0.2).pixel_dimensions(), (100, 1));
    }
}
