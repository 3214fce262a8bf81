//! Camera: pan/zoom state and the world↔screen transform.

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

use frames::Point;

use crate::consts::{WHEEL_ZOOM_BASE, WHEEL_ZOOM_NORMALIZER, ZOOM_MAX, ZOOM_MIN};

/// Camera state for pan/zoom on the infinite canvas.
///
/// `pan_x` / `pan_y` are in CSS pixels. `zoom` is a scale factor
/// (1.0 = no zoom), always within [`ZOOM_MIN`]..=[`ZOOM_MAX`].
/// `world_to_screen` is `screen = world * zoom + pan`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub pan_x: f64,
    pub pan_y: f64,
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self { pan_x: 0.0, pan_y: 0.0, zoom: 1.0 }
    }
}

impl Camera {
    /// Convert a screen-space point (CSS pixels) to world coordinates.
    #[must_use]
    pub fn screen_to_world(&self, screen: Point) -> Point {
        Point {
            x: (screen.x - self.pan_x) / self.zoom,
            y: (screen.y - self.pan_y) / self.zoom,
        }
    }

    /// Convert a world-space point to screen coordinates (CSS pixels).
    #[must_use]
    pub fn world_to_screen(&self, world: Point) -> Point {
        Point {
            x: world.x * self.zoom + self.pan_x,
            y: world.y * self.zoom + self.pan_y,
        }
    }

    /// Convert a screen-space distance (pixels) to world-space distance.
    #[must_use]
    pub fn screen_dist_to_world(&self, screen_dist: f64) -> f64 {
        screen_dist / self.zoom
    }

    /// Translate the view by a screen-space delta.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan_x += dx;
        self.pan_y += dy;
    }

    /// Rescale zoom by `factor`, keeping the world point under the screen
    /// point `anchor` visually fixed: `pan' = anchor - (anchor - pan) / zoom * zoom'`.
    /// The resulting zoom is clamped to the allowed range.
    pub fn zoom_at(&mut self, anchor: Point, factor: f64) {
        let new_zoom = (self.zoom * factor).clamp(ZOOM_MIN, ZOOM_MAX);
        self.pan_x = anchor.x - (anchor.x - self.pan_x) / self.zoom * new_zoom;
        self.pan_y = anchor.y - (anchor.y - self.pan_y) / self.zoom * new_zoom;
        self.zoom = new_zoom;
    }
}

/// Zoom factor for a wheel delta: an exponential curve so repeated small
/// deltas compose smoothly. Scroll up (negative delta) zooms in.
#[must_use]
pub fn wheel_zoom_factor(delta_y: f64) -> f64 {
    WHEEL_ZOOM_BASE.powf(-delta_y / WHEEL_ZOOM_NORMALIZER)
}
