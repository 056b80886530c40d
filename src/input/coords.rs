//! Screen ↔ workspace coordinate conversion.
//!
//! Pointer events arrive in screen units; blocks, connections and the
//! spatial structures live in workspace units. The mapping is a pan offset
//! plus a uniform zoom:
//!
//! ```text
//! workspace = (screen - pan) / zoom
//! screen    = workspace * zoom + pan
//! ```

use kurbo::{Point, Vec2};

use crate::constants::{DEFAULT_ZOOM, MAX_ZOOM, MIN_ZOOM};

/// The view mapping for one workspace surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    /// Pan offset in screen units.
    pub pan: Vec2,
    pub zoom: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: DEFAULT_ZOOM,
        }
    }
}

impl ViewTransform {
    pub fn screen_to_workspace(&self, screen: Point) -> Point {
        ((screen - self.pan).to_vec2() / self.zoom).to_point()
    }

    pub fn workspace_to_screen(&self, workspace: Point) -> Point {
        (workspace.to_vec2() * self.zoom).to_point() + self.pan
    }

    /// Convert a screen-space displacement to workspace units. Pan cancels
    /// out of deltas; only zoom applies.
    pub fn screen_delta_to_workspace(&self, delta: Vec2) -> Vec2 {
        delta / self.zoom
    }

    /// Set the zoom level, clamped to the supported range.
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }
}
