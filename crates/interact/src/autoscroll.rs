//! Edge-triggered auto-scroll for drag gestures.
//!
//! While a pointer-tracking gesture is active and the pointer sits inside an
//! edge zone (or past the viewport), the viewport scrolls a little every
//! frame. Intensity grows monotonically with how deep into the zone the
//! pointer is, up to a per-frame cap.

use serde::{Deserialize, Serialize};

use crate::geometry::{PointerPos, ViewportGeometry};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoScrollSettings {
    /// Depth of the activation zone along each viewport edge.
    pub edge_px: f32,
    /// Scroll distance per frame at full intensity.
    pub max_step_px: f32,
}

impl Default for AutoScrollSettings {
    fn default() -> Self {
        Self {
            edge_px: 24.0,
            max_step_px: 32.0,
        }
    }
}

/// Per-axis drive in [-1, 1]: sign is scroll direction, magnitude is how far
/// into the edge zone the pointer sits.
#[derive(Debug, Default)]
pub struct EdgeScrollState {
    drive_x: f32,
    drive_y: f32,
}

/// Penetration of `value` into the `[low, high]` band's edge zones, mapped
/// to a signed drive.
fn axis_drive(value: f32, low: f32, high: f32, edge_px: f32) -> f32 {
    if edge_px <= 0.0 || high - low < edge_px * 2.0 {
        return 0.0;
    }
    if value < low + edge_px {
        -(((low + edge_px) - value) / edge_px).min(1.0)
    } else if value > high - edge_px {
        ((value - (high - edge_px)) / edge_px).min(1.0)
    } else {
        0.0
    }
}

impl EdgeScrollState {
    /// Re-derive the drive from the current pointer position. The vertical
    /// zone starts below the header; positions past the viewport saturate.
    pub fn update(
        &mut self,
        pos: PointerPos,
        geometry: &ViewportGeometry,
        settings: &AutoScrollSettings,
    ) {
        self.drive_x = axis_drive(pos.x, 0.0, geometry.view_width, settings.edge_px);
        self.drive_y = axis_drive(
            pos.y,
            geometry.header_height,
            geometry.view_height,
            settings.edge_px,
        );
    }

    pub fn is_active(&self) -> bool {
        self.drive_x != 0.0 || self.drive_y != 0.0
    }

    /// Per-frame scroll delta at the current drive.
    pub fn step(&self, settings: &AutoScrollSettings) -> (f32, f32) {
        (
            self.drive_x * settings.max_step_px,
            self.drive_y * settings.max_step_px,
        )
    }

    pub fn reset(&mut self) {
        self.drive_x = 0.0;
        self.drive_y = 0.0;
    }
}
