//! Wheel and touch-pan scroll pipeline.
//!
//! Raw deltas are locked to one axis, optionally smoothed through a
//! minimum-delta accumulator, clamped to the scrollable extent and reported
//! back with a per-axis consumption result so the host can decide whether
//! the event keeps propagating past the grid.

use serde::{Deserialize, Serialize};

use crate::geometry::ViewportGeometry;

/// How a two-axis delta collapses onto a single scroll axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisLock {
    /// The larger magnitude wins; ties go vertical.
    #[default]
    Dominant,
    /// Any horizontal motion locks horizontal.
    HorizontalPreferred,
    /// Any vertical motion locks vertical.
    VerticalPreferred,
}

/// When an unconsumed wheel event is released to outer scroll containers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryRelease {
    /// The grid always keeps wheel events.
    #[default]
    AlwaysRetain,
    /// Release only when nothing was consumed and the viewport sits at its
    /// scroll limit on the locked axis.
    ReleaseAtBoundary,
    /// Release whenever nothing was consumed, boundary or not.
    ReleaseUnconsumed,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WheelSettings {
    pub axis_lock: AxisLock,
    /// Deltas below this magnitude accumulate instead of scrolling.
    /// Zero disables smoothing.
    pub min_delta: f32,
    pub release: BoundaryRelease,
}

impl Default for WheelSettings {
    fn default() -> Self {
        Self {
            axis_lock: AxisLock::Dominant,
            min_delta: 0.0,
            release: BoundaryRelease::AlwaysRetain,
        }
    }
}

/// What happened to one axis of a wheel event.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AxisConsumption {
    /// Scroll distance actually applied.
    pub consumed: f32,
    /// The axis wanted to move further but the viewport was at its limit.
    pub at_boundary: bool,
}

/// Result of feeding one wheel event through the pipeline.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollConsumption {
    /// The event carried a delta the pipeline processed.
    pub handled: bool,
    pub x: AxisConsumption,
    pub y: AxisConsumption,
}

impl ScrollConsumption {
    pub fn scrolled(&self) -> bool {
        self.x.consumed != 0.0 || self.y.consumed != 0.0
    }

    /// Whether the host should let the event propagate past the grid under
    /// the given policy.
    pub fn should_release(&self, policy: BoundaryRelease) -> bool {
        match policy {
            BoundaryRelease::AlwaysRetain => false,
            BoundaryRelease::ReleaseAtBoundary => {
                !self.scrolled() && (self.x.at_boundary || self.y.at_boundary)
            }
            BoundaryRelease::ReleaseUnconsumed => !self.scrolled(),
        }
    }
}

/// Per-axis accumulator below the smoothing threshold. Resets when the
/// incoming delta flips sign.
#[derive(Debug, Default)]
struct DeltaAccumulator {
    pending: f32,
}

impl DeltaAccumulator {
    fn push(&mut self, delta: f32, min_delta: f32) -> f32 {
        if delta == 0.0 {
            return 0.0;
        }
        if self.pending != 0.0 && self.pending.signum() != delta.signum() {
            self.pending = 0.0;
        }
        self.pending += delta;
        if min_delta <= 0.0 || self.pending.abs() >= min_delta {
            std::mem::take(&mut self.pending)
        } else {
            0.0
        }
    }

    fn reset(&mut self) {
        self.pending = 0.0;
    }
}

/// Stateful wheel pipeline. One per grid; survives across events to carry
/// the sub-threshold accumulators.
#[derive(Debug, Default)]
pub struct WheelPipeline {
    pub settings: WheelSettings,
    accum_x: DeltaAccumulator,
    accum_y: DeltaAccumulator,
}

impl WheelPipeline {
    pub fn new(settings: WheelSettings) -> Self {
        Self {
            settings,
            accum_x: DeltaAccumulator::default(),
            accum_y: DeltaAccumulator::default(),
        }
    }

    pub fn reset(&mut self) {
        self.accum_x.reset();
        self.accum_y.reset();
    }

    /// Collapse a raw delta onto the locked axis as `(dx, dy)`.
    fn lock_axes(&self, delta_x: f32, delta_y: f32) -> (f32, f32) {
        match self.settings.axis_lock {
            AxisLock::Dominant => {
                if delta_x.abs() > delta_y.abs() {
                    (delta_x, 0.0)
                } else {
                    (0.0, delta_y)
                }
            }
            AxisLock::HorizontalPreferred => {
                if delta_x != 0.0 {
                    (delta_x, 0.0)
                } else {
                    (0.0, delta_y)
                }
            }
            AxisLock::VerticalPreferred => {
                if delta_y != 0.0 {
                    (0.0, delta_y)
                } else {
                    (delta_x, 0.0)
                }
            }
        }
    }

    /// Feed one wheel event through the pipeline, scrolling `geometry` by
    /// whatever survives axis locking, smoothing and extent clamping.
    pub fn process(
        &mut self,
        geometry: &mut ViewportGeometry,
        delta_x: f32,
        delta_y: f32,
    ) -> ScrollConsumption {
        let handled = delta_x != 0.0 || delta_y != 0.0;
        let (locked_x, locked_y) = self.lock_axes(delta_x, delta_y);

        let want_x = self.accum_x.push(locked_x, self.settings.min_delta);
        let want_y = self.accum_y.push(locked_y, self.settings.min_delta);

        let (got_x, got_y) = geometry.scroll_by(want_x, want_y);
        // Unconsumed remainder means the viewport hit its limit. Deltas that
        // were merely absorbed by the accumulator are not a boundary.
        ScrollConsumption {
            handled,
            x: AxisConsumption {
                consumed: got_x,
                at_boundary: want_x != 0.0 && got_x != want_x,
            },
            y: AxisConsumption {
                consumed: got_y,
                at_boundary: want_y != 0.0 && got_y != want_y,
            },
        }
    }
}
