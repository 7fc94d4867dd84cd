//! Pointer interaction controller.
//!
//! Routes raw pointer, wheel and key events into gesture sessions and engine
//! mutations:
//!
//! - Press routing: header grip -> resize, fill handle -> fill drag,
//!   selection edge or modified press inside the selection -> range move,
//!   plain cell press -> drag select
//! - Preview recomputation, synchronous or coalesced to one per frame
//! - Finalize on pointer up (apply), cancel on pointer-cancel/blur/Escape
//! - Edge auto-scroll and copy-flash countdown driven from `on_frame`

use serde::{Deserialize, Serialize};
use weft_engine::column::Column;
use weft_engine::coords::{CellCoord, GridRange};
use weft_engine::row::GridRow;
use weft_engine::state::GridState;

use crate::autoscroll::{AutoScrollSettings, EdgeScrollState};
use crate::frame::FrameScheduler;
use crate::geometry::{HitTarget, PointerPos, ViewportGeometry};
use crate::session::{SelectionSnapshot, Session};
use crate::wheel::{ScrollConsumption, WheelPipeline, WheelSettings};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub alt: bool,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
}

impl Modifiers {
    /// Any of the modifiers that turn a press inside the selection into a
    /// range move.
    pub fn range_move(&self) -> bool {
        self.alt || self.ctrl || self.meta
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    pub pos: PointerPos,
    pub button: PointerButton,
    pub modifiers: Modifiers,
}

impl PointerEvent {
    pub fn primary(x: f32, y: f32) -> Self {
        Self {
            pos: PointerPos::new(x, y),
            button: PointerButton::Primary,
            modifiers: Modifiers::default(),
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// When preview ranges are recomputed during a drag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreviewMode {
    /// At most one recomputation per display refresh.
    #[default]
    FrameBatched,
    /// Recompute on every pointer move.
    Synchronous,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractSettings {
    pub preview: PreviewMode,
    pub wheel: WheelSettings,
    pub autoscroll: AutoScrollSettings,
}

/// Interaction state for one grid view. Owns the viewport geometry and the
/// gesture session; the engine state is passed into each event handler so
/// the host keeps ownership of its data.
pub struct GridInteraction {
    pub geometry: ViewportGeometry,
    settings: InteractSettings,
    session: Session,
    wheel: WheelPipeline,
    autoscroll: EdgeScrollState,
    /// The pointer moved (or the viewport scrolled under it) since the last
    /// preview recompute.
    preview_dirty: bool,
    frame_requested: bool,
}

impl GridInteraction {
    pub fn new(geometry: ViewportGeometry, settings: InteractSettings) -> Self {
        Self {
            geometry,
            wheel: WheelPipeline::new(settings.wheel),
            settings,
            session: Session::Idle,
            autoscroll: EdgeScrollState::default(),
            preview_dirty: false,
            frame_requested: false,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn fill_preview(&self) -> Option<GridRange> {
        self.session.fill_preview()
    }

    pub fn move_preview(&self) -> Option<GridRange> {
        self.session.move_preview()
    }

    pub fn in_fill_preview(&self, coord: CellCoord) -> bool {
        self.fill_preview().is_some_and(|range| range.contains(coord))
    }

    pub fn in_move_preview(&self, coord: CellCoord) -> bool {
        self.move_preview().is_some_and(|range| range.contains(coord))
    }

    /// Rebuild pixel metrics from the grid's current columns and row count.
    /// Hosts call this after any mutation that can change layout.
    pub fn sync_layout<R: GridRow>(&mut self, state: &GridState<R>) {
        let widths: Vec<f32> = state.columns.iter().map(|c| c.width).collect();
        self.geometry.set_column_widths(&widths);
        self.geometry.set_row_count(state.row_count());
    }

    pub fn ensure_cell_visible(&mut self, coord: CellCoord) {
        self.geometry.ensure_visible(coord);
    }

    fn request_frame(&mut self, scheduler: &mut dyn FrameScheduler) {
        if !self.frame_requested {
            self.frame_requested = true;
            scheduler.request_frame();
        }
    }

    /// Route a pointer press. Any still-active gesture is cancelled first;
    /// a missed pointer-up must not leave a stale preview to commit.
    pub fn on_pointer_down<R: GridRow>(
        &mut self,
        state: &mut GridState<R>,
        event: &PointerEvent,
    ) -> bool {
        if self.session.is_active() {
            self.finalize(state, false);
        }
        if event.button != PointerButton::Primary {
            return false;
        }

        match self.geometry.hit_test(event.pos) {
            HitTarget::HeaderResize(column) => {
                let Some(col) = state.columns.get(column) else {
                    return false;
                };
                self.session = Session::ColumnResize {
                    column,
                    start_width: col.width,
                    start_x: event.pos.x,
                };
                true
            }
            HitTarget::Header(_) => false,
            HitTarget::Cell(coord) => self.press_cell(state, event, coord),
            HitTarget::Outside => false,
        }
    }

    fn press_cell<R: GridRow>(
        &mut self,
        state: &mut GridState<R>,
        event: &PointerEvent,
        coord: CellCoord,
    ) -> bool {
        // The fill handle wins over the edge band it overlaps.
        if let Some(range) = state.target_range() {
            let on_handle = self
                .geometry
                .fill_handle_rect(range)
                .is_some_and(|rect| rect.contains(event.pos));
            if on_handle {
                self.session = Session::FillDrag {
                    base: range,
                    pointer: event.pos,
                    preview: range,
                };
                return true;
            }
            let grab_edge = self.geometry.on_range_edge(range, event.pos);
            let grab_inside = event.modifiers.range_move() && range.contains(coord);
            if grab_edge || grab_inside {
                self.session = Session::RangeMove {
                    base: range,
                    grab: coord,
                    pointer: event.pos,
                    preview: range,
                };
                return true;
            }
        }

        if state
            .column_at(coord.col)
            .is_none_or(|col| !col.selectable)
        {
            return false;
        }

        if event.modifiers.range_move() {
            // Modified press outside the selection just moves the active
            // cell; no drag session starts.
            state.set_active_cell(coord.row as isize, coord.col as isize);
            return true;
        }

        let prior = SelectionSnapshot {
            active: state.active_cell(),
            anchor: state.selection_anchor(),
            focus: state.selection_focus(),
        };
        let anchor = if event.modifiers.shift {
            // Shift extends from the existing anchor, or from the cursor
            // when only an active cell exists.
            state
                .selection_anchor()
                .or(state.active_cell())
                .unwrap_or(coord)
        } else {
            coord
        };
        if event.modifiers.shift {
            state.select_range(anchor, coord);
        } else {
            state.set_active_cell(coord.row as isize, coord.col as isize);
        }
        self.session = Session::DragSelect {
            anchor,
            pointer: event.pos,
            prior,
        };
        true
    }

    /// Track pointer motion. Column resize applies immediately; tracking
    /// gestures store the position and recompute their preview either now
    /// or on the next frame, per settings.
    pub fn on_pointer_move<R: GridRow>(
        &mut self,
        state: &mut GridState<R>,
        pos: PointerPos,
        scheduler: &mut dyn FrameScheduler,
    ) -> bool {
        if let Session::ColumnResize {
            column,
            start_width,
            start_x,
        } = self.session
        {
            let width = (start_width + (pos.x - start_x)).max(Column::MIN_WIDTH);
            if let Some(col) = state.columns.get_mut(column) {
                col.width = width;
            }
            self.sync_layout(state);
            return true;
        }
        if !self.session.tracks_pointer() {
            return false;
        }

        self.session = std::mem::take(&mut self.session).with_pointer(pos);
        self.autoscroll
            .update(pos, &self.geometry, &self.settings.autoscroll);

        match self.settings.preview {
            PreviewMode::Synchronous => self.recompute_preview(state),
            PreviewMode::FrameBatched => self.preview_dirty = true,
        }
        if self.preview_dirty || self.autoscroll.is_active() {
            self.request_frame(scheduler);
        }
        true
    }

    /// Recompute the active gesture's preview from its stored pointer.
    fn recompute_preview<R: GridRow>(&mut self, state: &mut GridState<R>) {
        self.preview_dirty = false;
        let Some(pos) = self.session.pointer() else {
            return;
        };
        let Some(cell) = self.geometry.cell_at_clamped(pos) else {
            return;
        };
        match &mut self.session {
            Session::DragSelect { anchor, .. } => {
                state.select_range(*anchor, cell);
            }
            Session::FillDrag { base, preview, .. } => {
                *preview = fill_target(*base, cell);
            }
            Session::RangeMove {
                base,
                grab,
                preview,
                ..
            } => {
                *preview = move_target(*base, *grab, cell, state.row_count(), state.col_count());
            }
            _ => {}
        }
    }

    /// Per display-refresh work: copy-flash countdown, pending preview
    /// recomputes and edge auto-scroll. Requests another frame only while
    /// something still animates.
    pub fn on_frame<R: GridRow>(
        &mut self,
        state: &mut GridState<R>,
        scheduler: &mut dyn FrameScheduler,
    ) {
        self.frame_requested = false;
        state.tick_copy_flash();

        if self.session.tracks_pointer() {
            let (dx, dy) = self.autoscroll.step(&self.settings.autoscroll);
            if dx != 0.0 || dy != 0.0 {
                let (got_x, got_y) = self.geometry.scroll_by(dx, dy);
                // Scrolling moves the grid under the pointer; the preview
                // must follow until the viewport runs out of travel.
                if got_x != 0.0 || got_y != 0.0 {
                    self.preview_dirty = true;
                }
            }
            if self.preview_dirty {
                self.recompute_preview(state);
            }
            if self.autoscroll.is_active() {
                self.request_frame(scheduler);
            }
        }

        if state.copy_flash().is_some() {
            self.request_frame(scheduler);
        }
    }

    /// Close the active gesture. With `apply` the final preview is flushed
    /// and committed; without it, visual state returns to pre-gesture. The
    /// session always ends Idle, whatever the commit outcome.
    pub fn finalize<R: GridRow>(&mut self, state: &mut GridState<R>, apply: bool) -> bool {
        if apply && self.preview_dirty {
            self.recompute_preview(state);
        }
        self.preview_dirty = false;
        self.autoscroll.reset();

        let session = std::mem::take(&mut self.session);
        match session {
            Session::Idle => return false,
            Session::DragSelect { prior, .. } => {
                if !apply {
                    state.restore_selection(prior.active, prior.anchor, prior.focus);
                }
            }
            Session::FillDrag { base, preview, .. } => {
                if apply && preview != base && !state.fill_range(base, preview) {
                    log::debug!("fill gesture ended with nothing to apply");
                }
            }
            Session::RangeMove { base, preview, .. } => {
                if apply && preview != base && !state.move_range(base, preview) {
                    log::debug!("move gesture ended with nothing to apply");
                }
            }
            Session::ColumnResize {
                column,
                start_width,
                ..
            } => {
                if !apply {
                    if let Some(col) = state.columns.get_mut(column) {
                        col.width = start_width;
                    }
                    self.sync_layout(state);
                }
            }
        }
        true
    }

    pub fn on_pointer_up<R: GridRow>(&mut self, state: &mut GridState<R>) -> bool {
        self.finalize(state, true)
    }

    pub fn on_pointer_cancel<R: GridRow>(&mut self, state: &mut GridState<R>) -> bool {
        self.finalize(state, false)
    }

    pub fn on_blur<R: GridRow>(&mut self, state: &mut GridState<R>) -> bool {
        self.finalize(state, false)
    }

    /// Escape cancels an in-progress gesture, otherwise clears the
    /// selection. Returns whether the key was consumed.
    pub fn on_escape<R: GridRow>(&mut self, state: &mut GridState<R>) -> bool {
        if self.session.is_active() {
            self.finalize(state, false);
            return true;
        }
        if state.active_cell().is_some() || state.selection_range().is_some() {
            state.clear_selection();
            return true;
        }
        false
    }

    /// A context menu opening over an active gesture commits the pending
    /// preview first so the menu operates on what the user sees.
    pub fn on_context_menu<R: GridRow>(&mut self, state: &mut GridState<R>) -> bool {
        if !self.session.is_active() {
            return false;
        }
        self.finalize(state, true)
    }

    /// Feed a wheel or touch-pan delta through the scroll pipeline. When a
    /// tracking gesture is live, scrolling re-derives its preview.
    pub fn on_wheel<R: GridRow>(
        &mut self,
        state: &mut GridState<R>,
        delta_x: f32,
        delta_y: f32,
        scheduler: &mut dyn FrameScheduler,
    ) -> ScrollConsumption {
        let result = self.wheel.process(&mut self.geometry, delta_x, delta_y);
        if result.scrolled() && self.session.tracks_pointer() {
            match self.settings.preview {
                PreviewMode::Synchronous => self.recompute_preview(state),
                PreviewMode::FrameBatched => {
                    self.preview_dirty = true;
                    self.request_frame(scheduler);
                }
            }
        }
        result
    }

    /// Whether the host should let a wheel event propagate past the grid,
    /// under the configured boundary-release policy.
    pub fn should_release_wheel(&self, result: &ScrollConsumption) -> bool {
        result.should_release(self.wheel.settings.release)
    }
}

/// Extend the base range vertically to the pointer's row. Fill runs along
/// rows only; pointing inside the base keeps the preview at the base.
fn fill_target(base: GridRange, cell: CellCoord) -> GridRange {
    if cell.row < base.start_row {
        GridRange::from_corners(
            CellCoord::new(cell.row, base.start_col),
            CellCoord::new(base.end_row, base.end_col),
        )
    } else if cell.row > base.end_row {
        GridRange::from_corners(
            CellCoord::new(base.start_row, base.start_col),
            CellCoord::new(cell.row, base.end_col),
        )
    } else {
        base
    }
}

/// Shift the base so the grabbed cell lands under the pointer, clamped to
/// the grid. Falls back to the base when the grid cannot hold the shape.
fn move_target(
    base: GridRange,
    grab: CellCoord,
    cell: CellCoord,
    row_count: usize,
    col_count: usize,
) -> GridRange {
    let d_row = cell.row as isize - grab.row as isize;
    let d_col = cell.col as isize - grab.col as isize;
    base.shifted_clamped(d_row, d_col, row_count, col_count)
        .unwrap_or(base)
}
