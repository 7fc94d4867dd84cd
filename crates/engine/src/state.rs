//! Central grid state: rows, columns, selection, history, status sink.
//!
//! All mutation entry points (move/fill in `mutation`, copy/paste/clear/cut
//! in `clipboard`) are methods on `GridState`, one concern per file. State
//! changes flow one way: mutate a staging layer, commit rows, re-anchor the
//! selection, record an intent transaction, set the status line.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::column::{self, Column};
use crate::coords::{normalize_coord, CellCoord, ColumnBias, GridRange};
use crate::error::EngineError;
use crate::history::{History, HistoryDirection, Intent, Transaction};
use crate::row::GridRow;
use crate::staging::RowStaging;

/// Tunables for grid state behavior.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GridSettings {
    /// Frames the copied-range flash stays visible.
    pub copy_flash_frames: u32,
    /// Maximum undo depth.
    pub history_depth: usize,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            copy_flash_frames: 2,
            history_depth: 100,
        }
    }
}

/// Short-lived highlight over a just-copied range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CopyFlash {
    pub range: GridRange,
    pub frames_left: u32,
}

/// Deep-independent capture of everything undo must restore: row data plus
/// the cursor/selection context around it.
#[derive(Clone, Debug)]
pub struct StateSnapshot<R: GridRow> {
    pub rows: Vec<R>,
    pub active: Option<CellCoord>,
    pub anchor: Option<CellCoord>,
    pub focus: Option<CellCoord>,
    pub copy_flash: Option<CopyFlash>,
}

/// The grid's interaction and mutation state.
///
/// Rows are the committed collection; bulk mutations stage clones and swap
/// the collection wholesale on success, so a failed operation leaves no
/// trace.
pub struct GridState<R: GridRow> {
    pub rows: Vec<R>,
    pub columns: Vec<Column>,
    pub settings: GridSettings,
    pub(crate) active: Option<CellCoord>,
    pub(crate) anchor: Option<CellCoord>,
    pub(crate) focus: Option<CellCoord>,
    pub(crate) copy_flash: Option<CopyFlash>,
    pub(crate) history: History<StateSnapshot<R>>,
    pub(crate) last_action: Option<String>,
    /// In-memory clipboard payload; authoritative when the transport fails.
    pub(crate) clipboard: Option<String>,
}

impl<R: GridRow> GridState<R> {
    pub fn new(rows: Vec<R>, columns: Vec<Column>) -> Self {
        Self::with_settings(rows, columns, GridSettings::default())
    }

    pub fn with_settings(rows: Vec<R>, columns: Vec<Column>, settings: GridSettings) -> Self {
        let history = History::with_depth(settings.history_depth);
        Self {
            rows,
            columns,
            settings,
            active: None,
            anchor: None,
            focus: None,
            copy_flash: None,
            history,
            last_action: None,
            clipboard: None,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn col_count(&self) -> usize {
        self.columns.len()
    }

    /// Ordered column indexes the cursor may land on.
    pub fn navigable_columns(&self) -> Vec<usize> {
        column::navigable_indexes(&self.columns)
    }

    pub fn column_at(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    pub fn column_by_key(&self, key: &str) -> Option<&Column> {
        column::index_for_key(&self.columns, key).map(|i| &self.columns[i])
    }

    pub fn row_id_at(&self, index: usize) -> Option<&str> {
        self.rows.get(index).map(|r| r.id())
    }

    /// Raw stored value at a coordinate; `None` when out of bounds.
    pub fn cell_value(&self, coord: CellCoord) -> Option<Value> {
        let key = column::key_at_index(&self.columns, coord.col)?;
        self.rows.get(coord.row).map(|r| r.field(key))
    }

    /// Rendered value at a coordinate; `None` when out of bounds.
    pub fn cell_display(&self, coord: CellCoord) -> Option<String> {
        let key = column::key_at_index(&self.columns, coord.col)?;
        self.rows.get(coord.row).map(|r| r.display_field(key))
    }

    /// Clamp a raw position onto the grid, or `None` when the grid has no
    /// rows or no navigable columns.
    pub fn clamp_coord(&self, row: isize, col: isize, bias: ColumnBias) -> Option<CellCoord> {
        normalize_coord(row, col, self.row_count(), &self.navigable_columns(), bias)
    }

    // --- Selection -------------------------------------------------------

    pub fn active_cell(&self) -> Option<CellCoord> {
        self.active
    }

    pub fn selection_anchor(&self) -> Option<CellCoord> {
        self.anchor
    }

    pub fn selection_focus(&self) -> Option<CellCoord> {
        self.focus
    }

    /// The multi-cell selection, when one exists.
    pub fn selection_range(&self) -> Option<GridRange> {
        let (anchor, focus) = (self.anchor?, self.focus?);
        Some(GridRange::from_corners(anchor, focus))
    }

    /// The range bulk mutations operate on: the selection, or the active
    /// cell as a single-cell range.
    pub fn target_range(&self) -> Option<GridRange> {
        self.selection_range()
            .or_else(|| self.active.map(GridRange::single))
    }

    /// Move the cursor to a cell, clearing any range selection.
    pub fn set_active_cell(&mut self, row: isize, col: isize) -> Option<CellCoord> {
        let coord = self.clamp_coord(row, col, ColumnBias::Right)?;
        self.active = Some(coord);
        self.anchor = None;
        self.focus = None;
        Some(coord)
    }

    /// Establish a range selection between two corners. The focus corner
    /// becomes the active cell.
    pub fn select_range(&mut self, anchor: CellCoord, focus: CellCoord) -> Option<GridRange> {
        let anchor = self.clamp_coord(anchor.row as isize, anchor.col as isize, ColumnBias::Left)?;
        let focus = self.clamp_coord(focus.row as isize, focus.col as isize, ColumnBias::Right)?;
        self.anchor = Some(anchor);
        self.focus = Some(focus);
        self.active = Some(focus);
        Some(GridRange::from_corners(anchor, focus))
    }

    /// Re-anchor the selection to a committed range (post-mutation).
    pub(crate) fn anchor_to_range(&mut self, range: GridRange) {
        self.anchor = Some(range.start());
        self.focus = Some(range.end());
        self.active = Some(range.end());
    }

    pub fn select_all(&mut self) -> Option<GridRange> {
        if self.row_count() == 0 {
            return None;
        }
        let nav = self.navigable_columns();
        let (&first, &last) = (nav.first()?, nav.last()?);
        self.select_range(
            CellCoord::new(0, first),
            CellCoord::new(self.row_count() - 1, last),
        )
    }

    pub fn clear_selection(&mut self) {
        self.active = None;
        self.anchor = None;
        self.focus = None;
    }

    /// Restore selection fields verbatim. Used when a cancelled gesture puts
    /// the pre-gesture selection back; coordinates are trusted as previously
    /// valid.
    pub fn restore_selection(
        &mut self,
        active: Option<CellCoord>,
        anchor: Option<CellCoord>,
        focus: Option<CellCoord>,
    ) {
        self.active = active;
        self.anchor = anchor;
        self.focus = focus;
    }

    /// Step the cursor by a delta, clearing the range selection. A cursor is
    /// created at the grid origin when none exists.
    pub fn move_active_by(&mut self, d_row: isize, d_col: isize) -> Option<CellCoord> {
        let bias = if d_col < 0 {
            ColumnBias::Left
        } else {
            ColumnBias::Right
        };
        let from = self.active.unwrap_or(CellCoord::new(0, 0));
        let coord = self.clamp_coord(from.row as isize + d_row, from.col as isize + d_col, bias)?;
        self.active = Some(coord);
        self.anchor = None;
        self.focus = None;
        Some(coord)
    }

    /// Grow or shrink the selection by moving its focus corner, keeping the
    /// anchor fixed (shift+arrow behavior).
    pub fn extend_by(&mut self, d_row: isize, d_col: isize) -> Option<GridRange> {
        let bias = if d_col < 0 {
            ColumnBias::Left
        } else {
            ColumnBias::Right
        };
        let anchor = self.anchor.or(self.active)?;
        let from = self.focus.or(self.active)?;
        let focus = self.clamp_coord(from.row as isize + d_row, from.col as isize + d_col, bias)?;
        self.anchor = Some(anchor);
        self.focus = Some(focus);
        self.active = Some(focus);
        Some(GridRange::from_corners(anchor, focus))
    }

    // --- Visual predicates -------------------------------------------------

    pub fn is_selected(&self, coord: CellCoord) -> bool {
        self.target_range().is_some_and(|r| r.contains(coord))
    }

    pub fn is_active(&self, coord: CellCoord) -> bool {
        self.active == Some(coord)
    }

    pub fn is_anchor(&self, coord: CellCoord) -> bool {
        self.anchor == Some(coord)
    }

    pub fn in_copy_flash(&self, coord: CellCoord) -> bool {
        self.copy_flash.is_some_and(|f| f.range.contains(coord))
    }

    pub fn copy_flash(&self) -> Option<CopyFlash> {
        self.copy_flash
    }

    /// Advance the copy flash by one display frame, clearing it when its
    /// countdown runs out.
    pub fn tick_copy_flash(&mut self) {
        if let Some(flash) = &mut self.copy_flash {
            flash.frames_left = flash.frames_left.saturating_sub(1);
            if flash.frames_left == 0 {
                self.copy_flash = None;
            }
        }
    }

    // --- Status sink -------------------------------------------------------

    pub fn set_last_action(&mut self, message: impl Into<String>) {
        self.last_action = Some(message.into());
    }

    pub fn last_action(&self) -> Option<&str> {
        self.last_action.as_deref()
    }

    /// The in-memory clipboard payload, if a copy has happened.
    pub fn clipboard_text(&self) -> Option<&str> {
        self.clipboard.as_deref()
    }

    // --- History -----------------------------------------------------------

    /// Capture the full restorable state.
    pub fn snapshot(&self) -> StateSnapshot<R> {
        StateSnapshot {
            rows: self.rows.clone(),
            active: self.active,
            anchor: self.anchor,
            focus: self.focus,
            copy_flash: self.copy_flash,
        }
    }

    /// Replay a snapshot against live state.
    ///
    /// Rejects snapshots whose selection no longer resolves to in-bounds
    /// coordinates; the caller rolls the history stacks back on failure.
    pub fn apply_snapshot(&mut self, snapshot: &StateSnapshot<R>) -> Result<(), EngineError> {
        let row_count = snapshot.rows.len();
        let col_count = self.columns.len();
        let in_bounds = |coord: Option<CellCoord>| {
            coord.is_none_or(|c| c.row < row_count && c.col < col_count)
        };
        if !in_bounds(snapshot.active) || !in_bounds(snapshot.anchor) || !in_bounds(snapshot.focus)
        {
            return Err(EngineError::Snapshot(
                "selection out of bounds for snapshot rows".to_string(),
            ));
        }
        self.rows = snapshot.rows.clone();
        self.active = snapshot.active;
        self.anchor = snapshot.anchor;
        self.focus = snapshot.focus;
        self.copy_flash = snapshot.copy_flash;
        Ok(())
    }

    /// Record a completed mutation. The "after" snapshot is captured here,
    /// so callers commit state first and record second.
    pub(crate) fn record_transaction(
        &mut self,
        intent: Intent,
        label: impl Into<String>,
        before: StateSnapshot<R>,
    ) -> u64 {
        let after = self.snapshot();
        self.history.record(intent, label, before, after)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// The transaction the next undo would replay (for menu labels).
    pub fn next_undo(&self) -> Option<&Transaction<StateSnapshot<R>>> {
        self.history.peek_undo()
    }

    /// The transaction the next redo would replay.
    pub fn next_redo(&self) -> Option<&Transaction<StateSnapshot<R>>> {
        self.history.peek_redo()
    }

    /// Undo or redo one transaction, reporting the outcome through the
    /// status sink. Returns the replayed transaction id when one applied.
    pub fn run_history_action(&mut self, direction: HistoryDirection) -> Option<u64> {
        let transaction = match direction {
            HistoryDirection::Undo => self.history.undo(),
            HistoryDirection::Redo => self.history.redo(),
        };
        let Some(transaction) = transaction else {
            self.set_last_action(match direction {
                HistoryDirection::Undo => "Nothing to undo",
                HistoryDirection::Redo => "Nothing to redo",
            });
            return None;
        };
        let snapshot = match direction {
            HistoryDirection::Undo => &transaction.before,
            HistoryDirection::Redo => &transaction.after,
        };
        match self.apply_snapshot(snapshot) {
            Ok(()) => {
                let verb = match direction {
                    HistoryDirection::Undo => "Undid",
                    HistoryDirection::Redo => "Redid",
                };
                self.set_last_action(format!("{verb} {}", transaction.label));
                Some(transaction.id)
            }
            Err(err) => {
                log::warn!(
                    "history replay failed for {} ({}): {err}",
                    transaction.label,
                    transaction.intent.as_str()
                );
                match direction {
                    HistoryDirection::Undo => self.history.rollback_undo(),
                    HistoryDirection::Redo => self.history.rollback_redo(),
                }
                self.set_last_action(match direction {
                    HistoryDirection::Undo => "Undo failed",
                    HistoryDirection::Redo => "Redo failed",
                });
                None
            }
        }
    }

    // --- Single-cell edit ---------------------------------------------------

    /// Write one value into the active cell, recording an `edit` transaction.
    ///
    /// Returns `false` when there is no active cell, the column rejects the
    /// write, or the value matches what the cell already holds.
    pub fn edit_active_cell(&mut self, value: Value) -> bool {
        let Some(coord) = self.active else {
            self.set_last_action("Nothing selected");
            return false;
        };
        let (key, label) = match self.columns.get(coord.col) {
            Some(col) if col.editable && !col.excluded_from_bulk() => {
                (col.key.clone(), format!("Edit {}", col.label))
            }
            Some(col) => {
                let message = format!("{} is read-only", col.label);
                self.set_last_action(message);
                return false;
            }
            None => return false,
        };
        let Some(id) = self.rows.get(coord.row).map(|r| r.id().to_string()) else {
            return false;
        };
        match self.cell_value(coord) {
            Some(current) if current == value => return false,
            Some(_) => {}
            None => return false,
        }
        let before = self.snapshot();

        let mut staging = RowStaging::new(&self.rows);
        staging.write(&id, &key, value);
        let committed = staging.commit();
        self.rows = committed;
        self.record_transaction(Intent::Edit, label, before);
        true
    }
}
