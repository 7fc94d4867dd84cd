//! Clipboard operations for the grid.
//!
//! This module contains:
//! - The `ClipboardTransport` seam over the host clipboard
//! - Tab/newline serialization and parsing of cell matrices
//! - Copy, paste, clear and cut operations
//!
//! The host transport is fallible in both directions. Copy and paste fall
//! back to the in-memory payload when it fails; cut treats a failed write as
//! a hard failure because clearing without a successful copy would lose data.

use serde_json::Value;

use crate::coords::{positive_mod, GridRange};
use crate::error::EngineError;
use crate::history::Intent;
use crate::mutation::MutationOutcome;
use crate::row::{value_is_empty, GridRow};
use crate::staging::RowStaging;
use crate::state::{CopyFlash, GridState, StateSnapshot};

/// Injected seam over the host clipboard.
pub trait ClipboardTransport {
    fn write_text(&mut self, text: &str) -> Result<(), EngineError>;

    /// Read the current clipboard text; `Ok(None)` when the clipboard is
    /// empty or holds no text.
    fn read_text(&mut self) -> Result<Option<String>, EngineError>;
}

/// In-memory transport: the default for tests and host-less use.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    text: Option<String>,
}

impl ClipboardTransport for MemoryClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), EngineError> {
        self.text = Some(text.to_string());
        Ok(())
    }

    fn read_text(&mut self) -> Result<Option<String>, EngineError> {
        Ok(self.text.clone())
    }
}

/// What initiated a paste; surfaced in the status message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PasteTrigger {
    Keyboard,
    Menu,
}

impl PasteTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            PasteTrigger::Keyboard => "keyboard",
            PasteTrigger::Menu => "menu",
        }
    }
}

/// Normalize clipboard text for comparison and parsing (handles line ending
/// differences introduced by clipboard managers).
fn normalize_clipboard_text(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Parse clipboard text into a rectangular matrix of cell strings.
///
/// Rows split on `\n` (one trailing empty line from a terminated payload is
/// dropped), cells split on `\t`, and short rows are padded with empty cells
/// so every row has the same width. An empty payload parses to a single
/// empty cell.
pub fn parse_clipboard_text(text: &str) -> Vec<Vec<String>> {
    let normalized = normalize_clipboard_text(text);
    let mut matrix: Vec<Vec<String>> = normalized
        .lines()
        .map(|line| line.split('\t').map(str::to_string).collect())
        .collect();
    if matrix.is_empty() {
        return vec![vec![String::new()]];
    }
    let width = matrix.iter().map(Vec::len).max().unwrap_or(1);
    for row in &mut matrix {
        row.resize(width, String::new());
    }
    matrix
}

impl<R: GridRow> GridState<R> {
    /// Serialize a range to clipboard text, skipping columns excluded from
    /// bulk ops. Returns `None` when no copyable column falls in the range.
    fn serialize_range(&self, range: GridRange) -> Option<String> {
        let keys: Vec<&str> = (range.start_col..=range.end_col)
            .filter_map(|i| self.columns.get(i))
            .filter(|c| !c.excluded_from_bulk())
            .map(|c| c.key.as_str())
            .collect();
        if keys.is_empty() {
            return None;
        }
        let mut text = String::new();
        for row_idx in range.start_row..=range.end_row {
            if row_idx > range.start_row {
                text.push('\n');
            }
            let Some(row) = self.rows.get(row_idx) else {
                continue;
            };
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    text.push('\t');
                }
                text.push_str(&row.display_field(key));
            }
        }
        Some(text)
    }

    /// Copy the selection (or active cell) to the transport and the
    /// in-memory payload, flashing the copied range.
    ///
    /// A transport failure is logged and swallowed; the in-memory payload
    /// remains authoritative for later pastes.
    pub fn copy(&mut self, transport: &mut dyn ClipboardTransport) -> bool {
        let Some(range) = self.target_range() else {
            self.set_last_action("Nothing to copy");
            return false;
        };
        let Some(text) = self.serialize_range(range) else {
            self.set_last_action("Nothing to copy");
            return false;
        };
        if let Err(err) = transport.write_text(&text) {
            log::warn!("clipboard write failed, keeping in-memory payload: {err}");
        }
        self.clipboard = Some(text);
        self.copy_flash = Some(CopyFlash {
            range,
            frames_left: self.settings.copy_flash_frames,
        });
        self.set_last_action("Copied to clipboard");
        true
    }

    /// Paste the clipboard matrix at the current selection.
    ///
    /// Transport text wins when readable; otherwise the in-memory payload is
    /// used. A 1x1 payload broadcasts into a multi-cell selection; any other
    /// payload pastes as a rectangle anchored at the selection start (or
    /// active cell), clamped to the grid. Cells whose column is not editable
    /// or rejects the value are blocked; zero applied cells is a failure.
    pub fn paste(&mut self, transport: &mut dyn ClipboardTransport, trigger: PasteTrigger) -> bool {
        let text = match transport.read_text() {
            Ok(Some(text)) => Some(text),
            Ok(None) => None,
            Err(err) => {
                log::warn!("clipboard read failed, falling back to in-memory payload: {err}");
                None
            }
        };
        let Some(text) = text.or_else(|| self.clipboard.clone()) else {
            self.set_last_action("Nothing to paste");
            return false;
        };

        let Some(anchor) = self
            .selection_range()
            .map(|r| r.start())
            .or(self.active_cell())
        else {
            self.set_last_action("Nothing selected");
            return false;
        };

        let matrix = parse_clipboard_text(&text);
        let matrix_height = matrix.len();
        let matrix_width = matrix[0].len();

        // A single value broadcasts across a multi-cell selection; anything
        // else lands as a rectangle sized to the matrix.
        let target = match self.selection_range() {
            Some(selection) if matrix_height == 1 && matrix_width == 1 && !selection.is_single() => {
                selection
            }
            _ => GridRange::new(
                anchor.row,
                anchor.col,
                (anchor.row + matrix_height - 1).min(self.row_count().saturating_sub(1)),
                (anchor.col + matrix_width - 1).min(self.col_count().saturating_sub(1)),
            ),
        };

        // Read/coerce phase: resolve every write before touching any row.
        let mut writes: Vec<(String, String, Value)> = Vec::new();
        let mut outcome = MutationOutcome::default();
        for coord in target.cells() {
            let Some(col) = self.columns.get(coord.col) else {
                outcome.blocked += 1;
                continue;
            };
            if !col.editable || col.excluded_from_bulk() {
                outcome.blocked += 1;
                continue;
            }
            let Some(id) = self.rows.get(coord.row).map(|r| r.id().to_string()) else {
                outcome.blocked += 1;
                continue;
            };
            let raw = &matrix[positive_mod(
                coord.row as isize - target.start_row as isize,
                matrix_height as isize,
            ) as usize][positive_mod(
                coord.col as isize - target.start_col as isize,
                matrix_width as isize,
            ) as usize];
            let Some(value) = col.coerce(raw) else {
                outcome.blocked += 1;
                continue;
            };
            writes.push((id, col.key.clone(), value));
            outcome.applied += 1;
        }

        if !outcome.succeeded() {
            self.set_last_action(format!("Paste blocked ({} cells)", outcome.blocked));
            return false;
        }

        let before = self.snapshot();
        let mut staging = RowStaging::new(&self.rows);
        for (id, key, value) in &writes {
            staging.write(id, key, value.clone());
        }
        let committed = staging.commit();
        self.rows = committed;

        self.anchor_to_range(target);
        self.copy_flash = None;
        self.record_transaction(
            Intent::Paste,
            format!("Paste {} cells", outcome.applied),
            before,
        );
        let mut message = format!("Pasted {} cells ({})", outcome.applied, trigger.as_str());
        if outcome.blocked > 0 {
            message.push_str(&format!(", blocked {}", outcome.blocked));
        }
        self.set_last_action(message);
        true
    }

    /// Clear every editable, non-empty cell in the selection.
    ///
    /// Already-empty cells count as blocked, which keeps the operation
    /// idempotent: a second clear over the same range fails with zero
    /// applied cells and records nothing.
    pub fn clear_cells(&mut self) -> bool {
        let Some(range) = self.target_range() else {
            self.set_last_action("Nothing selected");
            return false;
        };
        let (outcome, before) = self.run_clear(range);
        match before {
            Some(before) => {
                self.record_transaction(
                    Intent::Clear,
                    format!("Clear {} cells", outcome.applied),
                    before,
                );
                self.set_last_action(format!(
                    "Cleared {} cells, blocked {}",
                    outcome.applied, outcome.blocked
                ));
                true
            }
            None => {
                self.set_last_action(format!("Cleared 0 cells, blocked {}", outcome.blocked));
                false
            }
        }
    }

    /// Copy the selection, then clear it.
    ///
    /// The copy is a precondition: if the transport write fails, cut fails
    /// without mutating anything.
    pub fn cut(&mut self, transport: &mut dyn ClipboardTransport) -> bool {
        let Some(range) = self.target_range() else {
            self.set_last_action("Nothing to cut");
            return false;
        };
        let Some(text) = self.serialize_range(range) else {
            self.set_last_action("Nothing to cut");
            return false;
        };
        if let Err(err) = transport.write_text(&text) {
            log::warn!("clipboard write failed, aborting cut: {err}");
            self.set_last_action("Cut failed: clipboard unavailable");
            return false;
        }
        self.clipboard = Some(text);

        let (outcome, before) = self.run_clear(range);
        match before {
            Some(before) => {
                self.record_transaction(
                    Intent::Cut,
                    format!("Cut {} cells", outcome.applied),
                    before,
                );
                self.set_last_action(format!(
                    "Cut {} cells, blocked {}",
                    outcome.applied, outcome.blocked
                ));
                true
            }
            None => {
                self.set_last_action(format!("Cut 0 cells, blocked {}", outcome.blocked));
                false
            }
        }
    }

    /// Shared clear kernel for `clear_cells` and `cut`. Commits and returns
    /// the pre-mutation snapshot when at least one cell cleared; otherwise
    /// leaves state untouched.
    fn run_clear(&mut self, range: GridRange) -> (MutationOutcome, Option<StateSnapshot<R>>) {
        let mut outcome = MutationOutcome::default();
        let mut clears: Vec<(String, String)> = Vec::new();
        for coord in range.cells() {
            let Some(col) = self.columns.get(coord.col) else {
                outcome.blocked += 1;
                continue;
            };
            if !col.editable || col.excluded_from_bulk() {
                outcome.blocked += 1;
                continue;
            }
            let Some(row) = self.rows.get(coord.row) else {
                outcome.blocked += 1;
                continue;
            };
            if value_is_empty(&row.field(&col.key)) {
                outcome.blocked += 1;
                continue;
            }
            clears.push((row.id().to_string(), col.key.clone()));
            outcome.applied += 1;
        }

        if !outcome.succeeded() {
            return (outcome, None);
        }

        let before = self.snapshot();
        let mut staging = RowStaging::new(&self.rows);
        for (id, key) in &clears {
            staging.write(id, key, Value::Null);
        }
        let committed = staging.commit();
        self.rows = committed;
        (outcome, Some(before))
    }
}
