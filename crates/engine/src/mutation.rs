//! Range mutation kernel: move and fill.
//!
//! Both operations follow the same discipline: read every source value from
//! committed state, decide per cell whether it applies or is blocked, then
//! push all writes through one staging layer and commit. No write happens
//! before the last read, so overlapping source/target cells never observe a
//! half-mutated collection.

use rustc_hash::FxHashSet;
use serde_json::Value;

use crate::coords::{positive_mod, GridRange};
use crate::history::Intent;
use crate::row::{value_is_empty, GridRow};
use crate::staging::RowStaging;
use crate::state::GridState;

/// Applied/blocked accounting for one bulk mutation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MutationOutcome {
    pub applied: usize,
    pub blocked: usize,
}

impl MutationOutcome {
    pub fn succeeded(&self) -> bool {
        self.applied > 0
    }
}

struct MoveEntry {
    src_id: String,
    dst_id: String,
    src_key: String,
    dst_key: String,
    value: Value,
}

impl<R: GridRow> GridState<R> {
    /// Move every cell of `base` to the corresponding cell of `target`.
    ///
    /// Sources are cleared and targets written in one commit; where the two
    /// ranges overlap the moved value wins. A cell is blocked when a row is
    /// missing on either end, a column cannot be resolved or is excluded
    /// from bulk ops, the destination is not editable, or the source is
    /// already empty. Zero applied cells is a failure: nothing commits and
    /// no transaction is recorded.
    pub fn move_range(&mut self, base: GridRange, target: GridRange) -> bool {
        if base == target || !base.shape_matches(&target) {
            return false;
        }

        // Read phase: resolve and read every cell against committed state.
        let mut entries: Vec<MoveEntry> = Vec::new();
        let mut blocked = 0usize;
        for r_off in 0..base.height() {
            for c_off in 0..base.width() {
                let src_row = base.start_row + r_off;
                let dst_row = target.start_row + r_off;
                let resolved = (
                    self.rows.get(src_row),
                    self.rows.get(dst_row),
                    self.columns.get(base.start_col + c_off),
                    self.columns.get(target.start_col + c_off),
                );
                let (Some(src), Some(dst), Some(src_col), Some(dst_col)) = resolved else {
                    blocked += 1;
                    continue;
                };
                if src_col.excluded_from_bulk()
                    || dst_col.excluded_from_bulk()
                    || !dst_col.editable
                {
                    blocked += 1;
                    continue;
                }
                let value = src.field(&src_col.key);
                if value_is_empty(&value) {
                    // Clearing an empty source is a no-op; the cell is
                    // counted, not moved.
                    blocked += 1;
                    continue;
                }
                entries.push(MoveEntry {
                    src_id: src.id().to_string(),
                    dst_id: dst.id().to_string(),
                    src_key: src_col.key.clone(),
                    dst_key: dst_col.key.clone(),
                    value,
                });
            }
        }

        let outcome = MutationOutcome {
            applied: entries.len(),
            blocked,
        };
        if !outcome.succeeded() {
            self.set_last_action(format!("Moved 0 cells, blocked {blocked}"));
            return false;
        }

        // Apply phase: deduplicated clears first, then every write, so an
        // overlap cell ends up holding the moved value.
        let before = self.snapshot();
        let mut clear_set: FxHashSet<(String, String)> = FxHashSet::default();
        for entry in &entries {
            clear_set.insert((entry.src_id.clone(), entry.src_key.clone()));
        }
        let mut staging = RowStaging::new(&self.rows);
        for (id, key) in &clear_set {
            staging.write(id, key, Value::Null);
        }
        for entry in &entries {
            staging.write(&entry.dst_id, &entry.dst_key, entry.value.clone());
        }
        let committed = staging.commit();
        self.rows = committed;

        self.anchor_to_range(target);
        self.record_transaction(
            Intent::Move,
            format!("Move {} cells", outcome.applied),
            before,
        );
        self.set_last_action(format!(
            "Moved {} cells, blocked {}",
            outcome.applied, outcome.blocked
        ));
        true
    }

    /// Repeat the base range's values into every preview cell outside it.
    ///
    /// Source rows wrap over the base's row span (fill works upward and
    /// downward); columns never wrap, so preview cells outside the base's
    /// column span are skipped, as are non-editable columns and cells whose
    /// value would not change. Zero changed cells is a no-op.
    pub fn fill_range(&mut self, base: GridRange, preview: GridRange) -> bool {
        struct FillWrite {
            id: String,
            key: String,
            value: Value,
        }

        let base_height = base.height() as isize;
        let mut writes: Vec<FillWrite> = Vec::new();
        for coord in preview.cells() {
            if base.contains(coord) {
                continue;
            }
            if coord.col < base.start_col || coord.col > base.end_col {
                continue;
            }
            let Some(col) = self.columns.get(coord.col) else {
                continue;
            };
            if !col.editable || col.excluded_from_bulk() {
                continue;
            }
            let Some(dst) = self.rows.get(coord.row) else {
                continue;
            };
            let offset =
                positive_mod(coord.row as isize - base.start_row as isize, base_height) as usize;
            let Some(src) = self.rows.get(base.start_row + offset) else {
                continue;
            };
            let value = src.field(&col.key);
            if dst.field(&col.key) == value {
                continue;
            }
            writes.push(FillWrite {
                id: dst.id().to_string(),
                key: col.key.clone(),
                value,
            });
        }

        if writes.is_empty() {
            return false;
        }
        let count = writes.len();

        let before = self.snapshot();
        let mut staging = RowStaging::new(&self.rows);
        for write in &writes {
            staging.write(&write.id, &write.key, write.value.clone());
        }
        let committed = staging.commit();
        self.rows = committed;

        self.anchor_to_range(preview);
        self.record_transaction(Intent::Fill, format!("Fill {count} cells"), before);
        self.set_last_action(format!("Fill applied ({count} cells)"));
        true
    }
}
