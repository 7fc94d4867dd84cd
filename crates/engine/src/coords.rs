//! Cell coordinates and rectangular ranges.
//!
//! Everything above this module (mutation kernel, clipboard, interaction)
//! speaks in `CellCoord` and `GridRange`. Ranges are always corner-normalized
//! and are rebuilt rather than mutated in place, so snapshots held by the
//! history never alias live selection state.

use serde::{Deserialize, Serialize};

/// A single cell position, zero-based.
///
/// Coordinates are transient: they are recomputed from row/column identity on
/// every projection change and never persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellCoord {
    /// Row index (0-based)
    pub row: usize,
    /// Column index (0-based)
    pub col: usize,
}

impl CellCoord {
    #[inline]
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// A rectangular range of cells, inclusive on both ends.
///
/// Invariant: `start_row <= end_row` and `start_col <= end_col`. All
/// constructors normalize, so the invariant holds regardless of which corner
/// the caller passes first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridRange {
    pub start_row: usize,
    pub start_col: usize,
    pub end_row: usize,
    pub end_col: usize,
}

impl GridRange {
    /// Create a new range, automatically normalizing so start <= end.
    pub fn new(r1: usize, c1: usize, r2: usize, c2: usize) -> Self {
        Self {
            start_row: r1.min(r2),
            start_col: c1.min(c2),
            end_row: r1.max(r2),
            end_col: c1.max(c2),
        }
    }

    /// Build a range from two corner coordinates, in any order.
    pub fn from_corners(a: CellCoord, b: CellCoord) -> Self {
        Self::new(a.row, a.col, b.row, b.col)
    }

    /// Create a single-cell range.
    pub fn single(coord: CellCoord) -> Self {
        Self::new(coord.row, coord.col, coord.row, coord.col)
    }

    /// Rebuild the range in normalized corner order.
    ///
    /// Idempotent: `r.normalized().normalized() == r.normalized()`.
    pub fn normalized(&self) -> Self {
        Self::new(self.start_row, self.start_col, self.end_row, self.end_col)
    }

    /// Top-left corner.
    pub fn start(&self) -> CellCoord {
        CellCoord::new(self.start_row, self.start_col)
    }

    /// Bottom-right corner.
    pub fn end(&self) -> CellCoord {
        CellCoord::new(self.end_row, self.end_col)
    }

    /// Number of rows spanned.
    #[inline]
    pub fn height(&self) -> usize {
        self.end_row - self.start_row + 1
    }

    /// Number of columns spanned.
    #[inline]
    pub fn width(&self) -> usize {
        self.end_col - self.start_col + 1
    }

    /// Number of cells in this range.
    pub fn cell_count(&self) -> usize {
        self.height() * self.width()
    }

    /// Check if this is a single cell.
    pub fn is_single(&self) -> bool {
        self.start_row == self.end_row && self.start_col == self.end_col
    }

    /// Check if this range contains a coordinate.
    pub fn contains(&self, coord: CellCoord) -> bool {
        self.contains_cell(coord.row, coord.col)
    }

    /// Check if this range contains a cell given as row/column indexes.
    pub fn contains_cell(&self, row: usize, col: usize) -> bool {
        row >= self.start_row && row <= self.end_row && col >= self.start_col && col <= self.end_col
    }

    /// True when both ranges cover the same number of rows and columns.
    pub fn shape_matches(&self, other: &GridRange) -> bool {
        self.height() == other.height() && self.width() == other.width()
    }

    /// True when both corners resolve to in-bounds coordinates.
    pub fn in_bounds(&self, row_count: usize, col_count: usize) -> bool {
        self.end_row < row_count && self.end_col < col_count
    }

    /// Grow the range just enough to include `coord`.
    pub fn extended_toward(&self, coord: CellCoord) -> Self {
        Self {
            start_row: self.start_row.min(coord.row),
            start_col: self.start_col.min(coord.col),
            end_row: self.end_row.max(coord.row),
            end_col: self.end_col.max(coord.col),
        }
    }

    /// Shift the range by a row/column delta, clamping the offset so the
    /// shifted range keeps its shape and stays inside the grid.
    ///
    /// Returns `None` if the grid is too small to hold the shape at all.
    pub fn shifted_clamped(
        &self,
        d_row: isize,
        d_col: isize,
        row_count: usize,
        col_count: usize,
    ) -> Option<Self> {
        if self.height() > row_count || self.width() > col_count {
            return None;
        }
        let max_start_row = (row_count - self.height()) as isize;
        let max_start_col = (col_count - self.width()) as isize;
        let start_row = (self.start_row as isize + d_row).clamp(0, max_start_row) as usize;
        let start_col = (self.start_col as isize + d_col).clamp(0, max_start_col) as usize;
        Some(Self {
            start_row,
            start_col,
            end_row: start_row + self.height() - 1,
            end_col: start_col + self.width() - 1,
        })
    }

    /// Iterate over all cells in this range (row-major order).
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> {
        let (start_row, end_row) = (self.start_row, self.end_row);
        let (start_col, end_col) = (self.start_col, self.end_col);
        (start_row..=end_row)
            .flat_map(move |r| (start_col..=end_col).map(move |c| CellCoord::new(r, c)))
    }
}

/// Euclidean-style modulo: the result is always in `[0, modulus)` even for
/// negative values. Used for wrap-around source lookup during fill and paste
/// tiling.
pub fn positive_mod(value: isize, modulus: isize) -> isize {
    ((value % modulus) + modulus) % modulus
}

/// Which way a column lookup should round when the requested index is not
/// itself navigable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnBias {
    /// Round toward smaller column indexes.
    Left,
    /// Round toward larger column indexes.
    Right,
}

/// Snap a raw column position onto an ordered set of navigable column
/// indexes.
///
/// Exact members are returned as-is. Otherwise the nearest navigable column
/// in the `bias` direction wins, falling back to the nearest boundary of the
/// set when nothing exists in that direction. Returns `None` only when the
/// set is empty.
pub fn nearest_navigable(col: isize, navigable: &[usize], bias: ColumnBias) -> Option<usize> {
    if navigable.is_empty() {
        return None;
    }
    if col >= 0 && navigable.binary_search(&(col as usize)).is_ok() {
        return Some(col as usize);
    }
    match bias {
        ColumnBias::Left => navigable
            .iter()
            .rev()
            .find(|&&c| (c as isize) < col)
            .copied()
            .or_else(|| navigable.first().copied()),
        ColumnBias::Right => navigable
            .iter()
            .find(|&&c| (c as isize) > col)
            .copied()
            .or_else(|| navigable.last().copied()),
    }
}

/// Clamp a raw position into a valid coordinate: rows into
/// `[0, row_count - 1]`, columns onto the navigable set.
///
/// Returns `None` when the grid has zero rows or zero navigable columns;
/// never panics.
pub fn normalize_coord(
    row: isize,
    col: isize,
    row_count: usize,
    navigable: &[usize],
    bias: ColumnBias,
) -> Option<CellCoord> {
    if row_count == 0 {
        return None;
    }
    let row = row.clamp(0, row_count as isize - 1) as usize;
    let col = nearest_navigable(col, navigable, bias)?;
    Some(CellCoord::new(row, col))
}
