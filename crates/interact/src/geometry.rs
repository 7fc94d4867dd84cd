//! Pixel geometry of the scrollable grid viewport.
//!
//! - Cumulative column edges derived from column widths
//! - Scroll offset clamping against the content extent
//! - Pixel-to-cell hit testing for pointer routing
//! - `ensure_visible` scrolling for keyboard navigation

use weft_engine::coords::{CellCoord, GridRange};

/// Width of the column-resize grip straddling a header boundary.
pub const RESIZE_GRIP_PX: f32 = 4.0;
/// Half-size of the square fill handle at the selection's bottom-right corner.
pub const FILL_HANDLE_PX: f32 = 5.0;
/// Thickness of the selection border band that starts a range move.
pub const MOVE_EDGE_PX: f32 = 3.0;

/// A pointer position in viewport coordinates (origin at the grid's top-left,
/// header included).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerPos {
    pub x: f32,
    pub y: f32,
}

impl PointerPos {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in viewport coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PixelRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl PixelRect {
    pub fn contains(&self, pos: PointerPos) -> bool {
        pos.x >= self.x
            && pos.x < self.x + self.width
            && pos.y >= self.y
            && pos.y < self.y + self.height
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Grow (or shrink, with a negative amount) the rect on all sides.
    pub fn inflated(&self, amount: f32) -> PixelRect {
        PixelRect {
            x: self.x - amount,
            y: self.y - amount,
            width: self.width + amount * 2.0,
            height: self.height + amount * 2.0,
        }
    }
}

/// What lives under a pointer position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HitTarget {
    /// Header strip over a column's resize grip.
    HeaderResize(usize),
    /// Header strip over a column body.
    Header(usize),
    /// A cell in the body.
    Cell(CellCoord),
    /// Outside the grid content.
    Outside,
}

/// Pixel layout of the grid viewport. Column edges are cumulative x offsets
/// in content space; scroll offsets translate content space to view space.
#[derive(Clone, Debug)]
pub struct ViewportGeometry {
    /// `column_edges[i]` is where column `i` starts; the final entry is the
    /// right edge of the last column.
    column_edges: Vec<f32>,
    pub header_height: f32,
    pub row_height: f32,
    pub view_width: f32,
    pub view_height: f32,
    pub scroll_x: f32,
    pub scroll_y: f32,
    pub row_count: usize,
}

impl ViewportGeometry {
    pub fn new(
        column_widths: &[f32],
        row_count: usize,
        header_height: f32,
        row_height: f32,
        view_width: f32,
        view_height: f32,
    ) -> Self {
        let mut geometry = Self {
            column_edges: Vec::new(),
            header_height,
            row_height,
            view_width,
            view_height,
            scroll_x: 0.0,
            scroll_y: 0.0,
            row_count,
        };
        geometry.set_column_widths(column_widths);
        geometry
    }

    /// Rebuild the cumulative edge table after a width change.
    pub fn set_column_widths(&mut self, widths: &[f32]) {
        self.column_edges.clear();
        self.column_edges.reserve(widths.len() + 1);
        let mut x = 0.0;
        self.column_edges.push(x);
        for width in widths {
            x += width.max(0.0);
            self.column_edges.push(x);
        }
        self.clamp_scroll();
    }

    pub fn set_row_count(&mut self, row_count: usize) {
        self.row_count = row_count;
        self.clamp_scroll();
    }

    pub fn col_count(&self) -> usize {
        self.column_edges.len().saturating_sub(1)
    }

    pub fn column_start(&self, index: usize) -> Option<f32> {
        if index < self.col_count() {
            Some(self.column_edges[index])
        } else {
            None
        }
    }

    pub fn column_end(&self, index: usize) -> Option<f32> {
        if index < self.col_count() {
            Some(self.column_edges[index + 1])
        } else {
            None
        }
    }

    pub fn content_width(&self) -> f32 {
        self.column_edges.last().copied().unwrap_or(0.0)
    }

    pub fn content_height(&self) -> f32 {
        self.row_count as f32 * self.row_height
    }

    /// Height of the body area below the header.
    pub fn body_height(&self) -> f32 {
        (self.view_height - self.header_height).max(0.0)
    }

    pub fn max_scroll_x(&self) -> f32 {
        (self.content_width() - self.view_width).max(0.0)
    }

    pub fn max_scroll_y(&self) -> f32 {
        (self.content_height() - self.body_height()).max(0.0)
    }

    fn clamp_scroll(&mut self) {
        self.scroll_x = self.scroll_x.clamp(0.0, self.max_scroll_x());
        self.scroll_y = self.scroll_y.clamp(0.0, self.max_scroll_y());
    }

    /// Scroll by a delta, clamped to the content extent. Returns the part of
    /// the delta actually consumed on each axis.
    pub fn scroll_by(&mut self, dx: f32, dy: f32) -> (f32, f32) {
        let old_x = self.scroll_x;
        let old_y = self.scroll_y;
        self.scroll_x = (self.scroll_x + dx).clamp(0.0, self.max_scroll_x());
        self.scroll_y = (self.scroll_y + dy).clamp(0.0, self.max_scroll_y());
        (self.scroll_x - old_x, self.scroll_y - old_y)
    }

    /// Column index at a content-space x offset.
    fn col_at_content_x(&self, content_x: f32) -> Option<usize> {
        if content_x < 0.0 || content_x >= self.content_width() {
            return None;
        }
        // Edges are sorted; partition_point finds the first edge past x.
        let idx = self
            .column_edges
            .partition_point(|edge| *edge <= content_x)
            .saturating_sub(1);
        if idx < self.col_count() {
            Some(idx)
        } else {
            None
        }
    }

    fn row_at_content_y(&self, content_y: f32) -> Option<usize> {
        if content_y < 0.0 || self.row_height <= 0.0 {
            return None;
        }
        let row = (content_y / self.row_height) as usize;
        if row < self.row_count {
            Some(row)
        } else {
            None
        }
    }

    /// Cell under a viewport position, or None over the header or outside
    /// the populated content.
    pub fn cell_at(&self, pos: PointerPos) -> Option<CellCoord> {
        if pos.y < self.header_height {
            return None;
        }
        let col = self.col_at_content_x(pos.x + self.scroll_x)?;
        let row = self.row_at_content_y(pos.y - self.header_height + self.scroll_y)?;
        Some(CellCoord::new(row, col))
    }

    /// Nearest cell to a viewport position, clamping positions that fall
    /// past the grid edges. Drag gestures track the pointer outside the
    /// content without losing their target. None only on an empty grid.
    pub fn cell_at_clamped(&self, pos: PointerPos) -> Option<CellCoord> {
        if self.row_count == 0 || self.col_count() == 0 {
            return None;
        }
        let content_x = (pos.x + self.scroll_x).clamp(0.0, self.content_width() - 0.5);
        let content_y = (pos.y - self.header_height + self.scroll_y)
            .clamp(0.0, self.content_height() - 0.5);
        let col = self.col_at_content_x(content_x).unwrap_or(0);
        let row = self.row_at_content_y(content_y).unwrap_or(0);
        Some(CellCoord::new(row, col))
    }

    /// Rect of a cell in viewport coordinates. Cells scrolled out of view
    /// still produce a rect; callers clip as needed.
    pub fn cell_rect(&self, coord: CellCoord) -> Option<PixelRect> {
        let start = self.column_start(coord.col)?;
        let end = self.column_end(coord.col)?;
        if coord.row >= self.row_count {
            return None;
        }
        Some(PixelRect {
            x: start - self.scroll_x,
            y: coord.row as f32 * self.row_height - self.scroll_y + self.header_height,
            width: end - start,
            height: self.row_height,
        })
    }

    /// Bounding rect of a range in viewport coordinates.
    pub fn range_rect(&self, range: GridRange) -> Option<PixelRect> {
        let range = range.normalized();
        let top_left = self.cell_rect(range.start())?;
        let bottom_right = self.cell_rect(range.end())?;
        Some(PixelRect {
            x: top_left.x,
            y: top_left.y,
            width: bottom_right.right() - top_left.x,
            height: bottom_right.bottom() - top_left.y,
        })
    }

    /// Square hit area of the fill handle for a selection.
    pub fn fill_handle_rect(&self, range: GridRange) -> Option<PixelRect> {
        let rect = self.range_rect(range)?;
        Some(PixelRect {
            x: rect.right() - FILL_HANDLE_PX,
            y: rect.bottom() - FILL_HANDLE_PX,
            width: FILL_HANDLE_PX * 2.0,
            height: FILL_HANDLE_PX * 2.0,
        })
    }

    /// Whether a position sits on the selection's border band but not in
    /// its interior (the grab area for a range move).
    pub fn on_range_edge(&self, range: GridRange, pos: PointerPos) -> bool {
        let Some(rect) = self.range_rect(range) else {
            return false;
        };
        let outer = rect.inflated(MOVE_EDGE_PX);
        let inner = rect.inflated(-MOVE_EDGE_PX);
        outer.contains(pos) && !inner.contains(pos)
    }

    /// Column whose resize grip covers a header position.
    pub fn resize_grip_at(&self, pos: PointerPos) -> Option<usize> {
        if pos.y >= self.header_height {
            return None;
        }
        let content_x = pos.x + self.scroll_x;
        for index in 0..self.col_count() {
            let edge = self.column_edges[index + 1];
            if (content_x - edge).abs() <= RESIZE_GRIP_PX {
                return Some(index);
            }
        }
        None
    }

    /// Classify what sits under a viewport position.
    pub fn hit_test(&self, pos: PointerPos) -> HitTarget {
        if pos.x < 0.0 || pos.y < 0.0 || pos.x >= self.view_width || pos.y >= self.view_height {
            return HitTarget::Outside;
        }
        if let Some(col) = self.resize_grip_at(pos) {
            return HitTarget::HeaderResize(col);
        }
        if pos.y < self.header_height {
            return match self.col_at_content_x(pos.x + self.scroll_x) {
                Some(col) => HitTarget::Header(col),
                None => HitTarget::Outside,
            };
        }
        match self.cell_at(pos) {
            Some(coord) => HitTarget::Cell(coord),
            None => HitTarget::Outside,
        }
    }

    /// Scroll the minimum distance needed to bring a cell fully into view.
    pub fn ensure_visible(&mut self, coord: CellCoord) {
        let Some(start) = self.column_start(coord.col) else {
            return;
        };
        let Some(end) = self.column_end(coord.col) else {
            return;
        };
        if start < self.scroll_x {
            self.scroll_x = start;
        } else if end > self.scroll_x + self.view_width {
            self.scroll_x = end - self.view_width;
        }

        let top = coord.row as f32 * self.row_height;
        let bottom = top + self.row_height;
        if top < self.scroll_y {
            self.scroll_y = top;
        } else if bottom > self.scroll_y + self.body_height() {
            self.scroll_y = bottom - self.body_height();
        }
        self.clamp_scroll();
    }
}
