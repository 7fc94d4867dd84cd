//! Gesture session state machine.
//!
//! One pointer gesture is in flight at a time. Each variant carries exactly
//! the data that gesture needs; entering a new gesture replaces whatever was
//! active. Transitions:
//!
//! - `Idle -> DragSelect` on a plain cell press
//! - `Idle -> FillDrag` on a fill-handle press
//! - `Idle -> RangeMove` on a selection-edge press or a modified cell press
//!   inside the selection
//! - `Idle -> ColumnResize` on a header grip press
//! - any variant `-> Idle` on finalize (pointer up, cancel, blur, Escape)

use weft_engine::coords::{CellCoord, GridRange};

use crate::geometry::PointerPos;

/// Selection fields captured before a gesture starts, restored on cancel.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SelectionSnapshot {
    pub active: Option<CellCoord>,
    pub anchor: Option<CellCoord>,
    pub focus: Option<CellCoord>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Session {
    Idle,
    /// Rubber-band selection from an anchor cell.
    DragSelect {
        anchor: CellCoord,
        pointer: PointerPos,
        prior: SelectionSnapshot,
    },
    /// Dragging the fill handle out of a base range.
    FillDrag {
        base: GridRange,
        pointer: PointerPos,
        preview: GridRange,
    },
    /// Dragging a selection by its border to a new position.
    RangeMove {
        base: GridRange,
        /// Cell grabbed at press time; the preview keeps this cell under
        /// the pointer.
        grab: CellCoord,
        pointer: PointerPos,
        preview: GridRange,
    },
    /// Live column width adjustment from a header grip.
    ColumnResize {
        column: usize,
        start_width: f32,
        start_x: f32,
    },
}

impl Default for Session {
    fn default() -> Self {
        Session::Idle
    }
}

impl Session {
    pub fn is_idle(&self) -> bool {
        matches!(self, Session::Idle)
    }

    pub fn is_active(&self) -> bool {
        !self.is_idle()
    }

    pub fn is_drag_select(&self) -> bool {
        matches!(self, Session::DragSelect { .. })
    }

    pub fn is_fill(&self) -> bool {
        matches!(self, Session::FillDrag { .. })
    }

    pub fn is_move(&self) -> bool {
        matches!(self, Session::RangeMove { .. })
    }

    pub fn is_resize(&self) -> bool {
        matches!(self, Session::ColumnResize { .. })
    }

    /// Whether the gesture tracks the pointer across cells (and so wants
    /// frame-batched preview recomputes and edge auto-scroll).
    pub fn tracks_pointer(&self) -> bool {
        matches!(
            self,
            Session::DragSelect { .. } | Session::FillDrag { .. } | Session::RangeMove { .. }
        )
    }

    /// Store a new pointer position, leaving the rest of the variant alone.
    pub fn with_pointer(self, pos: PointerPos) -> Session {
        match self {
            Session::DragSelect { anchor, prior, .. } => Session::DragSelect {
                anchor,
                pointer: pos,
                prior,
            },
            Session::FillDrag { base, preview, .. } => Session::FillDrag {
                base,
                pointer: pos,
                preview,
            },
            Session::RangeMove {
                base,
                grab,
                preview,
                ..
            } => Session::RangeMove {
                base,
                grab,
                pointer: pos,
                preview,
            },
            other => other,
        }
    }

    pub fn pointer(&self) -> Option<PointerPos> {
        match self {
            Session::DragSelect { pointer, .. }
            | Session::FillDrag { pointer, .. }
            | Session::RangeMove { pointer, .. } => Some(*pointer),
            _ => None,
        }
    }

    /// Preview range of a fill gesture, None otherwise.
    pub fn fill_preview(&self) -> Option<GridRange> {
        match self {
            Session::FillDrag { preview, .. } => Some(*preview),
            _ => None,
        }
    }

    /// Preview range of a move gesture, None otherwise.
    pub fn move_preview(&self) -> Option<GridRange> {
        match self {
            Session::RangeMove { preview, .. } => Some(*preview),
            _ => None,
        }
    }
}
