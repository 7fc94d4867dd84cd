use serde_json::json;

use weft_engine::column::Column;
use weft_engine::coords::{CellCoord, GridRange};
use weft_engine::history::{HistoryDirection, Intent};
use weft_engine::row::MapRow;
use weft_engine::state::GridState;
use weft_interact::controller::{GridInteraction, InteractSettings, Modifiers, PointerEvent};
use weft_interact::frame::ManualScheduler;
use weft_interact::geometry::{PointerPos, ViewportGeometry};
use weft_interact::wheel::{AxisLock, BoundaryRelease, WheelSettings};

// Columns: 0 marker (40px), 1 job, 2 owner, 3 hours (100px each).
fn columns() -> Vec<Column> {
    vec![
        Column::marker("_pin"),
        Column::text("job", "Job").with_width(100.0),
        Column::text("owner", "Owner").with_width(100.0),
        Column::number("hours", "Hours").with_width(100.0),
    ]
}

const OWNERS: [&str; 4] = ["ana", "bruno", "carol", "dev"];

fn sheet() -> GridState<MapRow> {
    let rows = (0..12)
        .map(|i| {
            MapRow::new(&format!("j{i}"))
                .with_field("job", json!(format!("Job {i}")))
                .with_field("owner", json!(OWNERS[i % 4]))
                .with_field("hours", json!(i as i64 * 2))
        })
        .collect();
    GridState::new(rows, columns())
}

// 250x124 view over 340x240 content: 90px of x travel, 140px of y.
fn view() -> GridInteraction {
    let geometry =
        ViewportGeometry::new(&[40.0, 100.0, 100.0, 100.0], 12, 24.0, 20.0, 250.0, 124.0);
    GridInteraction::new(geometry, InteractSettings::default())
}

fn view_with(settings: InteractSettings) -> GridInteraction {
    let geometry =
        ViewportGeometry::new(&[40.0, 100.0, 100.0, 100.0], 12, 24.0, 20.0, 250.0, 124.0);
    GridInteraction::new(geometry, settings)
}

fn center(ui: &GridInteraction, row: usize, col: usize) -> PointerPos {
    let rect = ui.geometry.cell_rect(CellCoord::new(row, col)).unwrap();
    PointerPos::new(rect.x + rect.width / 2.0, rect.y + rect.height / 2.0)
}

fn handle_press(ui: &GridInteraction, range: GridRange) -> PointerPos {
    let handle = ui.geometry.fill_handle_rect(range).unwrap();
    PointerPos::new(handle.x + 1.0, handle.y + 1.0)
}

fn text(state: &GridState<MapRow>, row: usize, col: usize) -> String {
    state
        .cell_display(CellCoord::new(row, col))
        .unwrap_or_default()
}

// -------------------------------------------------------------------------
// Drag select
// -------------------------------------------------------------------------

#[test]
fn drag_select_commits_on_release() {
    let mut state = sheet();
    let mut ui = view();
    let mut frames = ManualScheduler::new();

    let start = center(&ui, 1, 1);
    assert!(ui.on_pointer_down(&mut state, &PointerEvent::primary(start.x, start.y)));
    assert_eq!(state.active_cell(), Some(CellCoord::new(1, 1)));

    ui.on_pointer_move(&mut state, center(&ui, 3, 2), &mut frames);
    assert!(frames.take());
    ui.on_frame(&mut state, &mut frames);
    assert_eq!(state.selection_range(), Some(GridRange::new(1, 1, 3, 2)));

    ui.on_pointer_up(&mut state);
    assert!(ui.session().is_idle());
    assert_eq!(state.selection_range(), Some(GridRange::new(1, 1, 3, 2)));
    // Selecting is not a mutation; nothing landed in history.
    assert!(!state.can_undo());
}

#[test]
fn press_on_marker_column_is_ignored() {
    let mut state = sheet();
    let mut ui = view();

    let pos = center(&ui, 1, 0);
    assert!(!ui.on_pointer_down(&mut state, &PointerEvent::primary(pos.x, pos.y)));
    assert!(ui.session().is_idle());
    assert_eq!(state.active_cell(), None);
}

#[test]
fn shift_press_grows_an_existing_range() {
    let mut state = sheet();
    let mut ui = view();
    state.select_range(CellCoord::new(1, 1), CellCoord::new(2, 1));

    let pos = center(&ui, 3, 2);
    let event = PointerEvent::primary(pos.x, pos.y).with_modifiers(Modifiers {
        shift: true,
        ..Modifiers::default()
    });
    assert!(ui.on_pointer_down(&mut state, &event));
    assert_eq!(state.selection_range(), Some(GridRange::new(1, 1, 3, 2)));

    ui.on_pointer_up(&mut state);
    assert_eq!(state.selection_range(), Some(GridRange::new(1, 1, 3, 2)));
}

#[test]
fn escape_during_drag_restores_the_prior_selection() {
    let mut state = sheet();
    let mut ui = view();
    let mut frames = ManualScheduler::new();
    state.select_range(CellCoord::new(1, 1), CellCoord::new(2, 2));

    let start = center(&ui, 3, 1);
    ui.on_pointer_down(&mut state, &PointerEvent::primary(start.x, start.y));
    ui.on_pointer_move(&mut state, center(&ui, 4, 2), &mut frames);

    assert!(ui.on_escape(&mut state));
    assert!(ui.session().is_idle());
    assert_eq!(state.selection_range(), Some(GridRange::new(1, 1, 2, 2)));
    assert_eq!(state.active_cell(), Some(CellCoord::new(2, 2)));
}

// -------------------------------------------------------------------------
// Fill handle
// -------------------------------------------------------------------------

#[test]
fn fill_drag_repeats_the_selection_down_and_undoes() {
    let mut state = sheet();
    let mut ui = view();
    let mut frames = ManualScheduler::new();

    let base = GridRange::new(0, 2, 1, 2);
    state.select_range(base.start(), base.end());
    let press = handle_press(&ui, base);
    assert!(ui.on_pointer_down(&mut state, &PointerEvent::primary(press.x, press.y)));
    assert!(ui.session().is_fill());

    ui.on_pointer_move(&mut state, center(&ui, 3, 2), &mut frames);
    ui.on_frame(&mut state, &mut frames);
    assert_eq!(ui.fill_preview(), Some(GridRange::new(0, 2, 3, 2)));
    assert!(ui.in_fill_preview(CellCoord::new(3, 2)));
    assert!(!ui.in_fill_preview(CellCoord::new(3, 1)));

    ui.on_pointer_up(&mut state);
    assert_eq!(state.last_action(), Some("Fill applied (2 cells)"));
    assert_eq!(text(&state, 2, 2), "ana");
    assert_eq!(text(&state, 3, 2), "bruno");
    assert_eq!(state.selection_range(), Some(GridRange::new(0, 2, 3, 2)));
    assert_eq!(state.next_undo().unwrap().intent, Intent::Fill);

    state.run_history_action(HistoryDirection::Undo);
    assert_eq!(state.last_action(), Some("Undid Fill 2 cells"));
    assert_eq!(text(&state, 2, 2), "carol");
    assert_eq!(text(&state, 3, 2), "dev");
}

#[test]
fn fill_preview_extends_rows_never_columns() {
    let mut state = sheet();
    let mut ui = view();
    let mut frames = ManualScheduler::new();

    let base = GridRange::new(1, 1, 1, 2);
    state.select_range(base.start(), base.end());
    let press = handle_press(&ui, base);
    ui.on_pointer_down(&mut state, &PointerEvent::primary(press.x, press.y));

    // Pointer in column 1: rows grow, the column span does not shrink.
    ui.on_pointer_move(&mut state, center(&ui, 3, 1), &mut frames);
    ui.on_frame(&mut state, &mut frames);
    assert_eq!(ui.fill_preview(), Some(GridRange::new(1, 1, 3, 2)));

    // Above the base the preview grows upward instead.
    ui.on_pointer_move(&mut state, center(&ui, 0, 2), &mut frames);
    ui.on_frame(&mut state, &mut frames);
    assert_eq!(ui.fill_preview(), Some(GridRange::new(0, 1, 1, 2)));

    ui.on_blur(&mut state);
    assert!(ui.session().is_idle());
    assert_eq!(text(&state, 0, 1), "Job 0");
    assert_eq!(text(&state, 3, 1), "Job 3");
    assert!(!state.can_undo());
}

#[test]
fn fill_released_on_its_base_is_a_noop() {
    let mut state = sheet();
    let mut ui = view();
    let mut frames = ManualScheduler::new();

    let base = GridRange::new(2, 1, 2, 2);
    state.select_range(base.start(), base.end());
    let press = handle_press(&ui, base);
    ui.on_pointer_down(&mut state, &PointerEvent::primary(press.x, press.y));
    ui.on_pointer_move(&mut state, center(&ui, 2, 1), &mut frames);

    ui.on_pointer_up(&mut state);
    assert!(ui.session().is_idle());
    assert!(!state.can_undo());
    assert_eq!(state.last_action(), None);
}

// -------------------------------------------------------------------------
// Range move
// -------------------------------------------------------------------------

#[test]
fn edge_grab_moves_the_block() {
    let mut state = sheet();
    let mut ui = view();
    let mut frames = ManualScheduler::new();
    state.select_range(CellCoord::new(1, 1), CellCoord::new(2, 2));

    // Grab the top border of the selection rect.
    let rect = ui.geometry.range_rect(GridRange::new(1, 1, 2, 2)).unwrap();
    let grab = PointerPos::new(rect.x + rect.width / 2.0, rect.y + 1.0);
    assert!(ui.on_pointer_down(&mut state, &PointerEvent::primary(grab.x, grab.y)));
    assert!(ui.session().is_move());

    ui.on_pointer_move(&mut state, center(&ui, 3, 2), &mut frames);
    ui.on_frame(&mut state, &mut frames);
    assert_eq!(ui.move_preview(), Some(GridRange::new(3, 1, 4, 2)));
    assert!(ui.in_move_preview(CellCoord::new(4, 1)));
    assert!(!ui.in_move_preview(CellCoord::new(1, 1)));

    ui.on_pointer_up(&mut state);
    assert_eq!(state.last_action(), Some("Moved 4 cells, blocked 0"));
    assert_eq!(text(&state, 3, 1), "Job 1");
    assert_eq!(text(&state, 3, 2), "bruno");
    assert_eq!(text(&state, 4, 1), "Job 2");
    assert_eq!(text(&state, 4, 2), "carol");
    assert_eq!(text(&state, 1, 1), "");
    assert_eq!(state.selection_range(), Some(GridRange::new(3, 1, 4, 2)));

    state.run_history_action(HistoryDirection::Undo);
    assert_eq!(text(&state, 1, 1), "Job 1");
    assert_eq!(text(&state, 3, 1), "Job 3");
    assert_eq!(text(&state, 4, 2), "ana");
    assert_eq!(state.selection_range(), Some(GridRange::new(1, 1, 2, 2)));
}

#[test]
fn modified_press_grabs_away_from_the_edge() {
    let mut state = sheet();
    let mut ui = view();
    state.select_range(CellCoord::new(1, 1), CellCoord::new(3, 2));

    // Dead center of the selection, far from the border band.
    let pos = center(&ui, 2, 1);
    let event = PointerEvent::primary(pos.x, pos.y).with_modifiers(Modifiers {
        alt: true,
        ..Modifiers::default()
    });
    assert!(ui.on_pointer_down(&mut state, &event));
    assert!(ui.session().is_move());

    assert!(ui.on_escape(&mut state));
    assert!(ui.session().is_idle());
    assert_eq!(state.selection_range(), Some(GridRange::new(1, 1, 3, 2)));
    assert!(!state.can_undo());
}

#[test]
fn move_preview_clamps_at_the_grid_boundary() {
    let mut state = sheet();
    let mut ui = view();
    let mut frames = ManualScheduler::new();
    state.select_range(CellCoord::new(0, 1), CellCoord::new(1, 2));

    let pos = center(&ui, 0, 1);
    let event = PointerEvent::primary(pos.x, pos.y).with_modifiers(Modifiers {
        ctrl: true,
        ..Modifiers::default()
    });
    ui.on_pointer_down(&mut state, &event);

    // Way past the last row: the block pins against the bottom.
    ui.on_pointer_move(&mut state, PointerPos::new(90.0, 5000.0), &mut frames);
    ui.on_frame(&mut state, &mut frames);
    assert_eq!(ui.move_preview(), Some(GridRange::new(10, 1, 11, 2)));

    // Further frames keep auto-scrolling but the preview stays pinned.
    ui.on_frame(&mut state, &mut frames);
    assert_eq!(ui.move_preview(), Some(GridRange::new(10, 1, 11, 2)));

    ui.on_pointer_cancel(&mut state);
    assert_eq!(text(&state, 0, 1), "Job 0");
    assert!(!state.can_undo());
}

// -------------------------------------------------------------------------
// Column resize
// -------------------------------------------------------------------------

#[test]
fn header_grip_drag_resizes_and_survives_release() {
    let mut state = sheet();
    let mut ui = view();
    let mut frames = ManualScheduler::new();

    // A plain header press is not a gesture.
    assert!(!ui.on_pointer_down(&mut state, &PointerEvent::primary(90.0, 5.0)));

    // Column 1 ends at content x 140.
    assert!(ui.on_pointer_down(&mut state, &PointerEvent::primary(140.0, 5.0)));
    assert!(ui.session().is_resize());

    ui.on_pointer_move(&mut state, PointerPos::new(180.0, 5.0), &mut frames);
    assert_eq!(state.columns[1].width, 140.0);
    assert_eq!(ui.geometry.column_end(1), Some(180.0));

    ui.on_pointer_up(&mut state);
    assert!(ui.session().is_idle());
    assert_eq!(state.columns[1].width, 140.0);
}

#[test]
fn resize_escape_rolls_the_width_back() {
    let mut state = sheet();
    let mut ui = view();
    let mut frames = ManualScheduler::new();

    ui.on_pointer_down(&mut state, &PointerEvent::primary(140.0, 5.0));
    ui.on_pointer_move(&mut state, PointerPos::new(100.0, 5.0), &mut frames);
    assert_eq!(state.columns[1].width, 60.0);

    assert!(ui.on_escape(&mut state));
    assert_eq!(state.columns[1].width, 100.0);
    assert_eq!(ui.geometry.column_end(1), Some(140.0));
}

// -------------------------------------------------------------------------
// Wheel routing
// -------------------------------------------------------------------------

#[test]
fn wheel_prefers_the_dominant_axis() {
    let mut state = sheet();
    let mut ui = view();
    let mut frames = ManualScheduler::new();

    let result = ui.on_wheel(&mut state, 10.0, 11.0, &mut frames);
    assert_eq!(result.x.consumed, 0.0);
    assert_eq!(result.y.consumed, 11.0);
    assert_eq!(ui.geometry.scroll_y, 11.0);

    let result = ui.on_wheel(&mut state, 12.0, 3.0, &mut frames);
    assert_eq!(result.x.consumed, 12.0);
    assert_eq!(result.y.consumed, 0.0);

    // Default policy keeps every event on the grid.
    assert!(!ui.should_release_wheel(&result));
}

#[test]
fn horizontal_preferred_routes_mixed_deltas_left() {
    let mut state = sheet();
    let mut ui = view_with(InteractSettings {
        wheel: WheelSettings {
            axis_lock: AxisLock::HorizontalPreferred,
            ..WheelSettings::default()
        },
        ..InteractSettings::default()
    });
    let mut frames = ManualScheduler::new();

    let result = ui.on_wheel(&mut state, 10.0, 11.0, &mut frames);
    assert_eq!(result.x.consumed, 10.0);
    assert_eq!(result.y.consumed, 0.0);

    let result = ui.on_wheel(&mut state, 0.0, 11.0, &mut frames);
    assert_eq!(result.y.consumed, 11.0);
}

#[test]
fn boundary_release_hands_the_event_to_the_host() {
    let mut state = sheet();
    let mut ui = view_with(InteractSettings {
        wheel: WheelSettings {
            release: BoundaryRelease::ReleaseAtBoundary,
            ..WheelSettings::default()
        },
        ..InteractSettings::default()
    });
    let mut frames = ManualScheduler::new();

    // Pinning scroll consumes part of the delta: still the grid's event.
    let result = ui.on_wheel(&mut state, 0.0, 500.0, &mut frames);
    assert_eq!(result.y.consumed, 140.0);
    assert!(!ui.should_release_wheel(&result));

    // Pinned and nothing consumed: the outer container takes over.
    let result = ui.on_wheel(&mut state, 0.0, 10.0, &mut frames);
    assert!(result.y.at_boundary);
    assert!(ui.should_release_wheel(&result));

    // Reversing away from the boundary scrolls the grid again.
    let result = ui.on_wheel(&mut state, 0.0, -10.0, &mut frames);
    assert_eq!(result.y.consumed, -10.0);
    assert!(!ui.should_release_wheel(&result));
}

#[test]
fn wheel_under_a_fill_drag_rederives_the_preview() {
    let mut state = sheet();
    let mut ui = view();
    let mut frames = ManualScheduler::new();

    let base = GridRange::new(0, 2, 1, 2);
    state.select_range(base.start(), base.end());
    let press = handle_press(&ui, base);
    ui.on_pointer_down(&mut state, &PointerEvent::primary(press.x, press.y));

    // 40px of scroll moves two more rows under the stationary pointer.
    let result = ui.on_wheel(&mut state, 0.0, 40.0, &mut frames);
    assert!(result.scrolled());
    assert!(frames.take());
    ui.on_frame(&mut state, &mut frames);
    assert_eq!(ui.fill_preview(), Some(GridRange::new(0, 2, 3, 2)));

    ui.on_pointer_up(&mut state);
    assert_eq!(state.last_action(), Some("Fill applied (2 cells)"));
    assert_eq!(text(&state, 2, 2), "ana");
    assert_eq!(text(&state, 3, 2), "bruno");
}

// -------------------------------------------------------------------------
// Edge auto-scroll
// -------------------------------------------------------------------------

#[test]
fn dragging_past_the_bottom_edge_walks_the_viewport() {
    let mut state = sheet();
    let mut ui = view();
    let mut frames = ManualScheduler::new();

    let start = center(&ui, 1, 1);
    ui.on_pointer_down(&mut state, &PointerEvent::primary(start.x, start.y));

    // Bottom of the viewport: full drive, 32px per frame.
    ui.on_pointer_move(&mut state, PointerPos::new(90.0, 124.0), &mut frames);
    assert!(frames.take());

    ui.on_frame(&mut state, &mut frames);
    assert_eq!(ui.geometry.scroll_y, 32.0);
    assert_eq!(state.selection_range(), Some(GridRange::new(1, 1, 6, 1)));
    // Auto-scroll keeps the frame loop alive.
    assert!(frames.take());

    ui.on_frame(&mut state, &mut frames);
    assert_eq!(ui.geometry.scroll_y, 64.0);
    assert_eq!(state.selection_range(), Some(GridRange::new(1, 1, 8, 1)));
    assert!(frames.take());

    // Back inside the body the scrolling stops and the loop winds down.
    ui.on_pointer_move(&mut state, PointerPos::new(90.0, 74.0), &mut frames);
    ui.on_frame(&mut state, &mut frames);
    assert_eq!(ui.geometry.scroll_y, 64.0);
    assert_eq!(state.selection_range(), Some(GridRange::new(1, 1, 5, 1)));
    assert!(!frames.take());

    ui.on_pointer_up(&mut state);
    assert_eq!(state.selection_range(), Some(GridRange::new(1, 1, 5, 1)));
}
