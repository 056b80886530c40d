//! Canvas panning and zoom-aware drag geometry.

use kurbo::{Point, Vec2};
use snapblocks::{EventKind, GestureSurface, HitTarget, PointerEvent};

use crate::helpers::*;

#[test]
fn test_canvas_drag_pans_the_view() {
    let (mut ws, _) = TestWorkspaceBuilder::new()
        .with_block(stack_block(0.0, 0.0))
        .build();
    drag(
        &mut ws,
        HitTarget::Workspace,
        Point::new(200.0, 200.0),
        Point::new(250.0, 180.0),
    );

    assert_eq!(ws.view.pan, Vec2::new(50.0, -20.0));
    let events = ws.take_events();
    assert_eq!(events.len(), 1);
    assert_eq!(
        events[0].kind,
        EventKind::ViewportMoved {
            offset: Vec2::new(50.0, -20.0)
        }
    );
}

#[test]
fn test_panning_never_moves_blocks() {
    let (mut ws, ids) = TestWorkspaceBuilder::new()
        .with_block(stack_block(0.0, 0.0))
        .build();
    drag(
        &mut ws,
        HitTarget::Workspace,
        Point::new(200.0, 200.0),
        Point::new(500.0, 500.0),
    );
    assert_eq!(ws.block(ids[0]).unwrap().pos, Point::ZERO);
}

#[test]
fn test_non_pannable_workspace_stays_put() {
    let (mut ws, _) = TestWorkspaceBuilder::new().without_panning().build();
    drag(
        &mut ws,
        HitTarget::Workspace,
        Point::new(200.0, 200.0),
        Point::new(500.0, 500.0),
    );
    assert_eq!(ws.view.pan, Vec2::ZERO);
    // The gesture left the click radius, so it resolves as nothing at all.
    assert!(ws.take_events().is_empty());
}

#[test]
fn test_pan_is_not_scaled_by_zoom() {
    let (mut ws, _) = TestWorkspaceBuilder::new().build();
    ws.view.set_zoom(2.0);
    drag(
        &mut ws,
        HitTarget::Workspace,
        Point::new(0.0, 0.0),
        Point::new(100.0, 0.0),
    );
    assert_eq!(ws.view.pan, Vec2::new(100.0, 0.0));
}

#[test]
fn test_block_drag_distance_is_scaled_by_zoom() {
    let (mut ws, ids) = TestWorkspaceBuilder::new()
        .with_block(stack_block(0.0, 0.0))
        .build();
    ws.view.set_zoom(2.0);

    // 108 screen units at 2x zoom is 54 workspace units.
    drag(
        &mut ws,
        HitTarget::Block(ids[0]),
        Point::new(0.0, 0.0),
        Point::new(108.0, 0.0),
    );
    assert_eq!(ws.block(ids[0]).unwrap().pos, Point::new(54.0, 0.0));
}

#[test]
fn test_drag_threshold_is_screen_space() {
    let (mut ws, ids) = TestWorkspaceBuilder::new()
        .with_block(stack_block(0.0, 0.0))
        .build();
    // Zoomed far out, 7 screen units would be a huge workspace distance; it
    // still must not classify as a drag.
    ws.view.set_zoom(0.1);
    drag(
        &mut ws,
        HitTarget::Block(ids[0]),
        Point::new(10.0, 10.0),
        Point::new(17.0, 10.0),
    );
    assert!(matches!(
        ws.take_events()[0].kind,
        EventKind::Click { .. }
    ));
    assert_eq!(ws.block(ids[0]).unwrap().pos, Point::ZERO);
}

#[test]
fn test_flyout_drop_lands_at_the_pointer_in_workspace_units() {
    let (mut ws, ids) = TestWorkspaceBuilder::new()
        .with_block(value_block(0.0, 0.0).in_flyout())
        .build();
    ws.view.pan = Vec2::new(100.0, 0.0);
    ws.view.set_zoom(2.0);

    let down = PointerEvent::primary(300.0, 40.0);
    ws.pointer_down(down, HitTarget::Block(ids[0]), GestureSurface::Flyout)
        .unwrap();
    ws.pointer_move(PointerEvent::primary(320.0, 40.0)).unwrap();
    let copy = ws.active_gesture().unwrap().dragged_block().unwrap();
    ws.pointer_up(PointerEvent::primary(320.0, 40.0)).unwrap();

    // Down-point (300, 40) maps to ((300 - 100) / 2, 40 / 2) = (100, 20);
    // the 20-unit screen move adds 10 workspace units.
    assert_eq!(ws.block(copy).unwrap().pos, Point::new(110.0, 20.0));
}
