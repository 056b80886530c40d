//! Click-vs-drag classification and click routing.

use kurbo::Point;
use snapblocks::{
    EventKind, GesturePhase, GestureSurface, HitTarget, PointerButton, PointerEvent,
};

use crate::helpers::*;

#[test]
fn test_press_release_in_place_is_a_click() {
    let (mut ws, ids) = TestWorkspaceBuilder::new()
        .with_block(stack_block(0.0, 0.0))
        .build();
    click(&mut ws, HitTarget::Block(ids[0]), Point::new(10.0, 10.0));

    let events = ws.take_events();
    assert_eq!(events.len(), 1);
    assert_eq!(
        events[0].kind,
        EventKind::Click {
            target: HitTarget::Block(ids[0])
        }
    );
    assert_eq!(ws.block(ids[0]).unwrap().pos, Point::ZERO);
}

#[test]
fn test_move_of_exactly_the_radius_is_still_a_click() {
    let (mut ws, ids) = TestWorkspaceBuilder::new()
        .with_block(stack_block(0.0, 0.0))
        .build();
    // 8.0 is the canvas threshold; the classifier requires strictly more.
    drag(
        &mut ws,
        HitTarget::Block(ids[0]),
        Point::new(10.0, 10.0),
        Point::new(18.0, 10.0),
    );

    let events = ws.take_events();
    assert!(events
        .iter()
        .any(|e| matches!(e.kind, EventKind::Click { .. })));
    assert!(!events
        .iter()
        .any(|e| matches!(e.kind, EventKind::BlockMoved { .. })));
}

#[test]
fn test_move_just_past_the_radius_is_a_drag_not_a_click() {
    let (mut ws, ids) = TestWorkspaceBuilder::new()
        .with_block(stack_block(0.0, 0.0))
        .build();
    drag(
        &mut ws,
        HitTarget::Block(ids[0]),
        Point::new(10.0, 10.0),
        Point::new(19.0, 10.0),
    );

    let events = ws.take_events();
    assert!(!events
        .iter()
        .any(|e| matches!(e.kind, EventKind::Click { .. })));
    assert!(events
        .iter()
        .any(|e| matches!(e.kind, EventKind::BlockMoved { .. })));
    assert_eq!(ws.block(ids[0]).unwrap().pos, Point::new(9.0, 0.0));
}

#[test]
fn test_clickable_field_beats_its_block() {
    let (mut ws, ids) = TestWorkspaceBuilder::new()
        .with_block(stack_block(0.0, 0.0).with_field("dropdown", true))
        .build();
    click(
        &mut ws,
        HitTarget::Field {
            block: ids[0],
            field: 0,
        },
        Point::new(10.0, 10.0),
    );
    let events = ws.take_events();
    assert_eq!(
        events[0].kind,
        EventKind::Click {
            target: HitTarget::Field {
                block: ids[0],
                field: 0
            }
        }
    );
}

#[test]
fn test_inert_field_falls_through_to_its_block() {
    let (mut ws, ids) = TestWorkspaceBuilder::new()
        .with_block(stack_block(0.0, 0.0).with_field("label", false))
        .build();
    click(
        &mut ws,
        HitTarget::Field {
            block: ids[0],
            field: 0,
        },
        Point::new(10.0, 10.0),
    );
    let events = ws.take_events();
    assert_eq!(
        events[0].kind,
        EventKind::Click {
            target: HitTarget::Block(ids[0])
        }
    );
}

#[test]
fn test_click_on_an_immovable_block_still_fires() {
    let (mut ws, ids) = TestWorkspaceBuilder::new()
        .with_block(stack_block(0.0, 0.0).immovable())
        .build();
    click(&mut ws, HitTarget::Block(ids[0]), Point::new(10.0, 10.0));
    assert!(matches!(
        ws.take_events()[0].kind,
        EventKind::Click { .. }
    ));
}

#[test]
fn test_right_click_short_circuits_to_context_menu() {
    let (mut ws, ids) = TestWorkspaceBuilder::new()
        .with_block(stack_block(0.0, 0.0).with_field("label", true))
        .build();
    let mut down = PointerEvent::primary(10.0, 10.0);
    down.button = PointerButton::Secondary;
    ws.pointer_down(
        down,
        HitTarget::Field {
            block: ids[0],
            field: 0,
        },
        GestureSurface::Main,
    )
    .unwrap();

    // No gesture starts, and the target collapses to the block.
    assert!(ws.active_gesture().is_none());
    assert_eq!(
        ws.take_events()[0].kind,
        EventKind::ContextMenu {
            target: HitTarget::Block(ids[0])
        }
    );
}

#[test]
fn test_events_from_other_pointers_are_ignored() {
    let (mut ws, ids) = TestWorkspaceBuilder::new()
        .with_block(stack_block(0.0, 0.0))
        .build();
    let down = PointerEvent::primary(10.0, 10.0);
    ws.pointer_down(down, HitTarget::Block(ids[0]), GestureSurface::Main)
        .unwrap();

    // A second finger lands and roams; the first gesture must not notice.
    let mut second_down = PointerEvent::primary(400.0, 400.0);
    second_down.pointer_id = 7;
    ws.pointer_down(second_down, HitTarget::Workspace, GestureSurface::Main)
        .unwrap();
    let mut second_move = PointerEvent::primary(600.0, 600.0);
    second_move.pointer_id = 7;
    ws.pointer_move(second_move).unwrap();
    let mut second_up = PointerEvent::primary(600.0, 600.0);
    second_up.pointer_id = 7;
    ws.pointer_up(second_up).unwrap();

    let gesture = ws.active_gesture().unwrap();
    assert_eq!(gesture.phase(), GesturePhase::Pending);

    ws.pointer_up(down).unwrap();
    assert!(ws.active_gesture().is_none());
    assert_eq!(
        ws.take_events(),
        vec![snapblocks::WorkspaceEvent {
            group: None,
            kind: EventKind::Click {
                target: HitTarget::Block(ids[0])
            }
        }]
    );
    assert_eq!(ws.block(ids[0]).unwrap().pos, Point::ZERO);
}

#[test]
fn test_flyout_uses_the_smaller_threshold() {
    let (mut ws, ids) = TestWorkspaceBuilder::new()
        .with_block(value_block(0.0, 0.0).in_flyout())
        .build();
    let down = PointerEvent::primary(10.0, 10.0);
    ws.pointer_down(down, HitTarget::Block(ids[0]), GestureSurface::Flyout)
        .unwrap();

    // 6 units: below the canvas radius, above the flyout radius.
    ws.pointer_move(PointerEvent::primary(16.0, 10.0)).unwrap();
    let gesture = ws.active_gesture().unwrap();
    assert_eq!(gesture.phase(), GesturePhase::DraggingBlock);

    // The drag operates on a fresh copy, not the palette template.
    let copy = gesture.dragged_block().unwrap();
    assert_ne!(copy, ids[0]);
    ws.pointer_up(PointerEvent::primary(16.0, 10.0)).unwrap();

    assert!(ws.block(ids[0]).unwrap().in_flyout);
    assert_eq!(ws.block(copy).unwrap().pos, Point::new(16.0, 10.0));
    let events = ws.take_events();
    assert!(events.iter().any(|e| matches!(
        e.kind,
        EventKind::BlockCreated { block, from_flyout: true } if block == copy
    )));
}

#[test]
fn test_same_move_on_the_main_canvas_is_still_a_click() {
    let (mut ws, ids) = TestWorkspaceBuilder::new()
        .with_block(stack_block(0.0, 0.0))
        .build();
    drag(
        &mut ws,
        HitTarget::Block(ids[0]),
        Point::new(10.0, 10.0),
        Point::new(16.0, 10.0),
    );
    assert!(matches!(
        ws.take_events()[0].kind,
        EventKind::Click { .. }
    ));
}
