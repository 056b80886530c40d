//! Deferred-work behaviour through `Workspace::advance_time`: staggering,
//! liveness re-checks, and cancellation.

use snapblocks::{ConnectionKind, EventKind};

use crate::helpers::*;

#[test]
fn test_staggered_disposal_runs_one_per_interval() {
    let (mut ws, ids) = TestWorkspaceBuilder::new()
        .with_block(stack_block(0.0, 0.0))
        .with_block(stack_block(0.0, 100.0))
        .with_block(stack_block(0.0, 200.0))
        .build();
    ws.dispose_blocks_staggered(&ids);
    assert_eq!(ws.block_count(), 3);

    ws.advance_time(0);
    assert_eq!(ws.block_count(), 2);
    ws.advance_time(10);
    assert_eq!(ws.block_count(), 1);
    ws.advance_time(10);
    assert_eq!(ws.block_count(), 0);
    assert!(ws.scheduler().is_idle());
}

#[test]
fn test_synchronous_dispose_cancels_pending_work_for_that_block() {
    let (mut ws, ids) = TestWorkspaceBuilder::new()
        .with_block(stack_block(0.0, 0.0))
        .build();
    ws.dispose_blocks_staggered(&ids);
    ws.dispose_block(ids[0]).unwrap();
    assert!(ws.scheduler().is_idle());

    // Nothing left to run; advancing is a no-op.
    ws.take_events();
    ws.advance_time(100);
    assert!(ws.take_events().is_empty());
}

#[test]
fn test_bump_does_not_fire_before_its_delay() {
    let (mut ws, ids) = TestWorkspaceBuilder::new()
        .with_block(socket_block(0.0, 0.0))
        .with_block(value_block(300.0, 0.0))
        .with_block(value_block(300.0, 300.0))
        .build();
    let input = conn_of(&ws, ids[0], ConnectionKind::Input);
    ws.connect(input, conn_of(&ws, ids[1], ConnectionKind::Output))
        .unwrap();
    ws.connect(input, conn_of(&ws, ids[2], ConnectionKind::Output))
        .unwrap();
    ws.take_events();
    assert_eq!(ws.scheduler().pending(), 1);

    let pos_before = ws.block(ids[1]).unwrap().pos;
    ws.advance_time(249);
    assert_eq!(ws.block(ids[1]).unwrap().pos, pos_before);
    ws.advance_time(1);
    assert_ne!(ws.block(ids[1]).unwrap().pos, pos_before);
}

#[test]
fn test_bump_whose_block_was_disposed_is_a_silent_no_op() {
    let (mut ws, ids) = TestWorkspaceBuilder::new()
        .with_block(socket_block(0.0, 0.0))
        .with_block(value_block(300.0, 0.0))
        .with_block(value_block(300.0, 300.0))
        .build();
    let input = conn_of(&ws, ids[0], ConnectionKind::Input);
    ws.connect(input, conn_of(&ws, ids[1], ConnectionKind::Output))
        .unwrap();
    ws.connect(input, conn_of(&ws, ids[2], ConnectionKind::Output))
        .unwrap();

    ws.dispose_block(ids[1]).unwrap();
    ws.take_events();
    ws.advance_time(250);
    assert!(ws.take_events().is_empty());
}

#[test]
fn test_bump_whose_obstruction_was_disposed_is_a_silent_no_op() {
    let (mut ws, ids) = TestWorkspaceBuilder::new()
        .with_block(socket_block(0.0, 0.0))
        .with_block(value_block(300.0, 0.0))
        .with_block(value_block(300.0, 300.0))
        .build();
    let input = conn_of(&ws, ids[0], ConnectionKind::Input);
    ws.connect(input, conn_of(&ws, ids[1], ConnectionKind::Output))
        .unwrap();
    ws.connect(input, conn_of(&ws, ids[2], ConnectionKind::Output))
        .unwrap();

    // Disposing the parent takes the obstructing connection with it; the
    // displaced block keeps its position.
    ws.dispose_block(ids[0]).unwrap();
    let pos_before = ws.block(ids[1]).unwrap().pos;
    ws.take_events();
    ws.advance_time(250);
    assert!(ws
        .take_events()
        .iter()
        .all(|e| !matches!(e.kind, EventKind::BlockMoved { .. })));
    assert_eq!(ws.block(ids[1]).unwrap().pos, pos_before);
}

#[test]
fn test_bump_of_a_block_that_got_reconnected_is_skipped() {
    let (mut ws, ids) = TestWorkspaceBuilder::new()
        .with_block(socket_block(0.0, 0.0))
        .with_block(value_block(300.0, 0.0))
        .with_block(value_block(300.0, 300.0))
        .with_block(socket_block(0.0, 500.0))
        .build();
    let input = conn_of(&ws, ids[0], ConnectionKind::Input);
    let first_out = conn_of(&ws, ids[1], ConnectionKind::Output);
    ws.connect(input, first_out).unwrap();
    ws.connect(input, conn_of(&ws, ids[2], ConnectionKind::Output))
        .unwrap();

    // Before the bump fires, the displaced block finds a new home. Once it is
    // no longer a root, the nudge is obsolete.
    ws.connect(conn_of(&ws, ids[3], ConnectionKind::Input), first_out)
        .unwrap();
    let pos_before = ws.block(ids[1]).unwrap().pos;
    ws.take_events();
    ws.advance_time(250);
    assert_eq!(ws.block(ids[1]).unwrap().pos, pos_before);
}
