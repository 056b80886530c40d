//! Collision resolution ("bump").
//!
//! When a block is dropped without a usable connection target, or a connect
//! displaces a previously attached block, the orphan must not be left
//! visually stacked on its neighbour. The resolver finds the obstructing
//! connection, then queues a deferred nudge of the orphan's root block away
//! from it: magnitude `SNAP_RADIUS + jitter`, direction away from the
//! obstruction. The delay keeps the nudge from reading as instantaneous
//! jitter and lets it join the event group of the disconnect that caused it.
//!
//! The deferred task re-checks liveness by id before acting; a bump whose
//! block (or obstruction) has since been disposed is a silent no-op.

use kurbo::Vec2;
use rand::Rng;
use tracing::{debug, trace};

use crate::constants::{BUMP_DELAY_MS, BUMP_JITTER, SNAP_RADIUS};
use crate::events::EventKind;
use crate::scheduler::Task;
use crate::types::{BlockId, ConnectionId, GroupId};
use crate::workspace::Workspace;
use crate::checker;

/// Queue bumps for every connection of `block`'s subtree that sits within
/// snap radius of an incompatible neighbour. Called after a drop that made
/// no connection, and after a failed connect attempt.
pub fn bump_neighbours(ws: &mut Workspace, block: BlockId) {
    let group = ws.current_group();
    let subtree = ws.subtree(block);
    for b in &subtree {
        let conn_ids: Vec<ConnectionId> = ws
            .block(*b)
            .map(|blk| blk.connections.to_vec())
            .unwrap_or_default();
        for cid in conn_ids {
            let Some(conn) = ws.connection(cid) else {
                continue;
            };
            if conn.is_connected() {
                continue;
            }
            let (kind, pos) = (conn.kind, conn.pos);
            let neighbours = ws.db(kind.opposite()).neighbours_within(pos, SNAP_RADIUS);
            for neighbour in neighbours {
                if checker::can_connect(ws, cid, neighbour, false) {
                    // A connectable neighbour is not an obstruction.
                    continue;
                }
                schedule_bump(ws, cid, neighbour, group);
                break;
            }
        }
    }
}

/// Decide which side moves and queue the deferred nudge. The orphan (the
/// side that just lost its connection) bumps; if its root is not movable,
/// the roles invert and the other side bumps instead.
fn schedule_bump(
    ws: &mut Workspace,
    orphan_conn: ConnectionId,
    obstruction: ConnectionId,
    group: Option<GroupId>,
) {
    let Some(orphan_owner) = ws.connection(orphan_conn).map(|c| c.owner) else {
        return;
    };
    let orphan_root = ws.root_of(orphan_owner);
    let (block, away_from) = if ws.block(orphan_root).is_some_and(|b| b.movable) {
        (orphan_root, obstruction)
    } else {
        // Roles invert: bump the obstructing side away from the orphan.
        let Some(other_owner) = ws.connection(obstruction).map(|c| c.owner) else {
            return;
        };
        let other_root = ws.root_of(other_owner);
        if ws.block(other_root).is_none_or(|b| !b.movable) {
            trace!(?orphan_conn, ?obstruction, "neither side movable; no bump");
            return;
        }
        (other_root, orphan_conn)
    };
    debug!(?block, ?away_from, "bump scheduled");
    ws.schedule_in(
        BUMP_DELAY_MS,
        Task::BumpBlock {
            block,
            away_from,
            group,
        },
    );
}

/// Deferred half of a bump. Re-checks liveness: the block and the
/// obstructing connection must still exist, the block must still be a root
/// (an orphan that got connected in the meantime no longer needs nudging),
/// and it must still be movable.
pub(crate) fn execute_bump(
    ws: &mut Workspace,
    block: BlockId,
    away_from: ConnectionId,
    group: Option<GroupId>,
) {
    let Some(blk) = ws.block(block) else {
        trace!(?block, "bump target disposed; skipping");
        return;
    };
    if !blk.movable || ws.root_of(block) != block {
        trace!(?block, "bump target no longer a movable root; skipping");
        return;
    }
    let Some(obstruction_pos) = ws.connection(away_from).map(|c| c.pos) else {
        trace!(?away_from, "obstruction disposed; skipping bump");
        return;
    };

    // Direction away from the obstruction, from the orphan's nearest free
    // connection (falling back to the block origin).
    let reference = ws
        .block(block)
        .map(|b| {
            b.connections
                .iter()
                .filter_map(|cid| ws.connection(*cid))
                .filter(|c| !c.is_connected())
                .map(|c| c.pos)
                .min_by(|a, b| {
                    a.distance(obstruction_pos)
                        .total_cmp(&b.distance(obstruction_pos))
                })
                .unwrap_or(b.pos)
        })
        .unwrap_or(obstruction_pos);

    let away = reference - obstruction_pos;
    let direction = if away.hypot() > f64::EPSILON {
        away / away.hypot()
    } else {
        // Coincident points: nudge down the stacking direction, horizontal
        // component mirrored in RTL layouts.
        let x = if ws.rtl { -1.0 } else { 1.0 };
        Vec2::new(x, 1.0) / std::f64::consts::SQRT_2
    };

    let jitter = rand::thread_rng().gen_range(0.0..BUMP_JITTER);
    let delta = direction * (SNAP_RADIUS + jitter);

    let from = match ws.block(block) {
        Some(b) => b.pos,
        None => return,
    };
    if ws.translate_block(block, delta).is_err() {
        return;
    }
    ws.push_event_grouped(
        EventKind::BlockMoved {
            block,
            from,
            to: from + delta,
        },
        group,
    );
    debug!(?block, ?delta, "bumped");
}

/// Whether `block`'s bounds overlap any block outside its own subtree.
/// Used at drop time to decide if a detached block needs a bump even though
/// no connection is within snap radius.
pub fn overlaps_neighbour(ws: &Workspace, block: BlockId) -> bool {
    let Some(bounds) = ws.block(block).map(|b| b.bounds()) else {
        return false;
    };
    let subtree = ws.subtree(block);
    !ws.block_index()
        .overlapping(bounds, |b| subtree.contains(&b))
        .is_empty()
}
