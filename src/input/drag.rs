//! Drag strategies: block, canvas (pan), and bubble.
//!
//! A single closed enum rather than a trait object; the gesture selects
//! exactly one variant when classification runs and drives it for the rest
//! of its life. Every strategy is a fresh value per gesture and holds only
//! the drag's origin state plus ids; everything else is looked up against
//! the workspace on each event.

use kurbo::{Point, Vec2};
use tracing::{debug, trace};

use crate::bump;
use crate::checker;
use crate::constants::SNAP_RADIUS;
use crate::error::{ContractViolation, WsResult};
use crate::events::EventKind;
use crate::input::state::GesturePhase;
use crate::types::{BlockId, BubbleId, ConnectionId, ConnectionKind, Modifiers, Tracking};
use crate::workspace::Workspace;

/// The best connection pairing found for the dragged stack so far. Doubles
/// as the insertion-marker position: the renderer draws its ghost at
/// `neighbour` while one of these is current.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectionCandidate {
    /// Connection on the dragged stack.
    pub local: ConnectionId,
    /// Compatible connection elsewhere on the workspace.
    pub neighbour: ConnectionId,
    pub distance: f64,
}

/// The active drag strategy of one gesture.
#[derive(Debug)]
pub enum Dragger {
    Block(BlockDragger),
    Canvas(CanvasDragger),
    Bubble(BubbleDragger),
}

impl Dragger {
    pub fn phase(&self) -> GesturePhase {
        match self {
            Self::Block(_) => GesturePhase::DraggingBlock,
            Self::Canvas(_) => GesturePhase::DraggingCanvas,
            Self::Bubble(_) => GesturePhase::DraggingBubble,
        }
    }

    pub fn dragged_block(&self) -> Option<BlockId> {
        match self {
            Self::Block(d) => Some(d.block),
            _ => None,
        }
    }

    pub fn insertion_candidate(&self) -> Option<&ConnectionCandidate> {
        match self {
            Self::Block(d) => d.candidate.as_ref(),
            _ => None,
        }
    }

    pub(crate) fn start(&mut self, ws: &mut Workspace, modifiers: Modifiers) -> WsResult<()> {
        match self {
            Self::Block(d) => d.start(ws, modifiers),
            Self::Canvas(d) => d.start(ws),
            Self::Bubble(d) => d.start(ws),
        }
    }

    pub(crate) fn drag(
        &mut self,
        ws: &mut Workspace,
        delta_ws: Vec2,
        delta_screen: Vec2,
    ) -> WsResult<()> {
        match self {
            Self::Block(d) => d.drag(ws, delta_ws),
            Self::Canvas(d) => d.drag(ws, delta_screen),
            Self::Bubble(d) => d.drag(ws, delta_ws),
        }
    }

    pub(crate) fn end(
        &mut self,
        ws: &mut Workspace,
        delta_ws: Vec2,
        delta_screen: Vec2,
    ) -> WsResult<()> {
        match self {
            Self::Block(d) => d.end(ws, delta_ws),
            Self::Canvas(d) => d.end(ws, delta_screen),
            Self::Bubble(d) => d.end(ws, delta_ws),
        }
    }
}

// ============================================================================
// Block drag
// ============================================================================

/// Drags a block (and its attached subtree), searching for a compatible
/// connection to snap onto as it moves.
#[derive(Debug)]
pub struct BlockDragger {
    pub(crate) block: BlockId,
    /// Block origin at drag start; moves are absolute from here.
    start_pos: Point,
    /// Free connections of the dragged stack eligible to snap.
    available: Vec<ConnectionId>,
    pub(crate) candidate: Option<ConnectionCandidate>,
}

impl BlockDragger {
    pub(crate) fn new(block: BlockId) -> Self {
        Self {
            block,
            start_pos: Point::ZERO,
            available: Vec::new(),
            candidate: None,
        }
    }

    fn start(&mut self, ws: &mut Workspace, modifiers: Modifiers) -> WsResult<()> {
        self.start_pos = ws
            .block(self.block)
            .ok_or(ContractViolation::StaleId("dragged block"))?
            .pos;
        // One group spans the whole drag, so detach + reattach + any bump
        // undo atomically. If starting fails the group must not stay open.
        ws.begin_group();
        let result = self.start_steps(ws, modifiers);
        if result.is_err() {
            ws.end_group();
        }
        result
    }

    fn start_steps(&mut self, ws: &mut Workspace, modifiers: Modifiers) -> WsResult<()> {
        self.detach(ws, modifiers)?;

        // The dragged stack must not be a connect target for itself.
        for b in ws.subtree(self.block) {
            let conns: Vec<ConnectionId> = ws
                .block(b)
                .map(|blk| blk.connections.to_vec())
                .unwrap_or_default();
            for cid in conns {
                ws.set_tracking(cid, Tracking::Untracked)?;
            }
        }

        self.available = self.collect_available(ws);
        debug!(block = ?self.block, available = self.available.len(), "block drag started");
        Ok(())
    }

    /// Pull the block off its parent. With heal-the-stack modifiers, the
    /// block's following stack stays behind and is reattached to the parent;
    /// otherwise the gap is left open and the stack travels with the block.
    fn detach(&mut self, ws: &mut Workspace, modifiers: Modifiers) -> WsResult<()> {
        let Some((child_conn, parent_conn)) = ws.parent_connection_of(self.block) else {
            return Ok(());
        };

        let heal = modifiers.heals_stack()
            && ws
                .connection(child_conn)
                .is_some_and(|c| c.kind == ConnectionKind::Previous);
        let follower = if heal {
            self.next_connection(ws)
                .and_then(|next| ws.connection(next).and_then(|c| c.partner.map(|p| (next, p))))
        } else {
            None
        };

        ws.disconnect(child_conn)?;
        if let Some((next_conn, follower_prev)) = follower {
            ws.disconnect(next_conn)?;
            ws.connect(parent_conn, follower_prev)?;
        }
        Ok(())
    }

    fn next_connection(&self, ws: &Workspace) -> Option<ConnectionId> {
        ws.block(self.block)?
            .connections
            .iter()
            .copied()
            .find(|cid| {
                ws.connection(*cid)
                    .is_some_and(|c| c.kind == ConnectionKind::Next)
            })
    }

    /// Connections of the dragged stack that may snap onto the rest of the
    /// diagram: the root's free previous/output, plus the trailing free next
    /// of the last block in the stack (so a dragged stack can insert above
    /// an existing one). Inner inputs never connect outward mid-drag.
    fn collect_available(&self, ws: &Workspace) -> Vec<ConnectionId> {
        let mut out = Vec::new();
        if let Some(blk) = ws.block(self.block) {
            for cid in &blk.connections {
                if let Some(conn) = ws.connection(*cid)
                    && matches!(
                        conn.kind,
                        ConnectionKind::Previous | ConnectionKind::Output
                    )
                    && !conn.is_connected()
                {
                    out.push(*cid);
                }
            }
        }
        let last = ws.last_in_stack(self.block);
        if let Some(blk) = ws.block(last) {
            for cid in &blk.connections {
                if let Some(conn) = ws.connection(*cid)
                    && conn.kind == ConnectionKind::Next
                    && !conn.is_connected()
                {
                    out.push(*cid);
                }
            }
        }
        out
    }

    fn drag(&mut self, ws: &mut Workspace, delta: Vec2) -> WsResult<()> {
        ws.move_block_to(self.block, self.start_pos + delta)?;
        self.update_candidate(ws);
        trace!(block = ?self.block, candidate = ?self.candidate, "block drag moved");
        Ok(())
    }

    fn update_candidate(&mut self, ws: &Workspace) {
        let mut best: Option<ConnectionCandidate> = None;
        for &local in &self.available {
            if let Some((neighbour, distance)) = ws.nearest_compatible(local, SNAP_RADIUS) {
                let better = match &best {
                    None => true,
                    Some(b) => distance < b.distance,
                };
                if better {
                    best = Some(ConnectionCandidate {
                        local,
                        neighbour,
                        distance,
                    });
                }
            }
        }
        self.candidate = best;
    }

    fn end(&mut self, ws: &mut Workspace, delta: Vec2) -> WsResult<()> {
        let result = self.end_steps(ws, delta);
        ws.end_group();
        result
    }

    fn end_steps(&mut self, ws: &mut Workspace, delta: Vec2) -> WsResult<()> {
        // A cancel may arrive without a final move; settle at the last known
        // displacement either way.
        ws.move_block_to(self.block, self.start_pos + delta)?;

        // The stack rejoins the searchable world before any reattachment.
        for b in ws.subtree(self.block) {
            let conns: Vec<ConnectionId> = ws
                .block(b)
                .map(|blk| blk.connections.to_vec())
                .unwrap_or_default();
            for cid in conns {
                if ws.connection(cid).is_some_and(|c| !c.is_connected()) {
                    ws.set_tracking(cid, Tracking::Tracked)?;
                }
            }
        }

        let to = self.start_pos + delta;
        if to != self.start_pos {
            ws.push_event(EventKind::BlockMoved {
                block: self.block,
                from: self.start_pos,
                to,
            });
        }

        match self.candidate.take() {
            Some(c) if checker::can_connect(ws, c.local, c.neighbour, true) => {
                ws.connect(c.neighbour, c.local)?;
                debug!(block = ?self.block, "block drag connected");
            }
            Some(_) => {
                // The candidate went stale between the last move and the
                // release; degrade to a plain drop plus bump.
                bump::bump_neighbours(ws, self.block);
                debug!(block = ?self.block, "block drag dropped; stale candidate bumped");
            }
            None => {
                if bump::overlaps_neighbour(ws, self.block) {
                    bump::bump_neighbours(ws, self.block);
                }
                debug!(block = ?self.block, "block drag dropped detached");
            }
        }
        Ok(())
    }
}

// ============================================================================
// Canvas drag (panning)
// ============================================================================

/// Pans the surface origin. No connection machinery involved.
#[derive(Debug)]
pub struct CanvasDragger {
    start_pan: Vec2,
}

impl CanvasDragger {
    pub(crate) fn new() -> Self {
        Self {
            start_pan: Vec2::ZERO,
        }
    }

    fn start(&mut self, ws: &mut Workspace) -> WsResult<()> {
        self.start_pan = ws.view.pan;
        debug!("canvas drag started");
        Ok(())
    }

    fn drag(&mut self, ws: &mut Workspace, delta_screen: Vec2) -> WsResult<()> {
        ws.view.pan = self.start_pan + delta_screen;
        Ok(())
    }

    fn end(&mut self, ws: &mut Workspace, delta_screen: Vec2) -> WsResult<()> {
        ws.view.pan = self.start_pan + delta_screen;
        ws.push_event(EventKind::ViewportMoved {
            offset: ws.view.pan,
        });
        debug!(pan = ?ws.view.pan, "canvas drag ended");
        Ok(())
    }
}

// ============================================================================
// Bubble drag
// ============================================================================

/// Drags a floating bubble; on release the owner block learns the bubble's
/// new anchor offset.
#[derive(Debug)]
pub struct BubbleDragger {
    bubble: BubbleId,
    start_pos: Point,
}

impl BubbleDragger {
    pub(crate) fn new(bubble: BubbleId) -> Self {
        Self {
            bubble,
            start_pos: Point::ZERO,
        }
    }

    fn start(&mut self, ws: &mut Workspace) -> WsResult<()> {
        self.start_pos = ws
            .bubble(self.bubble)
            .ok_or(ContractViolation::StaleId("dragged bubble"))?
            .pos;
        debug!(bubble = ?self.bubble, "bubble drag started");
        Ok(())
    }

    fn drag(&mut self, ws: &mut Workspace, delta: Vec2) -> WsResult<()> {
        ws.move_bubble(self.bubble, self.start_pos + delta)
    }

    fn end(&mut self, ws: &mut Workspace, delta: Vec2) -> WsResult<()> {
        ws.move_bubble(self.bubble, self.start_pos + delta)?;
        let Some(bubble) = ws.bubble(self.bubble) else {
            return Ok(());
        };
        let (id, owner, pos) = (bubble.id, bubble.owner, bubble.pos);
        let Some(owner_pos) = ws.block(owner).map(|b| b.pos) else {
            return Ok(());
        };
        ws.push_event(EventKind::BubbleMoved {
            bubble: id,
            owner,
            anchor: pos - owner_pos,
        });
        debug!(bubble = ?id, "bubble drag ended");
        Ok(())
    }
}
