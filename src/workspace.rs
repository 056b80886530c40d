//! The workspace context: registries, indices, scheduler, and event log.
//!
//! Every component that needs shared state receives `&Workspace` (or `&mut`)
//! explicitly; there is no process-wide registry or hidden singleton. All
//! cross-references are ids resolved against the live registries here, which
//! is what makes deferred callbacks safe: a stale id simply fails to
//! resolve.
//!
//! The model is single-threaded and event-driven. All work for one pointer
//! event runs to completion before the next is processed, so no locking is
//! needed; within one event handler, collections are snapshotted before
//! destructive iteration instead.

use std::collections::HashMap;

use kurbo::{Point, Vec2};
use smallvec::SmallVec;
use tracing::{debug, trace, warn};

use crate::block::{Block, BlockTemplate, ConnectionTemplate};
use crate::checker;
use crate::connection::Connection;
use crate::connection_db::ConnectionDb;
use crate::constants::{BUMP_DELAY_MS, DISPOSE_STAGGER_MS};
use crate::error::{ContractViolation, WsResult};
use crate::events::{EventKind, EventLog, WorkspaceEvent};
use crate::input::coords::ViewTransform;
use crate::input::gesture::Gesture;
use crate::scheduler::{Scheduler, Task};
use crate::spatial_index::BlockIndex;
use crate::types::{BlockId, BubbleId, ConnectionId, ConnectionKind, GroupId, IdGen, Tracking};

/// A floating auxiliary element (comment, warning, mutator) anchored to a
/// block. Dragging one never involves the connection machinery.
#[derive(Debug, Clone)]
pub struct Bubble {
    pub id: BubbleId,
    pub owner: BlockId,
    /// Position in workspace units.
    pub pos: Point,
}

/// One `ConnectionDb` per connection kind.
#[derive(Debug, Default)]
struct Dbs {
    input: ConnectionDb,
    output: ConnectionDb,
    previous: ConnectionDb,
    next: ConnectionDb,
}

impl Dbs {
    fn get(&self, kind: ConnectionKind) -> &ConnectionDb {
        match kind {
            ConnectionKind::Input => &self.input,
            ConnectionKind::Output => &self.output,
            ConnectionKind::Previous => &self.previous,
            ConnectionKind::Next => &self.next,
        }
    }

    fn get_mut(&mut self, kind: ConnectionKind) -> &mut ConnectionDb {
        match kind {
            ConnectionKind::Input => &mut self.input,
            ConnectionKind::Output => &mut self.output,
            ConnectionKind::Previous => &mut self.previous,
            ConnectionKind::Next => &mut self.next,
        }
    }
}

/// The per-workspace interaction context.
#[derive(Debug, Default)]
pub struct Workspace {
    pub(crate) ids: IdGen,
    blocks: HashMap<BlockId, Block>,
    connections: HashMap<ConnectionId, Connection>,
    bubbles: HashMap<BubbleId, Bubble>,
    dbs: Dbs,
    block_index: BlockIndex,
    scheduler: Scheduler,
    events: EventLog,
    /// The single in-flight gesture, if any.
    pub(crate) gesture: Option<Gesture>,
    /// Guard stack against disposal re-entering itself.
    disposing: Vec<BlockId>,
    /// Screen ↔ workspace mapping (pan + zoom).
    pub view: ViewTransform,
    /// Mirrored (right-to-left) layout; flips the horizontal bump direction.
    pub rtl: bool,
    /// Whether a drag on empty canvas pans the surface.
    pub pannable: bool,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            pannable: true,
            ..Self::default()
        }
    }

    // ========================================================================
    // Read access
    // ========================================================================

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(&id)
    }

    pub fn connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.get(&id)
    }

    pub fn bubble(&self, id: BubbleId) -> Option<&Bubble> {
        self.bubbles.get(&id)
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// The per-kind connection index, read-only.
    pub fn db(&self, kind: ConnectionKind) -> &ConnectionDb {
        self.dbs.get(kind)
    }

    /// The block-bounds spatial index, read-only (hosts use it for hit
    /// testing).
    pub fn block_index(&self) -> &BlockIndex {
        &self.block_index
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    // ========================================================================
    // Structure queries (derived from connection partners)
    // ========================================================================

    /// The connection through which `block` hangs off its parent, if any:
    /// `(child_side, parent_side)`.
    pub fn parent_connection_of(&self, block: BlockId) -> Option<(ConnectionId, ConnectionId)> {
        let blk = self.block(block)?;
        for cid in &blk.connections {
            let conn = self.connection(*cid)?;
            if matches!(
                conn.kind,
                ConnectionKind::Output | ConnectionKind::Previous
            ) && let Some(partner) = conn.partner
            {
                return Some((*cid, partner));
            }
        }
        None
    }

    pub fn parent_of(&self, block: BlockId) -> Option<BlockId> {
        let (_, parent_conn) = self.parent_connection_of(block)?;
        self.connection(parent_conn).map(|c| c.owner)
    }

    /// The topmost block of `block`'s physical stack/tree.
    pub fn root_of(&self, block: BlockId) -> BlockId {
        let mut cur = block;
        // Bounded walk in case of (illegal) cycles.
        for _ in 0..=self.blocks.len() {
            match self.parent_of(cur) {
                Some(parent) => cur = parent,
                None => break,
            }
        }
        cur
    }

    /// Whether `ancestor` is an ancestor of `block` (strictly above it).
    pub fn is_ancestor(&self, ancestor: BlockId, block: BlockId) -> bool {
        let mut cur = block;
        for _ in 0..=self.blocks.len() {
            match self.parent_of(cur) {
                Some(parent) if parent == ancestor => return true,
                Some(parent) => cur = parent,
                None => return false,
            }
        }
        false
    }

    /// Directly attached child blocks (through input and next connections).
    pub fn children_of(&self, block: BlockId) -> Vec<BlockId> {
        let Some(blk) = self.block(block) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for cid in &blk.connections {
            if let Some(conn) = self.connection(*cid)
                && conn.kind.is_superior()
                && let Some(partner) = conn.partner
                && let Some(pc) = self.connection(partner)
            {
                out.push(pc.owner);
            }
        }
        out
    }

    /// `block` plus every descendant, in breadth-first order.
    pub fn subtree(&self, block: BlockId) -> Vec<BlockId> {
        let mut out = vec![block];
        let mut i = 0;
        while i < out.len() {
            let next = self.children_of(out[i]);
            out.extend(next);
            i += 1;
        }
        out
    }

    /// The bottom-most block of the stack starting at `block`, following
    /// next-connections only (inputs hang sideways, not down the stack).
    pub fn last_in_stack(&self, block: BlockId) -> BlockId {
        let mut cur = block;
        for _ in 0..=self.blocks.len() {
            let next_child = self.block(cur).and_then(|blk| {
                blk.connections.iter().find_map(|cid| {
                    let conn = self.connection(*cid)?;
                    if conn.kind == ConnectionKind::Next {
                        let partner = conn.partner?;
                        return self.connection(partner).map(|pc| pc.owner);
                    }
                    None
                })
            });
            match next_child {
                Some(child) => cur = child,
                None => break,
            }
        }
        cur
    }

    // ========================================================================
    // Block lifecycle
    // ========================================================================

    /// Add a block described by `template`. Connections of main-surface
    /// blocks start tracked; flyout templates stay out of the indices.
    pub fn add_block(&mut self, template: BlockTemplate) -> WsResult<BlockId> {
        self.add_block_inner(template, false)
    }

    fn add_block_inner(&mut self, template: BlockTemplate, from_flyout: bool) -> WsResult<BlockId> {
        template
            .validate()
            .map_err(ContractViolation::InvalidBlock)?;

        let id = self.ids.block();
        let mut conn_ids: SmallVec<[ConnectionId; 4]> = SmallVec::new();
        for ct in &template.connections {
            let cid = self.ids.connection();
            let conn = Connection::new(cid, ct.kind, id, template.pos, ct.offset, ct.checks.clone());
            self.connections.insert(cid, conn);
            conn_ids.push(cid);
        }

        let block = Block {
            id,
            pos: template.pos,
            size: template.size,
            movable: template.movable,
            deletable: template.deletable,
            in_flyout: template.in_flyout,
            fields: template.fields,
            connections: conn_ids.clone(),
        };
        self.block_index.upsert(id, block.bounds());
        self.blocks.insert(id, block);

        if !template.in_flyout {
            for cid in conn_ids {
                self.set_tracking(cid, Tracking::Tracked)?;
            }
            self.events.push(EventKind::BlockCreated {
                block: id,
                from_flyout,
            });
        }
        debug!(?id, in_flyout = template.in_flyout, "block added");
        Ok(id)
    }

    /// Clone a flyout template block onto the main surface at `at`.
    pub fn instantiate_from_flyout(&mut self, src: BlockId, at: Point) -> WsResult<BlockId> {
        let template = {
            let blk = self
                .block(src)
                .ok_or(ContractViolation::StaleId("flyout block"))?;
            if !blk.in_flyout {
                return Err(ContractViolation::InvalidBlock(
                    "source block is not in the flyout",
                ));
            }
            BlockTemplate {
                pos: at,
                size: blk.size,
                movable: true,
                deletable: true,
                in_flyout: false,
                fields: blk.fields.clone(),
                connections: blk
                    .connections
                    .iter()
                    .filter_map(|cid| self.connection(*cid))
                    .map(|c| ConnectionTemplate {
                        kind: c.kind,
                        offset: c.offset,
                        checks: c.checks.clone(),
                    })
                    .collect(),
            }
        };
        self.add_block_inner(template, true)
    }

    /// Dispose a block, its connections, and its descendants. Idempotent for
    /// ids that are already gone; re-entering the disposal of a block that is
    /// mid-disposal is a contract violation.
    pub fn dispose_block(&mut self, id: BlockId) -> WsResult<()> {
        if !self.blocks.contains_key(&id) {
            return Ok(());
        }
        if self.disposing.contains(&id) {
            return Err(ContractViolation::ReentrantDisposal(id));
        }
        self.disposing.push(id);
        self.events.begin_group(&mut self.ids);
        let result = self.dispose_steps(id);
        self.events.end_group();
        self.disposing.pop();
        result
    }

    fn dispose_steps(&mut self, id: BlockId) -> WsResult<()> {
        // A gesture dragging this block must end before the block vanishes
        // under it.
        if self.gesture.as_ref().is_some_and(|g| g.involves_block(id)) {
            self.cancel_active_gesture();
        }
        self.scheduler.cancel_for_block(id);

        // Snapshot both lists before detaching anything; disconnecting
        // mutates the structures we would otherwise be iterating.
        let children = self.children_of(id);
        let conns: Vec<ConnectionId> = self
            .block(id)
            .map(|b| b.connections.to_vec())
            .unwrap_or_default();

        for cid in conns {
            self.disconnect(cid)?;
            self.set_tracking(cid, Tracking::Untracked)?;
            self.connections.remove(&cid);
        }
        for child in children {
            self.dispose_block(child)?;
        }

        let owned: Vec<BubbleId> = self
            .bubbles
            .values()
            .filter(|b| b.owner == id)
            .map(|b| b.id)
            .collect();
        for bid in owned {
            self.bubbles.remove(&bid);
        }

        self.block_index.remove(id);
        self.blocks.remove(&id);
        self.events.push(EventKind::BlockDisposed { block: id });
        debug!(?id, "block disposed");
        Ok(())
    }

    /// Dispose many blocks without janking the host: each disposal is queued
    /// one stagger interval after the previous.
    pub fn dispose_blocks_staggered(&mut self, ids: &[BlockId]) {
        for (i, id) in ids.iter().enumerate() {
            self.scheduler
                .schedule_in(i as u64 * DISPOSE_STAGGER_MS, Task::DisposeBlock { block: *id });
        }
    }

    // ========================================================================
    // Bubbles
    // ========================================================================

    pub fn add_bubble(&mut self, owner: BlockId, pos: Point) -> WsResult<BubbleId> {
        if !self.blocks.contains_key(&owner) {
            return Err(ContractViolation::StaleId("bubble owner"));
        }
        let id = self.ids.bubble();
        self.bubbles.insert(id, Bubble { id, owner, pos });
        Ok(id)
    }

    pub(crate) fn move_bubble(&mut self, id: BubbleId, pos: Point) -> WsResult<()> {
        let bubble = self
            .bubbles
            .get_mut(&id)
            .ok_or(ContractViolation::StaleId("bubble"))?;
        bubble.pos = pos;
        Ok(())
    }

    // ========================================================================
    // Tracking & geometry
    // ========================================================================

    /// Transition a connection's tracking state, keeping index membership in
    /// sync: a connection is in its kind's db iff it is `Tracked`.
    pub fn set_tracking(&mut self, id: ConnectionId, tracking: Tracking) -> WsResult<()> {
        let (old, pos, kind) = {
            let conn = self
                .connections
                .get(&id)
                .ok_or(ContractViolation::StaleId("connection"))?;
            (conn.tracking, conn.pos, conn.kind)
        };
        if old == tracking {
            return Ok(());
        }
        if old == Tracking::Tracked {
            self.dbs.get_mut(kind).remove(id)?;
        }
        if tracking == Tracking::Tracked {
            self.dbs.get_mut(kind).insert(id, pos)?;
        }
        if let Some(conn) = self.connections.get_mut(&id) {
            conn.tracking = tracking;
        }
        Ok(())
    }

    /// Translate `block` and its whole subtree by `delta`, cascading to
    /// every connection and keeping both spatial structures in sync. Emits
    /// nothing; callers that complete a user-visible move emit `BlockMoved`.
    pub fn translate_block(&mut self, block: BlockId, delta: Vec2) -> WsResult<()> {
        if delta == Vec2::ZERO {
            return Ok(());
        }
        let subtree = self.subtree(block);
        for b in subtree {
            let (bounds, conn_ids) = {
                let blk = self
                    .blocks
                    .get_mut(&b)
                    .ok_or(ContractViolation::StaleId("block"))?;
                blk.pos += delta;
                (blk.bounds(), blk.connections.clone())
            };
            self.block_index.upsert(b, bounds);
            for cid in conn_ids {
                let (kind, pos, tracked) = {
                    let conn = self
                        .connections
                        .get_mut(&cid)
                        .ok_or(ContractViolation::StaleId("connection"))?;
                    conn.pos += delta;
                    (conn.kind, conn.pos, conn.tracking == Tracking::Tracked)
                };
                if tracked {
                    self.dbs.get_mut(kind).update(cid, pos)?;
                }
            }
        }
        Ok(())
    }

    /// Move `block`'s origin to `to` (subtree cascades along).
    pub fn move_block_to(&mut self, block: BlockId, to: Point) -> WsResult<()> {
        let from = self
            .block(block)
            .ok_or(ContractViolation::StaleId("block"))?
            .pos;
        self.translate_block(block, to - from)
    }

    // ========================================================================
    // Connect / disconnect
    // ========================================================================

    /// Join two connections. The superior side keeps its position; the
    /// inferior side's root block snaps so the two points coincide. An
    /// existing partner on the superior side is detached first (same event
    /// group) and queued for a bump.
    pub fn connect(&mut self, a: ConnectionId, b: ConnectionId) -> WsResult<()> {
        let (ka, kb) = {
            let ca = self
                .connection(a)
                .ok_or(ContractViolation::StaleId("connection"))?;
            let cb = self
                .connection(b)
                .ok_or(ContractViolation::StaleId("connection"))?;
            (ca.kind, cb.kind)
        };
        if ka.opposite() != kb {
            return Err(ContractViolation::InvalidBlock(
                "connect requires complementary kinds",
            ));
        }
        let (sup, inf) = if ka.is_superior() { (a, b) } else { (b, a) };

        let group = self.events.begin_group(&mut self.ids);
        let result = self.connect_steps(sup, inf, group);
        self.events.end_group();
        result
    }

    fn connect_steps(&mut self, sup: ConnectionId, inf: ConnectionId, group: GroupId) -> WsResult<()> {
        // Detachment always precedes the corresponding reattachment.
        if let Some(old_child) = self.connection(sup).and_then(|c| c.partner) {
            let orphan_owner = self
                .connection(old_child)
                .map(|c| c.owner)
                .ok_or(ContractViolation::StaleId("connection"))?;
            self.disconnect(sup)?;
            let orphan_root = self.root_of(orphan_owner);
            self.scheduler.schedule_in(
                BUMP_DELAY_MS,
                Task::BumpBlock {
                    block: orphan_root,
                    away_from: sup,
                    group: Some(group),
                },
            );
        }
        if self.connection(inf).and_then(|c| c.partner).is_some() {
            self.disconnect(inf)?;
        }

        if let Some(conn) = self.connections.get_mut(&sup) {
            conn.partner = Some(inf);
        }
        if let Some(conn) = self.connections.get_mut(&inf) {
            conn.partner = Some(sup);
        }
        // Occupied connections are not snap targets; they leave the index.
        self.set_tracking(sup, Tracking::Untracked)?;
        self.set_tracking(inf, Tracking::Untracked)?;

        let (sup_pos, parent_block) = {
            let c = self
                .connection(sup)
                .ok_or(ContractViolation::StaleId("connection"))?;
            (c.pos, c.owner)
        };
        let (inf_pos, child_block) = {
            let c = self
                .connection(inf)
                .ok_or(ContractViolation::StaleId("connection"))?;
            (c.pos, c.owner)
        };

        // Snap the child's root so the two points coincide.
        let snap = sup_pos - inf_pos;
        if snap != Vec2::ZERO {
            let from = self
                .block(child_block)
                .ok_or(ContractViolation::StaleId("block"))?
                .pos;
            self.translate_block(child_block, snap)?;
            self.events.push(EventKind::BlockMoved {
                block: child_block,
                from,
                to: from + snap,
            });
        }

        self.events.push(EventKind::Connected {
            parent: sup,
            child: inf,
            parent_block,
            child_block,
        });
        debug!(?sup, ?inf, "connected");
        Ok(())
    }

    /// Split a connection from its partner. A connection with no partner is
    /// an expected no-op, not an error. Both sides return to the index.
    pub fn disconnect(&mut self, conn: ConnectionId) -> WsResult<()> {
        let (kind, partner) = {
            let c = self
                .connection(conn)
                .ok_or(ContractViolation::StaleId("connection"))?;
            (c.kind, c.partner)
        };
        let Some(partner) = partner else {
            trace!(?conn, "disconnect of unconnected connection ignored");
            return Ok(());
        };

        if let Some(c) = self.connections.get_mut(&conn) {
            c.partner = None;
        }
        if let Some(c) = self.connections.get_mut(&partner) {
            c.partner = None;
        }
        self.set_tracking(conn, Tracking::Tracked)?;
        self.set_tracking(partner, Tracking::Tracked)?;

        let (sup, inf) = if kind.is_superior() {
            (conn, partner)
        } else {
            (partner, conn)
        };
        let parent_block = self
            .connection(sup)
            .map(|c| c.owner)
            .ok_or(ContractViolation::StaleId("connection"))?;
        let child_block = self
            .connection(inf)
            .map(|c| c.owner)
            .ok_or(ContractViolation::StaleId("connection"))?;
        self.events.push(EventKind::Disconnected {
            parent: sup,
            child: inf,
            parent_block,
            child_block,
        });
        debug!(?sup, ?inf, "disconnected");
        Ok(())
    }

    // ========================================================================
    // Search
    // ========================================================================

    /// Nearest connection compatible with `local` within `radius`, searching
    /// the complementary kind's index. Incompatible-but-closer candidates
    /// are skipped in favour of the next-best compatible one.
    pub fn nearest_compatible(
        &self,
        local: ConnectionId,
        radius: f64,
    ) -> Option<(ConnectionId, f64)> {
        let conn = self.connection(local)?;
        self.dbs
            .get(conn.kind.opposite())
            .nearest_within(conn.pos, radius, |candidate| {
                checker::can_connect(self, local, candidate, true)
            })
    }

    /// All compatible connections within `radius` of `local`, for "nearby
    /// connections" highlighting.
    pub fn compatible_within(&self, local: ConnectionId, radius: f64) -> Vec<ConnectionId> {
        let Some(conn) = self.connection(local) else {
            return Vec::new();
        };
        self.dbs
            .get(conn.kind.opposite())
            .neighbours_within(conn.pos, radius)
            .into_iter()
            .filter(|candidate| checker::can_connect(self, local, *candidate, true))
            .collect()
    }

    // ========================================================================
    // Deferred work
    // ========================================================================

    /// Advance the cooperative clock; runs every deferred task that became
    /// due. Hosts call this from their main loop.
    pub fn advance_time(&mut self, elapsed_ms: u64) {
        let due = self.scheduler.advance(elapsed_ms);
        for task in due {
            self.run_task(task);
        }
    }

    pub(crate) fn schedule_in(&mut self, delay_ms: u64, task: Task) {
        self.scheduler.schedule_in(delay_ms, task);
    }

    fn run_task(&mut self, task: Task) {
        match task {
            Task::BumpBlock {
                block,
                away_from,
                group,
            } => crate::bump::execute_bump(self, block, away_from, group),
            Task::DisposeBlock { block } => {
                if let Err(err) = self.dispose_block(block) {
                    warn!(?block, %err, "deferred disposal failed");
                }
            }
        }
    }

    // ========================================================================
    // Events
    // ========================================================================

    /// Open an undo group; nested groups collapse into the outermost.
    pub fn begin_group(&mut self) -> GroupId {
        self.events.begin_group(&mut self.ids)
    }

    pub fn end_group(&mut self) {
        self.events.end_group();
    }

    /// The undo group currently in effect, if any.
    pub fn current_group(&self) -> Option<GroupId> {
        self.events.current_group()
    }

    /// Drain pending structural-change events, oldest first.
    pub fn take_events(&mut self) -> Vec<WorkspaceEvent> {
        self.events.take()
    }

    /// Pending events without draining (test/diagnostic convenience).
    pub fn pending_events(&self) -> &[WorkspaceEvent] {
        self.events.pending()
    }

    pub(crate) fn push_event(&mut self, kind: EventKind) {
        self.events.push(kind);
    }

    pub(crate) fn push_event_grouped(&mut self, kind: EventKind, group: Option<GroupId>) {
        self.events.push_grouped(kind, group);
    }
}
