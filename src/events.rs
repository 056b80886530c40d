//! Structural-change notifications produced for collaborators.
//!
//! Every mutation a host (or the undo-log collaborator) needs to observe is
//! appended to the workspace's [`EventLog`] as a [`WorkspaceEvent`]. Events
//! carry enough identity (block/connection ids, old/new values) for the
//! undo log to reconstruct and reverse them, and an optional [`GroupId`]
//! tying multi-step mutations (detach + reattach, disconnect + bump) into
//! one atomically-reversible action.

use kurbo::{Point, Vec2};

use crate::types::{BlockId, BubbleId, ConnectionId, GroupId, HitTarget, IdGen};

/// One observable change on the workspace.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkspaceEvent {
    /// Undo group this event belongs to, if any.
    pub group: Option<GroupId>,
    pub kind: EventKind,
}

/// The payload of a [`WorkspaceEvent`].
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    /// A gesture resolved as a click on the given target.
    Click { target: HitTarget },

    /// A right-click requested a context action on the given target.
    ContextMenu { target: HitTarget },

    /// A block moved from `from` to `to` (workspace units, block origin).
    BlockMoved {
        block: BlockId,
        from: Point,
        to: Point,
    },

    /// Two connections joined. `parent` is the superior side.
    Connected {
        parent: ConnectionId,
        child: ConnectionId,
        parent_block: BlockId,
        child_block: BlockId,
    },

    /// Two connections split. Mirrors [`EventKind::Connected`].
    Disconnected {
        parent: ConnectionId,
        child: ConnectionId,
        parent_block: BlockId,
        child_block: BlockId,
    },

    /// A block appeared on the main surface.
    BlockCreated { block: BlockId, from_flyout: bool },

    /// A block (and its connections) left the workspace.
    BlockDisposed { block: BlockId },

    /// The canvas origin moved (panning). `offset` is the new pan offset in
    /// screen units.
    ViewportMoved { offset: Vec2 },

    /// A bubble was released at a new anchor offset relative to its owner.
    BubbleMoved {
        bubble: BubbleId,
        owner: BlockId,
        anchor: Vec2,
    },

    /// A gesture was abandoned because of a recoverable contract violation.
    /// Distinct from the fatal `Err` the API also returns, this is the
    /// signal a production host consumes instead of crashing.
    GestureAborted { reason: String },
}

/// Append-only event log with an explicit group stack.
///
/// Nested `begin_group` calls join the outermost group, so a connect that
/// triggers a displacement-plus-bump still undoes as one action.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<WorkspaceEvent>,
    group_stack: Vec<GroupId>,
}

impl EventLog {
    /// Open a group; returns the id subsequent events are attributed to.
    pub fn begin_group(&mut self, ids: &mut IdGen) -> GroupId {
        let id = match self.group_stack.last() {
            Some(outer) => *outer,
            None => ids.group(),
        };
        self.group_stack.push(id);
        id
    }

    /// Close the innermost group.
    pub fn end_group(&mut self) {
        self.group_stack.pop();
    }

    /// The group currently in effect, if any.
    pub fn current_group(&self) -> Option<GroupId> {
        self.group_stack.last().copied()
    }

    /// Append an event, stamped with the current group.
    pub fn push(&mut self, kind: EventKind) {
        self.events.push(WorkspaceEvent {
            group: self.current_group(),
            kind,
        });
    }

    /// Append an event attributed to an explicit group (used by deferred
    /// tasks whose originating group has already been closed).
    pub fn push_grouped(&mut self, kind: EventKind, group: Option<GroupId>) {
        self.events.push(WorkspaceEvent { group, kind });
    }

    /// Drain all pending events, oldest first.
    pub fn take(&mut self) -> Vec<WorkspaceEvent> {
        std::mem::take(&mut self.events)
    }

    /// Peek at pending events without draining them.
    pub fn pending(&self) -> &[WorkspaceEvent] {
        &self.events
    }
}
