//! Blocks: the draggable units on the canvas.
//!
//! A block owns its origin (top-left, workspace units), size, behaviour
//! flags, its fields, and the list of connection ids attached to it. The
//! parent/child structure of the diagram is not stored separately; it is
//! derived from connection partners, so it can never fall out of sync with
//! them. Stack and tree traversals live on [`crate::workspace::Workspace`],
//! which owns the registries.

use kurbo::{Point, Rect, Size, Vec2};
use smallvec::SmallVec;

use crate::types::{BlockId, ConnectionId, ConnectionKind};

/// A labelled region on a block that may react to clicks (e.g. a dropdown).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub clickable: bool,
}

/// A block on the workspace (or in the flyout, when `in_flyout`).
#[derive(Debug, Clone)]
pub struct Block {
    pub id: BlockId,
    /// Origin (top-left) in workspace units.
    pub pos: Point,
    pub size: Size,
    pub movable: bool,
    pub deletable: bool,
    /// Flyout blocks are palette templates: never tracked, never dragged
    /// directly. A drag clones them onto the main surface first.
    pub in_flyout: bool,
    pub fields: Vec<Field>,
    /// Connections owned by this block. At most four in practice.
    pub connections: SmallVec<[ConnectionId; 4]>,
}

impl Block {
    /// Bounding rectangle in workspace units.
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.pos, self.size)
    }
}

/// Template for one connection on a [`BlockTemplate`].
#[derive(Debug, Clone)]
pub struct ConnectionTemplate {
    pub kind: ConnectionKind,
    /// Offset of the connection point from the block origin.
    pub offset: Vec2,
    /// Type-check tags; `None` accepts anything.
    pub checks: Option<Vec<String>>,
}

/// Declarative description of a block, consumed by
/// [`crate::workspace::Workspace::add_block`]. Builder-style so hosts and
/// tests read naturally.
#[derive(Debug, Clone)]
pub struct BlockTemplate {
    pub pos: Point,
    pub size: Size,
    pub movable: bool,
    pub deletable: bool,
    pub in_flyout: bool,
    pub fields: Vec<Field>,
    pub connections: Vec<ConnectionTemplate>,
}

impl Default for BlockTemplate {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockTemplate {
    pub fn new() -> Self {
        Self {
            pos: Point::ZERO,
            size: Size::new(100.0, 40.0),
            movable: true,
            deletable: true,
            in_flyout: false,
            fields: Vec::new(),
            connections: Vec::new(),
        }
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.pos = Point::new(x, y);
        self
    }

    pub fn sized(mut self, w: f64, h: f64) -> Self {
        self.size = Size::new(w, h);
        self
    }

    pub fn immovable(mut self) -> Self {
        self.movable = false;
        self
    }

    pub fn in_flyout(mut self) -> Self {
        self.in_flyout = true;
        self
    }

    pub fn with_field(mut self, name: &str, clickable: bool) -> Self {
        self.fields.push(Field {
            name: name.to_string(),
            clickable,
        });
        self
    }

    /// Add a connection with no type-check tags (accepts anything).
    pub fn with_connection(self, kind: ConnectionKind, offset: Vec2) -> Self {
        self.with_checked_connection(kind, offset, None)
    }

    pub fn with_checked_connection(
        mut self,
        kind: ConnectionKind,
        offset: Vec2,
        checks: Option<Vec<String>>,
    ) -> Self {
        self.connections.push(ConnectionTemplate {
            kind,
            offset,
            checks,
        });
        self
    }

    /// Structural validity: at most one output, previous and next each, and
    /// no block carries both an output and a previous connection.
    pub(crate) fn validate(&self) -> Result<(), &'static str> {
        let count = |k: ConnectionKind| self.connections.iter().filter(|c| c.kind == k).count();
        if count(ConnectionKind::Output) > 1 {
            return Err("more than one output connection");
        }
        if count(ConnectionKind::Previous) > 1 {
            return Err("more than one previous connection");
        }
        if count(ConnectionKind::Next) > 1 {
            return Err("more than one next connection");
        }
        if count(ConnectionKind::Output) > 0 && count(ConnectionKind::Previous) > 0 {
            return Err("block cannot have both an output and a previous connection");
        }
        Ok(())
    }
}
