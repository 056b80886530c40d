//! Connections: typed attachment points on blocks.
//!
//! A connection owns its absolute workspace position (kept in sync with its
//! block as the block translates), a back-reference to its owner, and, when
//! attached, the id of its partner connection. Partnering is symmetric and
//! only ever joins complementary kinds; the workspace enforces both.
//!
//! Index membership is governed by the tri-state [`Tracking`] flag: a
//! connection sits in its kind's [`crate::connection_db::ConnectionDb`] iff
//! it is `Tracked`. Connecting untracks both sides (an occupied connection
//! is not a snap target); disconnecting re-tracks them.

use kurbo::{Point, Vec2};

use crate::types::{BlockId, ConnectionId, ConnectionKind, Tracking};

/// A typed attachment point on a block.
#[derive(Debug, Clone)]
pub struct Connection {
    pub id: ConnectionId,
    pub kind: ConnectionKind,
    /// Owning block; exclusive ownership, set at creation and never changed.
    pub owner: BlockId,
    /// Absolute position in workspace units.
    pub pos: Point,
    /// Offset from the owner block's origin; translation cascades through
    /// this.
    pub offset: Vec2,
    /// Type-check tags. `None` means "accepts anything"; `Some` lists must
    /// intersect for two connections to be compatible.
    pub checks: Option<Vec<String>>,
    /// Partner connection, if attached. Symmetric: if `a.partner == Some(b)`
    /// then `b.partner == Some(a)`, and the two kinds are complementary.
    pub partner: Option<ConnectionId>,
    pub tracking: Tracking,
}

impl Connection {
    pub fn new(
        id: ConnectionId,
        kind: ConnectionKind,
        owner: BlockId,
        origin: Point,
        offset: Vec2,
        checks: Option<Vec<String>>,
    ) -> Self {
        Self {
            id,
            kind,
            owner,
            pos: origin + offset,
            offset,
            checks,
            partner: None,
            tracking: Tracking::WillTrack,
        }
    }

    /// Whether this connection is attached to a partner.
    pub fn is_connected(&self) -> bool {
        self.partner.is_some()
    }

    /// Euclidean distance to another position, in workspace units.
    pub fn distance_to(&self, other: Point) -> f64 {
        self.pos.distance(other)
    }

    /// Whether this connection's tag list is compatible with another's.
    /// An absent list on either side accepts anything.
    pub fn checks_intersect(&self, other: &Connection) -> bool {
        match (&self.checks, &other.checks) {
            (None, _) | (_, None) => true,
            (Some(a), Some(b)) => a.iter().any(|tag| b.contains(tag)),
        }
    }
}
