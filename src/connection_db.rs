//! Per-kind connection index with range-limited nearest-neighbour search.
//!
//! One `ConnectionDb` exists per connection kind per workspace. Entries are
//! kept sorted by vertical position, which lets a nearest search scan only
//! the window of entries whose y-coordinate falls within the radius instead
//! of the whole collection. Blocks mostly spread vertically on a canvas, so
//! the vertical axis prunes best.
//!
//! Searches never run against this kind's own db: a dragged `Output`
//! searches the `Input` db and so on. The caller picks the db; this module
//! only knows about positions.

use kurbo::Point;

use crate::error::ContractViolation;
use crate::types::ConnectionId;

/// One index entry: a connection id and the position it was indexed at.
///
/// The position is a copy; the workspace keeps it in sync whenever a tracked
/// connection moves.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Entry {
    id: ConnectionId,
    pos: Point,
}

/// Axis-sorted index over the tracked connections of one kind.
#[derive(Debug, Default)]
pub struct ConnectionDb {
    /// Sorted by `pos.y`, ties in insertion position.
    entries: Vec<Entry>,
}

impl ConnectionDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// First index whose entry has `y >= bound`.
    fn lower_bound(&self, bound: f64) -> usize {
        self.entries.partition_point(|e| e.pos.y < bound)
    }

    /// Insert a connection at `pos`. Duplicate membership is a caller bug.
    pub fn insert(&mut self, id: ConnectionId, pos: Point) -> Result<(), ContractViolation> {
        if self.contains(id) {
            return Err(ContractViolation::DuplicateIndexEntry(id));
        }
        let at = self.lower_bound(pos.y);
        self.entries.insert(at, Entry { id, pos });
        Ok(())
    }

    /// Remove a connection from the index.
    pub fn remove(&mut self, id: ConnectionId) -> Result<(), ContractViolation> {
        match self.entries.iter().position(|e| e.id == id) {
            Some(at) => {
                self.entries.remove(at);
                Ok(())
            }
            None => Err(ContractViolation::MissingIndexEntry(id)),
        }
    }

    /// Move a member to a new position, re-sorting locally.
    pub fn update(&mut self, id: ConnectionId, new_pos: Point) -> Result<(), ContractViolation> {
        self.remove(id)?;
        // Re-insert never collides: we just removed the only entry.
        let at = self.lower_bound(new_pos.y);
        self.entries.insert(at, Entry { id, pos: new_pos });
        Ok(())
    }

    /// Nearest entry within `radius` of `pos` that passes `accept`, together
    /// with its distance. Rejected candidates are skipped and the next-best
    /// considered, so an incompatible-but-closer connection never shadows a
    /// compatible one.
    ///
    /// Ties on distance break toward the lower connection id. Ids are
    /// allocated monotonically, so this is stable creation order.
    pub fn nearest_within(
        &self,
        pos: Point,
        radius: f64,
        mut accept: impl FnMut(ConnectionId) -> bool,
    ) -> Option<(ConnectionId, f64)> {
        let mut best: Option<(ConnectionId, f64)> = None;
        for entry in self.window(pos.y, radius) {
            let dist = entry.pos.distance(pos);
            if dist > radius || !accept(entry.id) {
                continue;
            }
            let better = match best {
                None => true,
                Some((best_id, best_dist)) => {
                    dist < best_dist || (dist == best_dist && entry.id < best_id)
                }
            };
            if better {
                best = Some((entry.id, dist));
            }
        }
        best
    }

    /// All entries within `radius` of `pos`, unfiltered, in index order.
    /// Used for "nearby connections" highlighting.
    pub fn neighbours_within(&self, pos: Point, radius: f64) -> Vec<ConnectionId> {
        self.window(pos.y, radius)
            .filter(|e| e.pos.distance(pos) <= radius)
            .map(|e| e.id)
            .collect()
    }

    /// Entries whose sort key falls in `[y - radius, y + radius]`.
    fn window(&self, y: f64, radius: f64) -> impl Iterator<Item = &Entry> {
        let start = self.lower_bound(y - radius);
        self.entries[start..]
            .iter()
            .take_while(move |e| e.pos.y <= y + radius)
    }

    /// Sorted-order check, used by tests and debug assertions.
    pub fn is_sorted(&self) -> bool {
        self.entries.windows(2).all(|w| w[0].pos.y <= w[1].pos.y)
    }
}
