//! Block-bounds spatial index.
//!
//! R-tree over every block's bounding rectangle. The collision resolver uses
//! it to decide whether a dropped block overlaps a neighbour, and hosts can
//! use the same queries for hit testing. The per-kind connection search
//! lives in [`crate::connection_db`]; this index only knows about block
//! rectangles.

use std::collections::HashMap;

use kurbo::Rect;
use rstar::{AABB, RTree, RTreeObject};

use crate::types::BlockId;

/// A spatial entry representing a block's bounding box.
#[derive(Debug, Clone, Copy)]
struct BlockEntry {
    block: BlockId,
    min: [f64; 2],
    max: [f64; 2],
}

impl BlockEntry {
    fn new(block: BlockId, bounds: Rect) -> Self {
        Self {
            block,
            min: [bounds.x0, bounds.y0],
            max: [bounds.x1, bounds.y1],
        }
    }

    fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min[0] && x <= self.max[0] && y >= self.min[1] && y <= self.max[1]
    }
}

impl RTreeObject for BlockEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.min, self.max)
    }
}

impl PartialEq for BlockEntry {
    fn eq(&self, other: &Self) -> bool {
        self.block == other.block
    }
}

/// Spatial index over block bounds, with O(log n) point and rect queries.
#[derive(Debug, Default)]
pub struct BlockIndex {
    tree: RTree<BlockEntry>,
    entries: HashMap<BlockId, BlockEntry>,
}

impl BlockIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or move a block's bounds.
    pub fn upsert(&mut self, block: BlockId, bounds: Rect) {
        if let Some(old) = self.entries.remove(&block) {
            self.tree.remove(&old);
        }
        let entry = BlockEntry::new(block, bounds);
        self.tree.insert(entry);
        self.entries.insert(block, entry);
    }

    pub fn remove(&mut self, block: BlockId) -> bool {
        match self.entries.remove(&block) {
            Some(entry) => {
                self.tree.remove(&entry);
                true
            }
            None => false,
        }
    }

    /// Blocks whose bounds contain the given workspace point.
    pub fn blocks_at_point(&self, x: f64, y: f64) -> Vec<BlockId> {
        let probe = AABB::from_point([x, y]);
        self.tree
            .locate_in_envelope_intersecting(&probe)
            .filter(|e| e.contains_point(x, y))
            .map(|e| e.block)
            .collect()
    }

    /// Blocks whose bounds intersect the given rectangle.
    pub fn blocks_in_rect(&self, rect: Rect) -> Vec<BlockId> {
        let envelope = AABB::from_corners([rect.x0, rect.y0], [rect.x1, rect.y1]);
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|e| e.block)
            .collect()
    }

    /// Blocks overlapping `bounds`, excluding those `ignore` accepts.
    /// This is the collision resolver's "does the dropped block sit on top
    /// of a neighbour" query; `ignore` filters out the dragged stack itself.
    pub fn overlapping(
        &self,
        bounds: Rect,
        mut ignore: impl FnMut(BlockId) -> bool,
    ) -> Vec<BlockId> {
        self.blocks_in_rect(bounds)
            .into_iter()
            .filter(|b| !ignore(*b))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.tree = RTree::new();
        self.entries.clear();
    }
}
