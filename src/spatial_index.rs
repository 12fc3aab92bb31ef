//! Spatial Index Module
//!
//! R-tree over marker bounds in content space, used by the gesture router to
//! decide whether a contact landed on a marker. Entries are keyed by marker
//! index, so the index is rebuilt whenever a removal shifts indices.

use crate::types::{Marker, Point};
use rstar::{AABB, RTree, RTreeObject};

/// A marker's bounding box in content space.
#[derive(Debug, Clone, Copy)]
pub struct SpatialEntry {
    pub index: usize,
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl SpatialEntry {
    pub fn new(index: usize, marker: &Marker) -> Self {
        Self {
            index,
            min_x: marker.x,
            min_y: marker.y,
            max_x: marker.x + marker.width,
            max_y: marker.y + marker.height,
        }
    }

    #[inline]
    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

impl RTreeObject for SpatialEntry {
    type Envelope = AABB<[f32; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners([self.min_x, self.min_y], [self.max_x, self.max_y])
    }
}

impl PartialEq for SpatialEntry {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

/// O(log n) point queries over a marker list.
#[derive(Default)]
pub struct SpatialIndex {
    tree: RTree<SpatialEntry>,
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    pub fn from_markers(markers: &[Marker]) -> Self {
        let mut index = Self::new();
        index.rebuild(markers);
        index
    }

    /// Replace every entry with the current marker list.
    pub fn rebuild(&mut self, markers: &[Marker]) {
        let entries: Vec<SpatialEntry> = markers
            .iter()
            .enumerate()
            .map(|(i, m)| SpatialEntry::new(i, m))
            .collect();
        self.tree = RTree::bulk_load(entries);
    }

    /// Add a marker appended at `index`. Indices of existing entries are
    /// unaffected by an append, so no rebuild is needed.
    pub fn insert(&mut self, index: usize, marker: &Marker) {
        self.tree.insert(SpatialEntry::new(index, marker));
    }

    /// All markers containing the point, in ascending index order.
    pub fn query_point(&self, p: Point) -> Vec<usize> {
        let envelope = AABB::from_point([p.x, p.y]);
        let mut hits: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&envelope)
            .filter(|entry| entry.contains_point(p.x, p.y))
            .map(|entry| entry.index)
            .collect();
        hits.sort_unstable();
        hits
    }

    /// The topmost (last drawn, so highest index) marker under the point.
    pub fn topmost_at(&self, p: Point) -> Option<usize> {
        self.query_point(p).last().copied()
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}
