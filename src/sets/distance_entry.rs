use crate::model::NodeId;
use crate::sets::ordered_float::TotalF64;

/// A `(distance, node)` pair ordered by distance. Used as the Dijkstra
/// binary-heap entry (`BinaryHeap` is a max-heap, so callers wrap in
/// `Reverse` for a min-priority queue) and as the element type when
/// ranking amenities by distance for depth-category rank selection.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct DistanceEntry {
    pub distance: TotalF64,
    pub node: NodeId,
}

impl DistanceEntry {
    pub fn new(distance: f64, node: NodeId) -> Self {
        DistanceEntry {
            distance: TotalF64(distance),
            node,
        }
    }
}

impl PartialOrd for DistanceEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DistanceEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.distance.cmp(&other.distance)
    }
}
