use crate::model::NodeId;
use hashbrown::HashMap;

/// A sparse (source, sink) -> distance (meters) matrix.
///
/// Only pairs actually computed and within reach are stored; any other
/// pair reads back as `d_infinity`. This is the materialized form
/// described for the distance fabric: a dense matrix would waste memory
/// on pairs neither side ever queries, since only residents-to-amenities
/// and candidates-to-residents pairs are ever looked up.
#[derive(Debug)]
pub struct DistanceStore {
    distances: HashMap<(NodeId, NodeId), f64>,
    d_infinity: f64,
}

impl DistanceStore {
    pub fn new(d_infinity: f64) -> Self {
        DistanceStore {
            distances: HashMap::new(),
            d_infinity,
        }
    }

    pub fn d_infinity(&self) -> f64 {
        self.d_infinity
    }

    /// Records a distance for an unordered pair. The fabric is built
    /// over an undirected graph, so `(a, b)` and `(b, a)` always carry
    /// the same distance; storing under a canonical key ordering halves
    /// memory use versus storing both directions.
    pub fn insert(&mut self, a: NodeId, b: NodeId, distance_m: f64) {
        self.distances.insert(Self::canonical_key(a, b), distance_m);
    }

    /// Returns the stored distance between `a` and `b`, or `d_infinity`
    /// if no path within reach was ever recorded.
    pub fn get(&self, a: NodeId, b: NodeId) -> f64 {
        if a == b {
            return 0.0;
        }
        self.distances
            .get(&Self::canonical_key(a, b))
            .copied()
            .unwrap_or(self.d_infinity)
    }

    pub fn len(&self) -> usize {
        self.distances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    fn canonical_key(a: NodeId, b: NodeId) -> (NodeId, NodeId) {
        if a.0 <= b.0 { (a, b) } else { (b, a) }
    }
}
