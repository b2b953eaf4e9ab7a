//! The Distance Fabric: a parallel multi-source Dijkstra construction
//! plus a materialized sparse distance matrix.
//!
//! # Submodules
//!
//! - [`graph`]: the undirected weighted adjacency list and its
//!   connectivity check.
//! - [`dijkstra`]: single-source and parallel multi-source Dijkstra.
//! - [`store`]: the sparse `(node, node) -> distance` matrix with the
//!   `D_infinity` sentinel.

pub mod dijkstra;
pub mod graph;
pub mod store;

use crate::error::{EngineError, EngineResult};
use crate::model::{
    Category, CandidateSite, ExistingAmenity, NetworkEdge, NetworkNode, NodeId, ResidentialBuilding,
};
use crate::progress::{NullProgressSink, ProgressSink};
use crate::statistics::Stats;
use graph::Graph;
use hashbrown::HashMap;
use std::sync::Arc;
use store::DistanceStore;
use tracing::{debug, info};

/// Summary statistics over the materialized distance matrix, restored
/// from the original distance-calculator's own diagnostics: useful for
/// sanity-checking a freshly built fabric before handing it to the
/// allocator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceStatistics {
    pub count: usize,
    pub mean_m: f64,
    pub min_m: f64,
    pub max_m: f64,
    pub within_400m: usize,
    pub within_1800m: usize,
    pub at_d_infinity: usize,
}

/// Owns the pedestrian network graph and the materialized distances
/// between residential buildings and every amenity location (existing
/// or candidate). Distances are computed once at construction and never
/// recomputed; `distance` and `candidates_within` are pure reads.
pub struct DistanceFabric {
    graph: Arc<Graph>,
    store: DistanceStore,
    residential_nodes: Vec<NodeId>,
    candidate_nodes: Vec<NodeId>,
    existing_by_category: HashMap<Category, Vec<NodeId>>,
    stats: Stats,
}

impl DistanceFabric {
    /// Builds the fabric: validates the graph, checks that every
    /// resident, candidate and existing amenity lies in the graph's
    /// largest connected component, then computes distances from every
    /// resident to every amenity location (existing and candidate) via
    /// parallel chunked Dijkstra.
    pub fn build(
        nodes: &[NetworkNode],
        edges: &[NetworkEdge],
        residential: &[ResidentialBuilding],
        candidates: &[CandidateSite],
        existing_amenities: &[ExistingAmenity],
        d_infinity_m: f64,
        parallelism: usize,
    ) -> EngineResult<Self> {
        Self::build_with_progress(
            nodes,
            edges,
            residential,
            candidates,
            existing_amenities,
            d_infinity_m,
            parallelism,
            &NullProgressSink,
        )
    }

    /// Same as [`DistanceFabric::build`], but reports coarse checkpoints
    /// to `progress` as each chunk of the parallel Dijkstra construction
    /// joins (spec's "at coarse checkpoints during Fabric construction").
    #[allow(clippy::too_many_arguments)]
    pub fn build_with_progress(
        nodes: &[NetworkNode],
        edges: &[NetworkEdge],
        residential: &[ResidentialBuilding],
        candidates: &[CandidateSite],
        existing_amenities: &[ExistingAmenity],
        d_infinity_m: f64,
        parallelism: usize,
        progress: &dyn ProgressSink,
    ) -> EngineResult<Self> {
        info!(nodes = nodes.len(), edges = edges.len(), "building graph");
        let graph = Graph::build(nodes, edges)?;

        let component = graph.largest_component();
        for r in residential {
            if !component.contains(&r.snapped_node) {
                return Err(EngineError::DataIntegrity {
                    entity: "residential_building",
                    id: r.building_id,
                });
            }
        }
        for c in candidates {
            if !component.contains(&c.snapped_node) {
                return Err(EngineError::DataIntegrity {
                    entity: "candidate_site",
                    id: c.candidate_id,
                });
            }
        }
        for a in existing_amenities {
            if !component.contains(&a.snapped_node) {
                return Err(EngineError::DataIntegrity {
                    entity: "existing_amenity",
                    id: a.amenity_id,
                });
            }
        }

        // Per-candidate capacity bookkeeping (`allocator::greedy`) is keyed
        // by `snapped_node`, so two distinct candidate sites sharing a node
        // would silently collapse into one capacity pool. Reject that here
        // rather than let it surface as a confusing allocator bug.
        let mut seen_candidate_nodes: hashbrown::HashSet<NodeId> =
            hashbrown::HashSet::with_capacity(candidates.len());
        for c in candidates {
            if !seen_candidate_nodes.insert(c.snapped_node) {
                return Err(EngineError::DataIntegrity {
                    entity: "candidate_site.snapped_node",
                    id: c.candidate_id,
                });
            }
        }

        let mut destinations: hashbrown::HashSet<NodeId> =
            hashbrown::HashSet::with_capacity(candidates.len() + existing_amenities.len());
        destinations.extend(candidates.iter().map(|c| c.snapped_node));
        destinations.extend(existing_amenities.iter().map(|a| a.snapped_node));

        let residential_nodes: Vec<NodeId> = residential.iter().map(|r| r.snapped_node).collect();
        let candidate_nodes: Vec<NodeId> = candidates.iter().map(|c| c.snapped_node).collect();

        let graph = Arc::new(graph);
        let (per_source, mut stats) = dijkstra::parallel_multi_source_distances_with_progress(
            &graph,
            &residential_nodes,
            parallelism,
            progress,
        );

        let mut store = DistanceStore::new(d_infinity_m);
        for (source, distances) in per_source {
            for &destination in &destinations {
                match distances.get(&destination) {
                    Some(&d) if d < d_infinity_m => store.insert(source, destination, d),
                    _ => stats.bump_pairs_at_d_infinity(1),
                }
            }
        }
        debug!(
            pairs = store.len(),
            pairs_at_d_infinity = stats.get_pairs_at_d_infinity(),
            "distance fabric built"
        );

        let mut existing_by_category: HashMap<Category, Vec<NodeId>> = HashMap::new();
        for amenity in existing_amenities {
            existing_by_category
                .entry(amenity.category.clone())
                .or_default()
                .push(amenity.snapped_node);
        }

        Ok(DistanceFabric {
            graph,
            store,
            residential_nodes,
            candidate_nodes,
            existing_by_category,
            stats,
        })
    }

    /// Shortest-path distance in meters between two nodes, or
    /// `d_infinity` if no recorded pair exists. Only defined for
    /// (resident, amenity-location) pairs: the fabric does not
    /// materialize arbitrary node-to-node distances.
    pub fn distance(&self, a: NodeId, b: NodeId) -> f64 {
        self.store.get(a, b)
    }

    pub fn d_infinity(&self) -> f64 {
        self.store.d_infinity()
    }

    /// Residents within `radius_m` of `candidate`, used to build a
    /// candidate's neighborhood `N_j`. A resident whose distance reads
    /// back as `d_infinity` (unreachable, or beyond the fabric's
    /// materialized horizon) is never admitted, even when `radius_m >=
    /// d_infinity` -- the sentinel marks "not actually measured", not a
    /// real distance to compare against the radius.
    pub fn candidates_within(&self, candidate: NodeId, radius_m: f64) -> Vec<NodeId> {
        self.residential_nodes
            .iter()
            .copied()
            .filter(|&resident| {
                let d = self.distance(candidate, resident);
                d < self.d_infinity() && d <= radius_m
            })
            .collect()
    }

    pub fn residential_nodes(&self) -> &[NodeId] {
        &self.residential_nodes
    }

    pub fn candidate_nodes(&self) -> &[NodeId] {
        &self.candidate_nodes
    }

    pub fn existing_amenities(&self, category: &Category) -> &[NodeId] {
        self.existing_by_category
            .get(category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// Min/max/mean distance distribution over every materialized pair,
    /// plus counts within the two scoring breakpoints commonly used
    /// (400m, 1800m) and the count sitting at `d_infinity`. Restored
    /// from the original distance calculator's own sanity-check report.
    pub fn distance_statistics(&self) -> DistanceStatistics {
        let mut count = 0usize;
        let mut sum = 0.0;
        let mut min_m = f64::INFINITY;
        let mut max_m = f64::NEG_INFINITY;
        let mut within_400m = 0usize;
        let mut within_1800m = 0usize;
        let mut at_d_infinity = 0usize;

        for &resident in &self.residential_nodes {
            for &candidate in &self.candidate_nodes {
                let d = self.distance(resident, candidate);
                count += 1;
                sum += d;
                min_m = min_m.min(d);
                max_m = max_m.max(d);
                if d <= 400.0 {
                    within_400m += 1;
                }
                if d <= 1800.0 {
                    within_1800m += 1;
                }
                if d >= self.d_infinity() {
                    at_d_infinity += 1;
                }
            }
        }

        DistanceStatistics {
            count,
            mean_m: if count > 0 { sum / count as f64 } else { 0.0 },
            min_m: if count > 0 { min_m } else { 0.0 },
            max_m: if count > 0 { max_m } else { 0.0 },
            within_400m,
            within_1800m,
            at_d_infinity,
        }
    }
}
