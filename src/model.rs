//! Stable data-transfer types.
//!
//! These are the shapes that would cross the boundary from an ingest
//! pipeline into the engine, and back out to persistence/presentation.
//! Nothing in this module performs I/O; [`crate::io::dataset`] is the
//! thin loader that turns a JSON fixture into these types for tests,
//! benchmarks and the demonstration CLI.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::collections::HashMap;

/// Identifier of a node in the pedestrian network graph.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub i64);

/// Classification tag carried by ingest. Only `Network` nodes are part
/// of the pedestrian network graph; any other tag is kept purely for
/// provenance and is dropped by `crate::fabric::graph::Graph::build`
/// before routing ever sees it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum NodeKind {
    #[default]
    Network,
    Other(String),
}

/// A node in the pedestrian network graph, as handed over by ingest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkNode {
    pub id: NodeId,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub kind: NodeKind,
}

/// An undirected edge of the pedestrian network graph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NetworkEdge {
    pub from: NodeId,
    pub to: NodeId,
    pub length_m: f64,
}

/// A residential building, snapped to its nearest network node.
///
/// Multiple buildings may snap to the same node; the score cache is
/// keyed by node, never by building, so those buildings always share
/// one cached value (see `crate::allocator::cache`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResidentialBuilding {
    pub building_id: i64,
    pub snapped_node: NodeId,
    /// Original coordinates, retained for presentation only; all
    /// routing and scoring uses `snapped_node`.
    pub lat: f64,
    pub lon: f64,
}

/// Name of an amenity category (e.g. `"grocery"`, `"school"`). Kept as a
/// string-keyed newtype rather than a closed Rust enum so the set of
/// categories stays data-driven, matching the weighting table's own
/// data-driven shape.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(pub String);

/// An existing amenity of a given category, snapped to a network node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExistingAmenity {
    pub amenity_id: i64,
    pub category: Category,
    pub snapped_node: NodeId,
}

/// A site where a new amenity could be built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandidateSite {
    pub candidate_id: i64,
    pub snapped_node: NodeId,
    /// Maximum number of amenities (across all categories) that may be
    /// allocated to this site. Must be at least 1.
    pub capacity: u32,
}

/// How a category's contribution to the weighted distance is computed.
///
/// `Plain` categories contribute `weight * nearest_distance`. `Depth`
/// categories contribute a rank-weighted sum over the `p`-th nearest
/// locations, padding missing ranks with `D_infinity`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum CategoryWeighting {
    Plain {
        weight: f64,
    },
    Depth {
        /// The category's own scalar weight (`w_cat` in spec terms),
        /// applied to the whole rank-weighted sum. There is no silent
        /// default for this field: an omitted value is a configuration
        /// error (see `crate::config::ScoringConfig::validate`), not the
        /// `0.6` fallback some source paths used.
        category_weight: f64,
        rank_weights: Vec<f64>,
    },
}

impl CategoryWeighting {
    pub fn total_weight(&self) -> f64 {
        match self {
            CategoryWeighting::Plain { weight } => *weight,
            CategoryWeighting::Depth {
                category_weight,
                rank_weights,
            } => category_weight * rank_weights.iter().sum::<f64>(),
        }
    }
}

/// The current allocation: for each category, the set of candidate
/// sites a new amenity of that category has been committed to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllocationSet {
    by_category: HashMap<Category, BTreeSet<NodeId>>,
}

impl AllocationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes_for(&self, category: &Category) -> impl Iterator<Item = NodeId> + '_ {
        self.by_category
            .get(category)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    pub fn len_for(&self, category: &Category) -> usize {
        self.by_category.get(category).map_or(0, BTreeSet::len)
    }

    pub fn contains(&self, category: &Category, node: NodeId) -> bool {
        self.by_category
            .get(category)
            .is_some_and(|set| set.contains(&node))
    }

    pub fn insert(&mut self, category: Category, node: NodeId) -> bool {
        self.by_category.entry(category).or_default().insert(node)
    }

    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.by_category.keys()
    }
}
