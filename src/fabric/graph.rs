use crate::error::{EngineError, EngineResult};
use crate::model::{NetworkEdge, NetworkNode, NodeId, NodeKind};
use hashbrown::{HashMap, HashSet};
use std::collections::VecDeque;

/// An undirected, weighted adjacency list over the pedestrian network.
///
/// Edge lengths are meters and must be strictly positive; that is
/// enforced once at construction, not re-checked on every lookup.
#[derive(Debug)]
pub struct Graph {
    adjacency: HashMap<NodeId, Vec<(NodeId, f64)>>,
}

impl Graph {
    /// Builds the adjacency list from a node list and an edge list.
    /// Nodes with no incident edges are still present (with an empty
    /// neighbor list) so isolated-node detection can tell them apart
    /// from nodes absent from the graph entirely. Nodes not tagged
    /// `NodeKind::Network` are ignored entirely: they exist in ingest
    /// for provenance only and never participate in routing, so an edge
    /// referencing one surfaces as the usual "edge references an
    /// unknown node" data-integrity error.
    pub fn build(nodes: &[NetworkNode], edges: &[NetworkEdge]) -> EngineResult<Self> {
        let mut adjacency: HashMap<NodeId, Vec<(NodeId, f64)>> =
            HashMap::with_capacity(nodes.len());
        for node in nodes {
            if node.kind != NodeKind::Network {
                continue;
            }
            adjacency.entry(node.id).or_default();
        }

        for edge in edges {
            if !(edge.length_m > 0.0) {
                return Err(EngineError::DataIntegrity {
                    entity: "edge",
                    id: edge.from.0,
                });
            }
            if !adjacency.contains_key(&edge.from) {
                return Err(EngineError::DataIntegrity {
                    entity: "edge.from",
                    id: edge.from.0,
                });
            }
            if !adjacency.contains_key(&edge.to) {
                return Err(EngineError::DataIntegrity {
                    entity: "edge.to",
                    id: edge.to.0,
                });
            }
            adjacency
                .get_mut(&edge.from)
                .expect("checked above")
                .push((edge.to, edge.length_m));
            adjacency
                .get_mut(&edge.to)
                .expect("checked above")
                .push((edge.from, edge.length_m));
        }

        Ok(Graph { adjacency })
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.adjacency.contains_key(&node)
    }

    pub fn neighbors(&self, node: NodeId) -> &[(NodeId, f64)] {
        self.adjacency
            .get(&node)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.adjacency.keys().copied()
    }

    /// Returns the node set of the largest connected component,
    /// breadth-first, tie-broken toward the first-encountered component
    /// in node insertion order in case of a size tie (keeps the result
    /// deterministic).
    pub fn largest_component(&self) -> HashSet<NodeId> {
        let mut seen: HashSet<NodeId> = HashSet::with_capacity(self.adjacency.len());
        let mut best: HashSet<NodeId> = HashSet::new();

        let mut ordered_nodes: Vec<NodeId> = self.adjacency.keys().copied().collect();
        ordered_nodes.sort_by_key(|n| n.0);

        for &start in &ordered_nodes {
            if seen.contains(&start) {
                continue;
            }
            let mut component: HashSet<NodeId> = HashSet::new();
            let mut queue = VecDeque::new();
            queue.push_back(start);
            seen.insert(start);
            while let Some(node) = queue.pop_front() {
                component.insert(node);
                for &(neighbor, _) in self.neighbors(node) {
                    if seen.insert(neighbor) {
                        queue.push_back(neighbor);
                    }
                }
            }
            if component.len() > best.len() {
                best = component;
            }
        }
        best
    }
}
