use crate::fabric::DistanceFabric;
use crate::model::{AllocationSet, NodeId};
use crate::scoring::WalkScoreEvaluator;
use hashbrown::HashMap;

/// Caches each resident **node's** current WalkScore, keyed by node id,
/// never by building id.
///
/// Multiple residential buildings snapped to the same node share one
/// entry; the running average the allocator reports still divides by
/// the total building count (see
/// [`crate::allocator::greedy::GreedyAllocator`]), so a node carrying
/// three buildings counts three times toward the average while its
/// score is computed, and cached, only once.
pub struct ScoreCache {
    scores: HashMap<NodeId, f64>,
}

impl ScoreCache {
    /// Computes the initial score for every distinct resident node.
    pub fn build(
        evaluator: &WalkScoreEvaluator,
        fabric: &DistanceFabric,
        allocation: &AllocationSet,
        distinct_resident_nodes: &[NodeId],
    ) -> Self {
        let mut scores = HashMap::with_capacity(distinct_resident_nodes.len());
        for &node in distinct_resident_nodes {
            scores.insert(node, evaluator.score(fabric, node, allocation));
        }
        ScoreCache { scores }
    }

    pub fn get(&self, node: NodeId) -> f64 {
        self.scores
            .get(&node)
            .copied()
            .unwrap_or_else(|| panic!("score cache missing an entry for node {node:?}"))
    }

    /// Recomputes and stores the score for `node`. Callers are expected
    /// to call this only for nodes inside the committed candidate's
    /// neighborhood `N_j` — an update to a node outside that
    /// neighborhood is an internal invariant violation (see
    /// `GreedyAllocator::commit`).
    pub fn update(
        &mut self,
        evaluator: &WalkScoreEvaluator,
        fabric: &DistanceFabric,
        allocation: &AllocationSet,
        node: NodeId,
    ) -> f64 {
        let new_score = evaluator.score(fabric, node, allocation);
        self.scores.insert(node, new_score);
        new_score
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}
