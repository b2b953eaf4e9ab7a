use crate::allocator::cache::ScoreCache;
use crate::allocator::cancellation::CancellationToken;
use crate::allocator::neighborhood::NeighborhoodIndex;
use crate::config::AllocatorConfig;
use crate::fabric::DistanceFabric;
use crate::model::{AllocationSet, CandidateSite, Category, NodeId, ResidentialBuilding};
use crate::progress::{ProgressEvent, ProgressPhase, ProgressSink};
use crate::scoring::WalkScoreEvaluator;
use hashbrown::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// One committed (category, candidate) decision.
#[derive(Debug, Clone, PartialEq)]
pub struct IterationRecord {
    pub iteration: usize,
    pub category: Category,
    pub candidate_id: i64,
    pub delta_avg: f64,
    pub average_after: f64,
}

/// The outcome of a completed allocator run. Infeasibility is reported
/// as data here, never as an `EngineError` — the run still succeeds
/// with whatever partial allocation it managed.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationOutcome {
    pub allocation: AllocationSet,
    pub building_scores: HashMap<i64, f64>,
    pub average_walkscore: f64,
    pub iterations: Vec<IterationRecord>,
    pub infeasible_categories: Vec<Category>,
}

/// `Ready` stage of the allocator state machine: holds everything
/// needed to prepare, but has not yet built the neighborhood index or
/// score cache.
pub struct GreedyAllocator {
    fabric: Arc<DistanceFabric>,
    evaluator: WalkScoreEvaluator,
    categories: Vec<Category>,
    residential: Vec<ResidentialBuilding>,
    candidates: Vec<CandidateSite>,
    config: AllocatorConfig,
}

impl GreedyAllocator {
    pub fn new(
        fabric: Arc<DistanceFabric>,
        evaluator: WalkScoreEvaluator,
        categories: Vec<Category>,
        residential: Vec<ResidentialBuilding>,
        candidates: Vec<CandidateSite>,
        config: AllocatorConfig,
    ) -> Self {
        GreedyAllocator {
            fabric,
            evaluator,
            categories,
            residential,
            candidates,
            config,
        }
    }

    /// `Ready -> Prepared`: builds the neighborhood index `N_j` and the
    /// node-keyed score cache against the current (empty) allocation.
    pub fn prepare(self, parallelism: usize) -> PreparedAllocator {
        self.prepare_with_progress(parallelism, &crate::progress::NullProgressSink)
    }

    /// Same as [`GreedyAllocator::prepare`], but reports coarse
    /// [`crate::progress::ProgressEvent`]s as the neighborhood index is
    /// built.
    pub fn prepare_with_progress(
        self,
        parallelism: usize,
        progress: &dyn ProgressSink,
    ) -> PreparedAllocator {
        info!(
            candidates = self.candidates.len(),
            residents = self.residential.len(),
            "preparing allocator"
        );
        let neighborhoods = NeighborhoodIndex::build_with_progress(
            &self.fabric,
            self.config.neighborhood_radius_m,
            parallelism,
            progress,
        );

        let mut building_count: HashMap<NodeId, u32> = HashMap::new();
        for r in &self.residential {
            *building_count.entry(r.snapped_node).or_insert(0) += 1;
        }
        let distinct_nodes: Vec<NodeId> = building_count.keys().copied().collect();

        let allocation = AllocationSet::new();
        let cache = ScoreCache::build(&self.evaluator, &self.fabric, &allocation, &distinct_nodes);

        let total_buildings = self.residential.len() as f64;
        let running_sum: f64 = distinct_nodes
            .iter()
            .map(|&n| cache.get(n) * building_count[&n] as f64)
            .sum();

        let mut candidate_by_node: HashMap<NodeId, i64> = HashMap::new();
        let mut remaining_capacity: HashMap<NodeId, u32> = HashMap::new();
        for c in &self.candidates {
            candidate_by_node.insert(c.snapped_node, c.candidate_id);
            *remaining_capacity.entry(c.snapped_node).or_insert(0) += c.capacity;
        }

        PreparedAllocator {
            fabric: self.fabric,
            evaluator: self.evaluator,
            categories: self.categories,
            residential: self.residential,
            neighborhoods,
            building_count,
            distinct_nodes,
            cache,
            allocation,
            running_sum,
            total_buildings,
            candidate_by_node,
            remaining_capacity,
            config: self.config,
        }
    }
}

/// `Prepared` stage: everything needed to iterate is precomputed.
pub struct PreparedAllocator {
    fabric: Arc<DistanceFabric>,
    evaluator: WalkScoreEvaluator,
    categories: Vec<Category>,
    residential: Vec<ResidentialBuilding>,
    neighborhoods: NeighborhoodIndex,
    building_count: HashMap<NodeId, u32>,
    distinct_nodes: Vec<NodeId>,
    cache: ScoreCache,
    allocation: AllocationSet,
    running_sum: f64,
    total_buildings: f64,
    candidate_by_node: HashMap<NodeId, i64>,
    remaining_capacity: HashMap<NodeId, u32>,
    config: AllocatorConfig,
}

impl PreparedAllocator {
    /// `Prepared -> Iterating -> Done`. Commits one (category, candidate)
    /// pair per iteration until every category reaches its `k` budget,
    /// every category is infeasible, or `cancellation` is observed at an
    /// iteration boundary. Returns `None` on cancellation: per-spec, a
    /// cancelled run yields no partial results.
    pub fn run(
        mut self,
        cancellation: &CancellationToken,
        progress: &dyn ProgressSink,
    ) -> Option<OptimizationOutcome> {
        let mut iterations = Vec::new();
        let mut dead: Vec<Category> = Vec::new();
        let k = self.config.k as usize;
        let total_target = self.categories.len() * k;

        loop {
            if cancellation.is_cancelled() {
                return None;
            }

            let active: Vec<usize> = (0..self.categories.len())
                .filter(|&i| {
                    self.allocation.len_for(&self.categories[i]) < k
                        && !dead.contains(&self.categories[i])
                })
                .collect();
            if active.is_empty() {
                break;
            }

            let best = self.find_best_pair(&active, &mut dead);
            let Some((category_index, candidate_node, delta_avg)) = best else {
                break;
            };

            let category = self.categories[category_index].clone();
            let candidate_id = self.candidate_by_node[&candidate_node];
            self.commit(&category, candidate_node, delta_avg);

            let average_after = self.running_sum / self.total_buildings;
            debug!(
                iteration = iterations.len() + 1,
                category = %category.0,
                candidate_id,
                delta_avg,
                average_after,
                "committed allocation"
            );
            iterations.push(IterationRecord {
                iteration: iterations.len() + 1,
                category,
                candidate_id,
                delta_avg,
                average_after,
            });

            if total_target > 0 {
                progress.on_progress(ProgressEvent {
                    phase: ProgressPhase::Iterating,
                    fraction_complete: iterations.len() as f64 / total_target as f64,
                    eta_seconds: None,
                });
            }
        }

        let mut infeasible_categories: Vec<Category> = self
            .categories
            .iter()
            .filter(|c| self.allocation.len_for(c) < k)
            .cloned()
            .collect();
        infeasible_categories.sort_by(|a, b| a.0.cmp(&b.0));

        let mut building_scores = HashMap::with_capacity(self.residential.len());
        for r in &self.residential {
            building_scores.insert(r.building_id, self.cache.get(r.snapped_node));
        }

        Some(OptimizationOutcome {
            allocation: self.allocation,
            building_scores,
            average_walkscore: self.running_sum / self.total_buildings,
            iterations,
            infeasible_categories,
        })
    }

    /// Finds the (category, candidate) pair with the largest exact
    /// objective-average delta among `active` category indices,
    /// deterministically tie-broken by (category index, candidate id).
    /// Marks any active category with no remaining eligible candidate as
    /// dead (infeasible) as a side effect.
    fn find_best_pair(
        &self,
        active: &[usize],
        dead: &mut Vec<Category>,
    ) -> Option<(usize, NodeId, f64)> {
        let mut best: Option<(usize, NodeId, f64)> = None;

        for &category_index in active {
            let category = &self.categories[category_index];
            let mut eligible: Vec<NodeId> = self
                .remaining_capacity
                .iter()
                .filter(|(node, &cap)| cap > 0 && !self.allocation.contains(category, **node))
                .map(|(&node, _)| node)
                .collect();
            eligible.sort_by_key(|n| self.candidate_by_node[n]);

            if eligible.is_empty() {
                dead.push(category.clone());
                continue;
            }

            for node in eligible {
                let delta = self.evaluate_delta(category, node);
                let candidate_id = self.candidate_by_node[&node];
                let is_better = match &best {
                    None => true,
                    Some((best_category, best_node, best_delta)) => {
                        let best_candidate_id = self.candidate_by_node[best_node];
                        delta > *best_delta
                            || (delta == *best_delta
                                && (category_index, candidate_id)
                                    < (*best_category, best_candidate_id))
                    }
                };
                if is_better {
                    best = Some((category_index, node, delta));
                }
            }
        }

        best
    }

    /// Exact average-delta from hypothetically allocating `category` to
    /// `candidate`: only the nodes in the candidate's neighborhood `N_j`
    /// can change score, per the fabric's locality guarantee (scoring a
    /// node farther than `N_j`'s radius away can't newly surface this
    /// candidate as anyone's nearest/top-r choice).
    fn evaluate_delta(&self, category: &Category, candidate: NodeId) -> f64 {
        let mut hypothetical = self.allocation.clone();
        hypothetical.insert(category.clone(), candidate);

        let mut delta_sum = 0.0;
        for &node in self.neighborhoods.neighbors(candidate) {
            let old_score = self.cache.get(node);
            let new_score = self.evaluator.score(&self.fabric, node, &hypothetical);
            let count = self.building_count.get(&node).copied().unwrap_or(0) as f64;
            delta_sum += (new_score - old_score) * count;
        }
        delta_sum / self.total_buildings
    }

    fn commit(&mut self, category: &Category, candidate: NodeId, delta_avg: f64) {
        let inserted = self.allocation.insert(category.clone(), candidate);
        assert!(
            inserted,
            "internal invariant violation: committed a (category, candidate) pair twice"
        );

        let before_sum = self.running_sum;
        for &node in self.neighborhoods.neighbors(candidate) {
            let old_score = self.cache.get(node);
            let new_score = self
                .cache
                .update(&self.evaluator, &self.fabric, &self.allocation, node);
            let count = self.building_count.get(&node).copied().unwrap_or(0) as f64;
            self.running_sum += (new_score - old_score) * count;
        }

        let actual_delta_avg = (self.running_sum - before_sum) / self.total_buildings;
        assert!(
            (actual_delta_avg - delta_avg).abs() < 1e-6,
            "internal invariant violation: committed delta {actual_delta_avg} disagrees with \
             the evaluated delta {delta_avg}"
        );

        let remaining = self
            .remaining_capacity
            .get_mut(&candidate)
            .expect("candidate present in remaining_capacity");
        assert!(
            *remaining > 0,
            "internal invariant violation: committed to a candidate with no remaining capacity"
        );
        *remaining -= 1;

        assert!(
            self.running_sum / self.total_buildings + 1e-9
                >= before_sum / self.total_buildings,
            "internal invariant violation: running average decreased after a commit"
        );
    }
}
