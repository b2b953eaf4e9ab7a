use crate::config::ScoringConfig;
use crate::fabric::DistanceFabric;
use crate::model::{AllocationSet, Category, CategoryWeighting, NodeId};
use crate::scoring::pwl::PiecewiseLinear;
use crate::sets::distance_entry::DistanceEntry;

/// Computes weighted distances and WalkScores for residential nodes
/// against a fixed fabric and a fixed scoring configuration.
///
/// `weighted_distance` deliberately does **not** normalize by the total
/// category weight. Summing weighted contributions directly, without
/// dividing by their total weight, keeps every category's marginal
/// contribution proportional to its configured weight across different
/// allocations; dividing by total weight instead rescales the whole sum
/// every time the category set changes, which distorts the greedy
/// allocator's deltas between iterations.
pub struct WalkScoreEvaluator {
    categories: std::collections::HashMap<Category, CategoryWeighting>,
    curve: PiecewiseLinear,
}

impl WalkScoreEvaluator {
    pub fn new(config: &ScoringConfig) -> Self {
        WalkScoreEvaluator {
            categories: config.categories.clone(),
            curve: PiecewiseLinear::from_config(&config.pwl),
        }
    }

    /// Sum of every category's weighted contribution for `resident`,
    /// given `allocation` (candidate sites committed so far) in addition
    /// to the fabric's existing amenities. No normalization.
    pub fn weighted_distance(
        &self,
        fabric: &DistanceFabric,
        resident: NodeId,
        allocation: &AllocationSet,
    ) -> f64 {
        let mut total = 0.0;
        for (category, weighting) in &self.categories {
            let locations = self.locations_for(fabric, allocation, category);
            total += match weighting {
                CategoryWeighting::Plain { weight } => {
                    let nearest = locations
                        .iter()
                        .map(|&loc| fabric.distance(resident, loc))
                        .fold(fabric.d_infinity(), f64::min);
                    weight * nearest
                }
                CategoryWeighting::Depth {
                    category_weight,
                    rank_weights,
                } => {
                    let mut ranked: Vec<DistanceEntry> = locations
                        .iter()
                        .map(|&loc| DistanceEntry::new(fabric.distance(resident, loc), loc))
                        .collect();
                    ranked.sort();

                    let mut sum = 0.0;
                    for (rank, &rank_weight) in rank_weights.iter().enumerate() {
                        let distance = ranked
                            .get(rank)
                            .map(|entry| entry.distance.0)
                            .unwrap_or_else(|| fabric.d_infinity());
                        sum += rank_weight * distance;
                    }
                    category_weight * sum
                }
            };
        }
        total
    }

    pub fn score(&self, fabric: &DistanceFabric, resident: NodeId, allocation: &AllocationSet) -> f64 {
        self.curve
            .score(self.weighted_distance(fabric, resident, allocation))
    }

    fn locations_for(
        &self,
        fabric: &DistanceFabric,
        allocation: &AllocationSet,
        category: &Category,
    ) -> Vec<NodeId> {
        let mut locations: Vec<NodeId> = fabric.existing_amenities(category).to_vec();
        locations.extend(allocation.nodes_for(category));
        locations
    }
}

/// Post-hoc descriptive statistics over a map of building id -> score.
/// Restored from the original scorer's own reporting method; pure
/// arithmetic over already-computed scores, not a new scoring rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreSummary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub above_50: usize,
    pub above_75: usize,
}

pub fn summarize(scores: &std::collections::HashMap<i64, f64>) -> ScoreSummary {
    let mut values: Vec<f64> = scores.values().copied().collect();
    values.sort_by(f64::total_cmp);

    let count = values.len();
    if count == 0 {
        return ScoreSummary {
            count: 0,
            mean: 0.0,
            median: 0.0,
            std_dev: 0.0,
            min: 0.0,
            max: 0.0,
            above_50: 0,
            above_75: 0,
        };
    }

    let mean = values.iter().sum::<f64>() / count as f64;
    let median = if count % 2 == 1 {
        values[count / 2]
    } else {
        (values[count / 2 - 1] + values[count / 2]) / 2.0
    };
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count as f64;

    ScoreSummary {
        count,
        mean,
        median,
        std_dev: variance.sqrt(),
        min: values[0],
        max: values[count - 1],
        above_50: values.iter().filter(|&&v| v >= 50.0).count(),
        above_75: values.iter().filter(|&&v| v >= 75.0).count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PwlConfig;
    use crate::model::{CandidateSite, ExistingAmenity, NetworkEdge, NetworkNode, ResidentialBuilding};
    use std::collections::HashMap;

    fn line_fabric() -> DistanceFabric {
        // resident(1) --300-- grocery(2) --400-- school(3) --100-- candidate(4)
        let nodes: Vec<_> = (1..=4)
            .map(|id| NetworkNode {
                id: NodeId(id),
                lat: 0.0,
                lon: 0.0,
                kind: crate::model::NodeKind::Network,
            })
            .collect();
        let edges = vec![
            NetworkEdge {
                from: NodeId(1),
                to: NodeId(2),
                length_m: 300.0,
            },
            NetworkEdge {
                from: NodeId(2),
                to: NodeId(3),
                length_m: 400.0,
            },
            NetworkEdge {
                from: NodeId(3),
                to: NodeId(4),
                length_m: 100.0,
            },
        ];
        let residential = vec![ResidentialBuilding {
            building_id: 1,
            snapped_node: NodeId(1),
            lat: 0.0,
            lon: 0.0,
        }];
        let candidates = vec![CandidateSite {
            candidate_id: 1,
            snapped_node: NodeId(4),
            capacity: 1,
        }];
        let existing = vec![ExistingAmenity {
            amenity_id: 1,
            category: Category("grocery".to_string()),
            snapped_node: NodeId(2),
        }];

        DistanceFabric::build(&nodes, &edges, &residential, &candidates, &existing, 2400.0, 1).unwrap()
    }

    fn pwl() -> PwlConfig {
        PwlConfig {
            breakpoints: vec![0.0, 400.0, 1800.0, 2400.0],
            scores: vec![100.0, 100.0, 0.0, 0.0],
        }
    }

    #[test]
    fn plain_category_uses_nearest_of_existing_and_allocated() {
        let mut categories = HashMap::new();
        categories.insert(
            Category("grocery".to_string()),
            CategoryWeighting::Plain { weight: 1.0 },
        );
        let evaluator = WalkScoreEvaluator::new(&ScoringConfig {
            categories,
            pwl: pwl(),
        });
        let fabric = line_fabric();
        let allocation = AllocationSet::new();

        // Only the existing grocery at node 2 (distance 300) counts.
        let distance = evaluator.weighted_distance(&fabric, NodeId(1), &allocation);
        assert_eq!(distance, 300.0);
    }

    #[test]
    fn plain_category_ignores_an_allocated_site_that_is_farther() {
        let mut categories = HashMap::new();
        categories.insert(
            Category("grocery".to_string()),
            CategoryWeighting::Plain { weight: 2.0 },
        );
        let evaluator = WalkScoreEvaluator::new(&ScoringConfig {
            categories,
            pwl: pwl(),
        });
        let fabric = line_fabric();
        let mut allocation = AllocationSet::new();
        // Allocate the candidate at node 4, distance 300+400+100=800 -- farther
        // than the existing grocery, so it should NOT change the result.
        allocation.insert(Category("grocery".to_string()), NodeId(4));

        let distance = evaluator.weighted_distance(&fabric, NodeId(1), &allocation);
        assert_eq!(distance, 2.0 * 300.0);
    }

    #[test]
    fn weighted_distance_is_not_normalized_by_total_weight() {
        let mut categories = HashMap::new();
        categories.insert(
            Category("grocery".to_string()),
            CategoryWeighting::Plain { weight: 3.0 },
        );
        let evaluator = WalkScoreEvaluator::new(&ScoringConfig {
            categories,
            pwl: pwl(),
        });
        let fabric = line_fabric();
        let allocation = AllocationSet::new();

        // If this were normalized by total_weight (3.0), the result would be
        // 300.0 regardless of the weight. It must scale with the weight.
        let distance = evaluator.weighted_distance(&fabric, NodeId(1), &allocation);
        assert_eq!(distance, 3.0 * 300.0);
    }

    #[test]
    fn depth_category_pads_missing_ranks_with_d_infinity() {
        let mut categories = HashMap::new();
        // Only one amenity of this category exists, but we ask for two ranks.
        categories.insert(
            Category("park".to_string()),
            CategoryWeighting::Depth {
                category_weight: 0.5,
                rank_weights: vec![0.6, 0.4],
            },
        );
        let evaluator = WalkScoreEvaluator::new(&ScoringConfig {
            categories,
            pwl: pwl(),
        });
        let fabric = line_fabric(); // no "park" category amenities at all
        let allocation = AllocationSet::new();

        let distance = evaluator.weighted_distance(&fabric, NodeId(1), &allocation);
        assert_eq!(distance, 0.5 * (0.6 * 2400.0 + 0.4 * 2400.0));
    }

    #[test]
    fn summarize_computes_basic_descriptive_statistics() {
        let mut scores = HashMap::new();
        scores.insert(1, 100.0);
        scores.insert(2, 50.0);
        scores.insert(3, 0.0);

        let summary = summarize(&scores);
        assert_eq!(summary.count, 3);
        assert_eq!(summary.mean, 50.0);
        assert_eq!(summary.median, 50.0);
        assert_eq!(summary.min, 0.0);
        assert_eq!(summary.max, 100.0);
        assert_eq!(summary.above_50, 2);
        assert_eq!(summary.above_75, 1);
    }

    #[test]
    fn summarize_of_empty_scores_is_all_zero() {
        let summary = summarize(&HashMap::new());
        assert_eq!(summary.count, 0);
        assert_eq!(summary.mean, 0.0);
    }
}
