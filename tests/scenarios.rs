//! Concrete scenarios exercising exact expected numeric outputs: a
//! single plain-category pick, a depth-category-only computation,
//! infeasibility, tie-break determinism, the locality radius audit and
//! cache-vs-recompute agreement after a full run.

use std::collections::HashMap;
use std::sync::Arc;
use walkability_engine::allocator::{CancellationToken, GreedyAllocator};
use walkability_engine::config::{AllocatorConfig, PwlConfig, ScoringConfig};
use walkability_engine::fabric::DistanceFabric;
use walkability_engine::model::{
    CandidateSite, Category, CategoryWeighting, ExistingAmenity, NetworkEdge, NetworkNode, NodeId,
    NodeKind, ResidentialBuilding,
};
use walkability_engine::progress::NullProgressSink;
use walkability_engine::scoring::WalkScoreEvaluator;

fn standard_pwl() -> PwlConfig {
    PwlConfig {
        breakpoints: vec![0.0, 400.0, 1800.0, 2400.0],
        scores: vec![100.0, 100.0, 0.0, 0.0],
    }
}

fn nodes_and_line(edges: &[(i64, i64, f64)]) -> (Vec<NetworkNode>, Vec<NetworkEdge>) {
    let mut ids: Vec<i64> = edges.iter().flat_map(|&(a, b, _)| [a, b]).collect();
    ids.sort_unstable();
    ids.dedup();
    let nodes = ids
        .iter()
        .map(|&id| NetworkNode {
            id: NodeId(id),
            lat: 0.0,
            lon: 0.0,
            kind: NodeKind::Network,
        })
        .collect();
    let edges = edges
        .iter()
        .map(|&(from, to, length_m)| NetworkEdge {
            from: NodeId(from),
            to: NodeId(to),
            length_m,
        })
        .collect();
    (nodes, edges)
}

/// Scenario A: two residents, one candidate, one plain category.
#[test]
fn scenario_a_single_plain_category_pick() {
    let (nodes, edges) = nodes_and_line(&[(1, 3, 500.0), (2, 3, 800.0)]);
    let residential = vec![
        ResidentialBuilding {
            building_id: 1,
            snapped_node: NodeId(1),
            lat: 0.0,
            lon: 0.0,
        },
        ResidentialBuilding {
            building_id: 2,
            snapped_node: NodeId(2),
            lat: 0.0,
            lon: 0.0,
        },
    ];
    let candidates = vec![CandidateSite {
        candidate_id: 1,
        snapped_node: NodeId(3),
        capacity: 1,
    }];
    let fabric = Arc::new(
        DistanceFabric::build(&nodes, &edges, &residential, &candidates, &[], 2400.0, 1).unwrap(),
    );

    let mut categories = HashMap::new();
    categories.insert(Category("grocery".to_string()), CategoryWeighting::Plain { weight: 1.0 });
    let evaluator = WalkScoreEvaluator::new(&ScoringConfig {
        categories,
        pwl: standard_pwl(),
    });

    let allocator = GreedyAllocator::new(
        Arc::clone(&fabric),
        evaluator,
        vec![Category("grocery".to_string())],
        residential,
        candidates,
        AllocatorConfig {
            k: 1,
            neighborhood_radius_m: 3000.0,
        },
    );
    let outcome = allocator
        .prepare(1)
        .run(&CancellationToken::new(), &NullProgressSink)
        .unwrap();

    assert_eq!(outcome.iterations.len(), 1);
    assert_eq!(outcome.iterations[0].candidate_id, 1);
    assert!((outcome.building_scores[&1] - 92.857142857).abs() < 1e-6);
    assert!((outcome.building_scores[&2] - 71.428571428).abs() < 1e-6);
    assert!((outcome.average_walkscore - 82.142857142).abs() < 1e-6);
}

/// Scenario B: a single resident scored against three existing
/// amenities of one depth category, no candidates at all.
#[test]
fn scenario_b_depth_category_only() {
    let (nodes, edges) = nodes_and_line(&[(1, 2, 300.0), (1, 3, 900.0), (1, 4, 1500.0)]);
    let residential = vec![ResidentialBuilding {
        building_id: 1,
        snapped_node: NodeId(1),
        lat: 0.0,
        lon: 0.0,
    }];
    let existing = vec![
        ExistingAmenity {
            amenity_id: 1,
            category: Category("restaurant".to_string()),
            snapped_node: NodeId(2),
        },
        ExistingAmenity {
            amenity_id: 2,
            category: Category("restaurant".to_string()),
            snapped_node: NodeId(3),
        },
        ExistingAmenity {
            amenity_id: 3,
            category: Category("restaurant".to_string()),
            snapped_node: NodeId(4),
        },
    ];

    let fabric =
        DistanceFabric::build(&nodes, &edges, &residential, &[], &existing, 2400.0, 1).unwrap();

    let mut categories = HashMap::new();
    categories.insert(
        Category("restaurant".to_string()),
        CategoryWeighting::Depth {
            category_weight: 0.6,
            rank_weights: vec![0.5, 0.3, 0.2],
        },
    );
    let evaluator = WalkScoreEvaluator::new(&ScoringConfig {
        categories,
        pwl: standard_pwl(),
    });

    let allocation = walkability_engine::model::AllocationSet::new();
    let weighted_distance = evaluator.weighted_distance(&fabric, NodeId(1), &allocation);
    assert!((weighted_distance - 432.0).abs() < 1e-9);

    let score = evaluator.score(&fabric, NodeId(1), &allocation);
    assert!((score - 97.714285714).abs() < 1e-6);
}

/// Scenario C: three categories share two capacity-1 candidates; the
/// third category runs out of eligible sites and is reported infeasible
/// without error.
#[test]
fn scenario_c_infeasibility_reported_as_data() {
    let (nodes, edges) = nodes_and_line(&[(1, 2, 100.0), (1, 3, 200.0)]);
    let residential = vec![ResidentialBuilding {
        building_id: 1,
        snapped_node: NodeId(1),
        lat: 0.0,
        lon: 0.0,
    }];
    let candidates = vec![
        CandidateSite {
            candidate_id: 10,
            snapped_node: NodeId(2),
            capacity: 1,
        },
        CandidateSite {
            candidate_id: 20,
            snapped_node: NodeId(3),
            capacity: 1,
        },
    ];
    let fabric = Arc::new(
        DistanceFabric::build(&nodes, &edges, &residential, &candidates, &[], 2400.0, 1).unwrap(),
    );

    let mut categories = HashMap::new();
    for name in ["catA", "catB", "catC"] {
        categories.insert(Category(name.to_string()), CategoryWeighting::Plain { weight: 1.0 });
    }
    // A wide single linear segment keeps every delta in this scenario
    // exactly linear, matching the hand-computed expectations below.
    let evaluator = WalkScoreEvaluator::new(&ScoringConfig {
        categories,
        pwl: PwlConfig {
            breakpoints: vec![0.0, 10_000.0],
            scores: vec![100.0, 0.0],
        },
    });

    let allocator = GreedyAllocator::new(
        Arc::clone(&fabric),
        evaluator,
        vec![
            Category("catA".to_string()),
            Category("catB".to_string()),
            Category("catC".to_string()),
        ],
        residential,
        candidates,
        AllocatorConfig {
            k: 1,
            neighborhood_radius_m: 3000.0,
        },
    );
    let outcome = allocator
        .prepare(1)
        .run(&CancellationToken::new(), &NullProgressSink)
        .unwrap();

    assert_eq!(outcome.iterations.len(), 2);
    assert_eq!(outcome.iterations[0].category, Category("catA".to_string()));
    assert_eq!(outcome.iterations[0].candidate_id, 10);
    assert_eq!(outcome.iterations[1].category, Category("catB".to_string()));
    assert_eq!(outcome.iterations[1].candidate_id, 20);
    assert_eq!(outcome.infeasible_categories, vec![Category("catC".to_string())]);
    assert!((outcome.average_walkscore - 73.0).abs() < 1e-9);
}

/// Scenario D: two candidates with identical neighborhoods and
/// distance profiles; the tie-break always selects the lower candidate
/// id, and repeated runs agree exactly.
#[test]
fn scenario_d_tie_break_picks_the_lower_candidate_id() {
    let (nodes, edges) = nodes_and_line(&[(1, 2, 100.0), (1, 3, 100.0)]);
    let residential = vec![ResidentialBuilding {
        building_id: 1,
        snapped_node: NodeId(1),
        lat: 0.0,
        lon: 0.0,
    }];
    let candidates = vec![
        CandidateSite {
            candidate_id: 5,
            snapped_node: NodeId(2),
            capacity: 1,
        },
        CandidateSite {
            candidate_id: 3,
            snapped_node: NodeId(3),
            capacity: 1,
        },
    ];
    let fabric = Arc::new(
        DistanceFabric::build(&nodes, &edges, &residential, &candidates, &[], 2400.0, 1).unwrap(),
    );

    let run = || {
        let mut categories = HashMap::new();
        categories.insert(Category("grocery".to_string()), CategoryWeighting::Plain { weight: 1.0 });
        let evaluator = WalkScoreEvaluator::new(&ScoringConfig {
            categories,
            pwl: standard_pwl(),
        });
        let allocator = GreedyAllocator::new(
            Arc::clone(&fabric),
            evaluator,
            vec![Category("grocery".to_string())],
            residential.clone(),
            candidates.clone(),
            AllocatorConfig {
                k: 1,
                neighborhood_radius_m: 3000.0,
            },
        );
        allocator
            .prepare(1)
            .run(&CancellationToken::new(), &NullProgressSink)
            .unwrap()
    };

    let first = run();
    let second = run();
    assert_eq!(first.iterations[0].candidate_id, 3);
    assert_eq!(first.iterations, second.iterations);
}

/// Scenario E: a candidate whose nearest resident sits just outside the
/// 3000m neighborhood radius contributes exactly zero delta, because
/// the distance (3001m) already exceeds the PWL's 2400m horizon either
/// way -- the radius carries a comfortable safety margin over the
/// scoring curve's reach.
#[test]
fn scenario_e_locality_radius_audit() {
    let (nodes, edges) = nodes_and_line(&[(1, 2, 3001.0)]);
    let residential = vec![ResidentialBuilding {
        building_id: 1,
        snapped_node: NodeId(1),
        lat: 0.0,
        lon: 0.0,
    }];
    let candidates = vec![CandidateSite {
        candidate_id: 1,
        snapped_node: NodeId(2),
        capacity: 1,
    }];
    let fabric =
        DistanceFabric::build(&nodes, &edges, &residential, &candidates, &[], 2400.0, 1).unwrap();

    let within = fabric.candidates_within(NodeId(2), 3000.0);
    assert!(within.is_empty(), "resident at 3001m must fall outside the 3000m radius");

    let mut categories = HashMap::new();
    categories.insert(Category("grocery".to_string()), CategoryWeighting::Plain { weight: 1.0 });
    let evaluator = WalkScoreEvaluator::new(&ScoringConfig {
        categories,
        pwl: standard_pwl(),
    });

    let empty = walkability_engine::model::AllocationSet::new();
    let mut allocated = walkability_engine::model::AllocationSet::new();
    allocated.insert(Category("grocery".to_string()), NodeId(2));

    let before = evaluator.score(&fabric, NodeId(1), &empty);
    let after = evaluator.score(&fabric, NodeId(1), &allocated);
    assert_eq!(before, after);
}

/// Scenario F: after a full run, the allocator's reported building
/// scores agree with a from-scratch recomputation against the final
/// allocation, within floating tolerance.
#[test]
fn scenario_f_cache_matches_a_from_scratch_recompute() {
    let (nodes, edges) = nodes_and_line(&[
        (1, 10, 250.0),
        (2, 10, 700.0),
        (3, 10, 1200.0),
        (10, 20, 150.0),
    ]);
    let residential = vec![
        ResidentialBuilding {
            building_id: 1,
            snapped_node: NodeId(1),
            lat: 0.0,
            lon: 0.0,
        },
        ResidentialBuilding {
            building_id: 2,
            snapped_node: NodeId(2),
            lat: 0.0,
            lon: 0.0,
        },
        ResidentialBuilding {
            building_id: 3,
            snapped_node: NodeId(3),
            lat: 0.0,
            lon: 0.0,
        },
    ];
    let candidates = vec![
        CandidateSite {
            candidate_id: 100,
            snapped_node: NodeId(10),
            capacity: 1,
        },
        CandidateSite {
            candidate_id: 200,
            snapped_node: NodeId(20),
            capacity: 1,
        },
    ];
    let fabric = Arc::new(
        DistanceFabric::build(&nodes, &edges, &residential, &candidates, &[], 2400.0, 2).unwrap(),
    );

    let mut categories = HashMap::new();
    categories.insert(Category("grocery".to_string()), CategoryWeighting::Plain { weight: 1.0 });
    let scoring = ScoringConfig {
        categories,
        pwl: standard_pwl(),
    };

    let allocator = GreedyAllocator::new(
        Arc::clone(&fabric),
        WalkScoreEvaluator::new(&scoring),
        vec![Category("grocery".to_string())],
        residential.clone(),
        candidates,
        AllocatorConfig {
            k: 2,
            neighborhood_radius_m: 3000.0,
        },
    );
    let outcome = allocator
        .prepare(2)
        .run(&CancellationToken::new(), &NullProgressSink)
        .unwrap();

    let recompute_evaluator = WalkScoreEvaluator::new(&scoring);
    for r in &residential {
        let recomputed = recompute_evaluator.score(&fabric, r.snapped_node, &outcome.allocation);
        let cached = outcome.building_scores[&r.building_id];
        assert!(
            (recomputed - cached).abs() < 1e-9,
            "building {} cached={cached} recomputed={recomputed}",
            r.building_id
        );
    }
}
