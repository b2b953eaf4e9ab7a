use crate::fabric::graph::Graph;
use crate::model::NodeId;
use crate::progress::{ProgressEvent, ProgressPhase, ProgressSink};
use crate::sets::distance_entry::DistanceEntry;
use crate::statistics::Stats;
use hashbrown::HashMap;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Runs single-source Dijkstra from `source` over `graph`, returning the
/// shortest-path distance (meters) to every reachable node, and bumping
/// `stats` as it goes. Nodes unreachable from `source` are simply absent
/// from the result; the sentinel `D_infinity` substitution happens one
/// layer up, in [`crate::fabric::store::DistanceStore`].
pub fn single_source_distances(
    graph: &Graph,
    source: NodeId,
    stats: &mut Stats,
) -> HashMap<NodeId, f64> {
    stats.bump_dijkstra_runs();

    let mut distances: HashMap<NodeId, f64> = HashMap::new();
    let mut heap: BinaryHeap<Reverse<DistanceEntry>> = BinaryHeap::new();

    distances.insert(source, 0.0);
    heap.push(Reverse(DistanceEntry::new(0.0, source)));

    while let Some(Reverse(DistanceEntry { distance, node })) = heap.pop() {
        stats.bump_nodes_visited();
        let best_known = distances.get(&node).copied().unwrap_or(f64::INFINITY);
        if distance.0 > best_known {
            // Stale heap entry from before a shorter path was found.
            continue;
        }

        for &(neighbor, length_m) in graph.neighbors(node) {
            let candidate = distance.0 + length_m;
            let current = distances.get(&neighbor).copied().unwrap_or(f64::INFINITY);
            if candidate < current {
                distances.insert(neighbor, candidate);
                heap.push(Reverse(DistanceEntry::new(candidate, neighbor)));
            }
        }
    }

    stats.bump_dists_computed(distances.len());
    distances
}

/// Partitions `sources` into `parallelism` disjoint chunks and runs
/// `single_source_distances` for each source in a chunk on its own OS
/// thread, the same chunked worker-pool shape used throughout this
/// crate for embarrassingly parallel per-node work. Each worker
/// accumulates its own `(source, distances)` pairs and its own `Stats`;
/// the caller merges both after every thread has joined.
pub fn parallel_multi_source_distances(
    graph: &std::sync::Arc<Graph>,
    sources: &[NodeId],
    parallelism: usize,
) -> (Vec<(NodeId, HashMap<NodeId, f64>)>, Stats) {
    parallel_multi_source_distances_with_progress(
        graph,
        sources,
        parallelism,
        &crate::progress::NullProgressSink,
    )
}

/// Same as [`parallel_multi_source_distances`], but emits a coarse
/// [`ProgressEvent`] every time a worker's chunk joins, so a caller can
/// show fabric-construction progress without polling. Chunks may finish
/// out of the order they were spawned in; the fraction reported is
/// still monotonically non-decreasing because it counts joined chunks,
/// not worker identity.
pub fn parallel_multi_source_distances_with_progress(
    graph: &std::sync::Arc<Graph>,
    sources: &[NodeId],
    parallelism: usize,
    progress: &dyn ProgressSink,
) -> (Vec<(NodeId, HashMap<NodeId, f64>)>, Stats) {
    if sources.is_empty() {
        return (Vec::new(), Stats::new());
    }

    let parallelism = parallelism.max(1).min(sources.len());
    let chunk_size = sources.len().div_ceil(parallelism);
    let sources = std::sync::Arc::new(sources.to_vec());
    let total_chunks = parallelism;

    let handles: Vec<_> = (0..parallelism)
        .map(|worker_id| {
            let graph = std::sync::Arc::clone(graph);
            let sources = std::sync::Arc::clone(&sources);
            let start = worker_id * chunk_size;
            let end = std::cmp::min(start + chunk_size, sources.len());

            std::thread::spawn(move || {
                let mut local_stats = Stats::new();
                let mut local_results = Vec::with_capacity(end - start);
                for &source in &sources[start..end] {
                    let distances = single_source_distances(&graph, source, &mut local_stats);
                    local_results.push((source, distances));
                }
                (local_results, local_stats)
            })
        })
        .collect();

    let mut merged_stats = Stats::new();
    let mut all_results = Vec::with_capacity(sources.len());
    for (joined, handle) in handles.into_iter().enumerate() {
        let (local_results, local_stats) = handle.join().expect("dijkstra worker panicked");
        merged_stats = merged_stats.merge(&local_stats);
        all_results.extend(local_results);
        progress.on_progress(ProgressEvent {
            phase: ProgressPhase::FabricConstruction,
            fraction_complete: (joined + 1) as f64 / total_chunks as f64,
            eta_seconds: None,
        });
    }

    (all_results, merged_stats)
}
