use crate::fabric::DistanceFabric;
use crate::model::NodeId;
use crate::progress::{NullProgressSink, ProgressEvent, ProgressPhase, ProgressSink};
use crate::statistics::Stats;
use hashbrown::HashMap;
use std::sync::Arc;

/// Precomputed neighborhoods `N_j`: for each candidate site, the
/// residential nodes within the configured radius. Bounds every
/// objective-delta evaluation in the allocator to `O(|N_j|)` instead of
/// `O(|N|)`.
pub struct NeighborhoodIndex {
    by_candidate: HashMap<NodeId, Vec<NodeId>>,
    stats: Stats,
}

impl NeighborhoodIndex {
    /// Builds `N_j` for every candidate in parallel, partitioning the
    /// candidate list into `parallelism` disjoint chunks — the same
    /// chunked worker-pool shape used for Dijkstra construction.
    pub fn build(fabric: &Arc<DistanceFabric>, radius_m: f64, parallelism: usize) -> Self {
        Self::build_with_progress(fabric, radius_m, parallelism, &NullProgressSink)
    }

    /// Same as [`NeighborhoodIndex::build`], but reports a coarse
    /// [`ProgressEvent`] as each worker's chunk of candidates finishes.
    pub fn build_with_progress(
        fabric: &Arc<DistanceFabric>,
        radius_m: f64,
        parallelism: usize,
        progress: &dyn ProgressSink,
    ) -> Self {
        let candidates = fabric.candidate_nodes().to_vec();
        if candidates.is_empty() {
            return NeighborhoodIndex {
                by_candidate: HashMap::new(),
                stats: Stats::new(),
            };
        }

        let parallelism = parallelism.max(1).min(candidates.len());
        let chunk_size = candidates.len().div_ceil(parallelism);
        let candidates = Arc::new(candidates);

        let handles: Vec<_> = (0..parallelism)
            .map(|worker_id| {
                let fabric = Arc::clone(fabric);
                let candidates = Arc::clone(&candidates);
                let start = worker_id * chunk_size;
                let end = std::cmp::min(start + chunk_size, candidates.len());

                std::thread::spawn(move || {
                    let mut local_stats = Stats::new();
                    let mut local: Vec<(NodeId, Vec<NodeId>)> = Vec::with_capacity(end - start);
                    for &candidate in &candidates[start..end] {
                        let neighborhood = fabric.candidates_within(candidate, radius_m);
                        local_stats.bump_dists_computed(neighborhood.len());
                        local.push((candidate, neighborhood));
                    }
                    (local, local_stats)
                })
            })
            .collect();

        let total_chunks = handles.len();
        let mut by_candidate = HashMap::with_capacity(candidates.len());
        let mut stats = Stats::new();
        for (joined, handle) in handles.into_iter().enumerate() {
            let (local, local_stats) = handle.join().expect("neighborhood worker panicked");
            stats = stats.merge(&local_stats);
            by_candidate.extend(local);
            progress.on_progress(ProgressEvent {
                phase: ProgressPhase::NeighborhoodPrecompute,
                fraction_complete: (joined + 1) as f64 / total_chunks as f64,
                eta_seconds: None,
            });
        }

        NeighborhoodIndex { by_candidate, stats }
    }

    pub fn neighbors(&self, candidate: NodeId) -> &[NodeId] {
        self.by_candidate
            .get(&candidate)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }
}
