use clap::Parser;
use std::sync::Arc;
use tracing::info;
use walkability_engine::allocator::{CancellationToken, GreedyAllocator};
use walkability_engine::fabric::DistanceFabric;
use walkability_engine::io::Dataset;
use walkability_engine::progress::{ProgressEvent, ProgressSink};
use walkability_engine::scoring::WalkScoreEvaluator;

/// Prints each progress checkpoint to stderr via `tracing`; a real UI
/// collaborator would instead push these over a channel, as
/// `ChannelProgressSink` does.
struct TracingProgressSink;

impl ProgressSink for TracingProgressSink {
    fn on_progress(&self, event: ProgressEvent) {
        tracing::debug!(
            phase = ?event.phase,
            fraction_complete = event.fraction_complete,
            "progress"
        );
    }
}

/// Greedy facility-location optimizer for pedestrian WalkScore
#[derive(Parser, Debug)]
#[command(name = "walkability-engine")]
#[command(about = "Allocates new amenities to maximize population-wide WalkScore", long_about = None)]
struct Args {
    /// Path to the JSON dataset fixture
    #[arg(short, long)]
    dataset: String,

    /// Overrides the dataset's allocator budget (max new sites per category)
    #[arg(short, long)]
    k: Option<u32>,

    /// Number of worker threads for Dijkstra and neighborhood construction
    #[arg(short, long)]
    threads: Option<usize>,

    /// Overrides the dataset's neighborhood radius, in meters
    #[arg(long)]
    neighborhood_radius: Option<f64>,
}

fn main() {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    println!("Loading dataset from {}...", args.dataset);
    let mut dataset = match Dataset::load_from_path(&args.dataset) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("failed to load dataset: {e}");
            std::process::exit(1);
        }
    };

    if let Some(k) = args.k {
        dataset.config.allocator.k = k;
    }
    if let Some(radius) = args.neighborhood_radius {
        dataset.config.allocator.neighborhood_radius_m = radius;
    }
    if let Some(threads) = args.threads {
        dataset.config.parallelism = threads;
    }
    if let Err(e) = dataset.config.validate() {
        eprintln!("invalid configuration after CLI overrides: {e}");
        std::process::exit(1);
    }

    let parallelism = dataset.config.parallelism;
    info!(parallelism, "building distance fabric");
    let start_time = std::time::Instant::now();
    let progress = TracingProgressSink;

    let fabric = match DistanceFabric::build_with_progress(
        &dataset.nodes,
        &dataset.edges,
        &dataset.residential,
        &dataset.candidates,
        &dataset.existing_amenities,
        dataset.config.d_infinity_m,
        parallelism,
        &progress,
    ) {
        Ok(f) => Arc::new(f),
        Err(e) => {
            eprintln!("failed to build distance fabric: {e}");
            std::process::exit(1);
        }
    };
    println!(
        "Distance fabric built in {:.2}s ({} residents, {} candidates)",
        start_time.elapsed().as_secs_f64(),
        fabric.residential_nodes().len(),
        fabric.candidate_nodes().len()
    );

    let distance_stats = fabric.distance_statistics();
    println!(
        "Distance distribution: mean={:.1}m min={:.1}m max={:.1}m within_400m={} within_1800m={} at_d_infinity={}",
        distance_stats.mean_m,
        distance_stats.min_m,
        distance_stats.max_m,
        distance_stats.within_400m,
        distance_stats.within_1800m,
        distance_stats.at_d_infinity
    );

    let evaluator = WalkScoreEvaluator::new(&dataset.config.scoring);
    let categories = dataset.config.active_categories();
    let allocator = GreedyAllocator::new(
        Arc::clone(&fabric),
        evaluator,
        categories,
        dataset.residential.clone(),
        dataset.candidates.clone(),
        dataset.config.allocator.clone(),
    );

    println!("Running greedy allocation (k={})...", dataset.config.allocator.k);
    let run_start = std::time::Instant::now();
    let prepared = allocator.prepare_with_progress(parallelism, &progress);
    println!(
        "Allocator prepared (neighborhood index + score cache) in {:.2}s",
        run_start.elapsed().as_secs_f64()
    );
    let cancellation = CancellationToken::new();
    let outcome = prepared.run(&cancellation, &progress);

    match outcome {
        None => {
            println!("Run was cancelled before any iteration completed.");
        }
        Some(outcome) => {
            for record in &outcome.iterations {
                println!(
                    "  [{:>3}] {:<16} candidate={:<8} delta={:+.3} avg={:.3}",
                    record.iteration,
                    record.category.0,
                    record.candidate_id,
                    record.delta_avg,
                    record.average_after
                );
            }
            println!(
                "Completed {} iterations in {:.2}s",
                outcome.iterations.len(),
                run_start.elapsed().as_secs_f64()
            );
            println!("Final average WalkScore: {:.3}", outcome.average_walkscore);
            if !outcome.infeasible_categories.is_empty() {
                let names: Vec<&str> = outcome
                    .infeasible_categories
                    .iter()
                    .map(|c| c.0.as_str())
                    .collect();
                println!("Infeasible categories (budget not reached): {}", names.join(", "));
            }
        }
    }
}
