//! Loading the engine's inputs from disk.
//!
//! This is deliberately thin: a JSON fixture format good enough for
//! tests, benchmarks and the demonstration CLI, not the real-world
//! OSM/GTFS ingest pipeline that would populate a production dataset.

mod dataset;

pub use dataset::Dataset;
