//! Performance and construction statistics.
//!
//! Collects counters accumulated per worker thread during Distance
//! Fabric construction and neighborhood precomputation, and provides
//! distance-distribution summaries useful for sanity-checking a freshly
//! built fabric before handing it to the allocator.

mod stats;
pub use stats::*;
