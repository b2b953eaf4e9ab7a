//! The Greedy Allocator: iterative best-(category, candidate) selection
//! bounded by a precomputed neighborhood index and an incrementally
//! updated score cache.
//!
//! # Submodules
//!
//! - [`neighborhood`]: precomputed candidate neighborhoods `N_j`.
//! - [`cache`]: the node-keyed score cache.
//! - [`cancellation`]: cooperative cross-thread cancellation.
//! - [`greedy`]: the `Ready -> Prepared -> Iterating -> Done` state
//!   machine itself.

pub mod cache;
pub mod cancellation;
pub mod greedy;
pub mod neighborhood;

pub use cancellation::CancellationToken;
pub use greedy::{GreedyAllocator, IterationRecord, OptimizationOutcome, PreparedAllocator};
pub use neighborhood::NeighborhoodIndex;
