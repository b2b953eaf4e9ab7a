//! Fatal error taxonomy for the walkability engine.
//!
//! Only two kinds of failure are modeled as [`EngineError`]: a bad
//! configuration caught before any work starts, and a data integrity
//! problem discovered while building the [`crate::fabric::DistanceFabric`].
//! Infeasibility (a category can't reach its `k` budget) and cancellation
//! are not errors — they are structured, successful outcomes, see
//! [`crate::allocator::OptimizationOutcome`]. Internal invariant
//! violations (a non-monotone running average, a score changing outside
//! its neighborhood) are never folded into this enum either: they are
//! programmer errors and panic, matching the teacher's own
//! `.expect("...")` idiom at can't-happen states.

use thiserror::Error;

/// Fatal errors raised before or while constructing the engine's inputs.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A configuration value is invalid in a way that can be checked
    /// without touching the network graph (e.g. non-monotone PWL
    /// breakpoints, an empty category table, `k == 0`).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A referenced entity is missing or inconsistent with the network
    /// graph (e.g. a resident snapped to a node absent from the graph,
    /// an edge with non-positive length, a point outside the largest
    /// connected component).
    #[error("data integrity error: {entity} {id} is missing or inconsistent")]
    DataIntegrity { entity: &'static str, id: i64 },
}

pub type EngineResult<T> = Result<T, EngineError>;
