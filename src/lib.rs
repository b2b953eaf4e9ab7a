//! # Walkability Engine: facility-location optimization for pedestrian access
//!
//! This crate builds a pedestrian-network distance fabric between
//! residential buildings and amenity locations, scores each resident's
//! walkability against a configurable piecewise-linear curve, and
//! greedily allocates a budget of new amenities to the candidate sites
//! that raise the population-wide average WalkScore the most.
//!
//! ## Core Concepts
//!
//! - **Distance Fabric** ([`fabric`]): a parallel multi-source Dijkstra
//!   construction over the pedestrian network, materialized as a
//!   sparse resident-to-amenity distance matrix.
//! - **WalkScore Evaluator** ([`scoring`]): a piecewise-linear scoring
//!   curve plus a per-category weighting table (plain nearest-distance
//!   or rank-weighted depth), with no normalization by total weight.
//! - **Greedy Allocator** ([`allocator`]): an iterative best-(category,
//!   candidate) selection loop bounded by a precomputed neighborhood
//!   index and an incrementally updated, node-keyed score cache.
//!
//! ## Modules
//!
//! - [`model`]: stable domain types shared across the crate.
//! - [`config`]: engine configuration and its validation.
//! - [`error`]: the fatal error taxonomy.
//! - [`progress`]: cooperative progress reporting for long-running phases.
//! - [`fabric`]: the Distance Fabric.
//! - [`scoring`]: the WalkScore Evaluator.
//! - [`allocator`]: the Greedy Allocator.
//! - [`io`]: JSON dataset loading for tests, benchmarks and the CLI.
//! - [`statistics`]: fabric and allocator run counters.
//! - [`sets`]: small supporting data structures (total-ordered floats,
//!   Dijkstra heap entries).

pub mod allocator;
pub mod config;
pub mod error;
pub mod fabric;
pub mod io;
pub mod model;
pub mod progress;
pub mod scoring;
pub mod sets;
pub mod statistics;
