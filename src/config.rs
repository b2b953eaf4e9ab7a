//! Engine configuration: the knobs enumerated in the external interface.
//!
//! `ScoringConfig` and `EngineConfig` are plain `serde`-derived structs so
//! they can be embedded directly in a JSON dataset fixture
//! ([`crate::io::dataset`]) or built programmatically; the CLI additionally
//! exposes the handful of knobs worth tuning per run as `clap` flags.

use crate::error::{EngineError, EngineResult};
use crate::model::{Category, CategoryWeighting};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default sentinel distance (meters) for pairs with no path or a path
/// longer than the fabric's reach, per the paper's `D_infinity`.
pub const DEFAULT_D_INFINITY_M: f64 = 2400.0;

/// Default radius (meters) bounding each candidate's neighborhood `N_j`.
pub const DEFAULT_NEIGHBORHOOD_RADIUS_M: f64 = 3000.0;

/// A piecewise-linear breakpoint/value curve, validated at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PwlConfig {
    /// Non-decreasing distances, in meters. Consecutive breakpoints may
    /// repeat (a vertical step in the curve); `PiecewiseLinear::score`
    /// special-cases that segment to return the earlier breakpoint's
    /// value rather than dividing by zero.
    pub breakpoints: Vec<f64>,
    /// Scores at each breakpoint, same length as `breakpoints`.
    pub scores: Vec<f64>,
}

impl PwlConfig {
    pub fn validate(&self) -> EngineResult<()> {
        if self.breakpoints.len() < 2 {
            return Err(EngineError::Configuration(
                "piecewise-linear curve needs at least two breakpoints".to_string(),
            ));
        }
        if self.breakpoints.len() != self.scores.len() {
            return Err(EngineError::Configuration(format!(
                "piecewise-linear curve has {} breakpoints but {} scores",
                self.breakpoints.len(),
                self.scores.len()
            )));
        }
        if !self.breakpoints.windows(2).all(|w| w[0] <= w[1]) {
            return Err(EngineError::Configuration(
                "piecewise-linear breakpoints must be non-decreasing".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration of the WalkScore evaluator: the category weighting
/// table and the piecewise-linear scoring curve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub categories: HashMap<Category, CategoryWeighting>,
    pub pwl: PwlConfig,
}

impl ScoringConfig {
    pub fn validate(&self) -> EngineResult<()> {
        if self.categories.is_empty() {
            return Err(EngineError::Configuration(
                "scoring configuration has no amenity categories".to_string(),
            ));
        }
        for (category, weighting) in &self.categories {
            match weighting {
                CategoryWeighting::Plain { weight } if *weight <= 0.0 => {
                    return Err(EngineError::Configuration(format!(
                        "category {category:?} has a non-positive plain weight"
                    )));
                }
                CategoryWeighting::Depth { rank_weights, .. } if rank_weights.is_empty() => {
                    return Err(EngineError::Configuration(format!(
                        "category {category:?} has a depth weighting with no ranks"
                    )));
                }
                CategoryWeighting::Depth { category_weight, .. } if *category_weight <= 0.0 => {
                    return Err(EngineError::Configuration(format!(
                        "category {category:?} has a non-positive category weight"
                    )));
                }
                CategoryWeighting::Depth { rank_weights, .. }
                    if rank_weights.iter().any(|w| *w < 0.0) =>
                {
                    return Err(EngineError::Configuration(format!(
                        "category {category:?} has a negative rank weight"
                    )));
                }
                _ => {}
            }
        }
        self.pwl.validate()
    }
}

/// Configuration of the greedy allocator run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocatorConfig {
    /// Maximum number of new amenities to allocate per category.
    pub k: u32,
    /// Radius (meters) bounding each candidate's neighborhood `N_j`.
    #[serde(default = "default_neighborhood_radius")]
    pub neighborhood_radius_m: f64,
}

fn default_neighborhood_radius() -> f64 {
    DEFAULT_NEIGHBORHOOD_RADIUS_M
}

impl AllocatorConfig {
    pub fn validate(&self) -> EngineResult<()> {
        if self.k == 0 {
            return Err(EngineError::Configuration(
                "k must be at least 1".to_string(),
            ));
        }
        if !(self.neighborhood_radius_m > 0.0) {
            return Err(EngineError::Configuration(
                "neighborhood radius must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_d_infinity")]
    pub d_infinity_m: f64,
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
    pub scoring: ScoringConfig,
    pub allocator: AllocatorConfig,
    /// Subset of `scoring.categories` to actually optimize over this run.
    /// `None` (the default) optimizes every category in the weighting
    /// table; existing amenities and residents of every category still
    /// feed scoring either way, only which categories the allocator is
    /// allowed to site new candidates for is restricted.
    #[serde(default)]
    pub categories: Option<Vec<Category>>,
    /// Whether the allocator breaks ties between equally-good
    /// `(category, candidate)` pairs deterministically (by id order)
    /// rather than by iteration order of the underlying hash map. `off`
    /// is accepted for parity with the original tool's flag but is a
    /// documented no-op: nondeterministic tie-breaking was never
    /// actually wired up, and flipping this off would only make runs
    /// harder to reproduce for no benefit.
    #[serde(default = "default_deterministic_tiebreak")]
    pub deterministic_tiebreak: bool,
}

fn default_d_infinity() -> f64 {
    DEFAULT_D_INFINITY_M
}

fn default_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

fn default_deterministic_tiebreak() -> bool {
    true
}

impl EngineConfig {
    pub fn validate(&self) -> EngineResult<()> {
        if !(self.d_infinity_m > 0.0) {
            return Err(EngineError::Configuration(
                "d_infinity_m must be positive".to_string(),
            ));
        }
        if self.parallelism == 0 {
            return Err(EngineError::Configuration(
                "parallelism must be at least 1".to_string(),
            ));
        }
        self.scoring.validate()?;
        self.allocator.validate()?;
        if let Some(categories) = &self.categories {
            if categories.is_empty() {
                return Err(EngineError::Configuration(
                    "categories restriction is present but empty".to_string(),
                ));
            }
            for category in categories {
                if !self.scoring.categories.contains_key(category) {
                    return Err(EngineError::Configuration(format!(
                        "categories restriction names {category:?}, which has no weighting entry"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Categories the allocator should optimize: the `categories`
    /// restriction if set, otherwise every category in the weighting
    /// table.
    pub fn active_categories(&self) -> Vec<Category> {
        match &self.categories {
            Some(categories) => categories.clone(),
            None => self.scoring.categories.keys().cloned().collect(),
        }
    }
}
