//! The WalkScore Evaluator: piecewise-linear scoring over weighted
//! nearest/top-r amenity distances.
//!
//! # Submodules
//!
//! - [`pwl`]: the piecewise-linear breakpoint/value curve.
//! - [`evaluator`]: weighted-distance computation (no normalization)
//!   and score composition, plus post-hoc score summaries.

pub mod evaluator;
pub mod pwl;

pub use evaluator::{ScoreSummary, WalkScoreEvaluator};
pub use pwl::PiecewiseLinear;
