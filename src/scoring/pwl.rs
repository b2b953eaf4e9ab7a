use crate::config::PwlConfig;

/// A piecewise-linear curve: clamps its input to `[breakpoints[0],
/// breakpoints[last]]`, then linearly interpolates within the segment
/// that contains it.
///
/// # Example
///
/// ```
/// use walkability_engine::scoring::PiecewiseLinear;
///
/// let curve = PiecewiseLinear::new(
///     vec![0.0, 400.0, 1800.0, 2400.0],
///     vec![100.0, 100.0, 0.0, 0.0],
/// ).unwrap();
///
/// assert_eq!(curve.score(0.0), 100.0);
/// assert_eq!(curve.score(400.0), 100.0);
/// assert_eq!(curve.score(1100.0), 50.0); // midpoint of the 400..1800 segment
/// assert_eq!(curve.score(3000.0), 0.0); // clamped beyond the last breakpoint
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PiecewiseLinear {
    breakpoints: Vec<f64>,
    scores: Vec<f64>,
}

impl PiecewiseLinear {
    pub fn new(breakpoints: Vec<f64>, scores: Vec<f64>) -> Result<Self, String> {
        let config = PwlConfig {
            breakpoints,
            scores,
        };
        config
            .validate()
            .map_err(|e| e.to_string())?;
        Ok(PiecewiseLinear {
            breakpoints: config.breakpoints,
            scores: config.scores,
        })
    }

    pub fn from_config(config: &PwlConfig) -> Self {
        PiecewiseLinear {
            breakpoints: config.breakpoints.clone(),
            scores: config.scores.clone(),
        }
    }

    /// Clamps `distance` into `[breakpoints[0], breakpoints[last]]` and
    /// linearly interpolates between the two breakpoints bracketing it.
    pub fn score(&self, distance: f64) -> f64 {
        let lo = self.breakpoints[0];
        let hi = *self.breakpoints.last().expect("validated non-empty");
        let distance = distance.clamp(lo, hi);

        for window in self.breakpoints.windows(2).zip(self.scores.windows(2)) {
            let ([x1, x2], [y1, y2]) = window;
            if distance >= *x1 && distance <= *x2 {
                if x2 == x1 {
                    return *y1;
                }
                return y1 + (y2 - y1) * (distance - x1) / (x2 - x1);
            }
        }
        *self.scores.last().expect("validated non-empty")
    }
}
