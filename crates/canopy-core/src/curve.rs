//! Periodic piecewise-linear curves over the season cycle.

use serde::{Deserialize, Serialize};

/// Length of one season cycle in season-value units.
pub const SEASON_PERIOD: f32 = 4.0;

/// Errors raised when building a curve.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CurveError {
    /// No keyframes were given.
    #[error("curve needs at least one keyframe")]
    Empty,

    /// A keyframe is not finite or lies outside `[0, period)`.
    #[error("keyframe ({x}, {y}) is invalid")]
    InvalidKeyframe {
        /// Keyframe position.
        x: f32,
        /// Keyframe value.
        y: f32,
    },

    /// Keyframe positions are not strictly increasing.
    #[error("keyframe positions must be strictly increasing")]
    Unordered,
}

/// A curve through `(x, y)` keyframes that repeats every [`SEASON_PERIOD`].
///
/// Between the last keyframe and the first one of the next cycle the curve
/// interpolates across the wrap, so it is continuous everywhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<(f32, f32)>", into = "Vec<(f32, f32)>")]
pub struct InterpolationCurve {
    points: Vec<(f32, f32)>,
}

impl InterpolationCurve {
    /// Build a curve from keyframes sorted by position.
    ///
    /// # Errors
    ///
    /// Returns a [`CurveError`] if the keyframes are empty, non-finite,
    /// outside `[0, 4)`, or not strictly increasing.
    pub fn new(points: Vec<(f32, f32)>) -> Result<Self, CurveError> {
        if points.is_empty() {
            return Err(CurveError::Empty);
        }
        for &(x, y) in &points {
            if !x.is_finite() || !y.is_finite() || !(0.0..SEASON_PERIOD).contains(&x) {
                return Err(CurveError::InvalidKeyframe { x, y });
            }
        }
        if points.windows(2).any(|w| matches!(w, [a, b] if a.0 >= b.0)) {
            return Err(CurveError::Unordered);
        }
        Ok(Self { points })
    }

    /// A flat curve.
    pub fn constant(value: f32) -> Self {
        Self {
            points: vec![(0.0, value)],
        }
    }

    /// Keyframes known to be valid at compile time.
    fn preset(points: &[(f32, f32)]) -> Self {
        Self {
            points: points.to_vec(),
        }
    }

    /// Keyframes of the curve.
    pub fn points(&self) -> &[(f32, f32)] {
        &self.points
    }

    /// Sample the curve at `x`, wrapping into one period first.
    pub fn sample(&self, x: f32) -> f32 {
        let (Some(&first), Some(&last)) = (self.points.first(), self.points.last()) else {
            return 0.0;
        };
        if !x.is_finite() {
            return first.1;
        }
        let x = x.rem_euclid(SEASON_PERIOD);

        if x <= first.0 || x >= last.0 {
            let span = first.0 + SEASON_PERIOD - last.0;
            let offset = if x >= last.0 {
                x - last.0
            } else {
                x + SEASON_PERIOD - last.0
            };
            return lerp(last.1, first.1, offset / span);
        }

        for pair in self.points.windows(2) {
            if let [a, b] = pair
                && x >= a.0
                && x <= b.0
            {
                return lerp(a.1, b.1, (x - a.0) / (b.0 - a.0));
            }
        }
        last.1
    }

    // ---- Presets ----

    /// Temperate growth: peaks early summer, dormant mid-winter.
    pub fn temperate_growth() -> Self {
        Self::preset(&[(0.0, 0.75), (1.25, 1.0), (2.5, 0.5), (3.5, 0.0)])
    }

    /// Tropical growth: mild year-round swing.
    pub fn tropical_growth() -> Self {
        Self::preset(&[(0.0, 0.9), (1.5, 1.0), (3.0, 0.8)])
    }

    /// Temperate seed drops: concentrated in autumn.
    pub fn temperate_seed_drop() -> Self {
        Self::preset(&[(0.0, 0.1), (1.5, 0.25), (2.5, 1.0), (3.25, 0.1)])
    }

    /// Tropical seed drops: steady with a wet-season bump.
    pub fn tropical_seed_drop() -> Self {
        Self::preset(&[(0.0, 0.6), (2.0, 1.0)])
    }

    /// Temperate fruit production: late summer into autumn only.
    pub fn temperate_fruit() -> Self {
        Self::preset(&[(0.0, 0.0), (1.0, 0.25), (2.0, 1.0), (3.0, 0.0)])
    }

    /// Tropical fruit production: always some, peak mid-year.
    pub fn tropical_fruit() -> Self {
        Self::preset(&[(0.0, 0.5), (2.0, 1.0)])
    }
}

impl TryFrom<Vec<(f32, f32)>> for InterpolationCurve {
    type Error = CurveError;

    fn try_from(points: Vec<(f32, f32)>) -> Result<Self, Self::Error> {
        Self::new(points)
    }
}

impl From<InterpolationCurve> for Vec<(f32, f32)> {
    fn from(curve: InterpolationCurve) -> Self {
        curve.points
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    if !t.is_finite() {
        return a;
    }
    (b - a).mul_add(t.clamp(0.0, 1.0), a)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn hits_keyframes_exactly() {
        let curve = InterpolationCurve::temperate_growth();
        for &(x, y) in curve.points() {
            assert!(close(curve.sample(x), y), "x={x}");
        }
    }

    #[test]
    fn interpolates_between_keyframes() {
        let curve = InterpolationCurve::new(vec![(0.0, 0.0), (2.0, 1.0)]).unwrap();
        assert!(close(curve.sample(1.0), 0.5));
        // Wrap segment: 2.0 -> 4.0 runs from 1.0 back down to 0.0.
        assert!(close(curve.sample(3.0), 0.5));
    }

    #[test]
    fn is_periodic() {
        let curve = InterpolationCurve::temperate_fruit();
        for step in 0..40u8 {
            let x = f32::from(step) * 0.1;
            assert!(close(curve.sample(x), curve.sample(x + SEASON_PERIOD)));
            assert!(close(curve.sample(x), curve.sample(x - SEASON_PERIOD)));
        }
    }

    #[test]
    fn wraps_before_first_keyframe() {
        let curve = InterpolationCurve::new(vec![(1.0, 1.0), (3.0, 0.0)]).unwrap();
        // 3.0 -> 5.0 (== 1.0) spans the wrap; 0.0 is halfway along it.
        assert!(close(curve.sample(0.0), 0.5));
    }

    #[test]
    fn constant_is_flat() {
        let curve = InterpolationCurve::constant(0.3);
        assert!(close(curve.sample(0.0), 0.3));
        assert!(close(curve.sample(2.7), 0.3));
        assert!(close(curve.sample(f32::NAN), 0.3));
    }

    #[test]
    fn rejects_bad_keyframes() {
        assert_eq!(InterpolationCurve::new(Vec::new()), Err(CurveError::Empty));
        assert_eq!(
            InterpolationCurve::new(vec![(1.0, 0.0), (1.0, 1.0)]),
            Err(CurveError::Unordered)
        );
        assert!(InterpolationCurve::new(vec![(4.0, 0.0)]).is_err());
        assert!(InterpolationCurve::new(vec![(0.0, f32::INFINITY)]).is_err());
    }

    #[test]
    fn deserializes_from_pairs() {
        let curve: InterpolationCurve = serde_json::from_str("[[0.0, 1.0], [2.0, 0.0]]").unwrap();
        assert_eq!(curve.points().len(), 2);
        assert!(serde_json::from_str::<InterpolationCurve>("[]").is_err());
    }
}
