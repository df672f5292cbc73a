// Copyright 2026 the Sketchloop Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Easing curves for clock transitions.
//!
//! An [`Easing`] maps the linear progress of a transition, in `[0, 1]`, onto
//! the fraction of the value change applied at that point. Every curve here
//! satisfies `f(0) = 0`, `f(1) = 1`, and is monotonically non-decreasing, so
//! a clock driven by it never runs backwards.

use kurbo::{CubicBez, ParamCurve, Point};

/// How a clock transition distributes its value change over its duration.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Easing {
    /// Constant rate.
    #[default]
    Linear,
    /// Accelerates quickly and decelerates slowly; `cubic-bezier(0.4, 0, 0.2, 1)`.
    FastOutSlowIn,
    /// Starts at full speed and decelerates; `cubic-bezier(0, 0, 0.2, 1)`.
    LinearOutSlowIn,
    /// Accelerates and ends at full speed; `cubic-bezier(0.4, 0, 1, 1)`.
    FastOutLinearIn,
    /// A custom curve, see [`Easing::cubic_bezier`].
    CubicBezier(CubicEasing),
}

/// A cubic Bézier from `(0, 0)` to `(1, 1)` whose control points lie in the
/// unit square.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CubicEasing {
    curve: CubicBez,
}

/// Bisection steps when inverting x(t); 2^-40 is far below any visible
/// difference.
const SOLVE_ITERATIONS: u32 = 40;

impl CubicEasing {
    /// Creates a curve with control points `(x1, y1)` and `(x2, y2)`.
    ///
    /// All coordinates are clamped to `[0, 1]`, which keeps the curve a
    /// monotone function of x.
    #[must_use]
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            curve: CubicBez::new(
                Point::ZERO,
                Point::new(unit(x1), unit(y1)),
                Point::new(unit(x2), unit(y2)),
                Point::new(1.0, 1.0),
            ),
        }
    }

    /// The two inner control points.
    #[must_use]
    pub fn control_points(&self) -> (Point, Point) {
        (self.curve.p1, self.curve.p2)
    }

    /// The curve's y at `x` in `[0, 1]`.
    fn y_at(&self, x: f64) -> f64 {
        if x <= 0.0 {
            return 0.0;
        }
        if x >= 1.0 {
            return 1.0;
        }
        let mut lo = 0.0;
        let mut hi = 1.0;
        for _ in 0..SOLVE_ITERATIONS {
            let mid = 0.5 * (lo + hi);
            if self.curve.eval(mid).x < x {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        self.curve.eval(0.5 * (lo + hi)).y
    }
}

impl Easing {
    /// Creates a cubic Bézier easing; see [`CubicEasing::new`].
    #[must_use]
    pub fn cubic_bezier(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self::CubicBezier(CubicEasing::new(x1, y1, x2, y2))
    }

    /// Evaluates the curve at linear progress `fraction`.
    ///
    /// `fraction` and the result are both clamped to `[0, 1]`.
    #[must_use]
    pub fn transform(self, fraction: f64) -> f64 {
        let x = unit(fraction);
        let y = match self {
            Self::Linear => x,
            Self::FastOutSlowIn => CubicEasing::new(0.4, 0.0, 0.2, 1.0).y_at(x),
            Self::LinearOutSlowIn => CubicEasing::new(0.0, 0.0, 0.2, 1.0).y_at(x),
            Self::FastOutLinearIn => CubicEasing::new(0.4, 0.0, 1.0, 1.0).y_at(x),
            Self::CubicBezier(curve) => curve.y_at(x),
        };
        unit(y)
    }
}

fn unit(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curves() -> [Easing; 6] {
        [
            Easing::Linear,
            Easing::FastOutSlowIn,
            Easing::LinearOutSlowIn,
            Easing::FastOutLinearIn,
            Easing::cubic_bezier(0.25, 0.1, 0.25, 1.0),
            Easing::cubic_bezier(0.3, 3.0, 0.7, -2.0),
        ]
    }

    #[test]
    fn endpoints_are_fixed() {
        for curve in curves() {
            assert_eq!(curve.transform(0.0), 0.0, "{curve:?} at 0");
            assert_eq!(curve.transform(1.0), 1.0, "{curve:?} at 1");
        }
    }

    #[test]
    fn curves_are_monotone() {
        for curve in curves() {
            let mut prev = 0.0;
            for i in 0..=200 {
                let v = curve.transform(f64::from(i) / 200.0);
                assert!(v >= prev - 1e-9, "{curve:?} decreased at step {i}");
                prev = v;
            }
        }
    }

    #[test]
    fn fast_out_slow_in_is_ahead_of_linear_at_midpoint() {
        let v = Easing::FastOutSlowIn.transform(0.5);
        assert!(v > 0.5, "expected > 0.5, got {v}");
        let v = Easing::FastOutLinearIn.transform(0.5);
        assert!(v < 0.5, "expected < 0.5, got {v}");
    }

    #[test]
    fn out_of_range_progress_is_clamped() {
        assert_eq!(Easing::Linear.transform(-1.0), 0.0);
        assert_eq!(Easing::FastOutSlowIn.transform(7.0), 1.0);
        assert_eq!(Easing::Linear.transform(f64::NAN), 0.0);
    }

    #[test]
    fn cubic_bezier_clamps_control_points() {
        let Easing::CubicBezier(curve) = Easing::cubic_bezier(-1.0, 2.0, 0.5, f64::NAN) else {
            panic!("expected a custom curve");
        };
        assert_eq!(
            curve.control_points(),
            (Point::new(0.0, 1.0), Point::new(0.5, 0.0))
        );
    }

    #[test]
    fn overshooting_control_points_stay_in_range() {
        let curve = Easing::cubic_bezier(0.3, 3.0, 0.7, -2.0);
        for i in 0..=100 {
            let v = curve.transform(f64::from(i) / 100.0);
            assert!((0.0..=1.0).contains(&v), "{v} at step {i}");
        }
    }
}
