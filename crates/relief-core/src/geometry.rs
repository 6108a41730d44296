//! Planar points and circles through three points.
//! All geometry uses f64.
use serde::{Deserialize, Serialize};

use crate::error::{Result, SurfaceError};

/// A point in the (axis coordinate, elevation) plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point2) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// Circle with centre (h, k) and radius r. Only built by [`fit_circle`],
/// which guarantees `r` is finite and positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleParams {
    pub h: f64,
    pub k: f64,
    pub r: f64,
}

impl CircleParams {
    /// Curvature in the `100 / radius` convention.
    pub fn curvature(&self) -> f64 {
        100.0 / self.r
    }

    /// Half-chord height `sqrt(r² − (coord − h)²)` above or below the centre.
    ///
    /// A negative radicand means `coord` is beyond the circle's horizontal
    /// extent; the caller decides which axis to blame, so this only reports
    /// `None`.
    #[inline]
    pub fn arc_offset(&self, coord: f64) -> Option<f64> {
        let d = coord - self.h;
        let radicand = self.r * self.r - d * d;
        if radicand < 0.0 {
            None
        } else {
            Some(radicand.sqrt())
        }
    }
}

/// Fit the unique circle through three points.
///
/// Each pair of points gives one linear equation in the centre (h, k):
///   A·h + B·k = C   with A = 2(x1−x0), B = 2(y1−y0), C = x1²+y1²−x0²−y0²
///   D·h + E·k = F   with D = 2(x2−x1), E = 2(y2−y1), F = x2²+y2²−x1²−y1²
/// solved by Cramer's rule. A zero determinant means the points are colinear
/// or coincident.
pub fn fit_circle(p0: Point2, p1: Point2, p2: Point2) -> Result<CircleParams> {
    let a = 2.0 * (p1.x - p0.x);
    let b = 2.0 * (p1.y - p0.y);
    let c = p1.x * p1.x + p1.y * p1.y - p0.x * p0.x - p0.y * p0.y;
    let d = 2.0 * (p2.x - p1.x);
    let e = 2.0 * (p2.y - p1.y);
    let f = p2.x * p2.x + p2.y * p2.y - p1.x * p1.x - p1.y * p1.y;

    let det = a * e - d * b;
    if det == 0.0 {
        return Err(SurfaceError::DegenerateGeometry);
    }

    let h = (c * e - f * b) / det;
    let k = (a * f - d * c) / det;
    let r = p0.distance(Point2::new(h, k));

    if !(h.is_finite() && k.is_finite() && r.is_finite()) || r <= 0.0 {
        return Err(SurfaceError::DegenerateGeometry);
    }
    Ok(CircleParams { h, k, r })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn unit_circle_from_three_points() {
        let c = fit_circle(
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 1.0),
            Point2::new(-1.0, 0.0),
        )
        .unwrap();
        assert_abs_diff_eq!(c.h, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(c.k, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(c.r, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(c.curvature(), 100.0, epsilon = 1e-9);
    }

    #[test]
    fn colinear_points_are_degenerate() {
        let err = fit_circle(
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(2.0, 2.0),
        )
        .unwrap_err();
        assert!(matches!(err, SurfaceError::DegenerateGeometry));
    }

    #[test]
    fn coincident_points_are_degenerate() {
        let p = Point2::new(3.0, -2.0);
        assert!(matches!(
            fit_circle(p, p, Point2::new(5.0, 1.0)),
            Err(SurfaceError::DegenerateGeometry)
        ));
    }

    #[test]
    fn every_input_point_lies_on_the_fitted_circle() {
        let pts = [
            Point2::new(0.0, 0.0),
            Point2::new(50.0, 7.5),
            Point2::new(100.0, 0.0),
        ];
        let c = fit_circle(pts[0], pts[1], pts[2]).unwrap();
        for p in pts {
            assert_abs_diff_eq!(p.distance(Point2::new(c.h, c.k)), c.r, epsilon = 1e-9);
        }
        // Symmetric chord: centre sits on the perpendicular bisector.
        assert_abs_diff_eq!(c.h, 50.0, epsilon = 1e-9);
    }

    #[test]
    fn arc_offset_outside_extent_is_none() {
        let c = CircleParams { h: 0.0, k: 0.0, r: 2.0 };
        assert_abs_diff_eq!(c.arc_offset(0.0).unwrap(), 2.0);
        assert_abs_diff_eq!(c.arc_offset(2.0).unwrap(), 0.0);
        assert!(c.arc_offset(2.5).is_none());
        assert!(c.arc_offset(-2.5).is_none());
    }
}
