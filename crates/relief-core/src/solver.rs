//! Forward and inverse arc curvature.
//!
//! A span of length `L` and a dimensionless rise `Z` define three points
//!
//! ```text
//!   Plan:     A = (0, 0)   B = (L/2, Z·L/2 ± Z·L/4)   C = (L, 0)
//!   Profile:  A = (0, 0)   B = (L/2, Z·L/2 ± Z·L/4)   C = (L, Z·L)
//! ```
//!
//! (`+` convex, `−` concave). The circumradius R of that triangle gives the
//! curvature `100 / R`. [`circle_from_z`] evaluates the relation directly;
//! [`solve_z`] inverts it with a bounded secant iteration.
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SurfaceError};
use crate::geometry::Point2;

/// Where the end point of the arc sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArcLayout {
    /// Both ends on the baseline; the arc is seen in plan.
    #[default]
    Plan,
    /// End point raised to `Z·L`; the arc rides on a slope of gradient Z.
    Profile,
}

/// Direction of the mid-point offset from the chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArcBend {
    #[default]
    Convex,
    Concave,
}

/// The three arc points for span `span` and rise `z`.
pub fn arc_points(span: f64, z: f64, layout: ArcLayout, bend: ArcBend) -> [Point2; 3] {
    let quarter = z * span / 4.0;
    let mid_y = match bend {
        ArcBend::Convex => z * span / 2.0 + quarter,
        ArcBend::Concave => z * span / 2.0 - quarter,
    };
    let end_y = match layout {
        ArcLayout::Plan => 0.0,
        ArcLayout::Profile => z * span,
    };
    [
        Point2::new(0.0, 0.0),
        Point2::new(span / 2.0, mid_y),
        Point2::new(span, end_y),
    ]
}

/// Circumradius of the triangle `abc` via Heron's formula, or `None` when the
/// points are (numerically) colinear.
fn circumradius(a: Point2, b: Point2, c: Point2) -> Option<f64> {
    let ab = a.distance(b);
    let bc = b.distance(c);
    let ac = a.distance(c);

    let s = (ab + bc + ac) / 2.0;
    let area = (s * (s - ab) * (s - bc) * (s - ac)).max(0.0).sqrt();
    if area <= 0.0 {
        return None;
    }
    Some((ab * bc * ac) / (4.0 * area))
}

/// Curvature (`100 / R`) of the arc for rise `z`.
///
/// Returns `+∞` for a colinear arc (e.g. `z == 0`) so that a root search is
/// pushed away from that rise instead of failing outright.
pub fn curvature_from_z(span: f64, z: f64, layout: ArcLayout, bend: ArcBend) -> f64 {
    let [a, b, c] = arc_points(span, z, layout, bend);
    match circumradius(a, b, c) {
        Some(r) => 100.0 / r,
        None => f64::INFINITY,
    }
}

/// Radius and curvature of one arc.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArcCurvature {
    pub radius: f64,
    /// `100 / radius`.
    pub curvature: f64,
}

/// Forward relation: radius and curvature for span `span` and rise `z`.
pub fn circle_from_z(span: f64, z: f64, layout: ArcLayout, bend: ArcBend) -> Result<ArcCurvature> {
    check_span(span)?;
    let [a, b, c] = arc_points(span, z, layout, bend);
    let radius = circumradius(a, b, c).ok_or(SurfaceError::DegenerateGeometry)?;
    Ok(ArcCurvature { radius, curvature: 100.0 / radius })
}

fn check_span(span: f64) -> Result<()> {
    if span > 0.0 && span.is_finite() {
        Ok(())
    } else {
        Err(SurfaceError::InvalidSpan(span))
    }
}

/// Inverse problem: which rise produces `curvature` over `span`?
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverQuery {
    pub span: f64,
    pub curvature: f64,
    pub initial_guess: f64,
    #[serde(default)]
    pub layout: ArcLayout,
    #[serde(default)]
    pub bend: ArcBend,
}

impl SolverQuery {
    /// Plan / convex arc, the layout used by surface templates.
    pub fn new(span: f64, curvature: f64, initial_guess: f64) -> Self {
        Self {
            span,
            curvature,
            initial_guess,
            layout: ArcLayout::Plan,
            bend: ArcBend::Convex,
        }
    }
}

/// Stopping rules for [`solve_z`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Absolute tolerance on `curvature_from_z(z) − target`.
    pub tolerance: f64,
    pub max_iterations: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self { tolerance: 1e-6, max_iterations: 100 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolvedElevation {
    pub z: f64,
    pub iterations: u32,
    pub residual: f64,
}

/// Offset used to seed a secant partner next to `z`.
fn partner_step(z: f64) -> f64 {
    if z == 0.0 {
        1e-6
    } else {
        z.abs() * 1e-3
    }
}

/// Solve `curvature_from_z(z) = query.curvature` for z.
///
/// Secant iteration from `query.initial_guess`. Where the residual is not
/// finite (colinear arc) the iterate keeps moving in the direction it was
/// already going, and a fresh partner point is taken once it is finite again.
/// Fails with `ConvergenceFailure` when the iteration cap is hit or the iterate
/// leaves the finite reals; a non-converged value is never returned.
pub fn solve_z(query: &SolverQuery, config: &SolverConfig) -> Result<SolvedElevation> {
    check_span(query.span)?;
    if !(query.curvature > 0.0 && query.curvature.is_finite()) {
        return Err(SurfaceError::InvalidCurvature(query.curvature));
    }

    let residual = |z: f64| curvature_from_z(query.span, z, query.layout, query.bend) - query.curvature;

    let mut z_prev = query.initial_guess;
    let mut f_prev = residual(z_prev);
    if f_prev.is_finite() && f_prev.abs() <= config.tolerance {
        return Ok(SolvedElevation { z: z_prev, iterations: 0, residual: f_prev });
    }

    let mut z = z_prev + partner_step(z_prev);
    let mut last_residual = f_prev;
    let mut iterations = 0;

    while iterations < config.max_iterations {
        iterations += 1;
        let f = residual(z);
        debug!("solve_z iter {iterations}: z = {z:e}, residual = {f:e}");

        if f.is_finite() {
            last_residual = f;
            if f.abs() <= config.tolerance {
                return Ok(SolvedElevation { z, iterations, residual: f });
            }
        }

        let mut next = if !f.is_finite() {
            z + (z - z_prev)
        } else if !f_prev.is_finite() {
            z + partner_step(z)
        } else {
            let denom = f - f_prev;
            if denom == 0.0 {
                z + (z - z_prev)
            } else {
                z - f * (z - z_prev) / denom
            }
        };
        if next == z {
            next = z + partner_step(z);
        }
        if !next.is_finite() {
            break;
        }

        z_prev = z;
        f_prev = f;
        z = next;
    }

    warn!(
        "solve_z: no convergence for span {} curvature {} after {iterations} iterations",
        query.span, query.curvature
    );
    Err(SurfaceError::ConvergenceFailure { iterations, residual: last_residual })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::fit_circle;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn heron_radius_agrees_with_circle_fit() {
        for layout in [ArcLayout::Plan, ArcLayout::Profile] {
            for bend in [ArcBend::Convex, ArcBend::Concave] {
                let [a, b, c] = arc_points(25.0, 0.01, layout, bend);
                let fit = fit_circle(a, b, c).unwrap();
                let arc = circle_from_z(25.0, 0.01, layout, bend).unwrap();
                assert_relative_eq!(arc.radius, fit.r, max_relative = 1e-6);
                assert_relative_eq!(arc.curvature, fit.curvature(), max_relative = 1e-6);
            }
        }
    }

    #[test]
    fn plan_convex_closed_form() {
        // Mid-point height b = 0.75·Z·L; r = (L²/4 + b²) / 2b.
        let arc = circle_from_z(200.0, 0.01, ArcLayout::Plan, ArcBend::Convex).unwrap();
        let b = 1.5;
        assert_relative_eq!(arc.radius, (10_000.0 + b * b) / (2.0 * b), max_relative = 1e-9);
        assert_abs_diff_eq!(arc.curvature, 0.029993, epsilon = 1e-6);
    }

    #[test]
    fn zero_rise_is_infinite_curvature() {
        assert_eq!(curvature_from_z(100.0, 0.0, ArcLayout::Plan, ArcBend::Convex), f64::INFINITY);
        assert!(matches!(
            circle_from_z(100.0, 0.0, ArcLayout::Plan, ArcBend::Convex),
            Err(SurfaceError::DegenerateGeometry)
        ));
    }

    #[test]
    fn round_trip_recovers_rise() {
        let cfg = SolverConfig::default();
        for z in [0.002, 0.01, 0.05, 2.0] {
            let c = circle_from_z(200.0, z, ArcLayout::Plan, ArcBend::Convex).unwrap().curvature;
            let solved = solve_z(&SolverQuery::new(200.0, c, z * 1.05), &cfg).unwrap();
            assert_abs_diff_eq!(solved.z, z, epsilon = 1e-4);
            assert!(solved.residual.abs() <= cfg.tolerance);
        }
    }

    #[test]
    fn round_trip_profile_layout() {
        let z = 0.02;
        let c = circle_from_z(200.0, z, ArcLayout::Profile, ArcBend::Concave).unwrap().curvature;
        let query = SolverQuery {
            layout: ArcLayout::Profile,
            bend: ArcBend::Concave,
            ..SolverQuery::new(200.0, c, 0.021)
        };
        let solved = solve_z(&query, &SolverConfig::default()).unwrap();
        assert_abs_diff_eq!(solved.z, z, epsilon = 1e-4);
    }

    #[test]
    fn small_initial_guess_reaches_reference_rise() {
        let solved = solve_z(&SolverQuery::new(200.0, 0.029993, 0.0001), &SolverConfig::default()).unwrap();
        assert_abs_diff_eq!(solved.z, 0.01, epsilon = 1e-4);
    }

    #[test]
    fn colinear_initial_guess_escapes() {
        let c = circle_from_z(200.0, 0.01, ArcLayout::Plan, ArcBend::Convex).unwrap().curvature;
        let solved = solve_z(&SolverQuery::new(200.0, c, 0.0), &SolverConfig::default()).unwrap();
        assert_abs_diff_eq!(solved.z.abs(), 0.01, epsilon = 1e-4);
    }

    #[test]
    fn unreachable_curvature_fails_to_converge() {
        // Plan arcs over L = 200 peak at 200 / L = 1.0.
        let cfg = SolverConfig { tolerance: 1e-6, max_iterations: 50 };
        let err = solve_z(&SolverQuery::new(200.0, 5.0, 0.01), &cfg).unwrap_err();
        match err {
            SurfaceError::ConvergenceFailure { iterations, .. } => assert!(iterations <= 50),
            other => panic!("expected ConvergenceFailure, got {other:?}"),
        }
    }

    #[test]
    fn invalid_inputs_are_rejected() {
        let cfg = SolverConfig::default();
        assert!(matches!(
            solve_z(&SolverQuery::new(0.0, 0.03, 0.01), &cfg),
            Err(SurfaceError::InvalidSpan(_))
        ));
        assert!(matches!(
            solve_z(&SolverQuery::new(200.0, -1.0, 0.01), &cfg),
            Err(SurfaceError::InvalidCurvature(_))
        ));
    }
}
