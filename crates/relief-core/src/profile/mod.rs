//! Two-axis curvature profiles.
//!
//! Each axis contributes independently:
//!   flat     `slope · (coord − origin)`
//!   convex   `+sqrt(r² − (coord − h)²) + k`
//!   concave  `−sqrt(r² − (coord − h)²) + k`
//! with (h, k, r) fitted through that axis' control points. The surface is
//! `z0 + fx(x) + fy(y)`, which covers every flat / convex / concave pairing
//! with one formula. Curved surfaces are then shifted so their minimum is 0.
pub mod params;

use log::debug;

use crate::error::{Result, SurfaceError};
use crate::geometry::{fit_circle, CircleParams, Point2};
use crate::grid::Grid;
use crate::heightfield::HeightField;
use crate::solver::{arc_points, solve_z, ArcBend, ArcLayout, SolverConfig, SolverQuery};
use params::{AxisCurvature, AxisProfile, ControlPoints, ProfileSpec};

/// Control points in world units for an axis spanning `[origin, end)`.
pub fn resolve_control_points(control: &ControlPoints, origin: f64, end: f64) -> [Point2; 3] {
    match control {
        ControlPoints::Template { rise } => {
            arc_points(end - origin, *rise, ArcLayout::Plan, ArcBend::Convex)
                .map(|p| Point2::new(p.x + origin, p.y))
        }
        ControlPoints::Explicit(points) => *points,
    }
}

/// Circle fitted for a curved axis.
pub fn axis_circle(profile: &AxisProfile, origin: f64, end: f64) -> Result<CircleParams> {
    let [p0, p1, p2] = resolve_control_points(&profile.control, origin, end);
    fit_circle(p0, p1, p2)
}

/// Curved axis whose template arc over `span` has curvature `target`
/// (`100 / radius`). The rise is recovered with [`solve_z`], seeded from the
/// shallow-arc approximation `c ≈ 600·Z / L`.
pub fn axis_for_curvature(
    curvature: AxisCurvature,
    span: f64,
    target: f64,
    config: &SolverConfig,
) -> Result<AxisProfile> {
    if !curvature.is_curved() {
        return Ok(AxisProfile::flat(0.0));
    }
    let guess = target * span / 600.0;
    let solved = solve_z(&SolverQuery::new(span, target, guess), config)?;
    debug!("rise {:.6} gives curvature {target} over span {span}", solved.z);
    Ok(AxisProfile::curved(curvature, ControlPoints::Template { rise: solved.z }))
}

/// One value per sample along an axis.
fn axis_terms(axis: char, profile: &AxisProfile, origin: f64, end: f64, coords: &[f64]) -> Result<Vec<f64>> {
    let sign = match profile.curvature {
        AxisCurvature::Flat => {
            return Ok(coords.iter().map(|&c| profile.slope * (c - origin)).collect());
        }
        AxisCurvature::Convex => 1.0,
        AxisCurvature::Concave => -1.0,
    };

    let circle = axis_circle(profile, origin, end)?;
    debug!(
        "{axis} axis {}: h = {:.4}, k = {:.4}, r = {:.4}",
        profile.curvature, circle.h, circle.k, circle.r
    );

    coords
        .iter()
        .map(|&coord| {
            circle
                .arc_offset(coord)
                .map(|offset| sign * offset + circle.k)
                .ok_or(SurfaceError::OutOfDomain { axis, coord })
        })
        .collect()
}

fn fill_row(out: &mut [f64], base: f64, fx: &[f64]) {
    for (v, &dx) in out.iter_mut().zip(fx) {
        *v = base + dx;
    }
}

#[cfg_attr(feature = "threading", allow(dead_code))]
fn compose_rows_serial(hf: &mut HeightField, z0: f64, fx: &[f64], fy: &[f64]) {
    let width = hf.width;
    if width == 0 {
        return;
    }
    for (row, out) in hf.data.chunks_mut(width).enumerate() {
        fill_row(out, z0 + fy[row], fx);
    }
}

#[cfg(feature = "threading")]
fn compose_rows_parallel(hf: &mut HeightField, z0: f64, fx: &[f64], fy: &[f64]) {
    use rayon::prelude::*;
    let width = hf.width;
    if width == 0 {
        return;
    }
    hf.data
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(row, out)| fill_row(out, z0 + fy[row], fx));
}

/// Write `z0 + fy[row] + fx[col]` into every cell.
fn compose_rows(hf: &mut HeightField, z0: f64, fx: &[f64], fy: &[f64]) {
    #[cfg(feature = "threading")]
    compose_rows_parallel(hf, z0, fx, fy);
    #[cfg(not(feature = "threading"))]
    compose_rows_serial(hf, z0, fx, fy);
}

/// Evaluate `spec` over `grid`.
///
/// # Errors
/// `DegenerateGeometry` when a curved axis' control points are colinear,
/// `OutOfDomain` when a sample lies beyond the fitted circle's extent.
pub fn evaluate_profile(spec: &ProfileSpec, grid: &Grid) -> Result<HeightField> {
    let b = &spec.bounds;
    let fx = axis_terms('x', &spec.x, b.x0, b.x_end, &grid.xs)?;
    let fy = axis_terms('y', &spec.y, b.y0, b.y_end, &grid.ys)?;

    let mut hf = HeightField::for_grid(grid);
    compose_rows(&mut hf, spec.z0, &fx, &fy);

    if spec.is_curved() {
        hf.normalize_baseline();
    }
    Ok(hf)
}
