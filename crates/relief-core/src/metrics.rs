//! Realised curvature of a generated surface.
//!
//! Fits a circle through the first, middle and last samples of the central
//! row (X transect) and central column (Y transect). On an undisturbed
//! template surface all three lie on the axis circle, so the measurement
//! equals the curvature the surface was built for.
use serde::Serialize;

use crate::geometry::{fit_circle, Point2};
use crate::heightfield::HeightField;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurvatureReport {
    /// `100 / r` along the central row; `None` when the row is straight.
    pub x: Option<f64>,
    /// `100 / r` along the central column; `None` when the column is straight.
    pub y: Option<f64>,
}

/// Relative sagitta below which a transect counts as straight.
const STRAIGHT_TOL: f64 = 1e-9;

fn three_point_curvature([a, b, c]: [Point2; 3]) -> Option<f64> {
    // Offset of the middle sample from the chord a–c; rounding keeps a tilted
    // plane from being exactly colinear, so test it before fitting.
    let t = (b.x - a.x) / (c.x - a.x);
    let sagitta = b.y - (a.y + t * (c.y - a.y));
    let scale = 1.0 + a.y.abs().max(b.y.abs()).max(c.y.abs());
    if sagitta.abs() <= STRAIGHT_TOL * scale {
        return None;
    }
    fit_circle(a, b, c).ok().map(|circle| circle.curvature())
}

/// Elevations at the world positions of three transect nodes.
fn transect(hf: &HeightField, nodes: [(f64, f64); 3], along_x: bool) -> Option<[Point2; 3]> {
    let mut out = [Point2::new(0.0, 0.0); 3];
    for (p, (x, y)) in out.iter_mut().zip(nodes) {
        let z = hf.sample(x, y)?;
        *p = Point2::new(if along_x { x } else { y }, z);
    }
    Some(out)
}

/// Curvature along the central row.
pub fn row_curvature(hf: &HeightField) -> Option<f64> {
    if hf.width < 3 || hf.height == 0 {
        return None;
    }
    let t = hf.transform();
    let row = (hf.height / 2) as f64;
    let nodes = [0, hf.width / 2, hf.width - 1].map(|c| t.apply(c as f64, row));
    three_point_curvature(transect(hf, nodes, true)?)
}

/// Curvature along the central column.
pub fn column_curvature(hf: &HeightField) -> Option<f64> {
    if hf.height < 3 || hf.width == 0 {
        return None;
    }
    let t = hf.transform();
    let col = (hf.width / 2) as f64;
    let nodes = [0, hf.height / 2, hf.height - 1].map(|r| t.apply(col, r as f64));
    three_point_curvature(transect(hf, nodes, false)?)
}

pub fn measure_curvature(hf: &HeightField) -> CurvatureReport {
    CurvatureReport { x: row_curvature(hf), y: column_curvature(hf) }
}
