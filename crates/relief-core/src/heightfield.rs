use serde::{Deserialize, Serialize};

use crate::grid::Grid;
use crate::raster::GeoTransform;

/// Slack, in cells, for world positions that land on an edge node.
const EDGE_TOL: f64 = 1e-9;

/// A 2D heightfield storing elevation data as f64, row-major.
/// Row index follows Y, column index follows X; sample (row, col) sits at
/// `(origin_x + col·cell_size, origin_y + row·cell_size)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeightField {
    /// Row-major elevation values.
    pub data: Vec<f64>,
    pub width: usize,
    pub height: usize,
    pub origin_x: f64,
    pub origin_y: f64,
    pub cell_size: f64,
}

impl HeightField {
    /// Create a new HeightField filled with the given value.
    pub fn new(width: usize, height: usize, origin_x: f64, origin_y: f64, cell_size: f64, fill: f64) -> Self {
        Self {
            data: vec![fill; width * height],
            width,
            height,
            origin_x,
            origin_y,
            cell_size,
        }
    }

    /// Zero-filled field covering `grid`.
    pub fn for_grid(grid: &Grid) -> Self {
        let origin_x = grid.xs.first().copied().unwrap_or(0.0);
        let origin_y = grid.ys.first().copied().unwrap_or(0.0);
        Self::new(grid.width(), grid.height(), origin_x, origin_y, grid.cell_size, 0.0)
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.width + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, val: f64) {
        self.data[row * self.width + col] = val;
    }

    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    /// Affine transform from (col, row) to world coordinates.
    pub fn transform(&self) -> GeoTransform {
        GeoTransform::from_origin(self.origin_x, self.origin_y, self.cell_size)
    }

    /// Sample the field at world coordinates (x, y) using bilinear interpolation.
    /// Returns None outside the sampled extent; positions within rounding
    /// distance of an edge node are snapped onto it.
    pub fn sample(&self, x: f64, y: f64) -> Option<f64> {
        if self.width == 0 || self.height == 0 {
            return None;
        }
        let max_x = (self.width - 1) as f64;
        let max_y = (self.height - 1) as f64;
        let fx = (x - self.origin_x) / self.cell_size;
        let fy = (y - self.origin_y) / self.cell_size;
        if fx < -EDGE_TOL || fy < -EDGE_TOL || fx > max_x + EDGE_TOL || fy > max_y + EDGE_TOL {
            return None;
        }
        let fx = fx.clamp(0.0, max_x);
        let fy = fy.clamp(0.0, max_y);

        let x0 = fx.floor() as usize;
        let y0 = fy.floor() as usize;
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);

        let tx = fx - x0 as f64;
        let ty = fy - y0 as f64;

        let v00 = self.get(y0, x0);
        let v10 = self.get(y0, x1);
        let v01 = self.get(y1, x0);
        let v11 = self.get(y1, x1);

        Some(
            v00 * (1.0 - tx) * (1.0 - ty)
                + v10 * tx * (1.0 - ty)
                + v01 * (1.0 - tx) * ty
                + v11 * tx * ty,
        )
    }

    pub fn min_elevation(&self) -> f64 {
        self.data.iter().cloned().fold(f64::INFINITY, f64::min)
    }

    pub fn max_elevation(&self) -> f64 {
        self.data.iter().cloned().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Shift every value so the minimum becomes exactly zero.
    /// No-op on an empty field.
    pub fn normalize_baseline(&mut self) {
        if self.data.is_empty() {
            return;
        }
        let min = self.min_elevation();
        for v in &mut self.data {
            *v -= min;
        }
    }
}
