//! Coordinate mesh over an axis-aligned rectangle.
//!
//! Axes follow the half-open convention: samples are `origin + i·cell` for
//! every i where the value stays strictly below `end`. A trailing partial
//! step is dropped, so `end` itself is never sampled.
use serde::{Deserialize, Serialize};

use crate::error::{Result, SurfaceError};

/// World-space rectangle `[x0, x_end) × [y0, y_end)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x0: f64,
    pub y0: f64,
    pub x_end: f64,
    pub y_end: f64,
}

impl Bounds {
    pub fn new(x0: f64, y0: f64, x_end: f64, y_end: f64) -> Self {
        Self { x0, y0, x_end, y_end }
    }

    pub fn span_x(&self) -> f64 {
        self.x_end - self.x0
    }

    pub fn span_y(&self) -> f64 {
        self.y_end - self.y0
    }

    /// Both axes must have `end > origin`.
    pub fn validate(&self) -> Result<()> {
        check_axis('x', self.x0, self.x_end)?;
        check_axis('y', self.y0, self.y_end)
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1000.0, 1000.0)
    }
}

fn check_axis(axis: char, origin: f64, end: f64) -> Result<()> {
    // Written so that NaN on either side is rejected too.
    if end > origin && origin.is_finite() && end.is_finite() {
        Ok(())
    } else {
        Err(SurfaceError::InvalidBounds { axis, origin, end })
    }
}

fn check_cell_size(cell_size: f64) -> Result<()> {
    if cell_size > 0.0 && cell_size.is_finite() {
        Ok(())
    } else {
        Err(SurfaceError::InvalidCellSize(cell_size))
    }
}

/// Sample positions `origin, origin + cell, …` strictly below `end`.
pub fn axis_samples(origin: f64, end: f64, cell_size: f64) -> Result<Vec<f64>> {
    check_cell_size(cell_size)?;
    check_axis('x', origin, end)?;

    let count = ((end - origin) / cell_size).ceil();
    if !count.is_finite() || count >= usize::MAX as f64 {
        return Err(SurfaceError::InvalidCellSize(cell_size));
    }
    let n = count as usize;
    let mut samples = Vec::new();
    samples
        .try_reserve_exact(n)
        .map_err(|_| SurfaceError::InvalidCellSize(cell_size))?;
    // Multiply rather than accumulate so rounding error does not drift.
    samples.extend((0..n).map(|i| origin + i as f64 * cell_size));
    // `ceil` can overshoot by one when the quotient rounds just above an integer.
    while samples.last().is_some_and(|&v| v >= end) {
        samples.pop();
    }
    Ok(samples)
}

/// Separable coordinate mesh: `xs` varies along columns, `ys` along rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
    pub cell_size: f64,
}

impl Grid {
    pub fn new(bounds: &Bounds, cell_size: f64) -> Result<Self> {
        check_cell_size(cell_size)?;
        bounds.validate()?;
        Ok(Self {
            xs: axis_samples(bounds.x0, bounds.x_end, cell_size)?,
            ys: axis_samples(bounds.y0, bounds.y_end, cell_size)?,
            cell_size,
        })
    }

    /// Number of columns (X samples).
    pub fn width(&self) -> usize {
        self.xs.len()
    }

    /// Number of rows (Y samples).
    pub fn height(&self) -> usize {
        self.ys.len()
    }

    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.height(), self.width())
    }

    /// Row-major X coordinate array of shape `(rows, cols)`.
    pub fn x_mesh(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.width() * self.height());
        for _ in &self.ys {
            out.extend_from_slice(&self.xs);
        }
        out
    }

    /// Row-major Y coordinate array of shape `(rows, cols)`.
    pub fn y_mesh(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.width() * self.height());
        for &y in &self.ys {
            out.extend(std::iter::repeat(y).take(self.width()));
        }
        out
    }
}
