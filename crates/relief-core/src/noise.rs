//! Bounded uniform perturbation of a finished height field.
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SurfaceError};
use crate::heightfield::HeightField;

/// Uniform noise in `[low, high]`, skipping the first `pad_rows` rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoiseSpec {
    pub low: f64,
    pub high: f64,
    /// Leading rows left untouched.
    #[serde(default)]
    pub pad_rows: usize,
}

impl NoiseSpec {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high, pad_rows: 0 }
    }

    pub fn with_pad_rows(mut self, pad_rows: usize) -> Self {
        self.pad_rows = pad_rows;
        self
    }

    pub fn validate(&self) -> Result<()> {
        // The width must be finite too, or the uniform sampler cannot be built.
        if self.low.is_finite()
            && self.high.is_finite()
            && self.low <= self.high
            && (self.high - self.low).is_finite()
        {
            Ok(())
        } else {
            Err(SurfaceError::InvalidNoiseRange { low: self.low, high: self.high })
        }
    }
}

/// Add an independent draw from `[low, high]` to every cell outside the
/// padding rows, in row-major order. `None` leaves the field untouched.
///
/// Draw order is fixed, so a seeded `rng` reproduces the same field.
pub fn inject_noise<R: Rng + ?Sized>(hf: &mut HeightField, noise: Option<&NoiseSpec>, rng: &mut R) -> Result<()> {
    let Some(spec) = noise else {
        return Ok(());
    };
    spec.validate()?;

    let skip = spec.pad_rows.min(hf.height) * hf.width;
    for v in &mut hf.data[skip..] {
        *v += rng.gen_range(spec.low..=spec.high);
    }
    Ok(())
}
