//! Surface pipeline orchestrator: grid → profile → noise → sink.

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::Result;
use crate::grid::Grid;
use crate::heightfield::HeightField;
use crate::noise::inject_noise;
use crate::profile::evaluate_profile;
use crate::profile::params::ProfileSpec;
use crate::raster::{RasterMeta, RasterSink, DEFAULT_CRS};

/// Builds height fields from a [`ProfileSpec`] and hands them to sinks.
pub struct SurfaceGenerator {
    crs: String,
}

impl SurfaceGenerator {
    pub fn new() -> Self {
        Self { crs: DEFAULT_CRS.to_string() }
    }

    /// CRS descriptor attached to every written raster, passed through as-is.
    pub fn with_crs(crs: impl Into<String>) -> Self {
        Self { crs: crs.into() }
    }

    /// Run the pipeline for `spec`.
    ///
    /// Pipeline order:
    ///   1. Grid sampling (half-open bounds)
    ///   2. Profile evaluation + baseline normalization
    ///   3. Noise injection, drawing from `rng`
    pub fn generate<R: Rng + ?Sized>(&self, spec: &ProfileSpec, rng: &mut R) -> Result<HeightField> {
        // ── 1. Grid ──────────────────────────────────────────────────────────
        let grid = Grid::new(&spec.bounds, spec.cell_size)?;
        debug!("grid {}×{} at cell size {}", grid.width(), grid.height(), grid.cell_size);

        // ── 2. Profile ───────────────────────────────────────────────────────
        let mut hf = evaluate_profile(spec, &grid)?;
        debug!(
            "profile {}×{}: elevation {:.4}..{:.4}",
            spec.x.curvature,
            spec.y.curvature,
            hf.min_elevation(),
            hf.max_elevation()
        );

        // ── 3. Noise ─────────────────────────────────────────────────────────
        inject_noise(&mut hf, spec.noise.as_ref(), rng)?;

        Ok(hf)
    }

    /// [`generate`](Self::generate) with a `StdRng` seeded from `seed`.
    pub fn generate_seeded(&self, spec: &ProfileSpec, seed: u64) -> Result<HeightField> {
        let mut rng = StdRng::seed_from_u64(seed);
        self.generate(spec, &mut rng)
    }

    pub fn meta_for(&self, hf: &HeightField) -> RasterMeta {
        RasterMeta::for_field(hf, self.crs.clone())
    }

    /// Hand a finished field to `sink` with its transform and this
    /// generator's CRS.
    pub fn write<S: RasterSink>(&self, hf: &HeightField, sink: &mut S) -> std::result::Result<(), S::Error> {
        sink.write_raster(hf, &self.meta_for(hf))
    }
}

impl Default for SurfaceGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SurfaceError;
    use crate::grid::Bounds;
    use crate::metrics::measure_curvature;
    use crate::noise::NoiseSpec;
    use crate::profile::axis_for_curvature;
    use crate::profile::params::{AxisCurvature, AxisProfile, ControlPoints};
    use crate::raster::JsonSink;
    use crate::solver::SolverConfig;
    use approx::assert_relative_eq;

    fn saddle_spec() -> ProfileSpec {
        ProfileSpec {
            bounds: Bounds::new(500.0, 1000.0, 700.0, 1100.0),
            cell_size: 1.0,
            z0: 40.0,
            x: AxisProfile::curved(AxisCurvature::Convex, ControlPoints::Template { rise: 0.02 }),
            y: AxisProfile::curved(AxisCurvature::Concave, ControlPoints::Template { rise: 0.03 }),
            noise: None,
        }
    }

    #[test]
    fn curved_surface_starts_at_zero_before_noise() {
        let hf = SurfaceGenerator::new().generate_seeded(&saddle_spec(), 42).unwrap();
        assert_eq!(hf.shape(), (100, 200));
        assert_eq!(hf.min_elevation(), 0.0);
        assert_eq!((hf.origin_x, hf.origin_y), (500.0, 1000.0));
    }

    #[test]
    fn noise_is_bounded_and_seeded() {
        let gen = SurfaceGenerator::new();
        let clean = gen.generate_seeded(&saddle_spec(), 1).unwrap();
        let spec = saddle_spec().with_noise(NoiseSpec::new(-0.02, 0.02));
        let a = gen.generate_seeded(&spec, 9).unwrap();
        let b = gen.generate_seeded(&spec, 9).unwrap();
        let c = gen.generate_seeded(&spec, 10).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
        for (n, o) in a.data.iter().zip(&clean.data) {
            assert!((n - o).abs() <= 0.02 + 1e-12);
        }
    }

    #[test]
    fn solver_parametrized_axis_carries_target_curvature() {
        let target = 0.05;
        let x = axis_for_curvature(AxisCurvature::Convex, 200.0, target, &SolverConfig::default()).unwrap();
        let spec = ProfileSpec {
            bounds: Bounds::new(0.0, 0.0, 200.0, 50.0),
            cell_size: 2.0,
            x,
            ..ProfileSpec::default()
        };
        let hf = SurfaceGenerator::new().generate_seeded(&spec, 0).unwrap();
        let report = measure_curvature(&hf);
        assert_relative_eq!(report.x.unwrap(), target, max_relative = 1e-4);
        assert!(report.y.is_none());
    }

    #[test]
    fn invalid_spec_is_reported_not_produced() {
        let spec = ProfileSpec { cell_size: 0.0, ..saddle_spec() };
        assert!(matches!(
            SurfaceGenerator::new().generate_seeded(&spec, 0),
            Err(SurfaceError::InvalidCellSize(_))
        ));
    }

    #[test]
    fn written_raster_carries_generator_crs() {
        let gen = SurfaceGenerator::with_crs("EPSG:3035");
        let hf = gen.generate_seeded(&saddle_spec(), 0).unwrap();
        let mut sink = JsonSink::new(Vec::new());
        gen.write(&hf, &mut sink).unwrap();

        let doc: serde_json::Value = serde_json::from_slice(&sink.into_inner()).unwrap();
        assert_eq!(doc["crs"], "EPSG:3035");
        assert_eq!(doc["transform"][0], 500.0);
        assert_eq!(doc["transform"][3], 1000.0);
        assert_eq!(doc["height"], 100);
    }
}
