//! Parametric relief synthesis: curved reference surfaces for terrain and
//! erosion experiments, plus the forward / inverse arc-curvature relations
//! used to parametrize them.

pub mod error;
pub mod generator;
pub mod geometry;
pub mod grid;
pub mod heightfield;
pub mod metrics;
pub mod noise;
pub mod profile;
pub mod raster;
pub mod solver;

pub use error::{Result, SurfaceError};
