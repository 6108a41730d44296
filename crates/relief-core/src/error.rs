use thiserror::Error;

/// Failures raised by surface synthesis and curvature solving.
///
/// Every variant is fatal for the request that produced it; nothing is
/// coerced to NaN and nothing is retried.
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("degenerate geometry: control points are colinear or coincident")]
    DegenerateGeometry,

    #[error("invalid cell size {0}: must be finite and > 0")]
    InvalidCellSize(f64),

    #[error("invalid bounds on {axis} axis: end {end} must exceed origin {origin}")]
    InvalidBounds { axis: char, origin: f64, end: f64 },

    #[error("{axis} = {coord} lies outside the supported chord of the {axis}-axis arc")]
    OutOfDomain { axis: char, coord: f64 },

    #[error("unrecognized curvature profile {0:?} (expected flat, convex or concave)")]
    InvalidProfileType(String),

    #[error("root search did not converge after {iterations} iterations (last residual {residual:e})")]
    ConvergenceFailure { iterations: u32, residual: f64 },

    #[error("invalid noise range [{low}, {high}]")]
    InvalidNoiseRange { low: f64, high: f64 },

    #[error("invalid span length {0}: must be finite and > 0")]
    InvalidSpan(f64),

    #[error("invalid target curvature {0}: must be finite and > 0")]
    InvalidCurvature(f64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SurfaceError>;
