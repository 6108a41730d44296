use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SurfaceError};
use crate::geometry::Point2;
use crate::grid::Bounds;
use crate::noise::NoiseSpec;

/// Shape of the surface along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum AxisCurvature {
    #[default]
    Flat,
    /// Upper half of the fitted circle: bulges away from the chord.
    Convex,
    /// Lower half of the fitted circle: dips towards the centre.
    Concave,
}

impl AxisCurvature {
    pub fn is_curved(self) -> bool {
        !matches!(self, AxisCurvature::Flat)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AxisCurvature::Flat => "flat",
            AxisCurvature::Convex => "convex",
            AxisCurvature::Concave => "concave",
        }
    }
}

impl fmt::Display for AxisCurvature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AxisCurvature {
    type Err = SurfaceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flat" => Ok(AxisCurvature::Flat),
            "convex" => Ok(AxisCurvature::Convex),
            "concave" => Ok(AxisCurvature::Concave),
            _ => Err(SurfaceError::InvalidProfileType(s.to_string())),
        }
    }
}

impl TryFrom<String> for AxisCurvature {
    type Error = SurfaceError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

/// Numeric codes 0 / 1 / 2 = flat / convex / concave.
impl TryFrom<u8> for AxisCurvature {
    type Error = SurfaceError;

    fn try_from(code: u8) -> Result<Self> {
        match code {
            0 => Ok(AxisCurvature::Flat),
            1 => Ok(AxisCurvature::Convex),
            2 => Ok(AxisCurvature::Concave),
            other => Err(SurfaceError::InvalidProfileType(other.to_string())),
        }
    }
}

/// The three points a curved axis fits its circle through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlPoints {
    /// Plan-layout arc over the full axis span:
    /// `(origin, 0)`, `(origin + L/2, 0.75·rise·L)`, `(origin + L, 0)`.
    /// `rise` is the same dimensionless Z the curvature solver returns.
    Template { rise: f64 },
    /// Caller-supplied (axis coordinate, elevation) triple in world units.
    Explicit([Point2; 3]),
}

impl Default for ControlPoints {
    fn default() -> Self {
        ControlPoints::Template { rise: 0.01 }
    }
}

/// Contribution of one axis to the height field.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisProfile {
    pub curvature: AxisCurvature,
    /// Gradient along the axis; used only when `curvature` is flat.
    pub slope: f64,
    /// Used only when `curvature` is convex or concave.
    pub control: ControlPoints,
}

impl AxisProfile {
    pub fn flat(slope: f64) -> Self {
        Self { curvature: AxisCurvature::Flat, slope, ..Self::default() }
    }

    pub fn curved(curvature: AxisCurvature, control: ControlPoints) -> Self {
        Self { curvature, slope: 0.0, control }
    }
}

/// Full description of one synthetic surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileSpec {
    pub bounds: Bounds,
    pub cell_size: f64,
    /// Base elevation at the grid origin. Washed out by baseline
    /// normalization whenever an axis is curved.
    pub z0: f64,
    pub x: AxisProfile,
    pub y: AxisProfile,
    pub noise: Option<NoiseSpec>,
}

impl Default for ProfileSpec {
    fn default() -> Self {
        Self {
            bounds: Bounds::default(),
            cell_size: 1.0,
            z0: 0.0,
            x: AxisProfile::default(),
            y: AxisProfile::default(),
            noise: None,
        }
    }
}

impl ProfileSpec {
    /// Tilted plane `z0 + slope_x·(x − x0) + slope_y·(y − y0)`.
    pub fn plane(bounds: Bounds, cell_size: f64, z0: f64, slope_x: f64, slope_y: f64) -> Self {
        Self {
            bounds,
            cell_size,
            z0,
            x: AxisProfile::flat(slope_x),
            y: AxisProfile::flat(slope_y),
            noise: None,
        }
    }

    pub fn with_noise(mut self, noise: NoiseSpec) -> Self {
        self.noise = Some(noise);
        self
    }

    /// True when at least one axis is convex or concave.
    pub fn is_curved(&self) -> bool {
        self.x.curvature.is_curved() || self.y.curvature.is_curved()
    }

    /// Load from a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curvature_parses_case_insensitively() {
        assert_eq!("Convex".parse::<AxisCurvature>().unwrap(), AxisCurvature::Convex);
        assert_eq!(" concave ".parse::<AxisCurvature>().unwrap(), AxisCurvature::Concave);
        assert_eq!(AxisCurvature::try_from(0u8).unwrap(), AxisCurvature::Flat);
    }

    #[test]
    fn unknown_curvature_is_invalid_profile_type() {
        assert!(matches!(
            "saddle".parse::<AxisCurvature>(),
            Err(SurfaceError::InvalidProfileType(s)) if s == "saddle"
        ));
        assert!(matches!(
            AxisCurvature::try_from(7u8),
            Err(SurfaceError::InvalidProfileType(_))
        ));
    }

    #[test]
    fn spec_json_round_trip_with_defaults() {
        let json = r#"{
            "bounds": { "x0": 0, "y0": 0, "x_end": 200, "y_end": 100 },
            "cell_size": 2,
            "x": { "curvature": "convex", "control": { "template": { "rise": 0.02 } } },
            "y": { "slope": 0.1 },
            "noise": { "low": -0.02, "high": 0.02 }
        }"#;
        let spec = ProfileSpec::from_json(json).unwrap();
        assert_eq!(spec.x.curvature, AxisCurvature::Convex);
        assert_eq!(spec.x.control, ControlPoints::Template { rise: 0.02 });
        assert_eq!(spec.y.curvature, AxisCurvature::Flat);
        assert_eq!(spec.z0, 0.0);
        assert_eq!(spec.noise.as_ref().map(|n| n.pad_rows), Some(0));
        assert!(spec.is_curved());

        let back = ProfileSpec::from_json(&serde_json::to_string(&spec).unwrap()).unwrap();
        assert_eq!(back, spec);
    }

    #[test]
    fn spec_json_rejects_unknown_curvature() {
        let err = ProfileSpec::from_json(r#"{ "x": { "curvature": "ridge" } }"#).unwrap_err();
        assert!(err.to_string().contains("ridge"), "{err}");
    }
}
