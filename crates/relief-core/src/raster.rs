//! Georeferencing metadata and the sink abstraction that persists a finished
//! height field. Encoding is the sink's business; the core only hands over the
//! field, its affine transform and an opaque CRS string.
use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::error::SurfaceError;
use crate::heightfield::HeightField;

/// CRS string used when the caller does not supply one.
pub const DEFAULT_CRS: &str = "+proj=latlong";

/// Axis-aligned affine transform from (col, row) to world (x, y).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub origin_x: f64,
    pub origin_y: f64,
    pub pixel_width: f64,
    pub pixel_height: f64,
}

impl GeoTransform {
    /// Square pixels, rows running towards +Y.
    pub fn from_origin(origin_x: f64, origin_y: f64, cell_size: f64) -> Self {
        Self { origin_x, origin_y, pixel_width: cell_size, pixel_height: cell_size }
    }

    pub fn apply(&self, col: f64, row: f64) -> (f64, f64) {
        (self.origin_x + col * self.pixel_width, self.origin_y + row * self.pixel_height)
    }

    /// GDAL ordering: `[x0, pw, 0, y0, 0, ph]`.
    pub fn to_gdal(&self) -> [f64; 6] {
        [self.origin_x, self.pixel_width, 0.0, self.origin_y, 0.0, self.pixel_height]
    }
}

/// Everything a sink needs besides the elevations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterMeta {
    pub transform: GeoTransform,
    /// Passed through unmodified.
    pub crs: String,
}

impl RasterMeta {
    pub fn for_field(field: &HeightField, crs: impl Into<String>) -> Self {
        Self { transform: field.transform(), crs: crs.into() }
    }
}

/// Persists a single-band height field.
pub trait RasterSink {
    type Error;

    fn write_raster(&mut self, field: &HeightField, meta: &RasterMeta) -> Result<(), Self::Error>;
}

#[derive(Serialize)]
struct JsonRaster<'a> {
    width: usize,
    height: usize,
    transform: [f64; 6],
    crs: &'a str,
    data: &'a [f64],
}

/// Writes the raster as one JSON document.
pub struct JsonSink<W: Write> {
    writer: W,
    pretty: bool,
}

impl<W: Write> JsonSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, pretty: false }
    }

    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RasterSink for JsonSink<W> {
    type Error = SurfaceError;

    fn write_raster(&mut self, field: &HeightField, meta: &RasterMeta) -> Result<(), SurfaceError> {
        let doc = JsonRaster {
            width: field.width,
            height: field.height,
            transform: meta.transform.to_gdal(),
            crs: &meta.crs,
            data: &field.data,
        };
        if self.pretty {
            serde_json::to_writer_pretty(&mut self.writer, &doc)?;
        } else {
            serde_json::to_writer(&mut self.writer, &doc)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_maps_indices_to_world() {
        let t = GeoTransform::from_origin(100.0, 200.0, 2.5);
        assert_eq!(t.apply(0.0, 0.0), (100.0, 200.0));
        assert_eq!(t.apply(4.0, 2.0), (110.0, 205.0));
        assert_eq!(t.to_gdal(), [100.0, 2.5, 0.0, 200.0, 0.0, 2.5]);
    }

    #[test]
    fn json_sink_carries_crs_and_data() {
        let mut hf = HeightField::new(2, 2, 0.0, 0.0, 1.0, 0.0);
        hf.set(1, 1, 3.5);
        let meta = RasterMeta::for_field(&hf, "EPSG:32633");

        let mut sink = JsonSink::new(Vec::new());
        sink.write_raster(&hf, &meta).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&sink.into_inner()).unwrap();

        assert_eq!(value["crs"], "EPSG:32633");
        assert_eq!(value["width"], 2);
        assert_eq!(value["data"][3], 3.5);
        assert_eq!(value["transform"][1], 1.0);
    }

    #[test]
    fn pretty_json_spans_lines_and_parses_the_same() {
        let hf = HeightField::new(2, 1, 5.0, 6.0, 0.5, 1.25);
        let meta = RasterMeta::for_field(&hf, DEFAULT_CRS);

        let mut compact = JsonSink::new(Vec::new());
        compact.write_raster(&hf, &meta).unwrap();
        let mut pretty = JsonSink::new(Vec::new()).pretty(true);
        pretty.write_raster(&hf, &meta).unwrap();

        let compact = compact.into_inner();
        let pretty = pretty.into_inner();
        assert!(!compact.contains(&b'\n'));
        assert!(pretty.contains(&b'\n'));
        let a: serde_json::Value = serde_json::from_slice(&compact).unwrap();
        let b: serde_json::Value = serde_json::from_slice(&pretty).unwrap();
        assert_eq!(a, b);
    }
}
