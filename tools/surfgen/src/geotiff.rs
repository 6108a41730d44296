//! Single-band GeoTIFF writer built on the pure-Rust `tiff` encoder.
//!
//! Georeferencing is carried by the four GeoTIFF tags written by hand:
//! ModelPixelScale, ModelTiepoint, GeoKeyDirectory and GeoAsciiParams (the
//! CRS string, stored verbatim as the GT citation).
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use relief_core::heightfield::HeightField;
use relief_core::raster::{RasterMeta, RasterSink};
use tiff::encoder::{colortype, TiffEncoder};
use tiff::tags::Tag;

const MODEL_PIXEL_SCALE: u16 = 33550;
const MODEL_TIEPOINT: u16 = 33922;
const GEO_KEY_DIRECTORY: u16 = 34735;
const GEO_ASCII_PARAMS: u16 = 34737;

const GT_MODEL_TYPE_KEY: u16 = 1024;
const GT_RASTER_TYPE_KEY: u16 = 1025;
const GT_CITATION_KEY: u16 = 1026;
/// GTModelType: user-defined; the CRS lives in the citation string.
const MODEL_TYPE_USER_DEFINED: u16 = 32767;
/// Samples are point values at grid nodes, not cell averages.
const RASTER_PIXEL_IS_POINT: u16 = 2;

pub struct GeoTiffSink {
    path: PathBuf,
}

impl GeoTiffSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// GeoKeyDirectory: header `[version, revision, minor, n_keys]` followed by
/// `[key, location, count, value_or_offset]` entries sorted by key.
fn geo_key_directory(citation_len: u16) -> Vec<u16> {
    vec![
        1, 1, 0, 3,
        GT_MODEL_TYPE_KEY, 0, 1, MODEL_TYPE_USER_DEFINED,
        GT_RASTER_TYPE_KEY, 0, 1, RASTER_PIXEL_IS_POINT,
        GT_CITATION_KEY, GEO_ASCII_PARAMS, citation_len, 0,
    ]
}

impl RasterSink for GeoTiffSink {
    type Error = anyhow::Error;

    fn write_raster(&mut self, field: &HeightField, meta: &RasterMeta) -> Result<()> {
        if field.width == 0 || field.height == 0 {
            bail!("refusing to write an empty {}×{} raster", field.width, field.height);
        }
        let file = File::create(&self.path)
            .with_context(|| format!("cannot create {}", self.path.display()))?;
        let mut writer = BufWriter::new(file);

        // TIFF rows run top-down; our row 0 is the smallest Y, so flip and
        // tie raster (0, 0) to the largest sampled Y.
        let mut data = Vec::with_capacity(field.data.len());
        for row in field.data.chunks(field.width).rev() {
            data.extend_from_slice(row);
        }
        let t = &meta.transform;
        let (top_x, top_y) = t.apply(0.0, field.height.saturating_sub(1) as f64);
        let scale = [t.pixel_width, t.pixel_height, 0.0];
        let tiepoint = [0.0, 0.0, 0.0, top_x, top_y, 0.0];

        let citation = format!("{}|", meta.crs);
        let citation_len = u16::try_from(citation.len())
            .with_context(|| format!("CRS string too long ({} bytes)", citation.len()))?;

        {
            let mut encoder = TiffEncoder::new(&mut writer)?;
            let mut image =
                encoder.new_image::<colortype::Gray64Float>(field.width as u32, field.height as u32)?;
            let dir = image.encoder();
            dir.write_tag(Tag::Unknown(MODEL_PIXEL_SCALE), &scale[..])?;
            dir.write_tag(Tag::Unknown(MODEL_TIEPOINT), &tiepoint[..])?;
            dir.write_tag(Tag::Unknown(GEO_KEY_DIRECTORY), &geo_key_directory(citation_len)[..])?;
            dir.write_tag(Tag::Unknown(GEO_ASCII_PARAMS), citation.as_str())?;
            image.write_data(&data)?;
        }

        writer.flush().with_context(|| format!("cannot flush {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_directory_counts_match_entries() {
        let dir = geo_key_directory(14);
        assert_eq!(dir.len(), 4 + 4 * dir[3] as usize);
        // Keys sorted ascending.
        assert!(dir[4] < dir[8] && dir[8] < dir[12]);
        assert_eq!(dir[14], 14);
    }

    #[test]
    fn writes_a_decodable_file() {
        let path = std::env::temp_dir().join(format!("surfgen-test-{}.tif", std::process::id()));
        let mut hf = HeightField::new(3, 2, 10.0, 20.0, 5.0, 1.0);
        hf.set(1, 2, 9.0);
        let meta = RasterMeta::for_field(&hf, "+proj=latlong");

        GeoTiffSink::new(&path).write_raster(&hf, &meta).unwrap();

        let mut decoder = tiff::decoder::Decoder::new(File::open(&path).unwrap()).unwrap();
        assert_eq!(decoder.dimensions().unwrap(), (3, 2));
        match decoder.read_image().unwrap() {
            // Flipped: the last field row is the first TIFF row.
            tiff::decoder::DecodingResult::F64(v) => assert_eq!(v, vec![1.0, 1.0, 9.0, 1.0, 1.0, 1.0]),
            _ => panic!("expected f64 samples"),
        }
        std::fs::remove_file(&path).ok();
    }
}
