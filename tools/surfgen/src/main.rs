/// Surface synthesis tool: builds a parametric curvature surface from a
/// ProfileSpec JSON document (or from flags) and writes it as a GeoTIFF or
/// JSON raster.
mod geotiff;

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use relief_core::generator::SurfaceGenerator;
use relief_core::grid::Bounds;
use relief_core::metrics::measure_curvature;
use relief_core::noise::NoiseSpec;
use relief_core::profile::axis_for_curvature;
use relief_core::profile::params::{AxisCurvature, AxisProfile, ControlPoints, ProfileSpec};
use relief_core::raster::{JsonSink, DEFAULT_CRS};
use relief_core::solver::SolverConfig;

use geotiff::GeoTiffSink;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Tiff,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "surfgen", about = "Synthesize parametric curvature surfaces as raster files")]
struct Args {
    /// ProfileSpec JSON document. When given, the geometry flags are ignored.
    #[arg(short, long)]
    spec: Option<PathBuf>,

    #[arg(long, default_value = "0")]
    x0: f64,
    #[arg(long, default_value = "0")]
    y0: f64,
    #[arg(long, default_value = "1000")]
    x_end: f64,
    #[arg(long, default_value = "1000")]
    y_end: f64,
    #[arg(long, default_value = "1")]
    cell_size: f64,

    /// Base elevation (planes only; curved surfaces are normalized to min 0).
    #[arg(long, default_value = "0")]
    z0: f64,
    #[arg(long, default_value = "0")]
    slope_x: f64,
    #[arg(long, default_value = "0")]
    slope_y: f64,

    /// flat | convex | concave
    #[arg(long, default_value = "flat")]
    x_curvature: AxisCurvature,
    /// flat | convex | concave
    #[arg(long, default_value = "flat")]
    y_curvature: AxisCurvature,

    /// Dimensionless template rise Z for a curved X axis.
    #[arg(long, default_value = "0.01")]
    x_rise: f64,
    #[arg(long, default_value = "0.01")]
    y_rise: f64,

    /// Target curvature (100 / radius) for a curved X axis; solves for the rise.
    #[arg(long)]
    x_target: Option<f64>,
    #[arg(long)]
    y_target: Option<f64>,

    /// Lower bound of uniform noise; needs --noise-high.
    #[arg(long, requires = "noise_high")]
    noise_low: Option<f64>,
    #[arg(long, requires = "noise_low")]
    noise_high: Option<f64>,
    /// Leading rows left without noise.
    #[arg(long, default_value = "0")]
    pad_rows: usize,

    #[arg(long, default_value = "42")]
    seed: u64,

    /// CRS descriptor written to the raster unmodified.
    #[arg(long, default_value = DEFAULT_CRS)]
    crs: String,

    #[arg(short, long, default_value = "surface.tif")]
    output: PathBuf,

    #[arg(short, long, value_enum, default_value = "tiff")]
    format: Format,

    /// Indent JSON output (`--format json` only).
    #[arg(long)]
    pretty: bool,

    /// Print the resolved ProfileSpec as JSON and exit.
    #[arg(long)]
    print_spec: bool,
}

fn axis_from_flags(
    curvature: AxisCurvature,
    slope: f64,
    rise: f64,
    target: Option<f64>,
    span: f64,
) -> Result<AxisProfile> {
    if !curvature.is_curved() {
        return Ok(AxisProfile::flat(slope));
    }
    match target {
        Some(c) => axis_for_curvature(curvature, span, c, &SolverConfig::default())
            .with_context(|| format!("cannot reach curvature {c} over span {span}")),
        None => Ok(AxisProfile::curved(curvature, ControlPoints::Template { rise })),
    }
}

fn spec_from_args(args: &Args) -> Result<ProfileSpec> {
    if let Some(path) = &args.spec {
        let text = fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        return ProfileSpec::from_json(&text)
            .with_context(|| format!("invalid profile spec in {}", path.display()));
    }

    let bounds = Bounds::new(args.x0, args.y0, args.x_end, args.y_end);
    bounds.validate()?;
    let x = axis_from_flags(args.x_curvature, args.slope_x, args.x_rise, args.x_target, bounds.span_x())?;
    let y = axis_from_flags(args.y_curvature, args.slope_y, args.y_rise, args.y_target, bounds.span_y())?;
    let noise = match (args.noise_low, args.noise_high) {
        (Some(low), Some(high)) => Some(NoiseSpec::new(low, high).with_pad_rows(args.pad_rows)),
        _ => None,
    };

    Ok(ProfileSpec { bounds, cell_size: args.cell_size, z0: args.z0, x, y, noise })
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let spec = spec_from_args(&args)?;
    if args.print_spec {
        println!("{}", serde_json::to_string_pretty(&spec)?);
        return Ok(());
    }

    let generator = SurfaceGenerator::with_crs(args.crs.clone());
    let hf = generator
        .generate_seeded(&spec, args.seed)
        .context("surface generation failed")?;

    let (rows, cols) = hf.shape();
    eprintln!(
        "[surfgen] {} × {} surface, {cols}×{rows} cells, elevation {:.4}..{:.4}",
        spec.x.curvature,
        spec.y.curvature,
        hf.min_elevation(),
        hf.max_elevation()
    );
    let report = measure_curvature(&hf);
    if let Some(c) = report.x {
        eprintln!("  x transect curvature {c:.6}");
    }
    if let Some(c) = report.y {
        eprintln!("  y transect curvature {c:.6}");
    }

    match args.format {
        Format::Tiff => generator.write(&hf, &mut GeoTiffSink::new(&args.output))?,
        Format::Json => {
            let file = File::create(&args.output)
                .with_context(|| format!("cannot create {}", args.output.display()))?;
            generator
                .write(&hf, &mut JsonSink::new(BufWriter::new(file)).pretty(args.pretty))
                .with_context(|| format!("cannot write {}", args.output.display()))?;
        }
    }
    eprintln!("  -> {}", args.output.display());

    Ok(())
}
