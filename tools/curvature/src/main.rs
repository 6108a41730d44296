/// Arc curvature calculator: forward (rise → radius, curvature) and inverse
/// (curvature → rise) relations for three-point arcs over a span.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use relief_core::solver::{circle_from_z, solve_z, ArcBend, ArcLayout, SolverConfig, SolverQuery};
use serde::Serialize;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Layout {
    Plan,
    Profile,
}

impl From<Layout> for ArcLayout {
    fn from(l: Layout) -> Self {
        match l {
            Layout::Plan => ArcLayout::Plan,
            Layout::Profile => ArcLayout::Profile,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Bend {
    Convex,
    Concave,
}

impl From<Bend> for ArcBend {
    fn from(b: Bend) -> Self {
        match b {
            Bend::Convex => ArcBend::Convex,
            Bend::Concave => ArcBend::Concave,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "curvature", about = "Forward and inverse three-point arc curvature (100 / radius)")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Emit JSON instead of plain text.
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Radius and curvature for a span and rise.
    CircleFromZ {
        #[arg(short = 'l', long)]
        span: f64,
        #[arg(short, long, allow_negative_numbers = true)]
        z: f64,
        #[arg(long, value_enum, default_value = "plan")]
        layout: Layout,
        #[arg(long, value_enum, default_value = "convex")]
        bend: Bend,
    },
    /// Rise that produces a target curvature over a span.
    ZFromCircle {
        #[arg(short = 'l', long)]
        span: f64,
        #[arg(short, long)]
        curvature: f64,
        /// Starting rise for the secant iteration.
        #[arg(long, default_value = "0.0001", allow_negative_numbers = true)]
        guess: f64,
        #[arg(long, value_enum, default_value = "plan")]
        layout: Layout,
        #[arg(long, value_enum, default_value = "convex")]
        bend: Bend,
        /// Absolute residual tolerance.
        #[arg(long, default_value = "1e-6")]
        tolerance: f64,
        #[arg(long, default_value = "100")]
        max_iterations: u32,
    },
}

fn print<T: Serialize>(json: bool, value: &T, text: impl FnOnce() -> String) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", text());
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    match args.command {
        Command::CircleFromZ { span, z, layout, bend } => {
            let arc = circle_from_z(span, z, layout.into(), bend.into())
                .with_context(|| format!("no arc for span {span} and rise {z}"))?;
            print(args.json, &arc, || {
                format!("Radius = {:.6}\nCurvature = {:.6}", arc.radius, arc.curvature)
            })
        }
        Command::ZFromCircle { span, curvature, guess, layout, bend, tolerance, max_iterations } => {
            let query = SolverQuery {
                span,
                curvature,
                initial_guess: guess,
                layout: layout.into(),
                bend: bend.into(),
            };
            let config = SolverConfig { tolerance, max_iterations };
            let solved = solve_z(&query, &config)
                .with_context(|| format!("cannot solve for curvature {curvature} over span {span}"))?;
            print(args.json, &solved, || {
                format!("The value of Z: {:.4} ({} iterations)", solved.z, solved.iterations)
            })
        }
    }
}
