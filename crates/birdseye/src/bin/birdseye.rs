//! birdseye CLI — stitch surround-view cameras into a top-down composite.

use birdseye::core::{PickerEvent, PointPicker, CORNER_LABELS};
use birdseye::io::{load_image, save_image};
use birdseye::{pipeline, PointQuad, RigConfig};
use clap::{ArgAction, Parser, Subcommand};
use nalgebra::Point2;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "birdseye")]
#[command(about = "Stitch four (or two) camera views into a bird's-eye composite")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compose a four-camera rig described by a JSON config.
    Compose {
        /// Path to the rig config (JSON).
        #[arg(long)]
        config: PathBuf,

        /// Override the composite output path from the config.
        #[arg(long)]
        out: Option<PathBuf>,

        /// Write a JSON report with per-camera homographies.
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Warp one camera image to a top-down patch.
    Warp {
        /// Path to the input image.
        #[arg(long)]
        image: PathBuf,

        /// Ground quad as "x,y x,y x,y x,y" (TL TR BR BL).
        #[arg(long, value_parser = parse_quad)]
        points: PointQuad,

        #[arg(long, default_value_t = 400)]
        width: usize,

        #[arg(long, default_value_t = 400)]
        height: usize,

        /// Path to write the rectified patch.
        #[arg(long)]
        out: PathBuf,
    },

    /// Two-camera variant: rectify both views and stack them side by side.
    Pair {
        #[arg(long)]
        left: PathBuf,

        #[arg(long, value_parser = parse_quad)]
        left_points: PointQuad,

        #[arg(long)]
        right: PathBuf,

        #[arg(long, value_parser = parse_quad)]
        right_points: PointQuad,

        #[arg(long, default_value_t = 1280)]
        width: usize,

        #[arg(long, default_value_t = 720)]
        height: usize,

        #[arg(long)]
        out: PathBuf,
    },

    /// Collect the 4 ground corners of an image from stdin ("x y" per line,
    /// "r" to restart) and print them as JSON.
    Pick {
        /// Path to the calibration image.
        #[arg(short, long)]
        image: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> CliResult<()> {
    match command {
        Commands::Compose {
            config,
            out,
            report,
        } => run_compose(&config, out.as_deref(), report),
        Commands::Warp {
            image,
            points,
            width,
            height,
            out,
        } => run_warp(&image, &points, width, height, &out),
        Commands::Pair {
            left,
            left_points,
            right,
            right_points,
            width,
            height,
            out,
        } => run_pair(
            &left,
            &left_points,
            &right,
            &right_points,
            width,
            height,
            &out,
        ),
        Commands::Pick { image } => run_pick(&image),
    }
}

#[cfg(feature = "tracing")]
fn init_logging(_verbose: u8) {
    let _ = tracing_log::LogTracer::init();
    birdseye::core::init_tracing(false);
}

#[cfg(not(feature = "tracing"))]
fn init_logging(verbose: u8) {
    let _ = birdseye::core::init_with_level(birdseye::core::level_from_verbosity(verbose));
}

fn parse_quad(s: &str) -> Result<PointQuad, String> {
    let pts = s
        .split(|c: char| c.is_whitespace() || c == ';')
        .filter(|t| !t.is_empty())
        .map(|t| {
            let (x, y) = t
                .split_once(',')
                .ok_or_else(|| format!("expected x,y but got {t:?}"))?;
            let x: f32 = x.trim().parse().map_err(|e| format!("{t:?}: {e}"))?;
            let y: f32 = y.trim().parse().map_err(|e| format!("{t:?}: {e}"))?;
            Ok([x, y])
        })
        .collect::<Result<Vec<[f32; 2]>, String>>()?;
    let pts: [[f32; 2]; 4] = pts
        .try_into()
        .map_err(|v: Vec<[f32; 2]>| format!("expected 4 points, got {}", v.len()))?;
    Ok(PointQuad::from_array(pts))
}

fn run_compose(config: &Path, out: Option<&Path>, report: Option<PathBuf>) -> CliResult<()> {
    let mut cfg = RigConfig::load_json(config)?;
    if let Some(report) = report {
        cfg.report_path = Some(report.to_string_lossy().into_owned());
    }
    let base_dir = config.parent().unwrap_or_else(|| Path::new("."));

    let result = pipeline::run_surround(&cfg, base_dir)?;
    let written = pipeline::write_surround(&result, &cfg, base_dir, out)?;
    println!(
        "Bird's-eye view ({}x{}) saved as {}",
        result.canvas.width,
        result.canvas.height,
        written.display()
    );
    Ok(())
}

fn run_warp(
    image: &Path,
    points: &PointQuad,
    width: usize,
    height: usize,
    out: &Path,
) -> CliResult<()> {
    let src = load_image(image)?;
    let (patch, h) = pipeline::top_down_view(&src, points, width, height)?;
    log::debug!("homography {:?}", h.to_array());
    save_image(out, &patch)?;
    println!("Top-down view saved as {}", out.display());
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_pair(
    left: &Path,
    left_points: &PointQuad,
    right: &Path,
    right_points: &PointQuad,
    width: usize,
    height: usize,
    out: &Path,
) -> CliResult<()> {
    let l = load_image(left)?;
    let r = load_image(right)?;
    let canvas = pipeline::run_pair(&l, left_points, &r, right_points, width, height)?;
    save_image(out, &canvas)?;
    println!("Bird's-eye view saved as {}", out.display());
    Ok(())
}

fn run_pick(image: &Path) -> CliResult<()> {
    let img = load_image(image)?;
    eprintln!(
        "{} is {}x{}. Enter the 4 ground corners as \"x y\", in order:",
        image.display(),
        img.width,
        img.height
    );
    for (i, label) in CORNER_LABELS.iter().enumerate() {
        eprintln!("{}. {label}", i + 1);
    }
    eprintln!("Type \"r\" to start over.");

    let mut picker = PointPicker::new();
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case("r") {
            picker.reset();
            eprintln!("Points cleared.");
            continue;
        }

        let Some(point) = parse_point(line) else {
            eprintln!("Ignoring {line:?}: expected \"x y\"");
            continue;
        };
        if point.x < 0.0
            || point.y < 0.0
            || point.x >= img.width as f32
            || point.y >= img.height as f32
        {
            eprintln!("Ignoring ({}, {}): outside the image", point.x, point.y);
            continue;
        }

        match picker.push(point) {
            PickerEvent::Added { index, point } => {
                eprintln!("Point {} added: ({}, {})", index + 1, point.x, point.y);
            }
            PickerEvent::Completed(quad) => {
                eprintln!("--- 4 points selected ---");
                let mut stdout = io::stdout().lock();
                writeln!(stdout, "{}", serde_json::to_string(&quad)?)?;
                return Ok(());
            }
            PickerEvent::Ignored => {}
        }
    }

    let got = match picker.state() {
        birdseye::core::PickerState::Collecting(pts) => pts.len(),
        birdseye::core::PickerState::Complete(_) => 4,
    };
    Err(format!("input ended after {got} of 4 points").into())
}

fn parse_point(line: &str) -> Option<Point2<f32>> {
    let mut it = line
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty());
    let x = it.next()?.parse().ok()?;
    let y = it.next()?.parse().ok()?;
    if it.next().is_some() {
        return None;
    }
    Some(Point2::new(x, y))
}
