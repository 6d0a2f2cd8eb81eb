//! lurcov CLI - spatial covariates for land-use regression

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use geo::{Geometry, Point};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use wkt::TryFromWkt;

use lurcov_algorithms::emission::{to_emissions_named, Pollutant};
use lurcov_algorithms::vector::{buffer_aggregate, BufferParams, KindCounts, DEFAULT_SEGMENTS};
use lurcov_core::{AttributeValue, Feature, FeatureCollection};

/// Meters per degree of latitude
const METERS_PER_DEGREE: f64 = 111_111.0;

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "lurcov")]
#[command(author, version, about = "Spatial covariates for land-use regression", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Count features per geometry kind and report the dominant kind
    Classify {
        /// Feature file (one WKT geometry per line, optional tab-separated tags)
        features: PathBuf,
    },
    /// Sum feature count, length or area within a radius of each point
    Buffer {
        /// Feature file (one WKT geometry per line, optional tab-separated tags)
        features: PathBuf,
        /// Query points (one WKT POINT per line)
        points: PathBuf,
        /// Buffer radius
        #[arg(short, long)]
        radius: f64,
        /// Radius units
        #[arg(short, long, value_enum, default_value = "degrees")]
        units: RadiusUnits,
        /// Number of segments approximating the buffer circle
        #[arg(short, long, default_value_t = DEFAULT_SEGMENTS)]
        segments: usize,
        /// Z-score the output values
        #[arg(short, long)]
        normalize: bool,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the emission magnitude of each dominant-kind feature
    Emissions {
        /// Feature file (one WKT geometry per line, optional tab-separated tags)
        features: PathBuf,
        /// Pollutant channel: PrimaryPM25, pNH4, pNO3, pSO4, SOA
        #[arg(short, long, default_value = "PrimaryPM25")]
        pollutant: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum RadiusUnits {
    /// Same units as the input coordinates
    Degrees,
    /// Meters, converted at 111 111 m per degree
    Meters,
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Non-empty, non-comment lines with their 1-based line numbers
fn data_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty() && !l.starts_with('#'))
}

fn parse_geometry(wkt: &str, path: &PathBuf, line: usize) -> Result<Geometry<f64>> {
    Geometry::try_from_wkt_str(wkt)
        .map_err(|e| anyhow!("{}:{}: invalid WKT: {}", path.display(), line, e))
}

fn parse_tags(feature: &mut Feature, tags: &str) {
    for pair in tags.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match pair.split_once('=') {
            Some((k, v)) => feature.set_property(k.trim(), AttributeValue::from(v.trim())),
            None => feature.set_property(pair, AttributeValue::Null),
        }
    }
}

fn read_features(path: &PathBuf) -> Result<FeatureCollection> {
    let pb = spinner("Reading features...");
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let mut features = FeatureCollection::new();
    for (line, content) in data_lines(&text) {
        let (wkt, tags) = content.split_once('\t').unwrap_or((content, ""));
        let mut feature = Feature::new(parse_geometry(wkt, path, line)?);
        parse_tags(&mut feature, tags);
        features.push(feature);
    }
    pb.finish_and_clear();
    info!("Features: {}", features.len());
    Ok(features)
}

fn read_points(path: &PathBuf) -> Result<Vec<Point<f64>>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let mut points = Vec::new();
    for (line, content) in data_lines(&text) {
        match parse_geometry(content, path, line)? {
            Geometry::Point(p) => points.push(p),
            _ => bail!("{}:{}: expected a POINT", path.display(), line),
        }
    }
    info!("Query points: {}", points.len());
    Ok(points)
}

fn write_values(values: &[f64], output: Option<&PathBuf>) -> Result<()> {
    let mut out: Box<dyn Write> = match output {
        Some(path) => Box::new(
            fs::File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        ),
        None => Box::new(std::io::stdout().lock()),
    };
    for v in values {
        writeln!(out, "{v}")?;
    }
    out.flush()?;
    Ok(())
}

fn done(name: &str, elapsed: std::time::Duration) {
    info!("{} finished in {:.2?}", name, elapsed);
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Classify { features } => {
            let features = read_features(&features)?;
            let counts = KindCounts::count(features.as_slice()).context("Classification failed")?;
            println!("points:      {}", counts.points);
            println!("lines:       {}", counts.lines);
            println!("polygons:    {}", counts.polygons);
            println!("collections: {}", counts.collections);
            println!("dominant:    {}", counts.dominant());
        }

        Commands::Buffer {
            features,
            points,
            radius,
            units,
            segments,
            normalize,
            output,
        } => {
            let features = read_features(&features)?;
            let points = read_points(&points)?;
            let radius = match units {
                RadiusUnits::Degrees => radius,
                RadiusUnits::Meters => radius / METERS_PER_DEGREE,
            };
            let params = BufferParams {
                radius,
                segments,
                normalize,
            };

            let start = Instant::now();
            let pb = spinner("Aggregating buffers...");
            let result = buffer_aggregate(features.as_slice(), &points, &params);
            pb.finish_and_clear();

            match result.context("Buffer aggregation failed")? {
                Some(values) => write_values(&values, output.as_ref())?,
                None => info!("Feature set is dominated by geometry collections; no output"),
            }
            done("Buffer", start.elapsed());
        }

        Commands::Emissions {
            features,
            pollutant,
        } => {
            let features = read_features(&features)?;
            let records = to_emissions_named(features.as_slice(), &pollutant)
                .with_context(|| format!("Cannot map emissions for {pollutant}"))?;
            let channel: Pollutant = pollutant.parse()?;
            info!("{} records, channel {} ({})", records.len(), channel, channel.precursor());
            let magnitudes: Vec<f64> = records.iter().map(|r| r.magnitude).collect();
            write_values(&magnitudes, None)?;
        }
    }

    Ok(())
}
