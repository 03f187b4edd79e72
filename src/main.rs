use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use trackaudit::{AnalysisConfig, Clip, DuplicateOrder, Report, ZeroRadiusPolicy};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Order {
    /// Largest peak distance first
    Peak,
    /// Alphabetical by track names
    Name,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ZeroRadius {
    /// Damp the percentile radius, 1.0 unless the config sets a constant
    Damped,
    /// Score 0 when the percentile radius is 0
    Zero,
}

/// Lists motion tracks that move differently from their peers, and pairs of
/// tracks that sit on top of each other.
#[derive(Parser, Debug)]
#[command(name = "find-bad-tracks", version)]
struct Args {
    /// Clip JSON with the frame range and all tracks
    clip: PathBuf,

    /// Analysis config JSON, flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long)]
    percentile: Option<u32>,

    /// Duplicate distance threshold, percent of the image span
    #[arg(long)]
    dup_threshold: Option<f32>,

    #[arg(long, value_enum)]
    zero_radius: Option<ZeroRadius>,

    #[arg(long, value_enum, default_value = "peak")]
    order: Order,

    /// Max rows per list
    #[arg(short, long)]
    limit: Option<usize>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

impl Args {
    fn analysis_config(&self) -> Result<AnalysisConfig> {
        let mut config = match &self.config {
            Some(path) => AnalysisConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => AnalysisConfig::default(),
        };

        if let Some(percentile) = self.percentile {
            config.percentile = percentile;
        }

        if let Some(threshold) = self.dup_threshold {
            config.dup_maxdist_percent = threshold;
        }

        match (self.zero_radius, config.zero_radius) {
            (Some(ZeroRadius::Damped), ZeroRadiusPolicy::Damped { .. }) => {}
            (Some(ZeroRadius::Damped), _) => config.zero_radius = ZeroRadiusPolicy::default(),
            (Some(ZeroRadius::Zero), _) => config.zero_radius = ZeroRadiusPolicy::ZeroScore,
            (None, _) => {}
        }

        config.validate()?;
        Ok(config)
    }
}

fn print_report(report: &Report) {
    println!("Bad Tracks");
    for row in &report.bad_tracks {
        println!("  {:<32} {:>8.1}  frame {}", row.track, row.score, row.frame);
    }

    println!();
    println!("Duplicate Tracks");
    for row in &report.duplicates {
        println!(
            "  {} & {}  frame {}  peak {:.4}  front {}",
            row.track_a, row.track_b, row.frame, row.peak_distance, row.front_track
        );
    }
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("trackaudit=info,find_bad_tracks=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = args.analysis_config()?;

    let clip = Clip::load(&args.clip)
        .with_context(|| format!("loading clip {}", args.clip.display()))?;
    info!(
        tracks = clip.len(),
        first_frame = clip.first_frame,
        frame_count = clip.frame_count,
        "clip loaded"
    );

    if clip.is_empty() {
        warn!("clip has no tracks");
    }

    let order = match args.order {
        Order::Peak => DuplicateOrder::PeakDistance,
        Order::Name => DuplicateOrder::Name,
    };

    let mut report = Report::build(&clip, &config, order)?;
    if let Some(limit) = args.limit {
        report.truncate(limit);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}
