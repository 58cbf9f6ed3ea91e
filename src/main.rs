use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use timeline_digest::{
    build_overlay, build_report, load_photos, load_reviews, load_timeline, write_thumbnails,
    CommandInsights, DigestConfig, InsightSource,
};

/// Travel statistics and map overlays from a Google Timeline export.
#[derive(Parser, Debug)]
#[command(name = "timeline-digest", version, about)]
struct Cli {
    /// Timeline export (`semanticSegments` object or bare segment array)
    timeline: PathBuf,

    /// Maps reviews GeoJSON
    #[arg(long)]
    reviews: Option<PathBuf>,

    /// JSON array of Google Photos sidecar objects
    #[arg(long)]
    photos: Option<PathBuf>,

    /// Directory holding the photo files named by the sidecars
    #[arg(long)]
    photos_dir: Option<PathBuf>,

    /// Where report.json and the optional artifacts are written
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Also write overlay.json
    #[arg(long)]
    overlay: bool,

    /// Also write insights.json from an external generator
    #[arg(long)]
    insights: bool,

    /// Insight generator command line; receives report.json on stdin
    #[arg(long, default_value = "timeline-insights")]
    insights_cmd: String,

    /// Also write overlay.json with the top photos resized into
    /// <output-dir>/thumbs/
    #[arg(long, requires = "photos_dir")]
    thumbnails: bool,

    /// Photos kept in the overlay
    #[arg(long, default_value_t = 500)]
    top_photos: usize,

    /// Longest thumbnail edge in pixels
    #[arg(long, default_value_t = 256)]
    thumbnail_size: u32,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_vec_pretty(value)?;
    fs::write(path, json).with_context(|| format!("cannot write {}", path.display()))?;
    info!("Wrote {}", path.display());
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let config = DigestConfig {
        top_photos: cli.top_photos,
        thumbnail_size: cli.thumbnail_size,
        ..DigestConfig::default()
    };

    let export = load_timeline(&cli.timeline).context("cannot load timeline export")?;
    let reviews = cli.reviews.as_deref().and_then(load_reviews);
    let photos = cli.photos.as_deref().and_then(load_photos);

    let report = build_report(&export, reviews.as_deref(), photos.as_deref(), &config);

    fs::create_dir_all(&cli.output_dir)
        .with_context(|| format!("cannot create {}", cli.output_dir.display()))?;
    write_json(&cli.output_dir.join("report.json"), &report)?;

    if cli.overlay || cli.thumbnails {
        let mut overlay = build_overlay(&export, reviews.as_deref(), photos.as_deref(), &config);

        if let (true, Some(dir)) = (cli.thumbnails, &cli.photos_dir) {
            if let Err(e) =
                write_thumbnails(&mut overlay.top_photos, dir, &cli.output_dir, config.thumbnail_size)
            {
                warn!("[Thumbs] {}", e);
            }
        }

        write_json(&cli.output_dir.join("overlay.json"), &overlay)?;
    }

    if cli.insights {
        match CommandInsights::from_command_line(&cli.insights_cmd) {
            Some(source) => match source.generate(&report) {
                Ok(insights) => write_json(&cli.output_dir.join("insights.json"), &insights)?,
                Err(e) => warn!("[Insights] {}", e),
            },
            None => warn!("[Insights] Empty --insights-cmd, skipping"),
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
