//! Command-line shell around the recognition pipeline.
//!
//! Enumerates images in a directory, runs the pipeline over each, and
//! writes the classification results plus timing to a JSON document. All
//! recognition semantics live in the library; this binary is I/O glue.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use aerospot::{PipelineConfig, PipelineStats, TargetPipeline, TessCharRecognizer};

#[derive(Parser, Debug)]
#[command(name = "aerospot", version, about = "Aerial target recognition")]
struct Args {
    /// Directory containing input images.
    input: PathBuf,

    /// Path of the JSON results file.
    #[arg(short, long, default_value = "output.json")]
    output: PathBuf,

    /// Optional JSON pipeline configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Tesseract language.
    #[arg(long, default_value = "eng")]
    lang: String,

    /// Tesseract data directory.
    #[arg(long)]
    tessdata: Option<String>,

    /// Override the minimum candidate blob area.
    #[arg(long)]
    min_area: Option<f64>,

    /// Override the maximum candidate blob area.
    #[arg(long)]
    max_area: Option<f64>,
}

#[derive(Serialize)]
struct ImageEntry {
    image: String,
    image_time: f64,
    candidates: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    targets: Vec<aerospot::ClassificationRecord>,
}

#[derive(Serialize)]
struct RunOutput {
    images: Vec<ImageEntry>,
    runtime: f64,
}

/// Image files in the input directory, sorted by filename.
fn collect_image_paths(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("reading input directory {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("jpg") | Some("jpeg") | Some("png") | Some("bmp")
            )
        })
        .collect();
    paths.sort();
    Ok(paths)
}

fn load_config(args: &Args) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => PipelineConfig::default(),
    };
    if let Some(min_area) = args.min_area {
        config.min_area = min_area;
    }
    if let Some(max_area) = args.max_area {
        config.max_area = max_area;
    }
    Ok(config)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;

    let pipeline = TargetPipeline::builder()
        .config(config)
        .recognizer_factory(TessCharRecognizer::factory(
            args.tessdata.clone(),
            args.lang.clone(),
        ))
        .build()
        .context("building pipeline")?;

    let paths = collect_image_paths(&args.input)?;
    info!(images = paths.len(), "starting run");

    let run_start = Instant::now();
    let mut entries = Vec::with_capacity(paths.len());
    let mut reports = Vec::with_capacity(paths.len());

    for (index, path) in paths.iter().enumerate() {
        let image_start = Instant::now();
        let decoded = image::open(path).map(|img| img.to_rgb8());
        let entry = match decoded {
            Ok(image) => {
                let mut batch = pipeline.process_batch(std::slice::from_ref(&image));
                let mut report = batch.remove(0);
                report.index = index;
                let entry = ImageEntry {
                    image: path.display().to_string(),
                    image_time: image_start.elapsed().as_secs_f64(),
                    candidates: report.candidates,
                    error: report.error.clone(),
                    targets: report.records.clone(),
                };
                reports.push(report);
                entry
            }
            Err(err) => {
                warn!(image = %path.display(), error = %err, "failed to decode image, skipping");
                reports.push(aerospot::ImageReport {
                    index,
                    candidates: 0,
                    records: Vec::new(),
                    error: Some(err.to_string()),
                });
                ImageEntry {
                    image: path.display().to_string(),
                    image_time: image_start.elapsed().as_secs_f64(),
                    candidates: 0,
                    error: Some(err.to_string()),
                    targets: Vec::new(),
                }
            }
        };
        entries.push(entry);
    }

    let output = RunOutput {
        images: entries,
        runtime: run_start.elapsed().as_secs_f64(),
    };
    let json = serde_json::to_string_pretty(&output).context("serializing results")?;
    fs::write(&args.output, json)
        .with_context(|| format!("writing results to {}", args.output.display()))?;

    let stats = PipelineStats::from_reports(&reports);
    println!("{stats}");
    info!(output = %args.output.display(), "run complete");
    Ok(())
}
