//! OSM PBF ingest pipeline.
//!
//! Extracts playgrounds, schools, sport locations and kindergartens from an
//! OSM extract and writes them as a dataset file for the `check` binary.

mod classify;
mod geometry;

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use flate2::write::GzEncoder;
use flate2::Compression;
use indicatif::{ProgressBar, ProgressStyle};
use osmpbfreader::{OsmObj, OsmPbfReader};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use proxcheck::{Category, Dataset, PointOfInterest};

use crate::classify::{classify, name};
use crate::geometry::WayGeometry;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(name = "ingest")]
#[command(about = "Build a restricted-location dataset from OSM PBF data")]
struct Args {
    /// OSM PBF file to import
    #[arg(short, long)]
    file: PathBuf,

    /// Output dataset file; a `.gz` suffix writes gzip
    #[arg(short, long, default_value = "germany-latest.json")]
    output: PathBuf,

    /// Only take tagged nodes, skipping way centroid resolution
    #[arg(long)]
    skip_ways: bool,
}

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    info!("proxcheck ingest");
    info!("File: {}", args.file.display());

    let file = File::open(&args.file).context("Failed to open PBF file")?;
    let mut reader = OsmPbfReader::new(BufReader::new(file));

    let ways = if args.skip_ways {
        None
    } else {
        Some(WayGeometry::build(&mut reader, |tags| {
            classify(tags).is_some()
        })?)
    };

    info!("Counting objects...");
    reader.rewind()?;
    let total_count = reader.iter().filter(|obj| obj.is_ok()).count() as u64;
    info!("Total OSM objects: {}", total_count);

    let pb = ProgressBar::new(total_count);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})",
            )?
            .progress_chars("#>-"),
    );

    info!("Processing OSM objects...");
    reader.rewind()?;
    let mut points = Vec::new();
    let mut unresolved = 0u64;

    for obj_result in reader.iter() {
        pb.inc(1);

        let obj = match obj_result {
            Ok(o) => o,
            Err(e) => {
                warn!("Error reading OSM object: {}", e);
                continue;
            }
        };

        match &obj {
            OsmObj::Node(node) => {
                if let Some(category) = classify(&node.tags) {
                    points.push(PointOfInterest::new(
                        category,
                        node.lat(),
                        node.lon(),
                        name(&node.tags),
                    ));
                }
            }
            OsmObj::Way(way) => {
                let (Some(category), Some(ways)) = (classify(&way.tags), ways.as_ref()) else {
                    continue;
                };
                match ways.resolve_centroid(way.id) {
                    Some(center) => points.push(PointOfInterest::new(
                        category,
                        center.latitude,
                        center.longitude,
                        name(&way.tags),
                    )),
                    None => unresolved += 1,
                }
            }
            // Multipolygon relations are rare for these tags; skipped.
            OsmObj::Relation(_) => {}
        }
    }

    pb.finish_with_message("Processing complete");

    if unresolved > 0 {
        warn!("{} ways were open or had no resolvable geometry", unresolved);
    }

    let dataset = Dataset::from_points(points)?;
    for category in Category::all() {
        info!("  {}: {} points", category, dataset.points(*category).len());
    }

    write_dataset(&dataset, &args.output)?;
    info!(
        "Wrote {} points to {}",
        dataset.len(),
        args.output.display()
    );

    Ok(())
}

fn write_dataset(dataset: &Dataset, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    if path.extension().map_or(false, |e| e == "gz") {
        let mut encoder = GzEncoder::new(&mut writer, Compression::default());
        dataset.write_json(&mut encoder)?;
        encoder.finish()?;
    } else {
        dataset.write_json(&mut writer)?;
    }

    writer.flush()?;
    Ok(())
}
