//! Location check front end.
//!
//! Takes a position (fixed, or one per line on stdin), runs it through the
//! proximity evaluator and prints the resulting status.

mod report;

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::BufReader;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use proxcheck::config::Config;
use proxcheck::proximity::{PointLookup, ProximityEvaluator};
use proxcheck::source::{CoordinateSource, FixedSource, LineSource, LocationError, TimeoutSource};
use proxcheck::status::CheckState;
use proxcheck::{Coordinate, Dataset, SpatialIndex};

use crate::report::Report;

#[derive(Parser, Debug)]
#[command(name = "check")]
#[command(about = "Check a position against the restricted-location dataset")]
struct Args {
    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Dataset file (overrides config)
    #[arg(long)]
    dataset: Option<PathBuf>,

    /// Proximity threshold in meters (overrides config)
    #[arg(long)]
    threshold: Option<f64>,

    /// Use the R-tree index instead of a linear scan
    #[arg(long)]
    index: bool,

    /// Position as "lat,lon"
    #[arg(
        long,
        value_name = "LAT,LON",
        allow_hyphen_values = true,
        required_unless_present = "stdin",
        conflicts_with = "stdin"
    )]
    at: Option<Coordinate>,

    /// Read one position per line from stdin, re-checking for each
    #[arg(long)]
    stdin: bool,

    /// Give up on a position request after this many seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging; stdout is reserved for results
    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        })
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = match &args.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::default(),
    };
    if let Some(dataset) = &args.dataset {
        config.dataset = dataset.clone();
    }
    if let Some(threshold) = args.threshold {
        config.threshold_meters = threshold;
    }
    config.use_index |= args.index;

    let dataset = Arc::new(
        Dataset::load(&config.dataset)
            .with_context(|| format!("Failed to load dataset {}", config.dataset.display()))?,
    );
    info!(
        "Loaded {} points; threshold {} m",
        dataset.len(),
        config.threshold_meters
    );

    let session = Session {
        evaluator: config.evaluator(),
        json: args.json,
        timeout: args.timeout_secs.map(Duration::from_secs),
    };

    if config.use_index {
        let index = SpatialIndex::build(Arc::clone(&dataset));
        session.run(&args, &index).await
    } else {
        session.run(&args, dataset.as_ref()).await
    }
}

struct Session {
    evaluator: ProximityEvaluator,
    json: bool,
    timeout: Option<Duration>,
}

impl Session {
    async fn run<L: PointLookup + ?Sized>(&self, args: &Args, lookup: &L) -> Result<()> {
        let mut out = std::io::stdout();
        match args.at {
            Some(at) => {
                self.with_timeout(FixedSource::new(at), true, lookup, &mut out)
                    .await
            }
            None => {
                let stdin = LineSource::new(BufReader::new(tokio::io::stdin()));
                self.with_timeout(stdin, false, lookup, &mut out).await
            }
        }
    }

    async fn with_timeout<S, L, W>(
        &self,
        source: S,
        once: bool,
        lookup: &L,
        out: &mut W,
    ) -> Result<()>
    where
        S: CoordinateSource,
        L: PointLookup + ?Sized,
        W: Write,
    {
        match self.timeout {
            Some(limit) => {
                self.drive(TimeoutSource::new(source, limit), once, lookup, out)
                    .await
            }
            None => self.drive(source, once, lookup, out).await,
        }
    }

    /// Run checks until the source is exhausted (or once), one line per check
    async fn drive<S, L, W>(
        &self,
        mut source: S,
        once: bool,
        lookup: &L,
        out: &mut W,
    ) -> Result<()>
    where
        S: CoordinateSource,
        L: PointLookup + ?Sized,
        W: Write,
    {
        let mut state = CheckState::new();

        loop {
            state.begin_check();
            match source.locate().await {
                Ok(position) => {
                    let result = self.evaluator.evaluate(&position, lookup);
                    state.complete(position, &result);
                    self.print(out, &Report::new(&state, Some(&result)))?;
                }
                Err(LocationError::Exhausted) => break,
                Err(err) => {
                    warn!("Location request failed: {}", err);
                    state.fail(err);
                    self.print(out, &Report::new(&state, None))?;
                }
            }

            if once {
                break;
            }
        }

        Ok(())
    }

    fn print<W: Write>(&self, out: &mut W, report: &Report) -> Result<()> {
        if self.json {
            writeln!(out, "{}", serde_json::to_string(report)?)?;
        } else {
            writeln!(out, "{}", report)?;
        }
        out.flush()?;
        Ok(())
    }
}
