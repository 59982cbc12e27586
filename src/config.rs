use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::BoundingBox;
use crate::proximity::{ProximityEvaluator, DEFAULT_THRESHOLD_M};

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Dataset JSON (optionally gzipped)
    pub dataset: PathBuf,
    pub threshold_meters: f64,
    /// Query through the R-tree instead of scanning
    pub use_index: bool,
    pub bounds: BoundingBox,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dataset: PathBuf::from("germany-latest.json"),
            threshold_meters: DEFAULT_THRESHOLD_M,
            use_index: false,
            bounds: BoundingBox::GERMANY,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    pub fn evaluator(&self) -> ProximityEvaluator {
        ProximityEvaluator::new(self.bounds, self.threshold_meters)
    }
}
