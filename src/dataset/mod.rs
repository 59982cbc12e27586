//! Static point-of-interest dataset.
//!
//! Loaded once from a JSON document mapping category keys to arrays of
//! `{latitude, longitude, name?}` records, validated, and then shared
//! read-only for the lifetime of the process.

use flate2::read::GzDecoder;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::{Category, PointOfInterest};

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse dataset: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid point #{index} in {category}: ({latitude}, {longitude})")]
    InvalidPoint {
        category: Category,
        index: usize,
        latitude: f64,
        longitude: f64,
    },
}

/// One record as it appears in the dataset file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointRecord {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Category -> points, in dataset order
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    points: BTreeMap<Category, Vec<PointOfInterest>>,
}

impl Dataset {
    /// Build a dataset from already-categorized points, validating each one
    pub fn from_points(
        points: impl IntoIterator<Item = PointOfInterest>,
    ) -> Result<Self, DatasetError> {
        let mut dataset = Dataset::default();
        for point in points {
            dataset.push(point)?;
        }
        Ok(dataset)
    }

    /// Load from a JSON file; `.gz` files are decompressed on the fly
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        info!("Loading dataset from {}", path.display());

        let io_err = |source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(io_err)?;
        let reader: Box<dyn Read> = if path.extension().map_or(false, |e| e == "gz") {
            Box::new(GzDecoder::new(file))
        } else {
            Box::new(file)
        };

        let dataset = Self::from_reader(BufReader::new(reader))?;
        for category in Category::all() {
            info!("  {}: {} points", category, dataset.points(*category).len());
        }
        Ok(dataset)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        let raw: BTreeMap<String, Vec<PointRecord>> = serde_json::from_reader(reader)?;
        Self::from_records(raw)
    }

    pub fn from_json(s: &str) -> Result<Self, DatasetError> {
        let raw: BTreeMap<String, Vec<PointRecord>> = serde_json::from_str(s)?;
        Self::from_records(raw)
    }

    fn from_records(raw: BTreeMap<String, Vec<PointRecord>>) -> Result<Self, DatasetError> {
        let mut dataset = Dataset::default();

        for (key, records) in raw {
            let Some(category) = Category::from_dataset_key(&key) else {
                warn!("Skipping unknown dataset category '{}'", key);
                continue;
            };
            debug!("Reading {} records for {}", records.len(), category);

            for record in records {
                dataset.push(PointOfInterest::new(
                    category,
                    record.latitude,
                    record.longitude,
                    record.name,
                ))?;
            }
        }

        Ok(dataset)
    }

    fn push(&mut self, point: PointOfInterest) -> Result<(), DatasetError> {
        let list = self.points.entry(point.category).or_default();
        if !point.coordinate().is_valid() {
            return Err(DatasetError::InvalidPoint {
                category: point.category,
                index: list.len(),
                latitude: point.latitude,
                longitude: point.longitude,
            });
        }
        list.push(point);
        Ok(())
    }

    /// Points of a category in dataset order
    pub fn points(&self, category: Category) -> &[PointOfInterest] {
        self.points.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of points across all categories
    pub fn len(&self) -> usize {
        self.points.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over all points, category by category
    pub fn iter(&self) -> impl Iterator<Item = &PointOfInterest> {
        Category::all().iter().flat_map(|c| self.points(*c).iter())
    }

    /// Serialize in the file format read by [`Dataset::load`]
    pub fn write_json<W: Write>(&self, writer: W) -> Result<(), DatasetError> {
        let mut out: BTreeMap<&'static str, Vec<PointRecord>> = BTreeMap::new();
        for category in Category::all() {
            out.insert(
                category.dataset_key(),
                self.points(*category)
                    .iter()
                    .map(|p| PointRecord {
                        latitude: p.latitude,
                        longitude: p.longitude,
                        name: p.name.clone(),
                    })
                    .collect(),
            );
        }
        serde_json::to_writer(writer, &out)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;

    const SAMPLE: &str = r#"{
        "playgrounds": [
            {"latitude": 52.5200, "longitude": 13.4050, "name": "Spielplatz Mitte"},
            {"latitude": 52.5210, "longitude": 13.4060}
        ],
        "schools": [
            {"latitude": 48.1374, "longitude": 11.5755, "name": "Gymnasium", "osm_id": 42}
        ],
        "hospitals": [
            {"latitude": 50.0, "longitude": 8.0}
        ]
    }"#;

    #[test]
    fn test_parse_sample() {
        let dataset = Dataset::from_json(SAMPLE).unwrap();
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.points(Category::Playground).len(), 2);
        assert_eq!(dataset.points(Category::School)[0].name.as_deref(), Some("Gymnasium"));
        assert!(dataset.points(Category::Kindergarten).is_empty());
        assert!(dataset.points(Category::Playground)[1].name.is_none());
    }

    #[test]
    fn test_singular_keys_accepted() {
        let dataset =
            Dataset::from_json(r#"{"kindergarten": [{"latitude": 1.0, "longitude": 2.0}]}"#)
                .unwrap();
        assert_eq!(dataset.points(Category::Kindergarten).len(), 1);
    }

    #[test]
    fn test_invalid_point_rejected() {
        let err = Dataset::from_json(
            r#"{"schools": [
                {"latitude": 1.0, "longitude": 2.0},
                {"latitude": 91.0, "longitude": 2.0}
            ]}"#,
        )
        .unwrap_err();

        match err {
            DatasetError::InvalidPoint {
                category, index, ..
            } => {
                assert_eq!(category, Category::School);
                assert_eq!(index, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_coordinate_is_parse_error() {
        let err = Dataset::from_json(r#"{"schools": [{"latitude": 1.0}]}"#).unwrap_err();
        assert!(matches!(err, DatasetError::Parse(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Dataset::load(Path::new("/nonexistent/dataset.json")).unwrap_err();
        assert!(matches!(err, DatasetError::Io { .. }));
    }

    #[test]
    fn test_load_plain_and_gzip() {
        let dir = tempfile::tempdir().unwrap();

        let plain = dir.path().join("dataset.json");
        std::fs::write(&plain, SAMPLE).unwrap();
        assert_eq!(Dataset::load(&plain).unwrap().len(), 3);

        let gz = dir.path().join("dataset.json.gz");
        let mut encoder = GzEncoder::new(File::create(&gz).unwrap(), Compression::default());
        encoder.write_all(SAMPLE.as_bytes()).unwrap();
        encoder.finish().unwrap();
        assert_eq!(Dataset::load(&gz).unwrap().len(), 3);
    }

    #[test]
    fn test_written_file_loads_back() {
        let dataset = Dataset::from_json(SAMPLE).unwrap();
        let mut buf = Vec::new();
        dataset.write_json(&mut buf).unwrap();

        let reloaded = Dataset::from_reader(buf.as_slice()).unwrap();
        assert_eq!(
            reloaded.iter().collect::<Vec<_>>(),
            dataset.iter().collect::<Vec<_>>()
        );
    }
}
