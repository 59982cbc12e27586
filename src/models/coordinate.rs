//! Coordinate and bounding box value types.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Geographic point (lat/lon) in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// True if both components are finite and inside the WGS84 ranges
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

impl From<Coordinate> for geo::Point<f64> {
    fn from(c: Coordinate) -> Self {
        geo::Point::new(c.longitude, c.latitude)
    }
}

impl From<geo::Point<f64>> for Coordinate {
    fn from(p: geo::Point<f64>) -> Self {
        Coordinate::new(p.y(), p.x())
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum CoordinateParseError {
    #[error("expected \"lat,lon\", got {0:?}")]
    Format(String),
    #[error("invalid number {0:?}")]
    Number(String),
}

/// Parses `"lat,lon"`. Whitespace around either part is ignored.
///
/// Range is not checked here; see [`Coordinate::is_valid`].
impl FromStr for Coordinate {
    type Err = CoordinateParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lon) = s
            .split_once(',')
            .ok_or_else(|| CoordinateParseError::Format(s.to_string()))?;

        let parse = |part: &str| {
            part.trim()
                .parse::<f64>()
                .map_err(|_| CoordinateParseError::Number(part.trim().to_string()))
        };

        Ok(Coordinate::new(parse(lat)?, parse(lon)?))
    }
}

/// Axis-aligned lat/lon rectangle approximating a country's extent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Germany, mainland extent
    pub const GERMANY: BoundingBox = BoundingBox {
        min_lat: 47.270111,
        max_lat: 55.05814,
        min_lon: 5.866315,
        max_lon: 15.041896,
    };

    pub fn new(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Self {
        Self {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        }
    }

    /// Inclusive containment on all four edges
    pub fn contains(&self, c: &Coordinate) -> bool {
        c.latitude >= self.min_lat
            && c.latitude <= self.max_lat
            && c.longitude >= self.min_lon
            && c.longitude <= self.max_lon
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        BoundingBox::GERMANY
    }
}
