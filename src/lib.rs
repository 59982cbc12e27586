//! proxcheck - checks whether a position lies inside Germany and away from
//! playgrounds, schools, sport locations and kindergartens.
//!
//! This library provides shared types and modules for the check and ingest binaries.

pub mod config;
pub mod dataset;
pub mod models;
pub mod proximity;
pub mod source;
pub mod status;

pub use dataset::{Dataset, DatasetError};
pub use models::{BoundingBox, Category, Coordinate, EvaluationResult, Match, PointOfInterest};
pub use proximity::{evaluate, ProximityEvaluator, SpatialIndex};
