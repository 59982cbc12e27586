//! Core data models for the proximity checker.

pub mod coordinate;
pub mod poi;
pub mod result;

pub use coordinate::{BoundingBox, Coordinate, CoordinateParseError};
pub use poi::{Category, PointOfInterest};
pub use result::{EvaluationResult, Match};
