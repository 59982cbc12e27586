//! Proximity evaluation: haversine distance, country bounding box and the
//! first-match-per-category scan over the point dataset.
//!
//! Everything here is pure and synchronous. `Dataset` and `SpatialIndex`
//! are read-only once built and can be shared across threads freely.

mod distance;
mod evaluator;
mod index;

pub use distance::{
    distance, is_within_bounds, is_within_range, DEFAULT_THRESHOLD_M, EARTH_RADIUS_M,
};
pub use evaluator::{evaluate, PointLookup, ProximityEvaluator};
pub use index::SpatialIndex;
