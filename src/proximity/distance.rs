//! Great-circle distance and the range/bounds predicates built on it.

use crate::models::{BoundingBox, Coordinate};

/// Earth radius in meters
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Reference proximity threshold in meters
pub const DEFAULT_THRESHOLD_M: f64 = 200.0;

/// Haversine distance in meters between two coordinates.
///
/// Inputs are not range-checked. The haversine term is clamped to `[0, 1]`
/// so rounding near antipodal points cannot push `sqrt(1 - a)` into NaN.
pub fn distance(a: &Coordinate, b: &Coordinate) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let d_phi = (b.latitude - a.latitude).to_radians();
    let d_lambda = (b.longitude - a.longitude).to_radians();

    let h = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let h = h.clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

/// `distance(a, b) <= threshold_m`, inclusive
pub fn is_within_range(a: &Coordinate, b: &Coordinate, threshold_m: f64) -> bool {
    distance(a, b) <= threshold_m
}

/// Inclusive containment on all four edges of `bounds`
pub fn is_within_bounds(c: &Coordinate, bounds: &BoundingBox) -> bool {
    bounds.contains(c)
}
