//! R-tree index over the dataset for sub-linear range lookups.

use rstar::{RTree, RTreeObject, AABB};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

use super::distance::{is_within_range, EARTH_RADIUS_M};
use super::evaluator::PointLookup;
use crate::dataset::Dataset;
use crate::models::{Category, Coordinate, PointOfInterest};

/// Padding added to the search window, in degrees
const WINDOW_EPSILON_DEG: f64 = 1e-9;

/// A point's position in the tree plus its dataset position
#[derive(Debug, Clone, Copy)]
struct IndexedPoint {
    ordinal: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Per-category R-trees over a shared dataset.
///
/// Answers [`PointLookup`] queries with the same point the linear scan
/// would find: all in-range candidates are collected and the one with the
/// lowest dataset position wins.
pub struct SpatialIndex {
    dataset: Arc<Dataset>,
    trees: BTreeMap<Category, RTree<IndexedPoint>>,
}

impl SpatialIndex {
    pub fn build(dataset: Arc<Dataset>) -> Self {
        info!("Building spatial index for {} points...", dataset.len());

        let trees = Category::all()
            .iter()
            .map(|category| {
                let entries: Vec<IndexedPoint> = dataset
                    .points(*category)
                    .iter()
                    .enumerate()
                    .map(|(ordinal, p)| IndexedPoint {
                        ordinal,
                        envelope: AABB::from_point([p.longitude, p.latitude]),
                    })
                    .collect();
                (*category, RTree::bulk_load(entries))
            })
            .collect();

        Self { dataset, trees }
    }

    pub fn len(&self) -> usize {
        self.trees.values().map(RTree::size).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Lon/lat window guaranteed to contain every point within `threshold_m`.
///
/// `None` when no sound rectangular window exists (pole or antimeridian in
/// reach, or non-finite input); callers fall back to a full scan.
fn search_window(c: &Coordinate, threshold_m: f64) -> Option<AABB<[f64; 2]>> {
    if !c.latitude.is_finite() || !c.longitude.is_finite() || !(threshold_m >= 0.0) {
        return None;
    }

    let angular = threshold_m / EARTH_RADIUS_M;
    let d_lat = angular.to_degrees() + WINDOW_EPSILON_DEG;
    let min_lat = c.latitude - d_lat;
    let max_lat = c.latitude + d_lat;
    if min_lat <= -90.0 || max_lat >= 90.0 {
        return None;
    }

    let ratio = angular.sin() / c.latitude.to_radians().cos();
    if !(ratio < 1.0) {
        return None;
    }
    let d_lon = ratio.asin().to_degrees() + WINDOW_EPSILON_DEG;
    let min_lon = c.longitude - d_lon;
    let max_lon = c.longitude + d_lon;
    if min_lon < -180.0 || max_lon > 180.0 {
        return None;
    }

    Some(AABB::from_corners([min_lon, min_lat], [max_lon, max_lat]))
}

impl PointLookup for SpatialIndex {
    fn first_within(
        &self,
        category: Category,
        c: &Coordinate,
        threshold_m: f64,
    ) -> Option<&PointOfInterest> {
        let Some(window) = search_window(c, threshold_m) else {
            return self.dataset.first_within(category, c, threshold_m);
        };

        let points = self.dataset.points(category);
        self.trees
            .get(&category)?
            .locate_in_envelope(&window)
            .map(|ip| ip.ordinal)
            .filter(|&i| is_within_range(c, &points[i].coordinate(), threshold_m))
            .min()
            .map(|i| &points[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BoundingBox;
    use crate::proximity::evaluate;

    /// Deterministic spread of points around central Germany, with
    /// duplicates so first-match ordering matters.
    fn grid_dataset() -> Dataset {
        let mut points = Vec::new();
        for i in 0..40 {
            for j in 0..40 {
                let lat = 50.0 + i as f64 * 0.0011 + ((i * 7 + j * 3) % 5) as f64 * 0.0001;
                let lon = 8.0 + j as f64 * 0.0017 + ((i * 5 + j) % 7) as f64 * 0.0001;
                let category = Category::all()[(i + j) % 4];
                points.push(PointOfInterest::new(
                    category,
                    lat,
                    lon,
                    Some(format!("p{i}-{j}")),
                ));
                if (i * j) % 11 == 0 {
                    points.push(PointOfInterest::new(
                        category,
                        lat,
                        lon,
                        Some(format!("dup{i}-{j}")),
                    ));
                }
            }
        }
        Dataset::from_points(points).unwrap()
    }

    #[test]
    fn test_index_agrees_with_linear_scan() {
        let dataset = Arc::new(grid_dataset());
        let index = SpatialIndex::build(Arc::clone(&dataset));
        assert_eq!(index.len(), dataset.len());

        for i in 0..20 {
            for j in 0..20 {
                let c = Coordinate::new(49.999 + i as f64 * 0.0023, 7.999 + j as f64 * 0.0035);
                for threshold in [0.0, 50.0, 200.0, 750.0] {
                    let linear = evaluate(&c, &BoundingBox::GERMANY, dataset.as_ref(), threshold);
                    let indexed = evaluate(&c, &BoundingBox::GERMANY, &index, threshold);
                    assert_eq!(linear, indexed, "mismatch at {c} / {threshold} m");
                }
            }
        }
    }

    #[test]
    fn test_exact_hit_with_zero_threshold() {
        let dataset = Arc::new(
            Dataset::from_points([PointOfInterest::new(Category::School, 51.0, 10.0, None)])
                .unwrap(),
        );
        let index = SpatialIndex::build(dataset);
        let hit = index.first_within(Category::School, &Coordinate::new(51.0, 10.0), 0.0);
        assert!(hit.is_some());
    }

    #[test]
    fn test_window_rejects_unsound_queries() {
        assert!(search_window(&Coordinate::new(89.9999, 0.0), 200.0).is_none());
        assert!(search_window(&Coordinate::new(10.0, 179.9999), 200.0).is_none());
        assert!(search_window(&Coordinate::new(f64::NAN, 0.0), 200.0).is_none());
        assert!(search_window(&Coordinate::new(10.0, 10.0), -1.0).is_none());
        assert!(search_window(&Coordinate::new(52.52, 13.405), 200.0).is_some());
    }

    #[test]
    fn test_fallback_near_antimeridian() {
        let dataset = Arc::new(
            Dataset::from_points([PointOfInterest::new(
                Category::Playground,
                10.0,
                -179.9999,
                Some("Across the line".into()),
            )])
            .unwrap(),
        );
        let index = SpatialIndex::build(dataset);
        let hit = index.first_within(Category::Playground, &Coordinate::new(10.0, 179.9999), 200.0);
        assert_eq!(
            hit.and_then(|p| p.name.as_deref()),
            Some("Across the line")
        );
    }
}
