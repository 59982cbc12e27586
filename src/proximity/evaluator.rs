//! Country check and first-match-per-category scan.

use tracing::debug;

use super::distance::{is_within_bounds, is_within_range, DEFAULT_THRESHOLD_M};
use crate::dataset::Dataset;
use crate::models::{BoundingBox, Category, Coordinate, EvaluationResult, Match, PointOfInterest};

/// Source of "first point in range" answers for one category.
///
/// Implementations must return the point with the lowest dataset position
/// among those within `threshold_m` of `c`.
pub trait PointLookup {
    fn first_within(
        &self,
        category: Category,
        c: &Coordinate,
        threshold_m: f64,
    ) -> Option<&PointOfInterest>;
}

impl PointLookup for Dataset {
    fn first_within(
        &self,
        category: Category,
        c: &Coordinate,
        threshold_m: f64,
    ) -> Option<&PointOfInterest> {
        self.points(category)
            .iter()
            .find(|p| is_within_range(c, &p.coordinate(), threshold_m))
    }
}

/// Classify `c` against the country box and the restricted points.
///
/// Outside the box nothing is scanned. Inside, each category contributes at
/// most one match: the first point in dataset order that lies within range.
pub fn evaluate<L: PointLookup + ?Sized>(
    c: &Coordinate,
    bounds: &BoundingBox,
    lookup: &L,
    threshold_m: f64,
) -> EvaluationResult {
    if !is_within_bounds(c, bounds) {
        debug!("{} is outside {:?}", c, bounds);
        return EvaluationResult::outside_country();
    }

    let matches: Vec<Match> = Category::all()
        .iter()
        .filter_map(|category| {
            lookup
                .first_within(*category, c, threshold_m)
                .map(|p| Match::new(*category, p.display_name()))
        })
        .collect();

    debug!("{}: {} categories in range", c, matches.len());

    EvaluationResult {
        within_country: true,
        matches,
    }
}

/// Country box and threshold bundled for repeated checks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximityEvaluator {
    pub bounds: BoundingBox,
    pub threshold_m: f64,
}

impl ProximityEvaluator {
    pub fn new(bounds: BoundingBox, threshold_m: f64) -> Self {
        Self {
            bounds,
            threshold_m,
        }
    }

    pub fn evaluate<L: PointLookup + ?Sized>(&self, c: &Coordinate, lookup: &L) -> EvaluationResult {
        evaluate(c, &self.bounds, lookup, self.threshold_m)
    }
}

impl Default for ProximityEvaluator {
    fn default() -> Self {
        Self::new(BoundingBox::GERMANY, DEFAULT_THRESHOLD_M)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proximity::EARTH_RADIUS_M;

    const BERLIN: Coordinate = Coordinate {
        latitude: 52.52,
        longitude: 13.405,
    };

    /// A point `meters` due north of `c`
    fn north_of(c: &Coordinate, meters: f64) -> (f64, f64) {
        (
            c.latitude + (meters / EARTH_RADIUS_M).to_degrees(),
            c.longitude,
        )
    }

    fn poi(category: Category, at: (f64, f64), name: Option<&str>) -> PointOfInterest {
        PointOfInterest::new(category, at.0, at.1, name.map(String::from))
    }

    #[test]
    fn test_berlin_empty_dataset() {
        let result = evaluate(&BERLIN, &BoundingBox::GERMANY, &Dataset::default(), 200.0);
        assert_eq!(
            result,
            EvaluationResult {
                within_country: true,
                matches: vec![],
            }
        );
    }

    #[test]
    fn test_paris_outside() {
        let paris = Coordinate::new(48.8566, 2.3522);
        let result = evaluate(&paris, &BoundingBox::GERMANY, &Dataset::default(), 200.0);
        assert_eq!(result, EvaluationResult::outside_country());
    }

    #[test]
    fn test_outside_ignores_dataset() {
        let paris = Coordinate::new(48.8566, 2.3522);
        let dataset = Dataset::from_points([poi(
            Category::School,
            (paris.latitude, paris.longitude),
            Some("Lycée"),
        )])
        .unwrap();

        let result = evaluate(&paris, &BoundingBox::GERMANY, &dataset, 200.0);
        assert!(!result.within_country);
        assert!(result.matches.is_empty());
    }

    #[test]
    fn test_school_at_150m_matches() {
        let dataset =
            Dataset::from_points([poi(Category::School, north_of(&BERLIN, 150.0), None)]).unwrap();

        let result = evaluate(&BERLIN, &BoundingBox::GERMANY, &dataset, 200.0);
        assert!(result.within_country);
        assert_eq!(result.matches, vec![Match::new(Category::School, "school")]);
    }

    #[test]
    fn test_named_school_at_150m_uses_name() {
        let dataset = Dataset::from_points([poi(
            Category::School,
            north_of(&BERLIN, 150.0),
            Some("Grundschule am Park"),
        )])
        .unwrap();

        let result = evaluate(&BERLIN, &BoundingBox::GERMANY, &dataset, 200.0);
        assert_eq!(
            result.matches,
            vec![Match::new(Category::School, "Grundschule am Park")]
        );
    }

    #[test]
    fn test_school_at_250m_no_match() {
        let dataset =
            Dataset::from_points([poi(Category::School, north_of(&BERLIN, 250.0), None)]).unwrap();

        let result = evaluate(&BERLIN, &BoundingBox::GERMANY, &dataset, 200.0);
        assert!(result.within_country);
        assert!(result.matches.is_empty());
    }

    #[test]
    fn test_first_match_not_nearest() {
        let dataset = Dataset::from_points([
            poi(Category::Playground, north_of(&BERLIN, 500.0), Some("Far away")),
            poi(Category::Playground, north_of(&BERLIN, 180.0), Some("First")),
            poi(Category::Playground, north_of(&BERLIN, 10.0), Some("Nearest")),
        ])
        .unwrap();

        let result = evaluate(&BERLIN, &BoundingBox::GERMANY, &dataset, 200.0);
        assert_eq!(
            result.matches,
            vec![Match::new(Category::Playground, "First")]
        );
    }

    #[test]
    fn test_matches_follow_category_order() {
        // Inserted in reverse category order on purpose.
        let dataset = Dataset::from_points([
            poi(Category::Kindergarten, north_of(&BERLIN, 20.0), Some("Kita")),
            poi(Category::SportLocation, north_of(&BERLIN, 30.0), None),
            poi(Category::School, north_of(&BERLIN, 40.0), Some("Schule")),
            poi(Category::Playground, north_of(&BERLIN, 50.0), Some("Spielplatz")),
        ])
        .unwrap();

        let result = evaluate(&BERLIN, &BoundingBox::GERMANY, &dataset, 200.0);
        assert_eq!(
            result.matches,
            vec![
                Match::new(Category::Playground, "Spielplatz"),
                Match::new(Category::School, "Schule"),
                Match::new(Category::SportLocation, "sport location"),
                Match::new(Category::Kindergarten, "Kita"),
            ]
        );
    }

    #[test]
    fn test_evaluator_uses_configured_threshold() {
        let dataset =
            Dataset::from_points([poi(Category::School, north_of(&BERLIN, 250.0), None)]).unwrap();

        let strict = ProximityEvaluator::default();
        let loose = ProximityEvaluator::new(BoundingBox::GERMANY, 300.0);

        assert!(strict.evaluate(&BERLIN, &dataset).matches.is_empty());
        assert_eq!(loose.evaluate(&BERLIN, &dataset).matches.len(), 1);
    }
}
