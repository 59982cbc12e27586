//! Point-of-interest types loaded from the dataset.

use serde::{Deserialize, Serialize};

use super::Coordinate;

/// Restricted point-of-interest classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Playground,
    School,
    SportLocation,
    Kindergarten,
}

impl Category {
    /// All categories in evaluation order
    pub fn all() -> &'static [Category] {
        &[
            Category::Playground,
            Category::School,
            Category::SportLocation,
            Category::Kindergarten,
        ]
    }

    /// Snake-case singular label
    pub fn label(&self) -> &'static str {
        match self {
            Category::Playground => "playground",
            Category::School => "school",
            Category::SportLocation => "sport_location",
            Category::Kindergarten => "kindergarten",
        }
    }

    /// Key used for this category in dataset files
    pub fn dataset_key(&self) -> &'static str {
        match self {
            Category::Playground => "playgrounds",
            Category::School => "schools",
            Category::SportLocation => "sport_locations",
            Category::Kindergarten => "kindergartens",
        }
    }

    /// Resolve a dataset key; both plural and singular forms are accepted
    pub fn from_dataset_key(key: &str) -> Option<Self> {
        Category::all()
            .iter()
            .copied()
            .find(|c| c.dataset_key() == key || c.label() == key)
    }

    /// Name shown for a point that has none
    pub fn fallback_name(&self) -> String {
        self.label().replace('_', " ")
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointOfInterest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub category: Category,
}

impl PointOfInterest {
    pub fn new(category: Category, latitude: f64, longitude: f64, name: Option<String>) -> Self {
        Self {
            name,
            latitude,
            longitude,
            category,
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    /// The point's name, or the category fallback when missing or empty
    pub fn display_name(&self) -> String {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => self.category.fallback_name(),
        }
    }
}
