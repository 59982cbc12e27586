//! OSM tag classification into restricted categories.

use proxcheck::Category;

const SPORT_LEISURE: &[&str] = &["sports_centre", "pitch", "stadium", "sports_hall", "track"];

/// Category for an OSM object's tags, if it is one we track
pub fn classify(tags: &osmpbfreader::Tags) -> Option<Category> {
    classify_with(|key| tags.get(key).map(|v| v.as_str()))
}

/// Same as [`classify`], over any tag lookup
pub fn classify_with<'a, F>(get: F) -> Option<Category>
where
    F: Fn(&str) -> Option<&'a str>,
{
    match get("amenity") {
        Some("kindergarten") => return Some(Category::Kindergarten),
        Some("school") => return Some(Category::School),
        _ => {}
    }

    match get("leisure") {
        Some("playground") => Some(Category::Playground),
        Some(v) if SPORT_LEISURE.contains(&v) => Some(Category::SportLocation),
        _ => None,
    }
}

/// The `name` tag, if present and not blank
pub fn name(tags: &osmpbfreader::Tags) -> Option<String> {
    tags.get("name")
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
