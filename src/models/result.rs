use serde::{Deserialize, Serialize};

use super::Category;

/// A restricted point found within range, one per category at most
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub category: Category,
    pub name: String,
}

impl Match {
    pub fn new(category: Category, name: impl Into<String>) -> Self {
        Self {
            category,
            name: name.into(),
        }
    }
}

/// Outcome of a single location check
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    pub within_country: bool,
    pub matches: Vec<Match>,
}

impl EvaluationResult {
    pub fn outside_country() -> Self {
        Self::default()
    }

    /// Inside the country with no restricted point in range
    pub fn is_clear(&self) -> bool {
        self.within_country && self.matches.is_empty()
    }
}
