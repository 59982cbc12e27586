//! Status indicator and message shown to the user.
//!
//! The proximity core is stateless; this is where the display state lives.
//! Each location check moves the state through `begin_check` and then one
//! of `complete` / `fail`.

use serde::Serialize;

use crate::models::{Coordinate, EvaluationResult};
use crate::source::LocationError;

/// Icon shown next to the message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Indicator {
    /// No answer yet, or the position could not be determined
    Unknown,
    /// Inside the country and nothing restricted nearby
    Ok,
    /// Too close to something, or outside the country
    Blocked,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Nothing checked yet
    Idle,
    Clear,
    TooClose(Vec<String>),
    OutsideCountry,
    Failed(LocationError),
}

impl Outcome {
    pub fn from_result(result: &EvaluationResult) -> Self {
        if !result.within_country {
            Outcome::OutsideCountry
        } else if result.is_clear() {
            Outcome::Clear
        } else {
            Outcome::TooClose(result.matches.iter().map(|m| m.name.clone()).collect())
        }
    }

    pub fn indicator(&self) -> Indicator {
        match self {
            Outcome::Idle | Outcome::Failed(_) => Indicator::Unknown,
            Outcome::Clear => Indicator::Ok,
            Outcome::TooClose(_) | Outcome::OutsideCountry => Indicator::Blocked,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Outcome::Idle => "Keine Antwort.".to_string(),
            Outcome::Clear => "Blaze it.".to_string(),
            Outcome::TooClose(names) => names
                .iter()
                .map(|name| format!("Leider zu nah an {}.", name))
                .collect::<Vec<_>>()
                .join(" "),
            Outcome::OutsideCountry => "Location is outside Germany.".to_string(),
            Outcome::Failed(err) => err.to_string(),
        }
    }
}

/// Full display state: last outcome, last known position, loading flag
#[derive(Debug, Clone, PartialEq)]
pub struct CheckState {
    outcome: Outcome,
    position: Option<Coordinate>,
    loading: bool,
}

impl Default for CheckState {
    fn default() -> Self {
        Self {
            outcome: Outcome::Idle,
            position: None,
            loading: false,
        }
    }
}

impl CheckState {
    pub fn new() -> Self {
        Self::default()
    }

    /// A location request started; the previous outcome stays visible
    pub fn begin_check(&mut self) {
        self.loading = true;
    }

    /// A position arrived and was evaluated
    pub fn complete(&mut self, position: Coordinate, result: &EvaluationResult) {
        self.position = Some(position);
        self.outcome = Outcome::from_result(result);
        self.loading = false;
    }

    /// The position request failed; the last known position is kept
    pub fn fail(&mut self, err: LocationError) {
        self.outcome = Outcome::Failed(err);
        self.loading = false;
    }

    pub fn indicator(&self) -> Indicator {
        self.outcome.indicator()
    }

    pub fn message(&self) -> String {
        self.outcome.message()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn position(&self) -> Option<Coordinate> {
        self.position
    }

    /// Last position as `lat,lon`, or "leer" when there is none
    pub fn position_label(&self) -> String {
        self.position
            .map(|c| c.to_string())
            .unwrap_or_else(|| "leer".to_string())
    }
}
