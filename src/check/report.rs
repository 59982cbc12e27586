use serde::Serialize;

use proxcheck::status::{CheckState, Indicator};
use proxcheck::{Coordinate, EvaluationResult};

/// One printed line of `check` output
#[derive(Debug, Serialize)]
pub struct Report {
    pub indicator: Indicator,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Coordinate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<EvaluationResult>,
    #[serde(skip)]
    position_label: String,
}

impl Report {
    pub fn new(state: &CheckState, result: Option<&EvaluationResult>) -> Self {
        Self {
            indicator: state.indicator(),
            message: state.message(),
            position: state.position(),
            result: result.cloned(),
            position_label: state.position_label(),
        }
    }
}

impl std::fmt::Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let symbol = match self.indicator {
            Indicator::Unknown => "?",
            Indicator::Ok => "✓",
            Indicator::Blocked => "✗",
        };
        write!(
            f,
            "[{}] {} (Mein Standort: {})",
            symbol, self.message, self.position_label
        )
    }
}
