use serde::{Deserialize, Serialize};

use crate::error::{JourneyError, Result};
use crate::flow::tolerance::Classification;
use crate::scenario::scenario_model::ScenarioResult;

/// Aggregated report for a suite of scenario runs.
///
/// Built from a `Vec<ScenarioResult>` via `from_results()` and rendered by the
/// console reporter or serialized as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    pub suite_name: String,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,

    /// Persona deviations that were expected and observed
    pub known_defects: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u128>,

    pub results: Vec<ScenarioResult>,
}

impl SuiteReport {
    pub fn from_results(suite_name: &str, results: Vec<ScenarioResult>) -> Self {
        let total = results.len();
        let passed = results.iter().filter(|r| r.passed).count();
        let known_defects = results
            .iter()
            .flat_map(|r| &r.defects)
            .filter(|d| d.classification == Classification::KnownDefect)
            .count();
        Self {
            suite_name: suite_name.to_string(),
            total,
            passed,
            failed: total - passed,
            known_defects,
            duration_ms: None,
            results,
        }
    }

    pub fn with_duration(mut self, duration_ms: u128) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| JourneyError::Config(format!("serialize report: {}", e)))
    }
}
