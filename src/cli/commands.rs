use std::path::Path;
use std::sync::Arc;

use crate::browser::server::BrowserServerFactory;
use crate::cli::config::{JourneyConfig, ReportFormat};
use crate::error::Result;
use crate::flow::tolerance::{ExpectedDeviation, ToleranceTable};
use crate::report::console::format_console_report;
use crate::report::report_model::SuiteReport;
use crate::scenario::runner::ScenarioRunner;
use crate::scenario::scenario_model::load_scenarios;

// ============================================================================
// run subcommand
// ============================================================================

/// Run scenarios and return whether all passed.
pub async fn cmd_run(
    scenario_path: &str,
    config: &JourneyConfig,
    format: ReportFormat,
    output: Option<&str>,
) -> Result<bool> {
    let scenarios = load_scenarios(Path::new(scenario_path))?;

    if scenarios.is_empty() {
        eprintln!("No scenarios found at: {}", scenario_path);
        return Ok(true);
    }
    tracing::info!(count = scenarios.len(), base_url = %config.base_url, "running scenarios");

    let factory = Arc::new(BrowserServerFactory {
        node: config.browser.node_binary.clone(),
        script: config.browser.server_script.clone(),
    });
    let runner = ScenarioRunner::new(factory, &config.base_url, config.timeouts)
        .with_parallelism(config.parallel);

    let start = std::time::Instant::now();
    let results = runner.run_all(&scenarios).await;
    let duration = start.elapsed().as_millis();

    let report = SuiteReport::from_results(scenario_path, results).with_duration(duration);
    let all_passed = report.all_passed();

    let content = match format {
        ReportFormat::Json => report.to_json()?,
        ReportFormat::Console => format_console_report(&report),
    };

    match output {
        Some(path) => std::fs::write(path, &content)?,
        None => print!("{}", content),
    }

    Ok(all_passed)
}

// ============================================================================
// personas subcommand
// ============================================================================

pub fn cmd_personas() -> String {
    format_personas(&ToleranceTable::storefront())
}

pub fn format_personas(table: &ToleranceTable) -> String {
    let mut out = String::new();
    for (persona, deviation) in table.entries() {
        out.push_str(&format!("{:<26} {}\n", persona.username(), describe(deviation)));
    }
    out
}

// ============================================================================
// Helpers
// ============================================================================

/// One-line rule for a persona's tolerated deviation.
fn describe(deviation: &ExpectedDeviation) -> String {
    match deviation {
        ExpectedDeviation::None => "nominal".to_string(),
        ExpectedDeviation::LoginRefused { message } => format!("login refused with {:?}", message),
        ExpectedDeviation::IdenticalImages => "all catalog images identical".to_string(),
        ExpectedDeviation::SlowLogin { nominal_ms, outer_ms } => {
            format!("login in ({}ms, {}ms]", nominal_ms, outer_ms)
        }
        ExpectedDeviation::BrokenRemoveOrSort => "remove and/or sort fails".to_string(),
        ExpectedDeviation::VisualDifference => "visual drift from standard (lenient)".to_string(),
    }
}
