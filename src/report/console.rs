use crate::flow::tolerance::Classification;
use crate::report::report_model::SuiteReport;
use crate::scenario::scenario_model::{ScenarioResult, StepFailure};

// ============================================================================
// Console reporter: formatted terminal output
// ============================================================================

/// Format a suite report for terminal output.
///
/// ```text
/// === Suite: scenarios ===
///
/// ✓ PASS  checkout two items (6 steps, 412ms)
/// ✓ PASS  problem user images (2 steps, 220ms)
///     [DEFECT] Step 1: problem_user known defect: all 6 images share one asset
/// ✗ FAIL  empty password (3 steps, 130ms)
///     [FAIL] Step 2 expect_login_error: assertion in login error message
///            expected "Epic sadface: Password is required", got "..."
///
/// === Results: 2 passed, 1 failed (3 total), 1 known defect in 0.8s ===
/// ```
pub fn format_console_report(report: &SuiteReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== Suite: {} ===\n\n", report.suite_name));

    for result in &report.results {
        push_scenario(&mut out, result);
    }

    out.push_str(&format!(
        "\n=== Results: {} passed, {} failed ({} total)",
        report.passed, report.failed, report.total
    ));
    if report.known_defects > 0 {
        let noun = if report.known_defects == 1 {
            "known defect"
        } else {
            "known defects"
        };
        out.push_str(&format!(", {} {}", report.known_defects, noun));
    }
    if let Some(ms) = report.duration_ms {
        out.push_str(&format!(" in {:.1}s", ms as f64 / 1000.0));
    }
    out.push_str(" ===\n");

    out
}

// ============================================================================
// Helpers
// ============================================================================

/// One headline per scenario, then its known defects and its failure, if any.
fn push_scenario(out: &mut String, result: &ScenarioResult) {
    let marker = if result.passed {
        "\u{2713} PASS"
    } else {
        "\u{2717} FAIL"
    };
    out.push_str(&format!(
        "{}  {} ({} steps, {}ms)\n",
        marker, result.scenario_name, result.steps_run, result.duration_ms
    ));

    for defect in &result.defects {
        if defect.classification == Classification::KnownDefect {
            out.push_str(&format!(
                "    [DEFECT] Step {}: {} {}: {}\n",
                defect.step_index, defect.persona, defect.classification, defect.detail
            ));
        }
    }

    if let Some(ref failure) = result.failure {
        push_failure(out, failure);
    }
}

fn push_failure(out: &mut String, failure: &StepFailure) {
    let step = failure
        .step_index
        .map(|i| format!("Step {} ", i))
        .unwrap_or_default();
    let operation = failure.operation.as_deref().unwrap_or("-");
    out.push_str(&format!(
        "    [FAIL] {}{}: {} in {}\n",
        step, failure.action, failure.kind, operation
    ));
    match (&failure.expected, &failure.actual) {
        (Some(expected), Some(actual)) => out.push_str(&format!(
            "           expected {}, got {}\n",
            expected, actual
        )),
        _ => out.push_str(&format!("           {}\n", failure.message)),
    }
}
