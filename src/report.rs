//! Result aggregation and reporting.
//!
//! [`TestOutcome`] is the per-test record the runner builds as a test moves
//! through its phases; [`SuiteOutcome`] folds completed outcomes into suite
//! totals in a single pass. Rendering and persistence are pure projections
//! of a finalized `SuiteOutcome` — they never re-classify telemetry or
//! touch the transport.

use crate::catalog::TestCatalog;
use crate::classify::ObservedEvent;
use crate::config::ReportConfig;
use crate::error::HarnessError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::Path;

/// Outcome of one executed test.
///
/// Created zero-valued when the test starts, mutated while the test runs,
/// frozen when it completes, and moved into the suite outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestOutcome {
    pub test_id: String,
    pub succeeded: bool,
    pub crash_detected: bool,
    pub reboot_detected: bool,
    /// Crash-log events captured during the observation window, in order.
    pub crash_log_events: Vec<ObservedEvent>,
    pub duration_secs: f64,
    /// Set only when the harness itself failed mid-test; an unexpected
    /// device behavior is a plain failure with no error.
    pub error: Option<String>,
}

impl TestOutcome {
    /// Zero-valued outcome for a test that is about to run.
    pub fn pending(test_id: &str) -> Self {
        Self {
            test_id: test_id.to_string(),
            succeeded: false,
            crash_detected: false,
            reboot_detected: false,
            crash_log_events: Vec::new(),
            duration_secs: 0.0,
            error: None,
        }
    }

    /// Whether this outcome counts as an error rather than a pass/fail.
    pub fn errored(&self) -> bool {
        self.error.is_some()
    }
}

/// Suite-level counters, maintained by a one-pass fold over outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub errored: usize,
}

/// Aggregated result of a suite run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteOutcome {
    /// Per-test outcomes in execution order.
    outcomes: Vec<TestOutcome>,
    pub totals: Totals,
    pub started_at: DateTime<Utc>,
    /// Set exactly once when the suite ends, including on early termination.
    pub ended_at: Option<DateTime<Utc>>,
}

impl SuiteOutcome {
    /// Start an empty suite outcome.
    pub fn begin() -> Self {
        Self {
            outcomes: Vec::new(),
            totals: Totals::default(),
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    /// Fold one completed outcome into the totals.
    ///
    /// An outcome with an error is counted as errored even if `succeeded`
    /// were set; an errored test is never a pass.
    pub fn record(&mut self, outcome: TestOutcome) {
        self.totals.total += 1;
        if outcome.errored() {
            self.totals.errored += 1;
        } else if outcome.succeeded {
            self.totals.passed += 1;
        } else {
            self.totals.failed += 1;
        }
        self.outcomes.push(outcome);
    }

    /// Mark the suite as ended.
    pub fn finalize(&mut self) {
        self.ended_at = Some(Utc::now());
    }

    /// Outcomes in execution order.
    pub fn outcomes(&self) -> &[TestOutcome] {
        &self.outcomes
    }

    /// Look up an outcome by test id.
    pub fn outcome(&self, test_id: &str) -> Option<&TestOutcome> {
        self.outcomes.iter().find(|o| o.test_id == test_id)
    }

    /// Percentage of tests passed, 0.0 for an empty suite.
    pub fn success_rate(&self) -> f64 {
        if self.totals.total == 0 {
            return 0.0;
        }
        self.totals.passed as f64 / self.totals.total as f64 * 100.0
    }

    /// Wall-clock duration of the suite in seconds.
    pub fn duration_secs(&self) -> f64 {
        let end = self.ended_at.unwrap_or(self.started_at);
        (end - self.started_at).num_milliseconds() as f64 / 1000.0
    }
}

/// Coarse qualitative band for a success rate.
pub fn quality_band(success_rate: f64, report: &ReportConfig) -> &'static str {
    if success_rate >= report.excellent_pct {
        "EXCELLENT - Crash logging system working well"
    } else if success_rate >= report.good_pct {
        "GOOD - Crash logging mostly functional"
    } else if success_rate >= report.fair_pct {
        "FAIR - Some crash logging issues detected"
    } else {
        "POOR - Significant crash logging problems"
    }
}

/// Render the human-readable suite summary.
pub fn render_summary(suite: &SuiteOutcome, catalog: &TestCatalog, report: &ReportConfig) -> String {
    let mut out = String::new();
    let rule = "=".repeat(60);

    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "CRASH TEST SUITE SUMMARY");
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "Total duration: {:.1} seconds", suite.duration_secs());
    let _ = writeln!(out, "Tests run: {}", suite.totals.total);
    let _ = writeln!(out, "Passed:    {}", suite.totals.passed);
    let _ = writeln!(out, "Failed:    {}", suite.totals.failed);
    let _ = writeln!(out, "Errors:    {}", suite.totals.errored);
    let _ = writeln!(out, "Success rate: {:.1}%", suite.success_rate());

    let _ = writeln!(out, "\nIndividual test results:");
    let _ = writeln!(out, "{}", "-".repeat(40));

    for outcome in suite.outcomes() {
        let name = catalog
            .get(&outcome.test_id)
            .map(|d| d.name)
            .unwrap_or(outcome.test_id.as_str());

        let status = match &outcome.error {
            Some(e) => format!("ERROR: {e}"),
            None if outcome.succeeded => "PASS".to_string(),
            None => "FAIL".to_string(),
        };
        let _ = writeln!(out, "{name:<25} {status}");

        if outcome.succeeded && !outcome.errored() {
            let mut details = Vec::new();
            if outcome.crash_detected {
                details.push("crash detected");
            }
            if outcome.reboot_detected {
                details.push("reboot detected");
            }
            if !details.is_empty() {
                let _ = writeln!(out, "{:>27} {}", "", details.join(", "));
            }
        }
    }

    let _ = writeln!(
        out,
        "\nCrash log manager assessment: {}",
        quality_band(suite.success_rate(), report)
    );

    out
}

/// Default artifact filename, timestamped to the second.
pub fn default_results_filename(now: DateTime<Utc>) -> String {
    format!("crash_test_results_{}.json", now.format("%Y%m%d_%H%M%S"))
}

/// Persist the full suite outcome as pretty-printed JSON.
pub fn save_results(suite: &SuiteOutcome, path: &Path) -> Result<(), HarnessError> {
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(file, suite)?;
    Ok(())
}
