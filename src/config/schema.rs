//! Configuration schema definitions.
//!
//! All tunable constants of the harness live here with their production
//! defaults: serial connection parameters, the timing budgets that bound
//! every wait, and the reporting thresholds. The success-rate thresholds
//! are presentation heuristics carried over from long use of this suite;
//! they are configuration, not policy baked into the reporter.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Serial connection settings
    pub serial: SerialConfig,
    /// Timing budgets for every bounded wait
    pub timing: TimingConfig,
    /// Reporting thresholds
    pub report: ReportConfig,
}

/// Serial connection section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Port the device is attached to (e.g. "/dev/ttyUSB0" or "COM3")
    pub port: Option<String>,
    /// Baud rate
    pub baud: u32,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: None,
            baud: 115_200,
        }
    }
}

/// Timing section. Every wait in the harness is bounded by one of these.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Line-reader poll interval in milliseconds
    pub poll_interval_ms: u64,
    /// Settle delay between sequential tests in milliseconds
    pub quiescence_delay_ms: u64,
    /// Budget for reconfirming readiness after a reboot, in milliseconds
    pub recovery_budget_ms: u64,
    /// Budget for initial readiness before the first test, in milliseconds
    pub startup_budget_ms: u64,
    /// Observation window for the logging self-test, in milliseconds
    pub self_test_window_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1,
            quiescence_delay_ms: 5_000,
            recovery_budget_ms: 30_000,
            startup_budget_ms: 60_000,
            self_test_window_ms: 5_000,
        }
    }
}

impl TimingConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn quiescence_delay(&self) -> Duration {
        Duration::from_millis(self.quiescence_delay_ms)
    }

    pub fn recovery_budget(&self) -> Duration {
        Duration::from_millis(self.recovery_budget_ms)
    }

    pub fn startup_budget(&self) -> Duration {
        Duration::from_millis(self.startup_budget_ms)
    }

    pub fn self_test_window(&self) -> Duration {
        Duration::from_millis(self.self_test_window_ms)
    }
}

/// Reporting thresholds, all in percent of tests passed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Minimum success rate for a zero exit code
    pub pass_threshold_pct: f64,
    /// Lower bound of the "excellent" band
    pub excellent_pct: f64,
    /// Lower bound of the "good" band
    pub good_pct: f64,
    /// Lower bound of the "fair" band
    pub fair_pct: f64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            pass_threshold_pct: 50.0,
            excellent_pct: 80.0,
            good_pct: 60.0,
            fair_pct: 40.0,
        }
    }
}
