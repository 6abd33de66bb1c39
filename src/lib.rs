//! Crash-Test Harness Library
//!
//! Hardware-in-the-loop harness for validating a device's crash-logging
//! subsystem over a serial link. The harness injects fault-trigger commands,
//! observes the device's free-form textual telemetry, classifies what it
//! sees (crash logged, reboot, recovery), and aggregates the results into a
//! pass/fail report. All observation is line-oriented text; there is no
//! structured protocol to speak.
//!
//! # Modules
//!
//! - `catalog`: fixed table of crash tests and their trigger commands
//! - `classify`: telemetry classifiers (readiness, reboot, crash-log)
//! - `config`: TOML configuration with timing budgets and report thresholds
//! - `error`: unified harness error handling
//! - `observer`: injected sink for telemetry lines and progress messages
//! - `port`: transport abstraction over the serial connection
//! - `reader`: bounded-window line reader
//! - `report`: outcome aggregation, summary rendering, JSON persistence
//! - `runner`: per-test state machine and suite sequencing

pub mod catalog;
pub mod classify;
pub mod config;
pub mod error;
pub mod observer;
pub mod port;
pub mod reader;
pub mod report;
pub mod runner;

// Re-export commonly used types for convenience
pub use catalog::{TestCatalog, TestDefinition, TestKind};
pub use classify::{CrashPattern, EventKind, ObservedEvent};
pub use config::{Config, ConfigError, ConfigLoader, ConfigResult, ReportConfig, TimingConfig};
pub use error::HarnessError;
pub use observer::{HarnessObserver, RecordingObserver, TracingObserver};
pub use port::{MockTransport, PortError, SerialTransport, SyncSerialPort};
pub use reader::LineReader;
pub use report::{SuiteOutcome, TestOutcome, Totals};
pub use runner::TestRunner;
