//! Configuration module for the crash-test harness.
//!
//! TOML-based configuration covering the serial connection, the timing
//! budgets that bound every wait in the harness, and the reporting
//! thresholds.
//!
//! # Configuration Resolution
//!
//! Configuration is loaded from the following locations (in order of
//! priority):
//!
//! 1. `CRASH_HARNESS_CONFIG` environment variable (explicit path)
//! 2. `./crash-harness.toml` (current directory)
//! 3. `~/.config/crash-harness/crash-harness.toml` (platform config dir)
//! 4. Built-in defaults (no file required)
//!
//! # Example
//!
//! ```toml
//! [serial]
//! port = "/dev/ttyUSB0"
//! baud = 115200
//!
//! [timing]
//! recovery_budget_ms = 30000
//!
//! [report]
//! pass_threshold_pct = 50.0
//! ```

mod error;
mod loader;
mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{resolve_config_path, ConfigLoader};
pub use schema::{Config, ReportConfig, SerialConfig, TimingConfig};
