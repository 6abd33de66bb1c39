//! Harness-level error handling.
//!
//! Distinguishes suite-fatal conditions (connection and readiness failures
//! before any test runs) from per-test failures, which are captured in the
//! test's outcome and never propagate.

use crate::config::ConfigError;
use crate::port::PortError;
use std::time::Duration;
use thiserror::Error;

/// Unified harness error type.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Opening the device connection failed. Fatal to the whole suite.
    #[error("Failed to connect to {port}: {source}")]
    Connect {
        port: String,
        #[source]
        source: PortError,
    },

    /// The device did not report readiness within the startup budget.
    /// Fatal to the whole suite.
    #[error("Device not ready within {0:?}")]
    DeviceNotReady(Duration),

    /// Sending a trigger command failed. Fatal to the current test only.
    #[error("Failed to send command {command:?}: {source}")]
    CommandSend {
        command: String,
        #[source]
        source: PortError,
    },

    /// A transport error outside the read loop's recovery scope.
    #[error(transparent)]
    Port(#[from] PortError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
