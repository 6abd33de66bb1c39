//! Observer interface for harness telemetry and progress.
//!
//! The line reader and test runner report through a single injected sink
//! instead of printing ad hoc, so tests can assert on emitted events without
//! capturing process output.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

/// Sink for captured telemetry lines and harness progress messages.
pub trait HarnessObserver: Send + Sync {
    /// A telemetry line was captured, tagged with its capture timestamp.
    ///
    /// Called the moment the line reader completes a line, before any
    /// classification happens.
    fn on_line(&self, line: &str, at: DateTime<Utc>);

    /// A harness progress message (command sent, waiting for recovery, ...).
    fn on_status(&self, message: &str);
}

/// Default observer that forwards everything to `tracing`.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl HarnessObserver for TracingObserver {
    fn on_line(&self, line: &str, at: DateTime<Utc>) {
        tracing::info!(target: "telemetry", "[{}] {}", at.format("%H:%M:%S%.3f"), line);
    }

    fn on_status(&self, message: &str) {
        tracing::info!("{}", message);
    }
}

/// Observer that records everything it sees, for tests.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    lines: Mutex<Vec<String>>,
    statuses: Mutex<Vec<String>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// All telemetry lines seen so far, in capture order.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    /// All progress messages seen so far.
    pub fn statuses(&self) -> Vec<String> {
        self.statuses.lock().clone()
    }
}

impl HarnessObserver for RecordingObserver {
    fn on_line(&self, line: &str, _at: DateTime<Utc>) {
        self.lines.lock().push(line.to_string());
    }

    fn on_status(&self, message: &str) {
        self.statuses.lock().push(message.to_string());
    }
}
