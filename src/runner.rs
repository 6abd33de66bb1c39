//! Test orchestration.
//!
//! [`TestRunner`] owns the transport for the duration of a suite and drives
//! each test through its phases: send the trigger command, observe telemetry
//! for the test's window, classify what was captured, and — when a reboot
//! was seen — wait for the device to report readiness again before judging
//! the test.
//!
//! Tests run strictly sequentially; the device is a single shared resource
//! and there is no parallelism to manage. Every wait is wall-clock bounded.
//! A harness failure mid-test is caught at the test boundary and recorded in
//! that test's outcome; it never aborts the rest of the suite.

use crate::catalog::{TestCatalog, TestDefinition, TestKind};
use crate::classify;
use crate::config::TimingConfig;
use crate::error::HarnessError;
use crate::observer::HarnessObserver;
use crate::port::SerialTransport;
use crate::reader::LineReader;
use crate::report::{SuiteOutcome, TestOutcome};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Sequences crash tests against a device over one transport.
///
/// The runner owns the transport exclusively for the suite's duration and
/// closes it on every exit path of [`run_suite`], including the startup
/// abort path.
///
/// [`run_suite`]: TestRunner::run_suite
pub struct TestRunner<'a, T: SerialTransport> {
    transport: T,
    reader: LineReader,
    catalog: TestCatalog,
    timing: TimingConfig,
    observer: &'a dyn HarnessObserver,
}

impl<'a, T: SerialTransport> TestRunner<'a, T> {
    pub fn new(
        transport: T,
        catalog: TestCatalog,
        timing: TimingConfig,
        observer: &'a dyn HarnessObserver,
    ) -> Self {
        let reader = LineReader::new(timing.poll_interval());
        Self {
            transport,
            reader,
            catalog,
            timing,
            observer,
        }
    }

    /// Run the requested tests in order and aggregate their outcomes.
    ///
    /// Before the first test the device must confirm readiness within the
    /// startup budget; otherwise the suite aborts with
    /// [`HarnessError::DeviceNotReady`] and no per-test outcomes. Unknown
    /// test ids are skipped with a warning, not treated as failures. A fixed
    /// quiescence delay separates consecutive tests so the device settles.
    pub fn run_suite(&mut self, test_ids: &[String]) -> Result<SuiteOutcome, HarnessError> {
        let result = self.run_suite_inner(test_ids);
        if let Err(e) = self.transport.close() {
            debug!("Error closing {}: {}", self.transport.name(), e);
        }
        result
    }

    fn run_suite_inner(&mut self, test_ids: &[String]) -> Result<SuiteOutcome, HarnessError> {
        if let Err(e) = self.transport.clear_buffers() {
            warn!("Could not clear transport buffers: {}", e);
        }

        self.observer.on_status("Waiting for system initialization...");
        let startup_budget = self.timing.startup_budget();
        let lines = self
            .reader
            .read_lines(&mut self.transport, startup_budget, self.observer);
        if !classify::readiness_confirmed(&lines) {
            let found = classify::ready_indicators_found(&lines).len();
            warn!("System not ready (only {} indicators found)", found);
            return Err(HarnessError::DeviceNotReady(startup_budget));
        }
        self.observer.on_status("System ready");

        let selected: Vec<TestDefinition> = test_ids
            .iter()
            .filter_map(|id| match self.catalog.get(id) {
                Some(def) => Some(def.clone()),
                None => {
                    warn!("Skipping unknown test: {}", id);
                    None
                }
            })
            .collect();

        let mut suite = SuiteOutcome::begin();
        for (index, def) in selected.iter().enumerate() {
            info!("Running crash test: {} ({})", def.name, def.description);
            let outcome = self.run_test(def);

            let verdict = match (&outcome.error, outcome.succeeded) {
                (Some(e), _) => format!("Test errored: {e}"),
                (None, true) => "Test passed".to_string(),
                (None, false) => "Test failed".to_string(),
            };
            self.observer.on_status(&verdict);
            suite.record(outcome);

            if index + 1 < selected.len() {
                let delay = self.timing.quiescence_delay();
                self.observer
                    .on_status(&format!("Waiting {:.0?} before next test...", delay));
                std::thread::sleep(delay);
            }
        }

        suite.finalize();
        Ok(suite)
    }

    /// Run a single test, always producing an outcome.
    ///
    /// This is the test boundary: any harness error inside the phases is
    /// converted into the outcome's `error` field here.
    pub fn run_test(&mut self, def: &TestDefinition) -> TestOutcome {
        let started = Instant::now();
        let mut outcome = TestOutcome::pending(def.id);

        if let Err(e) = self.execute_phases(def, &mut outcome) {
            outcome.error = Some(e.to_string());
            outcome.succeeded = false;
        }

        outcome.duration_secs = started.elapsed().as_secs_f64();
        outcome
    }

    fn execute_phases(
        &mut self,
        def: &TestDefinition,
        outcome: &mut TestOutcome,
    ) -> Result<(), HarnessError> {
        match def.kind {
            TestKind::SelfTest => self.run_self_test(outcome),
            TestKind::Fault { expect_reboot } => self.run_fault_test(def, expect_reboot, outcome),
        }
    }

    /// Soft self-test: no command, short observation, marker-only success.
    fn run_self_test(&mut self, outcome: &mut TestOutcome) -> Result<(), HarnessError> {
        self.observer.on_status("Testing in-place crash logging...");
        let window = self.timing.self_test_window();
        let lines = self
            .reader
            .read_lines(&mut self.transport, window, self.observer);

        let markers = classify::test_marker_events(&lines);
        outcome.succeeded = !markers.is_empty();
        outcome.crash_log_events = markers;
        Ok(())
    }

    fn run_fault_test(
        &mut self,
        def: &TestDefinition,
        expect_reboot: bool,
        outcome: &mut TestOutcome,
    ) -> Result<(), HarnessError> {
        // CommandSent: a send failure ends the test with no observation.
        self.transport
            .write_line(def.command)
            .map_err(|source| HarnessError::CommandSend {
                command: def.command.to_string(),
                source,
            })?;
        self.observer
            .on_status(&format!("Sent command: {}", def.command));

        // Observing
        self.observer.on_status(&format!(
            "Monitoring for {:.0?}...",
            def.observation_timeout
        ));
        let lines =
            self.reader
                .read_lines(&mut self.transport, def.observation_timeout, self.observer);

        outcome.reboot_detected = classify::reboot_detected(&lines);
        outcome.crash_log_events = classify::crash_log_events(&lines);
        outcome.crash_detected = !outcome.crash_log_events.is_empty();

        outcome.succeeded = if expect_reboot {
            outcome.reboot_detected && outcome.crash_detected
        } else {
            // An unexpected reboot is a failure even if the crash was logged.
            outcome.crash_detected && !outcome.reboot_detected
        };

        // RebootWait: a device that crashes but never comes back is a failure
        // regardless of what the observation window showed.
        if outcome.reboot_detected {
            self.observer
                .on_status("System rebooted, waiting for recovery...");
            let recovery = self.reader.read_lines(
                &mut self.transport,
                self.timing.recovery_budget(),
                self.observer,
            );
            if classify::readiness_confirmed(&recovery) {
                self.observer.on_status("System recovered successfully");
            } else {
                self.observer.on_status("System recovery incomplete");
                outcome.succeeded = false;
            }
        }

        Ok(())
    }
}
