//! End-to-end scenarios for the test runner over the mock transport.
//!
//! Each scenario scripts the device side of a crash test: what the telemetry
//! stream shows during the observation window and, when a reboot occurred,
//! during the recovery window. Timing budgets are scaled down to tens of
//! milliseconds so the suite stays fast while exercising the same bounded
//! waits as a real run.

use crash_harness::catalog::{TestCatalog, TestDefinition, TestKind};
use crash_harness::config::TimingConfig;
use crash_harness::error::HarnessError;
use crash_harness::observer::RecordingObserver;
use crash_harness::port::MockTransport;
use crash_harness::runner::TestRunner;
use pretty_assertions::assert_eq;
use std::time::Duration;

const BOOT_BANNER: &[u8] = b"ESP-ROM:esp32s3-20210327\nrst:0x3 (RTC_SW_SYS_RST)\n";
const CRASH_STORED: &[u8] = b"I (310) crash_mgr: Storing crash log\n";
const READY_LINES: &[u8] =
    b"I (500) monitor: System Monitor - Fully Initialized\nI (510) crash: Crash handler initialized\n";

/// Timing budgets scaled for tests: observation windows live in the test
/// definitions, so only the runner-level budgets appear here.
fn fast_timing() -> TimingConfig {
    TimingConfig {
        poll_interval_ms: 1,
        quiescence_delay_ms: 10,
        recovery_budget_ms: 100,
        startup_budget_ms: 80,
        self_test_window_ms: 50,
    }
}

fn reboot_test(expect_reboot: bool) -> TestDefinition {
    TestDefinition {
        id: "null_pointer",
        name: "Null Pointer Dereference",
        description: "scenario fixture",
        command: "TEST_CRASH_NULL",
        kind: TestKind::Fault { expect_reboot },
        observation_timeout: Duration::from_millis(60),
    }
}

fn self_test() -> TestDefinition {
    TestDefinition {
        id: "soft_test",
        name: "Soft Test Crash",
        description: "scenario fixture",
        command: "TEST_CRASH_SOFT",
        kind: TestKind::SelfTest,
        observation_timeout: Duration::from_millis(60),
    }
}

fn runner_for<'a>(
    port: &MockTransport,
    observer: &'a RecordingObserver,
) -> TestRunner<'a, MockTransport> {
    runner_with_catalog(port, TestCatalog::standard(), observer)
}

fn runner_with_catalog<'a>(
    port: &MockTransport,
    catalog: TestCatalog,
    observer: &'a RecordingObserver,
) -> TestRunner<'a, MockTransport> {
    TestRunner::new(port.clone(), catalog, fast_timing(), observer)
}

/// Catalog with test-sized observation windows for suite-level scenarios.
fn fast_catalog() -> TestCatalog {
    TestCatalog::from_tests(vec![reboot_test(true), self_test()])
}

// ============================================================================
// Scenario A: expect-reboot test where the device crashes and recovers
// ============================================================================

#[test]
fn scenario_crash_reboot_and_recovery_passes() {
    // Arrange: boot banner and crash log arrive during the observation
    // window; two distinct readiness indicators during the recovery window.
    let port = MockTransport::new("MOCK0");
    port.feed_after(Duration::from_millis(10), BOOT_BANNER);
    port.feed_after(Duration::from_millis(15), CRASH_STORED);
    port.feed_after(Duration::from_millis(90), READY_LINES);
    let observer = RecordingObserver::new();

    // Act
    let outcome = runner_for(&port, &observer).run_test(&reboot_test(true));

    // Assert
    assert!(outcome.reboot_detected, "boot banner should be detected");
    assert!(outcome.crash_detected, "crash log should be detected");
    assert!(outcome.succeeded);
    assert_eq!(outcome.error, None);
    assert!(observer
        .statuses()
        .iter()
        .any(|s| s.contains("recovered successfully")));
}

// ============================================================================
// Scenario B: crash and reboot, but the device never comes back
// ============================================================================

#[test]
fn scenario_crash_without_recovery_fails() {
    let port = MockTransport::new("MOCK0");
    port.feed_after(Duration::from_millis(10), BOOT_BANNER);
    port.feed_after(Duration::from_millis(15), CRASH_STORED);
    // Nothing during the recovery window.
    let observer = RecordingObserver::new();

    let outcome = runner_for(&port, &observer).run_test(&reboot_test(true));

    assert!(outcome.reboot_detected);
    assert!(outcome.crash_detected);
    assert!(
        !outcome.succeeded,
        "reboot + crash must still fail when recovery is not confirmed"
    );
    assert_eq!(outcome.error, None, "unrecovered device is a failure, not a harness error");
}

// ============================================================================
// Scenario C: soft self-test, no command sent
// ============================================================================

#[test]
fn scenario_self_test_passes_on_marker_without_sending() {
    let port = MockTransport::new("MOCK0");
    port.feed_after(
        Duration::from_millis(10),
        b"I (200) crash_mgr: Test crash logged: manual\n",
    );
    let observer = RecordingObserver::new();

    let outcome = runner_for(&port, &observer).run_test(&self_test());

    assert!(outcome.succeeded);
    assert!(!outcome.reboot_detected, "reboot is never evaluated for the self-test");
    assert_eq!(
        port.write_log().len(),
        0,
        "self-test must not send any command"
    );
}

#[test]
fn scenario_self_test_fails_without_marker() {
    let port = MockTransport::new("MOCK0");
    port.feed_after(Duration::from_millis(10), b"I (200) wifi: connected\n");
    let observer = RecordingObserver::new();

    let outcome = runner_for(&port, &observer).run_test(&self_test());

    assert!(!outcome.succeeded);
    assert_eq!(outcome.error, None);
}

// ============================================================================
// Scenario D: no-reboot test that unexpectedly reboots
// ============================================================================

#[test]
fn scenario_unexpected_reboot_fails_despite_crash_log() {
    let port = MockTransport::new("MOCK0");
    port.feed_after(Duration::from_millis(10), CRASH_STORED);
    port.feed_after(Duration::from_millis(15), BOOT_BANNER);
    // Recovery completes, which must not rescue the verdict.
    port.feed_after(Duration::from_millis(90), READY_LINES);
    let observer = RecordingObserver::new();

    let outcome = runner_for(&port, &observer).run_test(&reboot_test(false));

    assert!(outcome.crash_detected);
    assert!(outcome.reboot_detected);
    assert!(!outcome.succeeded);
}

// ============================================================================
// Expect-reboot test where the device silently hangs
// ============================================================================

#[test]
fn scenario_silent_device_fails_without_harness_error() {
    let port = MockTransport::new("MOCK0");
    let observer = RecordingObserver::new();

    let outcome = runner_for(&port, &observer).run_test(&reboot_test(true));

    assert!(!outcome.succeeded);
    assert!(!outcome.crash_detected);
    assert!(!outcome.reboot_detected);
    assert_eq!(outcome.error, None);
}

// ============================================================================
// Suite-level sequencing
// ============================================================================

#[test]
fn suite_aborts_when_device_never_reports_ready() {
    let port = MockTransport::new("MOCK0");
    // One indicator is not enough evidence of readiness.
    port.feed_after(
        Duration::from_millis(10),
        b"I (500) crash: Crash handler initialized\n",
    );
    let observer = RecordingObserver::new();
    let mut runner = runner_with_catalog(&port, fast_catalog(), &observer);

    let result = runner.run_suite(&["null_pointer".to_string()]);

    assert!(matches!(result, Err(HarnessError::DeviceNotReady(_))));
    assert!(port.was_closed(), "transport must be released on the abort path");
    assert_eq!(port.write_log().len(), 0, "no test may run before readiness");
}

#[test]
fn suite_skips_unknown_ids_and_runs_known_tests() {
    let port = MockTransport::new("MOCK0");
    // Startup window [0, 80ms): readiness.
    port.feed_after(Duration::from_millis(10), READY_LINES);
    // Self-test window (~80-130ms): marker.
    port.feed_after(Duration::from_millis(100), b"Test crash logged: manual\n");
    let observer = RecordingObserver::new();
    let mut runner = runner_with_catalog(&port, fast_catalog(), &observer);

    let suite = runner
        .run_suite(&["soft_test".to_string(), "not_a_test".to_string()])
        .unwrap();

    assert_eq!(suite.totals.total, 1, "unknown id must be skipped, not failed");
    assert_eq!(suite.totals.passed, 1);
    assert!(suite.outcome("soft_test").is_some());
    assert!(suite.outcome("not_a_test").is_none());
    assert!(suite.ended_at.is_some());
    assert!(port.was_closed());
}

#[test]
fn suite_continues_past_a_send_failure() {
    let port = MockTransport::new("MOCK0");
    port.feed_after(Duration::from_millis(10), READY_LINES);
    // The first (fault) test's write fails; the suite must still run the
    // second test and produce both outcomes.
    port.fail_next_write();
    // Second test window: observation starts after the first test's
    // immediate error plus the quiescence delay (~90ms); give the marker
    // plenty of margin inside the 50ms self-test window.
    port.feed_after(Duration::from_millis(105), b"Test crash logged: manual\n");
    let observer = RecordingObserver::new();
    let mut runner = runner_with_catalog(&port, fast_catalog(), &observer);

    let suite = runner
        .run_suite(&["null_pointer".to_string(), "soft_test".to_string()])
        .unwrap();

    assert_eq!(suite.totals.total, 2);
    assert_eq!(suite.totals.errored, 1);
    assert_eq!(suite.totals.passed, 1);

    let errored = suite.outcome("null_pointer").unwrap();
    assert!(errored.error.as_deref().unwrap().contains("TEST_CRASH_NULL"));
    assert!(!errored.succeeded);
}

#[test]
fn suite_totals_always_balance() {
    let port = MockTransport::new("MOCK0");
    port.feed_after(Duration::from_millis(10), READY_LINES);
    let observer = RecordingObserver::new();
    let mut runner = runner_with_catalog(&port, fast_catalog(), &observer);

    // Both tests run against a silent device: one fault test (fails) and
    // one self-test (fails), no errors.
    let suite = runner
        .run_suite(&["null_pointer".to_string(), "soft_test".to_string()])
        .unwrap();

    assert_eq!(
        suite.totals.passed + suite.totals.failed + suite.totals.errored,
        suite.totals.total
    );
    assert_eq!(suite.totals.total, suite.outcomes().len());
    for outcome in suite.outcomes() {
        if outcome.error.is_some() {
            assert!(!outcome.succeeded);
        }
    }
}
