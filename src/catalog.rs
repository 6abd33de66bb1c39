//! Fixed catalog of crash tests.
//!
//! One [`TestDefinition`] per fault type, built once at startup and treated
//! as a read-only lookup table for the rest of the run. The evaluation
//! policy is dispatched on [`TestKind`] rather than on test ids, so a new
//! kind of test with its own policy does not touch the sequencing loop.

use std::time::Duration;

/// How a test is executed and judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestKind {
    /// Ordinary fault-injection test: send the trigger command, observe,
    /// then evaluate against the reboot expectation.
    Fault {
        /// Whether triggering this fault is expected to reset the device.
        expect_reboot: bool,
    },
    /// In-place logging self-test: never sends a command; observes a short
    /// fixed window and passes purely on a test-marker event.
    SelfTest,
}

/// Immutable definition of one crash test.
#[derive(Debug, Clone)]
pub struct TestDefinition {
    /// Unique key, used on the command line and in reports.
    pub id: &'static str,
    /// Human-readable name for summaries.
    pub name: &'static str,
    pub description: &'static str,
    /// Trigger command text. Kept for display even on the self-test, which
    /// never sends it.
    pub command: &'static str,
    pub kind: TestKind,
    /// Wall-clock budget for the observation window.
    pub observation_timeout: Duration,
}

impl TestDefinition {
    /// Whether this test expects the device to reset.
    pub fn expects_reboot(&self) -> bool {
        matches!(self.kind, TestKind::Fault { expect_reboot: true })
    }
}

/// Read-only table of all known crash tests, in execution order.
#[derive(Debug, Clone)]
pub struct TestCatalog {
    tests: Vec<TestDefinition>,
}

impl TestCatalog {
    /// The standard catalog covering the device's crash-trigger commands.
    pub fn standard() -> Self {
        let tests = vec![
            TestDefinition {
                id: "soft_test",
                name: "Soft Test Crash",
                description: "Tests logging without an actual crash",
                command: "TEST_CRASH_SOFT",
                kind: TestKind::SelfTest,
                observation_timeout: Duration::from_secs(10),
            },
            TestDefinition {
                id: "null_pointer",
                name: "Null Pointer Dereference",
                description: "Triggers a null pointer access violation",
                command: "TEST_CRASH_NULL",
                kind: TestKind::Fault { expect_reboot: true },
                observation_timeout: Duration::from_secs(15),
            },
            TestDefinition {
                id: "stack_overflow",
                name: "Stack Overflow",
                description: "Triggers stack overflow through recursion",
                command: "TEST_CRASH_STACK",
                kind: TestKind::Fault { expect_reboot: true },
                observation_timeout: Duration::from_secs(15),
            },
            TestDefinition {
                id: "heap_corruption",
                name: "Heap Corruption",
                description: "Triggers heap corruption detection",
                command: "TEST_CRASH_HEAP",
                kind: TestKind::Fault { expect_reboot: true },
                observation_timeout: Duration::from_secs(15),
            },
            TestDefinition {
                id: "assert_fail",
                name: "Assertion Failure",
                description: "Triggers an assertion failure",
                command: "TEST_CRASH_ASSERT",
                kind: TestKind::Fault { expect_reboot: true },
                observation_timeout: Duration::from_secs(15),
            },
            TestDefinition {
                id: "watchdog",
                name: "Watchdog Timeout",
                description: "Triggers a watchdog timeout",
                command: "TEST_CRASH_WATCHDOG",
                kind: TestKind::Fault { expect_reboot: true },
                observation_timeout: Duration::from_secs(30),
            },
        ];
        Self { tests }
    }

    /// Build a catalog from explicit definitions.
    ///
    /// Mostly useful in tests that need shortened observation windows.
    pub fn from_tests(tests: Vec<TestDefinition>) -> Self {
        Self { tests }
    }

    /// Look up a definition by id.
    pub fn get(&self, id: &str) -> Option<&TestDefinition> {
        self.tests.iter().find(|t| t.id == id)
    }

    /// All test ids in execution order.
    pub fn ids(&self) -> Vec<&'static str> {
        self.tests.iter().map(|t| t.id).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TestDefinition> {
        self.tests.iter()
    }

    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }
}
