//! Telemetry classifiers.
//!
//! Stateless functions that turn a batch of captured telemetry lines into
//! structured [`ObservedEvent`]s: readiness detection, reboot detection, and
//! crash-log extraction. Matching is substring/regex based on purpose — the
//! device emits free-form human-readable log lines, and the harness must
//! tolerate whatever formatting (timestamps, log-level tags) surrounds the
//! indicators it looks for.
//!
//! All classifiers are pure: re-running one on the same batch yields the
//! same events, and no state is shared between invocations.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Substrings whose presence signals a subsystem finished initializing.
pub const READY_INDICATORS: [&str; 3] = [
    "System Monitor - Fully Initialized",
    "Crash handler initialized",
    "Crash log manager initialized",
];

/// Distinct readiness indicators required to declare the device operable.
///
/// A single indicator is insufficient evidence; the device may have printed
/// one banner and hung before the rest of its init path ran.
pub const MIN_READY_INDICATORS: usize = 2;

/// Boot-banner substrings characteristic of the device's boot ROM,
/// bootloader, and application loader.
const REBOOT_INDICATORS: [&str; 4] = [
    "ESP-ROM:esp32s3",
    "rst:0x",
    "ESP-IDF v5.5 2nd stage bootloader",
    "Loaded app from partition",
];

/// Substrings that mark an in-place logging self-test in the output.
const TEST_MARKERS: [&str; 3] = ["Test crash logged", "TEST:", "Manual crash test"];

/// Named crash-log pattern that matched a telemetry line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrashPattern {
    /// "Crash log manager initialized - N logs stored" (captures the count).
    InitCount,
    /// Generic storage activity ("logs stored" / "Storing crash log").
    Storage,
    /// "Test crash logged: <payload>" (captures the payload).
    TestLogged,
    /// "System recovered from crash: <payload>" (captures the payload).
    Recovery,
}

/// Ordered crash-log patterns, applied case-insensitively to every line.
static CRASH_PATTERNS: Lazy<Vec<(CrashPattern, Regex)>> = Lazy::new(|| {
    vec![
        (
            CrashPattern::InitCount,
            Regex::new(r"(?i)Crash log manager initialized - (\d+) logs stored").unwrap(),
        ),
        (
            CrashPattern::Storage,
            Regex::new(r"(?i)logs stored|Storing crash log").unwrap(),
        ),
        (
            CrashPattern::TestLogged,
            Regex::new(r"(?i)Test crash logged: (.+)").unwrap(),
        ),
        (
            CrashPattern::Recovery,
            Regex::new(r"(?i)System recovered from crash: (.+)").unwrap(),
        ),
    ]
});

/// Classification of a telemetry line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A readiness indicator was seen.
    Readiness,
    /// A boot banner was seen.
    Reboot,
    /// A crash-log pattern matched.
    CrashLogEntry(CrashPattern),
    /// A self-test marker was seen.
    TestLoggedMarker,
}

/// A classified fact extracted from telemetry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservedEvent {
    pub kind: EventKind,
    /// The raw line the event was extracted from.
    pub source_line: String,
    /// Capture-group payloads, empty for patterns without groups.
    pub captured: Vec<String>,
    pub observed_at: DateTime<Utc>,
}

impl ObservedEvent {
    fn new(kind: EventKind, source_line: &str, captured: Vec<String>) -> Self {
        Self {
            kind,
            source_line: source_line.to_string(),
            captured,
            observed_at: Utc::now(),
        }
    }
}

/// Distinct readiness indicators present anywhere in the batch.
///
/// Counts indicators, not occurrences: the same banner printed twice still
/// counts once.
pub fn ready_indicators_found(lines: &[String]) -> Vec<&'static str> {
    READY_INDICATORS
        .iter()
        .filter(|indicator| lines.iter().any(|line| line.contains(*indicator)))
        .copied()
        .collect()
}

/// Whether the batch shows enough evidence the device is fully operable.
pub fn readiness_confirmed(lines: &[String]) -> bool {
    ready_indicators_found(lines).len() >= MIN_READY_INDICATORS
}

/// Whether the batch contains a boot banner, i.e. the device restarted.
pub fn reboot_detected(lines: &[String]) -> bool {
    lines.iter().any(|line| {
        REBOOT_INDICATORS
            .iter()
            .any(|indicator| line.contains(indicator))
    })
}

/// Extract crash-log events from the batch.
///
/// Every pattern is tried against every line; a single line may match more
/// than one pattern and yields one event per match.
pub fn crash_log_events(lines: &[String]) -> Vec<ObservedEvent> {
    let mut events = Vec::new();
    for line in lines {
        for (pattern, regex) in CRASH_PATTERNS.iter() {
            if let Some(caps) = regex.captures(line) {
                let captured = caps
                    .iter()
                    .skip(1)
                    .flatten()
                    .map(|m| m.as_str().to_string())
                    .collect();
                events.push(ObservedEvent::new(
                    EventKind::CrashLogEntry(*pattern),
                    line,
                    captured,
                ));
            }
        }
    }
    events
}

/// Extract self-test marker events from the batch.
pub fn test_marker_events(lines: &[String]) -> Vec<ObservedEvent> {
    let mut events = Vec::new();
    for line in lines {
        if TEST_MARKERS.iter().any(|marker| line.contains(marker)) {
            events.push(ObservedEvent::new(
                EventKind::TestLoggedMarker,
                line,
                Vec::new(),
            ));
        }
    }
    events
}
