//! Bounded-window line reader.
//!
//! Converts the raw byte stream from the transport into complete text lines
//! within a wall-clock budget. The reader owns the only polling loop in the
//! harness: it checks the transport's available-byte count on a short fixed
//! interval, drains whatever arrived, and splits on newline boundaries,
//! keeping any trailing partial line as carry-over for the next poll.
//!
//! The budget is honored exactly: the reader never returns early because
//! data arrived, and never errors because none did. Transient transport read
//! errors are logged and treated as an empty poll, so an I/O hiccup cannot
//! abort a test mid-observation.

use crate::observer::HarnessObserver;
use crate::port::SerialTransport;
use chrono::Utc;
use std::time::{Duration, Instant};
use tracing::warn;

/// Line reader with a fixed poll interval.
#[derive(Debug, Clone)]
pub struct LineReader {
    poll_interval: Duration,
}

impl LineReader {
    pub fn new(poll_interval: Duration) -> Self {
        Self { poll_interval }
    }

    /// Collect complete lines from `port` for exactly `budget` of wall-clock
    /// time.
    ///
    /// Each completed line is trimmed of surrounding whitespace; empty lines
    /// are discarded. Lines are surfaced through `observer` the moment they
    /// are captured, independent of any later classification. An empty
    /// result is valid; it means the device said nothing in the window.
    pub fn read_lines(
        &self,
        port: &mut dyn SerialTransport,
        budget: Duration,
        observer: &dyn HarnessObserver,
    ) -> Vec<String> {
        let deadline = Instant::now() + budget;
        let mut carry: Vec<u8> = Vec::new();
        let mut lines = Vec::new();

        while Instant::now() < deadline {
            match self.poll_once(port) {
                Ok(chunk) if !chunk.is_empty() => {
                    carry.extend_from_slice(&chunk);
                    self.drain_complete_lines(&mut carry, &mut lines, observer);
                }
                Ok(_) => {}
                Err(e) => {
                    // Transient fault: treat as no data this poll.
                    warn!("Error reading from {}: {}", port.name(), e);
                }
            }
            std::thread::sleep(self.poll_interval);
        }

        lines
    }

    fn poll_once(&self, port: &mut dyn SerialTransport) -> Result<Vec<u8>, crate::port::PortError> {
        if port.bytes_to_read()? == 0 {
            return Ok(Vec::new());
        }
        port.read_available()
    }

    fn drain_complete_lines(
        &self,
        carry: &mut Vec<u8>,
        lines: &mut Vec<String>,
        observer: &dyn HarnessObserver,
    ) {
        while let Some(pos) = memchr::memchr(b'\n', carry) {
            let raw: Vec<u8> = carry.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw[..raw.len() - 1])
                .trim()
                .to_string();
            if !line.is_empty() {
                observer.on_line(&line, Utc::now());
                lines.push(line);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::RecordingObserver;
    use crate::port::MockTransport;

    fn reader() -> LineReader {
        LineReader::new(Duration::from_millis(1))
    }

    #[test]
    fn test_splits_and_trims_lines() {
        let port = MockTransport::new("MOCK0");
        port.feed(b"  one \r\ntwo\n\n\nthree\n");
        let observer = RecordingObserver::new();

        let mut handle = port.clone();
        let lines = reader().read_lines(&mut handle, Duration::from_millis(20), &observer);

        assert_eq!(lines, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_partial_line_carries_over_between_polls() {
        let port = MockTransport::new("MOCK0");
        port.feed(b"Storing cra");
        port.feed_after(Duration::from_millis(10), b"sh log\n");
        let observer = RecordingObserver::new();

        let mut handle = port.clone();
        let lines = reader().read_lines(&mut handle, Duration::from_millis(40), &observer);

        assert_eq!(lines, vec!["Storing crash log"]);
    }

    #[test]
    fn test_trailing_partial_line_is_dropped() {
        let port = MockTransport::new("MOCK0");
        port.feed(b"complete\nincomplete without newline");
        let observer = RecordingObserver::new();

        let mut handle = port.clone();
        let lines = reader().read_lines(&mut handle, Duration::from_millis(20), &observer);

        assert_eq!(lines, vec!["complete"]);
    }

    #[test]
    fn test_waits_full_budget_with_no_data() {
        let mut port = MockTransport::new("MOCK0");
        let observer = RecordingObserver::new();
        let budget = Duration::from_millis(30);

        let start = Instant::now();
        let lines = reader().read_lines(&mut port, budget, &observer);

        assert!(lines.is_empty());
        assert!(
            start.elapsed() >= budget,
            "returned after {:?}, budget was {:?}",
            start.elapsed(),
            budget
        );
    }

    #[test]
    fn test_waits_full_budget_even_when_data_arrives_early() {
        let port = MockTransport::new("MOCK0");
        port.feed(b"early\n");
        let observer = RecordingObserver::new();
        let budget = Duration::from_millis(30);

        let mut handle = port.clone();
        let start = Instant::now();
        let lines = reader().read_lines(&mut handle, budget, &observer);

        assert_eq!(lines, vec!["early"]);
        assert!(start.elapsed() >= budget);
    }

    #[test]
    fn test_read_errors_do_not_abort_the_window() {
        let port = MockTransport::new("MOCK0");
        port.feed(b"before\n");
        port.fail_reads(3);
        port.feed_after(Duration::from_millis(15), b"after\n");
        let observer = RecordingObserver::new();

        let mut handle = port.clone();
        let lines = reader().read_lines(&mut handle, Duration::from_millis(40), &observer);

        assert_eq!(lines, vec!["before", "after"]);
    }

    #[test]
    fn test_lines_are_surfaced_to_observer_as_captured() {
        let port = MockTransport::new("MOCK0");
        port.feed(b"alpha\nbeta\n");
        let observer = RecordingObserver::new();

        let mut handle = port.clone();
        reader().read_lines(&mut handle, Duration::from_millis(20), &observer);

        assert_eq!(observer.lines(), vec!["alpha", "beta"]);
    }
}
