//! Mock transport implementation for testing.
//!
//! Provides a `MockTransport` that simulates device telemetry without
//! requiring hardware. Data can be fed immediately or released after a
//! delay, which lets tests script distinct observation and recovery
//! windows the way a real device interleaves them.

use super::error::PortError;
use super::traits::SerialTransport;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Inner state of the mock transport.
#[derive(Debug, Default)]
struct MockState {
    /// Bytes currently readable.
    read_queue: VecDeque<u8>,
    /// Bytes that become readable once their release instant passes.
    pending: Vec<(Instant, Vec<u8>)>,
    /// Log of all writes, one entry per `write_bytes` call.
    write_log: Vec<Vec<u8>>,
    /// Number of upcoming read polls that should fail.
    read_faults: u32,
    /// Whether the next write should fail.
    fail_next_write: bool,
    /// Whether `close` was called.
    closed: bool,
    /// Whether `clear_buffers` was called.
    cleared: bool,
}

impl MockState {
    /// Move any due pending chunks into the read queue.
    fn promote_due(&mut self) {
        let now = Instant::now();
        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].0 <= now {
                let (_, data) = self.pending.remove(i);
                self.read_queue.extend(data);
            } else {
                i += 1;
            }
        }
    }
}

/// Scripted mock transport.
///
/// Clones share state, so a test can keep one handle for scripting and
/// inspection while the runner owns another.
///
/// # Example
/// ```
/// use crash_harness::port::{MockTransport, SerialTransport};
///
/// let mut port = MockTransport::new("MOCK0");
/// port.feed(b"Crash handler initialized\n");
///
/// let data = port.read_available().unwrap();
/// assert_eq!(data, b"Crash handler initialized\n");
///
/// port.write_line("TEST_CRASH_NULL").unwrap();
/// assert_eq!(port.write_log()[0], b"TEST_CRASH_NULL\n");
/// ```
#[derive(Clone)]
pub struct MockTransport {
    name: String,
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    /// Create a new mock transport with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// Make bytes readable immediately.
    pub fn feed(&self, data: &[u8]) {
        let mut state = self.state.lock();
        state.read_queue.extend(data);
    }

    /// Make bytes readable once `delay` has elapsed from now.
    pub fn feed_after(&self, delay: Duration, data: &[u8]) {
        let mut state = self.state.lock();
        state.pending.push((Instant::now() + delay, data.to_vec()));
    }

    /// Fail the next `count` read polls with an I/O error.
    pub fn fail_reads(&self, count: u32) {
        self.state.lock().read_faults = count;
    }

    /// Fail the next write with an I/O error.
    pub fn fail_next_write(&self) {
        self.state.lock().fail_next_write = true;
    }

    /// Get a copy of all data written to the transport.
    pub fn write_log(&self) -> Vec<Vec<u8>> {
        self.state.lock().write_log.clone()
    }

    /// Whether `close` has been called.
    pub fn was_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Whether `clear_buffers` has been called.
    pub fn was_cleared(&self) -> bool {
        self.state.lock().cleared
    }
}

impl SerialTransport for MockTransport {
    fn write_bytes(&mut self, data: &[u8]) -> Result<usize, PortError> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(PortError::Closed);
        }
        if state.fail_next_write {
            state.fail_next_write = false;
            return Err(PortError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "simulated write failure",
            )));
        }
        state.write_log.push(data.to_vec());
        Ok(data.len())
    }

    fn bytes_to_read(&self) -> Result<usize, PortError> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(PortError::Closed);
        }
        state.promote_due();
        Ok(state.read_queue.len())
    }

    fn read_available(&mut self) -> Result<Vec<u8>, PortError> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(PortError::Closed);
        }
        if state.read_faults > 0 {
            state.read_faults -= 1;
            return Err(PortError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "simulated read failure",
            )));
        }
        state.promote_due();
        Ok(state.read_queue.drain(..).collect())
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn clear_buffers(&mut self) -> Result<(), PortError> {
        let mut state = self.state.lock();
        // Only what is buffered right now is discarded; scripted data that
        // has not been "emitted" by the fake device yet stays pending, the
        // same way clearing a real port cannot drop future output.
        state.promote_due();
        state.read_queue.clear();
        state.cleared = true;
        Ok(())
    }

    fn close(&mut self) -> Result<(), PortError> {
        self.state.lock().closed = true;
        Ok(())
    }
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("MockTransport")
            .field("name", &self.name)
            .field("readable", &state.read_queue.len())
            .field("pending", &state.pending.len())
            .field("closed", &state.closed)
            .finish()
    }
}
