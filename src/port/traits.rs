//! Core trait for the device transport.
//!
//! Defines the `SerialTransport` trait that allows both real serial ports and
//! mock implementations to be used interchangeably by the line reader and the
//! test runner.

use super::error::PortError;

/// Trait for the byte-level connection to the device under test.
///
/// All reads are non-blocking: callers poll [`bytes_to_read`] and drain
/// whatever is buffered with [`read_available`]. Timing policy (observation
/// windows, poll intervals) lives entirely in the line reader, not here.
///
/// [`bytes_to_read`]: SerialTransport::bytes_to_read
/// [`read_available`]: SerialTransport::read_available
pub trait SerialTransport: Send + std::fmt::Debug {
    /// Write bytes to the device.
    ///
    /// Returns the number of bytes actually written.
    fn write_bytes(&mut self, data: &[u8]) -> Result<usize, PortError>;

    /// Number of bytes currently buffered and readable without blocking.
    fn bytes_to_read(&self) -> Result<usize, PortError>;

    /// Read whatever is currently buffered, possibly nothing.
    ///
    /// Never blocks waiting for data; an empty vector is a normal result.
    fn read_available(&mut self) -> Result<Vec<u8>, PortError>;

    /// Get the name/path of this transport.
    fn name(&self) -> &str;

    /// Discard any unread input and unsent output.
    fn clear_buffers(&mut self) -> Result<(), PortError>;

    /// Release the transport.
    ///
    /// Subsequent operations may fail with [`PortError::Closed`]. Dropping
    /// the value releases the underlying handle either way; this hook exists
    /// so the runner can close on every exit path and tests can observe it.
    fn close(&mut self) -> Result<(), PortError>;

    /// Write a newline-terminated command line and flush it out.
    fn write_line(&mut self, line: &str) -> Result<(), PortError> {
        let mut framed = Vec::with_capacity(line.len() + 1);
        framed.extend_from_slice(line.as_bytes());
        framed.push(b'\n');

        let mut written = 0;
        while written < framed.len() {
            written += self.write_bytes(&framed[written..])?;
        }
        Ok(())
    }
}
