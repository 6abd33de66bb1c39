//! Serial port transport implementation.
//!
//! Wraps the `serialport` crate's `SerialPort` trait with our own
//! `SerialTransport` trait for dependency injection and testing.

use super::error::PortError;
use super::traits::SerialTransport;
use std::io::{Read, Write};
use std::time::Duration;

/// Internal read timeout for the underlying port.
///
/// Reads are gated on `bytes_to_read`, so this only bounds the rare case
/// where the OS buffer drains between the availability check and the read.
const READ_TIMEOUT: Duration = Duration::from_millis(50);

/// Serial transport backed by `serialport::SerialPort`.
pub struct SyncSerialPort {
    /// The underlying serial port, `None` once closed.
    port: Option<Box<dyn serialport::SerialPort>>,
    /// The port name/path for identification.
    name: String,
}

impl SyncSerialPort {
    /// Open a serial port at the given baud rate.
    ///
    /// # Arguments
    /// * `port_name` - The system path to the serial port (e.g., "/dev/ttyUSB0" or "COM3")
    /// * `baud_rate` - Line speed in bits per second
    ///
    /// # Example
    /// ```no_run
    /// use crash_harness::port::SyncSerialPort;
    ///
    /// let port = SyncSerialPort::open("/dev/ttyUSB0", 115200)?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn open(port_name: &str, baud_rate: u32) -> Result<Self, PortError> {
        let port = serialport::new(port_name, baud_rate)
            .timeout(READ_TIMEOUT)
            .open()
            .map_err(|e| match e.kind() {
                serialport::ErrorKind::NoDevice => PortError::not_found(port_name),
                serialport::ErrorKind::InvalidInput => PortError::config(e.to_string()),
                _ => PortError::Serial(e),
            })?;

        Ok(Self {
            port: Some(port),
            name: port_name.to_string(),
        })
    }

    fn port_mut(&mut self) -> Result<&mut Box<dyn serialport::SerialPort>, PortError> {
        self.port.as_mut().ok_or(PortError::Closed)
    }

    fn port_ref(&self) -> Result<&Box<dyn serialport::SerialPort>, PortError> {
        self.port.as_ref().ok_or(PortError::Closed)
    }
}

impl SerialTransport for SyncSerialPort {
    fn write_bytes(&mut self, data: &[u8]) -> Result<usize, PortError> {
        let port = self.port_mut()?;
        let n = port.write(data).map_err(PortError::Io)?;
        port.flush().map_err(PortError::Io)?;
        Ok(n)
    }

    fn bytes_to_read(&self) -> Result<usize, PortError> {
        let port = self.port_ref()?;
        port.bytes_to_read()
            .map(|n| n as usize)
            .map_err(PortError::Serial)
    }

    fn read_available(&mut self) -> Result<Vec<u8>, PortError> {
        let available = self.bytes_to_read()?;
        if available == 0 {
            return Ok(Vec::new());
        }

        let port = self.port_mut()?;
        let mut buffer = vec![0u8; available];
        let n = port.read(&mut buffer).map_err(PortError::Io)?;
        buffer.truncate(n);
        Ok(buffer)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn clear_buffers(&mut self) -> Result<(), PortError> {
        self.port_mut()?
            .clear(serialport::ClearBuffer::All)
            .map_err(PortError::Serial)
    }

    fn close(&mut self) -> Result<(), PortError> {
        // Dropping the boxed port releases the OS handle.
        self.port = None;
        Ok(())
    }
}

impl std::fmt::Debug for SyncSerialPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncSerialPort")
            .field("name", &self.name)
            .field("open", &self.port.is_some())
            .finish()
    }
}
