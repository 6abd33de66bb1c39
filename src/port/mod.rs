//! Transport layer for device communication.
//!
//! This module provides the byte-level connection to the device under test:
//!
//! - [`SerialTransport`]: trait abstracting the connection (write, poll,
//!   non-blocking drain, close)
//! - [`SyncSerialPort`]: real implementation over the `serialport` crate
//! - [`MockTransport`]: scripted implementation for tests, with time-gated
//!   data release
//! - [`PortError`]: transport-level error type

mod error;
mod mock;
mod sync_port;
mod traits;

pub use error::PortError;
pub use mock::MockTransport;
pub use sync_port::SyncSerialPort;
pub use traits::SerialTransport;
