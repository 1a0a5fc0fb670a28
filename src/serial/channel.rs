//! Byte channel seam between the read loop and the physical port

use std::io::{self, Read};
use std::time::Duration;

use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use tracing::info;

use crate::error::{MonitorError, Result};
use crate::types::BaudRate;

/// A readable byte source the live read loop can poll.
///
/// Implemented for real serial ports; tests use an in-memory script.
pub trait ByteChannel: Send + 'static {
    /// Bytes that can be read right now without waiting.
    fn bytes_available(&mut self) -> io::Result<usize>;

    /// Read up to `buf.len()` bytes.
    fn read_available(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}

impl ByteChannel for Box<dyn SerialPort> {
    fn bytes_available(&mut self) -> io::Result<usize> {
        let count = self.bytes_to_read().map_err(io::Error::from)?;
        Ok(count as usize)
    }

    fn read_available(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read(buf)
    }
}

/// Open `endpoint` at 8-N-1 without flow control.
///
/// Blocking; callers on a runtime should use `spawn_blocking`.
pub fn open_port(endpoint: &str, baud: BaudRate, timeout: Duration) -> Result<Box<dyn SerialPort>> {
    let port = serialport::new(endpoint, baud.as_u32())
        .data_bits(DataBits::Eight)
        .parity(Parity::None)
        .stop_bits(StopBits::One)
        .flow_control(FlowControl::None)
        .timeout(timeout)
        .open()
        .map_err(|e| MonitorError::from_open_error(endpoint, e))?;

    info!(endpoint, baud = baud.as_u32(), "Opened serial port (8N1)");
    Ok(port)
}
