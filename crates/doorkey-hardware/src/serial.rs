//! Serial port transport for RS-485 adapters.
//!
//! Available with the `hardware-serial` feature. The transport wraps a
//! [`serialport::SerialPort`]; bus direction is driven through the port's RTS
//! line by [`RtsDirectionPin`], which is how most USB RS-485 adapters wire
//! their driver-enable input.

use crate::{HardwareError, Result, traits::DigitalOutput, traits::SerialTransport, types::PinState};
use serialport::SerialPort;
use std::io::{ErrorKind, Read, Write};
use std::time::Duration;
use tracing::{debug, info};

/// Read timeout applied to the port. Reads only happen when
/// `bytes_to_read` reported data, so this is never actually waited for.
const READ_TIMEOUT: Duration = Duration::from_millis(10);

/// Serial transport over an operating system serial port.
pub struct SerialPortTransport {
    port: Box<dyn SerialPort>,
    path: String,
}

impl SerialPortTransport {
    /// Open `path` at `baud_rate`, 8N1.
    ///
    /// # Errors
    ///
    /// Returns `HardwareError::Disconnected` if the device does not exist and
    /// `HardwareError::ConfigurationError` for unsupported settings.
    pub fn open(path: &str, baud_rate: u32) -> Result<Self> {
        if baud_rate == 0 {
            return Err(HardwareError::configuration("baud rate must be non-zero"));
        }
        let port = serialport::new(path, baud_rate)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .flow_control(serialport::FlowControl::None)
            .timeout(READ_TIMEOUT)
            .open()?;
        info!(path, baud_rate, "serial port opened");
        Ok(Self {
            port,
            path: path.to_string(),
        })
    }

    /// Direction pin driving this port's RTS line.
    pub fn direction_pin(&self) -> Result<RtsDirectionPin> {
        Ok(RtsDirectionPin {
            port: self.port.try_clone()?,
        })
    }

    /// Path the port was opened from.
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl std::fmt::Debug for SerialPortTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialPortTransport")
            .field("path", &self.path)
            .finish()
    }
}

impl SerialTransport for SerialPortTransport {
    fn read_byte(&mut self) -> Result<Option<u8>> {
        if self.port.bytes_to_read()? == 0 {
            return Ok(None);
        }
        let mut buf = [0u8; 1];
        match self.port.read(&mut buf) {
            Ok(1) => Ok(Some(buf[0])),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == ErrorKind::TimedOut => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.port.write_all(bytes)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        // Blocks until the UART has shifted out the last byte (tcdrain on Unix)
        self.port.flush()?;
        Ok(())
    }
}

/// Bus direction output mapped to a serial port's RTS line.
pub struct RtsDirectionPin {
    port: Box<dyn SerialPort>,
}

impl std::fmt::Debug for RtsDirectionPin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RtsDirectionPin")
            .field("port", &self.port.name())
            .finish()
    }
}

impl DigitalOutput for RtsDirectionPin {
    fn set_state(&mut self, state: PinState) -> Result<()> {
        self.port.write_request_to_send(state.is_high())?;
        debug!(%state, "rts");
        Ok(())
    }
}
