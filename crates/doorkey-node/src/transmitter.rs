//! Half-duplex bus access.
//!
//! A node may only drive the bus while it sends its own response. The
//! transceiver's driver-enable (DE) and receiver-enable (RE, active low)
//! lines are raised for the duration of one frame and lowered afterwards.
//!
//! [`TransmitSession`] is the scope of that ownership: creating it raises
//! both lines, dropping it lowers them, whatever happened in between. A
//! session is only finished after the transport has drained; releasing DE
//! while the UART still shifts the last byte would cut that byte off.
//!
//! ```text
//! DE/RE high -> write frame -> flush (drain) -> DE/RE low
//! ```

use doorkey_core::DeviceAddress;
use doorkey_hardware::{DigitalOutput, PinState, SerialTransport};
use doorkey_protocol::{FrameWriter, Response};
use tracing::{trace, warn};

use crate::error::Result;

/// The transceiver direction lines.
pub struct BusDirection {
    driver_enable: Box<dyn DigitalOutput>,
    receiver_enable: Box<dyn DigitalOutput>,
}

impl BusDirection {
    pub fn new(driver_enable: Box<dyn DigitalOutput>, receiver_enable: Box<dyn DigitalOutput>) -> Self {
        Self {
            driver_enable,
            receiver_enable,
        }
    }

    /// Take the bus: DE high, receiver disabled.
    pub fn acquire(&mut self) -> Result<()> {
        self.driver_enable.set_state(PinState::High)?;
        self.receiver_enable.set_state(PinState::High)?;
        Ok(())
    }

    /// Give the bus back: DE low, receiver enabled.
    ///
    /// Both lines are always written, even if the first write fails.
    pub fn release(&mut self) -> Result<()> {
        let de = self.driver_enable.set_state(PinState::Low);
        let re = self.receiver_enable.set_state(PinState::Low);
        de?;
        re?;
        Ok(())
    }
}

impl std::fmt::Debug for BusDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BusDirection").finish_non_exhaustive()
    }
}

/// Exclusive use of the bus for one frame.
///
/// The direction lines are released when the session is dropped.
pub struct TransmitSession<'a, T: SerialTransport> {
    transport: &'a mut T,
    direction: &'a mut BusDirection,
    writer: FrameWriter,
}

impl<'a, T: SerialTransport> TransmitSession<'a, T> {
    /// Raise the direction lines and open a frame.
    ///
    /// If raising fails, the lines are released again before returning.
    pub fn begin(transport: &'a mut T, direction: &'a mut BusDirection) -> Result<Self> {
        if let Err(e) = direction.acquire() {
            if let Err(release_err) = direction.release() {
                warn!(error = %release_err, "failed to release bus direction");
            }
            return Err(e);
        }
        Ok(Self {
            transport,
            direction,
            writer: FrameWriter::start(),
        })
    }

    pub fn push_byte(&mut self, byte: u8) {
        self.writer.push_byte(byte);
    }

    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.writer.push_bytes(bytes);
    }

    /// Close the frame, write it and wait for the transport to drain.
    ///
    /// Returns the number of bytes put on the wire.
    pub fn finish(self) -> Result<usize> {
        // Take the writer out without dropping the session early
        let mut session = self;
        let writer = std::mem::replace(&mut session.writer, FrameWriter::start());
        let frame = writer.finish();
        session.transport.write(&frame)?;
        session.transport.flush()?;
        trace!(len = frame.len(), "frame transmitted");
        Ok(frame.len())
    }
}

impl<T: SerialTransport> Drop for TransmitSession<'_, T> {
    fn drop(&mut self) {
        if let Err(e) = self.direction.release() {
            warn!(error = %e, "failed to release bus direction");
        }
    }
}

/// Serial transport plus direction lines of one node.
pub struct BusInterface<T> {
    transport: T,
    direction: BusDirection,
}

impl<T: SerialTransport> BusInterface<T> {
    pub fn new(transport: T, direction: BusDirection) -> Self {
        Self {
            transport,
            direction,
        }
    }

    /// Read one received byte, if any.
    pub fn read_byte(&mut self) -> Result<Option<u8>> {
        Ok(self.transport.read_byte()?)
    }

    /// Put the bus in receive mode.
    pub fn release(&mut self) -> Result<()> {
        self.direction.release()
    }

    /// Open a transmit session.
    pub fn session(&mut self) -> Result<TransmitSession<'_, T>> {
        TransmitSession::begin(&mut self.transport, &mut self.direction)
    }

    /// Transmit one response: header, then payload, as a single frame.
    ///
    /// Returns the number of bytes put on the wire.
    pub fn transmit(&mut self, version: u8, address: DeviceAddress, response: &Response) -> Result<usize> {
        let mut session = self.session()?;
        session.push_byte(version);
        session.push_byte(address.as_u8());
        session.push_bytes(&response.payload());
        session.finish()
    }
}

impl<T> std::fmt::Debug for BusInterface<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BusInterface")
            .field("direction", &self.direction)
            .finish_non_exhaustive()
    }
}
