//! Hardware device trait definitions.
//!
//! These traits are the contract between the node loop and its peripherals:
//! digital outputs (relay, indicators, bus direction), the serial transport,
//! the one-wire token bus and the millisecond clock. They let the loop run
//! unchanged against mocks in tests and real drivers on a device.
//!
//! The traits are synchronous. A door node runs one cooperative loop on one
//! thread; every operation either completes immediately or, for
//! [`SerialTransport::flush`], blocks for the short time the transmit buffer
//! needs to drain before the bus direction may be released.

use crate::error::Result;
use crate::types::PinState;
use doorkey_core::{Millis, constants::ROM_CODE_LENGTH};

/// A binary output line.
///
/// Implementations write the physical level on every call, even if it did
/// not change; callers rely on this to re-assert outputs each loop tick.
pub trait DigitalOutput {
    /// Drive the output to `state`.
    fn set_state(&mut self, state: PinState) -> Result<()>;

    /// Drive the output high.
    fn set_high(&mut self) -> Result<()> {
        self.set_state(PinState::High)
    }

    /// Drive the output low.
    fn set_low(&mut self) -> Result<()> {
        self.set_state(PinState::Low)
    }
}

impl<T: DigitalOutput + ?Sized> DigitalOutput for Box<T> {
    fn set_state(&mut self, state: PinState) -> Result<()> {
        (**self).set_state(state)
    }
}

/// Byte-oriented serial channel attached to the shared bus.
pub trait SerialTransport {
    /// Read one byte if one is available.
    ///
    /// Returns `Ok(None)` immediately when nothing has been received; this
    /// call never waits for data.
    fn read_byte(&mut self) -> Result<Option<u8>>;

    /// Queue bytes for transmission.
    fn write(&mut self, bytes: &[u8]) -> Result<()>;

    /// Block until every queued byte has left the transmitter.
    fn flush(&mut self) -> Result<()>;
}

impl<T: SerialTransport + ?Sized> SerialTransport for Box<T> {
    fn read_byte(&mut self) -> Result<Option<u8>> {
        (**self).read_byte()
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).write(bytes)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

/// Single-wire bus with a presence search for contact key tokens.
pub trait OneWireBus {
    /// Search the bus for a device in contact.
    ///
    /// Returns the 8-byte ROM code (family code, 6 serial bytes, CRC-8) of
    /// the first device found, or `None` if the bus is empty. The CRC is not
    /// checked here.
    fn search(&mut self) -> Result<Option<[u8; ROM_CODE_LENGTH]>>;
}

impl<T: OneWireBus + ?Sized> OneWireBus for Box<T> {
    fn search(&mut self) -> Result<Option<[u8; ROM_CODE_LENGTH]>> {
        (**self).search()
    }
}

/// Free-running millisecond clock.
pub trait Clock {
    /// Current time. Wraps at `u32::MAX`.
    fn now(&self) -> Millis;
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now(&self) -> Millis {
        (**self).now()
    }
}
