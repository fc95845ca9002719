//! Mock device implementations for testing and development.
//!
//! Every mock is created as a `(device, handle)` pair: the device implements
//! the hardware trait and is moved into the code under test, the handle stays
//! with the test to drive inputs and inspect outputs. Pins and transports can
//! additionally share one [`EventLog`] to check the relative order of their
//! effects, which is what proves the bus direction discipline.

pub mod clock;
pub mod event_log;
pub mod one_wire;
pub mod pin;
pub mod transport;

// Re-export commonly used types
pub use clock::{MockClock, MockClockHandle};
pub use event_log::{EventLog, HardwareEvent};
pub use one_wire::{MockOneWire, MockOneWireHandle};
pub use pin::{MockPin, MockPinHandle};
pub use transport::{MockTransport, MockTransportHandle};

use std::sync::{Mutex, MutexGuard};

/// Lock shared mock state, recovering from a poisoned lock.
///
/// A panicking test thread must not cascade into unrelated assertions.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
