//! Hardware abstraction layer for door node peripherals.
//!
//! This crate provides trait-based abstractions for everything a door node
//! touches: relay and indicator outputs, the bus direction lines, the serial
//! transport, the one-wire key token bus and the millisecond clock. Mock
//! implementations allow the full node loop to run in tests without any
//! hardware.
//!
//! # Device Traits
//!
//! - [`DigitalOutput`]: binary output line, written every loop tick
//! - [`SerialTransport`]: non-blocking byte reads, writes, blocking drain
//! - [`OneWireBus`]: presence search returning a token ROM code
//! - [`Clock`]: wrapping millisecond counter
//!
//! ```
//! use doorkey_hardware::{DigitalOutput, PinState, Result};
//!
//! fn pulse<P: DigitalOutput>(pin: &mut P) -> Result<()> {
//!     pin.set_state(PinState::High)?;
//!     pin.set_state(PinState::Low)
//! }
//! ```
//!
//! # Token Reader
//!
//! [`TokenReader`] turns raw one-wire searches into a debounced
//! [`TokenSnapshot`](doorkey_core::TokenSnapshot).
//!
//! # Real Hardware
//!
//! With the `hardware-serial` feature, [`serial::SerialPortTransport`] opens
//! an operating system serial port and [`serial::RtsDirectionPin`] drives the
//! transceiver direction through RTS.

pub mod clock;
pub mod error;
pub mod mock;
pub mod output;
#[cfg(feature = "hardware-serial")]
pub mod serial;
pub mod token;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use clock::SystemClock;
pub use error::{HardwareError, Result};
pub use output::{LoggedOutput, NoopOutput};
pub use token::TokenReader;
pub use traits::{Clock, DigitalOutput, OneWireBus, SerialTransport};
pub use types::PinState;
