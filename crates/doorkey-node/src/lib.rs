//! Door node firmware logic.
//!
//! A node sits on a shared half-duplex serial bus next to other nodes and a
//! single master. It answers only requests addressed to it, drives a door
//! strike relay and two indicator lights for a bounded time, and reports the
//! key token currently touching its reader.
//!
//! The crate is hardware agnostic: every peripheral comes in through the
//! traits of [`doorkey_hardware`], so the same [`Node`] runs against serial
//! ports or against the mocks in tests.
//!
//! # Layout
//!
//! - [`dispatcher`]: request validation
//! - [`handlers`]: one function per command
//! - [`actuator`]: relay and indicator hold windows
//! - [`transmitter`]: bus direction discipline around each response
//! - [`node`]: the loop step tying it all together
//!
//! # Example
//!
//! ```
//! use doorkey_core::{DeviceAddress, Millis};
//! use doorkey_hardware::mock::{MockOneWire, MockPin, MockTransport};
//! use doorkey_node::{ActuatorPins, BusDirection, Node, NodeConfig};
//! use doorkey_protocol::{Command, encode_frame};
//!
//! let (transport, bus) = MockTransport::new();
//! let (one_wire, _) = MockOneWire::new();
//! let (de, _) = MockPin::new("de");
//! let (re, _) = MockPin::new("re");
//! let (relay, relay_pin) = MockPin::new("relay");
//! let (green, _) = MockPin::new("green");
//! let (red, _) = MockPin::new("red");
//!
//! let config = NodeConfig::default().with_device_address(DeviceAddress::new(1));
//! let mut node = Node::new(
//!     config,
//!     transport,
//!     BusDirection::new(Box::new(de), Box::new(re)),
//!     one_wire,
//!     ActuatorPins {
//!         relay: Box::new(relay),
//!         green: Box::new(green),
//!         red: Box::new(red),
//!     },
//! )
//! .unwrap();
//!
//! let request = Command::UnlockDoor.encode_request(1, DeviceAddress::new(1));
//! bus.inject(&encode_frame(&request));
//! node.step(Millis::new(0));
//!
//! assert!(relay_pin.is_high());
//! assert!(!bus.written().is_empty());
//! ```

pub mod actuator;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod node;
pub mod transmitter;

pub use actuator::{ActuatorController, IndicatorColor, IndicatorState, OutputLevels, RelayState};
pub use config::NodeConfig;
pub use dispatcher::Dispatcher;
pub use error::{NodeError, Result};
pub use node::{ActuatorPins, Node, NodeCore, StepOutcome};
pub use transmitter::{BusDirection, BusInterface, TransmitSession};
