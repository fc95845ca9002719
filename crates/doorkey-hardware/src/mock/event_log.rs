//! Ordered record of hardware effects shared between mocks.

use super::lock;
use crate::types::PinState;
use std::sync::{Arc, Mutex};

/// A single observable hardware effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HardwareEvent {
    /// A pin was written.
    Pin { name: String, state: PinState },

    /// Bytes were queued on a transport.
    Write(Vec<u8>),

    /// A transport was drained.
    Flush,
}

impl HardwareEvent {
    /// Pin write event helper.
    pub fn pin(name: impl Into<String>, state: PinState) -> Self {
        Self::Pin {
            name: name.into(),
            state,
        }
    }
}

/// Shared, cloneable event log.
///
/// # Examples
///
/// ```
/// use doorkey_hardware::mock::{EventLog, HardwareEvent, MockPin};
/// use doorkey_hardware::{DigitalOutput, PinState};
///
/// let log = EventLog::new();
/// let (mut pin, _handle) = MockPin::with_log("relay", log.clone());
///
/// pin.set_high().unwrap();
/// assert_eq!(log.events(), vec![HardwareEvent::pin("relay", PinState::High)]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<HardwareEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event.
    pub fn record(&self, event: HardwareEvent) {
        lock(&self.events).push(event);
    }

    /// Copy of every event recorded so far.
    pub fn events(&self) -> Vec<HardwareEvent> {
        lock(&self.events).clone()
    }

    /// Events recorded for the pin called `name`, in order.
    pub fn pin_history(&self, name: &str) -> Vec<PinState> {
        lock(&self.events)
            .iter()
            .filter_map(|event| match event {
                HardwareEvent::Pin { name: n, state } if n == name => Some(*state),
                _ => None,
            })
            .collect()
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        lock(&self.events).len()
    }

    /// Returns `true` if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        lock(&self.events).is_empty()
    }

    /// Forget every recorded event.
    pub fn clear(&self) {
        lock(&self.events).clear();
    }
}
