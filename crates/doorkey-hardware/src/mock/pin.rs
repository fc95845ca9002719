//! Mock digital output.

use super::{EventLog, HardwareEvent, lock};
use crate::{HardwareError, Result, traits::DigitalOutput, types::PinState};
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct PinShared {
    state: PinState,
    writes: usize,
    fail: bool,
}

/// Mock output pin recording every write.
///
/// # Examples
///
/// ```
/// use doorkey_hardware::mock::MockPin;
/// use doorkey_hardware::{DigitalOutput, PinState};
///
/// let (mut pin, handle) = MockPin::new("relay");
/// pin.set_high().unwrap();
///
/// assert_eq!(handle.state(), PinState::High);
/// assert_eq!(handle.write_count(), 1);
/// ```
#[derive(Debug)]
pub struct MockPin {
    name: String,
    shared: Arc<Mutex<PinShared>>,
    log: Option<EventLog>,
}

impl MockPin {
    /// Create a mock pin starting low.
    pub fn new(name: impl Into<String>) -> (Self, MockPinHandle) {
        Self::build(name.into(), None)
    }

    /// Create a mock pin that also records its writes into `log`.
    pub fn with_log(name: impl Into<String>, log: EventLog) -> (Self, MockPinHandle) {
        Self::build(name.into(), Some(log))
    }

    fn build(name: String, log: Option<EventLog>) -> (Self, MockPinHandle) {
        let shared = Arc::new(Mutex::new(PinShared::default()));
        let handle = MockPinHandle {
            name: name.clone(),
            shared: Arc::clone(&shared),
        };
        (Self { name, shared, log }, handle)
    }
}

impl DigitalOutput for MockPin {
    fn set_state(&mut self, state: PinState) -> Result<()> {
        let mut shared = lock(&self.shared);
        if shared.fail {
            return Err(HardwareError::pin(&self.name, "injected failure"));
        }
        shared.state = state;
        shared.writes += 1;
        if let Some(log) = &self.log {
            log.record(HardwareEvent::pin(&self.name, state));
        }
        Ok(())
    }
}

/// Handle for inspecting a mock pin.
#[derive(Debug, Clone)]
pub struct MockPinHandle {
    name: String,
    shared: Arc<Mutex<PinShared>>,
}

impl MockPinHandle {
    /// Last level written.
    pub fn state(&self) -> PinState {
        lock(&self.shared).state
    }

    /// Returns `true` if the last write was high.
    pub fn is_high(&self) -> bool {
        self.state().is_high()
    }

    /// Total number of successful writes.
    pub fn write_count(&self) -> usize {
        lock(&self.shared).writes
    }

    /// Make subsequent writes fail (or succeed again).
    pub fn set_fail(&self, fail: bool) {
        lock(&self.shared).fail = fail;
    }

    /// Pin name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pin_starts_low() {
        let (_pin, handle) = MockPin::new("green");
        assert_eq!(handle.state(), PinState::Low);
        assert_eq!(handle.write_count(), 0);
        assert_eq!(handle.name(), "green");
    }

    #[test]
    fn test_repeated_writes_are_counted() {
        let (mut pin, handle) = MockPin::new("relay");
        pin.set_high().unwrap();
        pin.set_high().unwrap();
        pin.set_low().unwrap();

        assert_eq!(handle.write_count(), 3);
        assert!(!handle.is_high());
    }

    #[test]
    fn test_injected_failure() {
        let (mut pin, handle) = MockPin::new("red");
        handle.set_fail(true);

        let result = pin.set_high();
        assert!(matches!(result, Err(HardwareError::PinError { .. })));
        assert_eq!(handle.state(), PinState::Low);

        handle.set_fail(false);
        pin.set_high().unwrap();
        assert!(handle.is_high());
    }

    #[test]
    fn test_boxed_pin_forwards() {
        let (pin, handle) = MockPin::new("de");
        let mut boxed: Box<dyn DigitalOutput> = Box::new(pin);
        boxed.set_high().unwrap();
        assert!(handle.is_high());
    }
}
