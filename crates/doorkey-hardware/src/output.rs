//! Outputs for hosts without GPIO.

use crate::{Result, traits::DigitalOutput, types::PinState};
use tracing::info;

/// Output that reports level changes through the log instead of a pin.
///
/// Useful when the node runs on a PC attached to the bus through a USB
/// adapter: the relay and indicators have no physical line, but their
/// transitions are still visible. Repeated writes of the same level are
/// silent.
#[derive(Debug)]
pub struct LoggedOutput {
    name: String,
    last: Option<PinState>,
}

impl LoggedOutput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            last: None,
        }
    }

    /// Last level written, if any.
    pub fn state(&self) -> Option<PinState> {
        self.last
    }
}

impl DigitalOutput for LoggedOutput {
    fn set_state(&mut self, state: PinState) -> Result<()> {
        if self.last != Some(state) {
            info!(output = %self.name, %state, "output changed");
            self.last = Some(state);
        }
        Ok(())
    }
}

/// Output with no effect, for lines a board does not have.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopOutput;

impl DigitalOutput for NoopOutput {
    fn set_state(&mut self, _state: PinState) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logged_output_tracks_level() {
        let mut output = LoggedOutput::new("relay");
        assert_eq!(output.state(), None);

        output.set_high().unwrap();
        output.set_high().unwrap();
        assert_eq!(output.state(), Some(PinState::High));

        output.set_low().unwrap();
        assert_eq!(output.state(), Some(PinState::Low));
    }

    #[test]
    fn test_noop_output_accepts_writes() {
        let mut output = NoopOutput;
        assert!(output.set_high().is_ok());
    }
}
