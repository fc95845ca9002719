//! Time-bounded actuator state.
//!
//! The [`ActuatorController`] owns the relay (door strike) and indicator
//! state. Handlers mutate it through [`ActuatorController::engage_relay`] and
//! [`ActuatorController::set_indicator`]; the loop calls
//! [`ActuatorController::tick`] every iteration to expire holds and obtain the
//! levels to write.
//!
//! Outputs are level driven: `tick` returns the full set of levels every
//! time, and the caller writes all of them, so a glitched write is corrected
//! on the next iteration.
//!
//! # Expiry
//!
//! Expiry is evaluated before levels are computed. An output activated at `T`
//! with hold `H` is high for every tick in `[T, T + H)` and low from
//! `T + H` on. Elapsed time uses wrapping subtraction, so holds spanning the
//! 32-bit counter wrap behave the same.
//!
//! # Examples
//!
//! ```
//! use doorkey_core::Millis;
//! use doorkey_node::actuator::{ActuatorController, IndicatorColor};
//! use doorkey_hardware::PinState;
//!
//! let mut actuators = ActuatorController::new(5000, 5000);
//! actuators.engage_relay(Millis::new(1000));
//! actuators.set_indicator(IndicatorColor::Green, Millis::new(1000));
//!
//! let levels = actuators.tick(Millis::new(5999));
//! assert_eq!(levels.relay, PinState::High);
//! assert_eq!(levels.green, PinState::High);
//!
//! let levels = actuators.tick(Millis::new(6000));
//! assert_eq!(levels.relay, PinState::Low);
//! assert_eq!(levels.green, PinState::Low);
//! ```

use doorkey_core::Millis;
use doorkey_hardware::PinState;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Indicator colors. Exactly one can be lit at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorColor {
    Green,
    Red,
}

impl fmt::Display for IndicatorColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorColor::Green => write!(f, "green"),
            IndicatorColor::Red => write!(f, "red"),
        }
    }
}

/// Door strike relay state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayState {
    pub engaged: bool,
    pub engaged_at: Millis,
}

/// Indicator state: off, or one color lit since a timestamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IndicatorState {
    #[default]
    Off,
    Lit { color: IndicatorColor, since: Millis },
}

impl IndicatorState {
    /// Color currently lit, if any.
    pub fn color(&self) -> Option<IndicatorColor> {
        match self {
            IndicatorState::Off => None,
            IndicatorState::Lit { color, .. } => Some(*color),
        }
    }
}

/// Levels of the three actuator outputs for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputLevels {
    pub relay: PinState,
    pub green: PinState,
    pub red: PinState,
}

impl OutputLevels {
    /// All outputs deasserted.
    pub const ALL_LOW: OutputLevels = OutputLevels {
        relay: PinState::Low,
        green: PinState::Low,
        red: PinState::Low,
    };
}

/// Owner of the relay and indicator state.
#[derive(Debug, Clone)]
pub struct ActuatorController {
    relay_hold_ms: u32,
    indicator_hold_ms: u32,
    relay: RelayState,
    indicator: IndicatorState,
}

impl ActuatorController {
    pub fn new(relay_hold_ms: u32, indicator_hold_ms: u32) -> Self {
        Self {
            relay_hold_ms,
            indicator_hold_ms,
            relay: RelayState::default(),
            indicator: IndicatorState::Off,
        }
    }

    /// Engage the relay, restarting its hold window at `now`.
    ///
    /// Repeated calls refresh the window; they do not extend it.
    pub fn engage_relay(&mut self, now: Millis) {
        debug!(%now, "relay on");
        self.relay = RelayState {
            engaged: true,
            engaged_at: now,
        };
    }

    /// Light `color` at `now`, replacing whichever color was lit.
    pub fn set_indicator(&mut self, color: IndicatorColor, now: Millis) {
        debug!(%now, "{color} indicator on");
        self.indicator = IndicatorState::Lit { color, since: now };
    }

    /// Expire elapsed holds and return the levels to drive.
    pub fn tick(&mut self, now: Millis) -> OutputLevels {
        if self.relay.engaged && now.has_elapsed(self.relay.engaged_at, self.relay_hold_ms) {
            debug!(%now, "relay off");
            self.relay.engaged = false;
        }

        if let IndicatorState::Lit { since, .. } = self.indicator
            && now.has_elapsed(since, self.indicator_hold_ms)
        {
            debug!(%now, "indicator off");
            self.indicator = IndicatorState::Off;
        }

        self.levels()
    }

    /// Levels implied by the current state, without evaluating expiry.
    pub fn levels(&self) -> OutputLevels {
        let color = self.indicator.color();
        OutputLevels {
            relay: PinState::from(self.relay.engaged),
            green: PinState::from(color == Some(IndicatorColor::Green)),
            red: PinState::from(color == Some(IndicatorColor::Red)),
        }
    }

    pub fn relay(&self) -> RelayState {
        self.relay
    }

    pub fn indicator(&self) -> IndicatorState {
        self.indicator
    }
}
