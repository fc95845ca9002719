//! Common types shared across hardware device implementations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Not;

/// Logic level of a digital output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinState {
    /// Output deasserted.
    #[default]
    Low,

    /// Output asserted.
    High,
}

impl PinState {
    /// Check if the level is high.
    pub fn is_high(self) -> bool {
        self == PinState::High
    }

    /// Check if the level is low.
    pub fn is_low(self) -> bool {
        self == PinState::Low
    }
}

impl From<bool> for PinState {
    fn from(asserted: bool) -> Self {
        if asserted { PinState::High } else { PinState::Low }
    }
}

impl Not for PinState {
    type Output = PinState;

    fn not(self) -> Self::Output {
        match self {
            PinState::Low => PinState::High,
            PinState::High => PinState::Low,
        }
    }
}

impl fmt::Display for PinState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PinState::Low => write!(f, "LOW"),
            PinState::High => write!(f, "HIGH"),
        }
    }
}
