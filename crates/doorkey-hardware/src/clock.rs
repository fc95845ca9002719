//! Monotonic system clock.

use crate::traits::Clock;
use doorkey_core::Millis;
use std::time::Instant;

/// Millisecond clock backed by [`Instant`], starting at zero on creation.
///
/// The counter is truncated to 32 bits, so it wraps after ~49.7 days just
/// like a microcontroller tick counter.
///
/// # Examples
///
/// ```
/// use doorkey_hardware::{Clock, SystemClock};
///
/// let clock = SystemClock::new();
/// assert!(clock.now().as_u32() < 1000);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Millis {
        // Truncation is the wraparound
        Millis::new(self.start.elapsed().as_millis() as u32)
    }
}
