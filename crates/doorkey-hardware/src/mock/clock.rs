//! Manually driven clock.

use crate::traits::Clock;
use doorkey_core::Millis;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

/// Clock whose time only moves when the handle says so.
///
/// # Examples
///
/// ```
/// use doorkey_core::Millis;
/// use doorkey_hardware::Clock;
/// use doorkey_hardware::mock::MockClock;
///
/// let (clock, handle) = MockClock::new(Millis::new(100));
/// handle.advance(50);
/// assert_eq!(clock.now(), Millis::new(150));
/// ```
#[derive(Debug, Clone)]
pub struct MockClock {
    now: Arc<AtomicU32>,
}

impl MockClock {
    pub fn new(start: Millis) -> (Self, MockClockHandle) {
        let now = Arc::new(AtomicU32::new(start.as_u32()));
        let handle = MockClockHandle {
            now: Arc::clone(&now),
        };
        (Self { now }, handle)
    }
}

impl Clock for MockClock {
    fn now(&self) -> Millis {
        Millis::new(self.now.load(Ordering::SeqCst))
    }
}

/// Handle for moving a [`MockClock`].
#[derive(Debug, Clone)]
pub struct MockClockHandle {
    now: Arc<AtomicU32>,
}

impl MockClockHandle {
    /// Jump to `time`.
    pub fn set(&self, time: Millis) {
        self.now.store(time.as_u32(), Ordering::SeqCst);
    }

    /// Move forward by `ms`, wrapping at `u32::MAX`.
    pub fn advance(&self, ms: u32) {
        // fetch_add on atomics wraps
        self.now.fetch_add(ms, Ordering::SeqCst);
    }

    /// Current time.
    pub fn now(&self) -> Millis {
        Millis::new(self.now.load(Ordering::SeqCst))
    }
}
