//! Mock one-wire bus for simulating key tokens.

use super::lock;
use crate::{HardwareError, Result, traits::OneWireBus};
use doorkey_core::constants::ROM_CODE_LENGTH;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct OneWireShared {
    rom: Option<[u8; ROM_CODE_LENGTH]>,
    searches: usize,
    fail: bool,
}

/// Mock one-wire bus; a token is "in contact" between `touch` and `release`.
#[derive(Debug)]
pub struct MockOneWire {
    shared: Arc<Mutex<OneWireShared>>,
}

impl MockOneWire {
    pub fn new() -> (Self, MockOneWireHandle) {
        let shared = Arc::new(Mutex::new(OneWireShared::default()));
        let handle = MockOneWireHandle {
            shared: Arc::clone(&shared),
        };
        (Self { shared }, handle)
    }
}

impl OneWireBus for MockOneWire {
    fn search(&mut self) -> Result<Option<[u8; ROM_CODE_LENGTH]>> {
        let mut shared = lock(&self.shared);
        shared.searches += 1;
        if shared.fail {
            return Err(HardwareError::one_wire("injected search failure"));
        }
        Ok(shared.rom)
    }
}

/// Handle for placing and removing tokens on a mock one-wire bus.
#[derive(Debug, Clone)]
pub struct MockOneWireHandle {
    shared: Arc<Mutex<OneWireShared>>,
}

impl MockOneWireHandle {
    /// Hold a token with ROM code `rom` against the reader.
    pub fn touch(&self, rom: [u8; ROM_CODE_LENGTH]) {
        lock(&self.shared).rom = Some(rom);
    }

    /// Take the token away.
    pub fn release(&self) {
        lock(&self.shared).rom = None;
    }

    /// Number of searches performed.
    pub fn search_count(&self) -> usize {
        lock(&self.shared).searches
    }

    /// Make subsequent searches fail (or succeed again).
    pub fn fail_searches(&self, fail: bool) {
        lock(&self.shared).fail = fail;
    }
}
