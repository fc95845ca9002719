//! Contact key token reader.
//!
//! The [`TokenReader`] owns a [`OneWireBus`] and keeps a [`TokenSnapshot`] of
//! the key currently held against the reader. It is polled once per loop
//! iteration and searches the bus at a fixed interval. A key that stops
//! answering is only forgotten after a keep-alive window, so a brief loss of
//! contact while the key is wiggled does not flicker the snapshot.
//!
//! # Examples
//!
//! ```
//! use doorkey_core::Millis;
//! use doorkey_hardware::TokenReader;
//! use doorkey_hardware::mock::MockOneWire;
//!
//! let (bus, handle) = MockOneWire::new();
//! let mut reader = TokenReader::new(bus, 50, 2000);
//!
//! handle.touch([0x02, 0x1C, 0xB8, 0x01, 0x00, 0x00, 0x00, 0xA2]);
//! reader.poll(Millis::new(0));
//!
//! let snapshot = reader.snapshot();
//! assert!(snapshot.present);
//! assert_eq!(snapshot.family_code, 0x02);
//! ```

use crate::traits::OneWireBus;
use doorkey_core::{
    Millis, TokenSnapshot,
    constants::{DEFAULT_TOKEN_KEEP_INTERVAL_MS, DEFAULT_TOKEN_SEARCH_INTERVAL_MS, ROM_CODE_LENGTH},
};
use tracing::{debug, trace, warn};

/// Reflected polynomial of the Dallas/Maxim CRC-8 (x^8 + x^5 + x^4 + 1).
const DALLAS_CRC8_POLY: u8 = 0x8C;

/// Compute the Dallas/Maxim one-wire CRC-8 over `bytes`.
///
/// # Examples
///
/// ```
/// use doorkey_hardware::token::dallas_crc8;
///
/// assert_eq!(dallas_crc8(&[0x02, 0x1C, 0xB8, 0x01, 0x00, 0x00, 0x00]), 0xA2);
/// ```
#[must_use]
pub fn dallas_crc8(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |mut crc, &byte| {
        crc ^= byte;
        for _ in 0..8 {
            crc = if crc & 0x01 != 0 {
                (crc >> 1) ^ DALLAS_CRC8_POLY
            } else {
                crc >> 1
            };
        }
        crc
    })
}

/// Check the trailing CRC-8 byte of a ROM code.
#[must_use]
pub fn rom_code_is_valid(rom: &[u8; ROM_CODE_LENGTH]) -> bool {
    dallas_crc8(&rom[..ROM_CODE_LENGTH - 1]) == rom[ROM_CODE_LENGTH - 1]
}

/// Presence tracker for a contact key token.
#[derive(Debug)]
pub struct TokenReader<B> {
    bus: B,
    search_interval_ms: u32,
    keep_interval_ms: u32,
    snapshot: TokenSnapshot,
    last_search: Option<Millis>,
    last_seen: Millis,
}

impl<B: OneWireBus> TokenReader<B> {
    /// Create a reader searching every `search_interval_ms` and forgetting a
    /// token `keep_interval_ms` after it was last seen.
    pub fn new(bus: B, search_interval_ms: u32, keep_interval_ms: u32) -> Self {
        Self {
            bus,
            search_interval_ms,
            keep_interval_ms,
            snapshot: TokenSnapshot::absent(),
            last_search: None,
            last_seen: Millis::default(),
        }
    }

    /// Create a reader with the default timing.
    pub fn with_defaults(bus: B) -> Self {
        Self::new(bus, DEFAULT_TOKEN_SEARCH_INTERVAL_MS, DEFAULT_TOKEN_KEEP_INTERVAL_MS)
    }

    /// Run one presence check if the search interval has elapsed.
    ///
    /// The first call always searches.
    pub fn poll(&mut self, now: Millis) {
        if let Some(last) = self.last_search
            && !now.has_elapsed(last, self.search_interval_ms)
        {
            return;
        }
        self.last_search = Some(now);

        match self.bus.search() {
            Ok(Some(rom)) if rom_code_is_valid(&rom) => {
                let snapshot = TokenSnapshot::from_rom_code(&rom);
                if snapshot != self.snapshot {
                    debug!(family_code = snapshot.family_code, serial = %snapshot.serial_number, "token detected");
                }
                self.snapshot = snapshot;
                self.last_seen = now;
            }
            Ok(Some(rom)) => {
                trace!(?rom, "rom code crc mismatch, ignored");
                self.not_found(now);
            }
            Ok(None) => self.not_found(now),
            Err(e) => {
                warn!(error = %e, "token search failed");
                self.not_found(now);
            }
        }
    }

    fn not_found(&mut self, now: Millis) {
        if self.snapshot.present && now.has_elapsed(self.last_seen, self.keep_interval_ms) {
            debug!("token removed");
            self.snapshot = TokenSnapshot::absent();
        }
    }

    /// Copy of the current token state.
    pub fn snapshot(&self) -> TokenSnapshot {
        self.snapshot
    }

    /// Borrow the underlying bus.
    pub fn bus(&self) -> &B {
        &self.bus
    }
}
