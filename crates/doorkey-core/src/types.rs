use crate::{
    Result,
    constants::{ROM_CODE_LENGTH, SERIAL_NUMBER_LENGTH},
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Device address distinguishing one node's traffic on the shared bus.
///
/// Every byte value is a valid address; the node only answers frames whose
/// second byte equals its own address.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceAddress(u8);

impl DeviceAddress {
    /// Create a device address.
    #[must_use]
    pub const fn new(address: u8) -> Self {
        DeviceAddress(address)
    }

    /// Get the raw address byte.
    #[must_use]
    pub const fn as_u8(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u8> for DeviceAddress {
    fn from(value: u8) -> Self {
        DeviceAddress(value)
    }
}

impl std::str::FromStr for DeviceAddress {
    type Err = Error;

    /// Parse a decimal (`"12"`) or hexadecimal (`"0x0C"`) address.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some(hex) => u8::from_str_radix(hex, 16),
            None => s.parse::<u8>(),
        };
        parsed
            .map(DeviceAddress)
            .map_err(|_| Error::Config(format!("Invalid device address: {s}")))
    }
}

/// Milliseconds on a free-running, wrapping 32-bit clock.
///
/// Timestamps are only ever compared through [`Millis::elapsed_since`], which
/// uses wrapping subtraction so hold windows stay correct across the ~49.7 day
/// wraparound of the counter.
///
/// # Examples
///
/// ```
/// use doorkey_core::Millis;
///
/// let before_wrap = Millis::new(u32::MAX - 9);
/// let after_wrap = before_wrap.wrapping_add(20);
///
/// assert_eq!(after_wrap.as_u32(), 10);
/// assert_eq!(after_wrap.elapsed_since(before_wrap), 20);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Millis(u32);

impl Millis {
    /// Create a timestamp from a raw millisecond counter value.
    #[must_use]
    pub const fn new(ms: u32) -> Self {
        Millis(ms)
    }

    /// Get the raw counter value.
    #[must_use]
    pub const fn as_u32(&self) -> u32 {
        self.0
    }

    /// Milliseconds elapsed from `earlier` to `self`, wrap-safe.
    #[inline]
    #[must_use]
    pub const fn elapsed_since(&self, earlier: Millis) -> u32 {
        self.0.wrapping_sub(earlier.0)
    }

    /// Returns `true` once at least `duration_ms` have passed since `earlier`.
    #[inline]
    #[must_use]
    pub const fn has_elapsed(&self, earlier: Millis, duration_ms: u32) -> bool {
        self.elapsed_since(earlier) >= duration_ms
    }

    /// Timestamp `ms` later than this one, wrapping at `u32::MAX`.
    #[inline]
    #[must_use]
    pub const fn wrapping_add(&self, ms: u32) -> Millis {
        Millis(self.0.wrapping_add(ms))
    }
}

impl fmt::Display for Millis {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

impl From<u32> for Millis {
    fn from(value: u32) -> Self {
        Millis(value)
    }
}

/// 48-bit serial number of a key token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SerialNumber([u8; SERIAL_NUMBER_LENGTH]);

impl SerialNumber {
    /// All-zero serial number reported while no token is present.
    pub const ZERO: SerialNumber = SerialNumber([0; SERIAL_NUMBER_LENGTH]);

    /// Create a serial number from its raw bytes.
    #[must_use]
    pub const fn new(bytes: [u8; SERIAL_NUMBER_LENGTH]) -> Self {
        SerialNumber(bytes)
    }

    /// Create a serial number from a slice.
    ///
    /// # Errors
    /// Returns `Error::InvalidPayloadLength` if the slice is not exactly
    /// [`SERIAL_NUMBER_LENGTH`] bytes long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let array: [u8; SERIAL_NUMBER_LENGTH] =
            bytes.try_into().map_err(|_| Error::InvalidPayloadLength {
                command: "serial number",
                expected: SERIAL_NUMBER_LENGTH,
                actual: bytes.len(),
            })?;
        Ok(SerialNumber(array))
    }

    /// Get the raw serial number bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; SERIAL_NUMBER_LENGTH] {
        &self.0
    }
}

impl fmt::Display for SerialNumber {
    /// Formats as space separated uppercase hex bytes (`11 22 33 44 55 66`).
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{byte:02X}")?;
        }
        Ok(())
    }
}

/// Read-only view of the key token currently in contact with the reader.
///
/// Produced by the token reader, consumed by the get-status handler. Handlers
/// never mutate it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSnapshot {
    /// Whether a token is currently considered present.
    pub present: bool,

    /// One-wire family code of the token.
    pub family_code: u8,

    /// Serial number of the token.
    pub serial_number: SerialNumber,
}

impl TokenSnapshot {
    /// Snapshot reported while no token is in contact.
    #[must_use]
    pub const fn absent() -> Self {
        Self {
            present: false,
            family_code: 0,
            serial_number: SerialNumber::ZERO,
        }
    }

    /// Snapshot of a present token.
    #[must_use]
    pub const fn present(family_code: u8, serial_number: SerialNumber) -> Self {
        Self {
            present: true,
            family_code,
            serial_number,
        }
    }

    /// Build a present snapshot from a one-wire ROM code.
    ///
    /// The ROM layout is `[family, serial0..serial5, crc]`; the CRC byte is
    /// not checked here.
    #[must_use]
    pub fn from_rom_code(rom: &[u8; ROM_CODE_LENGTH]) -> Self {
        let mut serial = [0u8; SERIAL_NUMBER_LENGTH];
        serial.copy_from_slice(&rom[1..=SERIAL_NUMBER_LENGTH]);
        Self::present(rom[0], SerialNumber::new(serial))
    }
}

impl fmt::Display for TokenSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.present {
            write!(
                f,
                "serial number: {}  family code: 0x{:02X}",
                self.serial_number, self.family_code
            )
        } else {
            write!(f, "no token")
        }
    }
}
