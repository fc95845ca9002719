//! Byte-level framing for the shared serial bus.
//!
//! Messages travel inside HDLC-style asynchronous frames: a flag byte opens
//! and closes each frame, bytes colliding with the flag or escape byte are
//! stuffed, and a CRC-16/CCITT frame check sequence protects the payload.
//!
//! # Wire Format
//!
//! ```text
//! 0x7E | stuffed(payload ++ crc_lo ++ crc_hi) | 0x7E
//! ```
//!
//! Stuffing replaces `0x7E` with `0x7D 0x5E` and `0x7D` with `0x7D 0x5D`.
//! The CRC is CRC-16/CCITT-FALSE (poly `0x1021`, init `0xFFFF`) over the
//! unstuffed payload, appended little-endian.
//!
//! # Examples
//!
//! ```
//! use doorkey_protocol::{StreamParser, encode_frame};
//!
//! let wire = encode_frame(&[0x01, 0x00, 0x7E]);
//! assert_eq!(wire[0], 0x7E);
//! assert_eq!(*wire.last().unwrap(), 0x7E);
//!
//! let mut parser = StreamParser::new();
//! parser.feed(&wire);
//! assert_eq!(parser.next_frame().unwrap().payload(), &[0x01, 0x00, 0x7E]);
//! ```

use bytes::Bytes;
use doorkey_core::{
    Error, Result,
    constants::{FRAME_CRC_LEN, FRAME_ESCAPE, FRAME_ESCAPE_XOR, FRAME_FLAG},
};
use std::fmt;

/// Initial value of the CRC-16/CCITT-FALSE register.
const CRC16_INIT: u16 = 0xFFFF;

/// CRC-16/CCITT generator polynomial (x^16 + x^12 + x^5 + 1).
const CRC16_POLY: u16 = 0x1021;

/// Feed one byte into a running CRC-16/CCITT register.
#[inline]
fn crc16_update(mut crc: u16, byte: u8) -> u16 {
    crc ^= u16::from(byte) << 8;
    for _ in 0..8 {
        crc = if crc & 0x8000 != 0 {
            (crc << 1) ^ CRC16_POLY
        } else {
            crc << 1
        };
    }
    crc
}

/// Compute CRC-16/CCITT-FALSE over `bytes`.
///
/// # Examples
///
/// ```
/// use doorkey_protocol::crc16_ccitt;
///
/// assert_eq!(crc16_ccitt(b"123456789"), 0x29B1);
/// ```
#[must_use]
pub fn crc16_ccitt(bytes: &[u8]) -> u16 {
    bytes.iter().fold(CRC16_INIT, |crc, &b| crc16_update(crc, b))
}

/// Append `byte` to `out`, escaping it if it collides with a control byte.
#[inline]
fn push_stuffed(out: &mut Vec<u8>, byte: u8) {
    if byte == FRAME_FLAG || byte == FRAME_ESCAPE {
        out.push(FRAME_ESCAPE);
        out.push(byte ^ FRAME_ESCAPE_XOR);
    } else {
        out.push(byte);
    }
}

/// Incremental frame builder.
///
/// Mirrors a transmit-start / transmit-byte / transmit-end sequence: the CRC
/// is accumulated while bytes are pushed, so a header and a payload held in
/// different buffers can be framed without concatenating them first.
///
/// # Examples
///
/// ```
/// use doorkey_protocol::{FrameWriter, encode_frame};
///
/// let mut writer = FrameWriter::start();
/// writer.push_byte(0x01);
/// writer.push_byte(0x05);
/// writer.push_bytes(&[0xAA, 0xBB]);
///
/// assert_eq!(writer.finish(), encode_frame(&[0x01, 0x05, 0xAA, 0xBB]));
/// ```
#[derive(Debug, Clone)]
pub struct FrameWriter {
    out: Vec<u8>,
    crc: u16,
}

impl FrameWriter {
    /// Begin a new frame by emitting the opening flag.
    pub fn start() -> Self {
        let mut out = Vec::with_capacity(32);
        out.push(FRAME_FLAG);
        Self {
            out,
            crc: CRC16_INIT,
        }
    }

    /// Append one payload byte.
    pub fn push_byte(&mut self, byte: u8) {
        self.crc = crc16_update(self.crc, byte);
        push_stuffed(&mut self.out, byte);
    }

    /// Append several payload bytes.
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.push_byte(b);
        }
    }

    /// Append the frame check sequence and closing flag.
    ///
    /// Returns the complete wire bytes of the frame.
    #[must_use]
    pub fn finish(mut self) -> Vec<u8> {
        let [lo, hi] = self.crc.to_le_bytes();
        push_stuffed(&mut self.out, lo);
        push_stuffed(&mut self.out, hi);
        self.out.push(FRAME_FLAG);
        self.out
    }
}

/// Frame `payload` for transmission.
#[must_use]
pub fn encode_frame(payload: &[u8]) -> Vec<u8> {
    let mut writer = FrameWriter::start();
    writer.push_bytes(payload);
    writer.finish()
}

/// Check and strip the trailing CRC of an unstuffed frame body.
///
/// # Errors
///
/// Returns `Error::MessageTooShort` if the body cannot hold a CRC and
/// `Error::ChecksumMismatch` if the CRC does not match the payload.
pub(crate) fn verify_body(body: &[u8]) -> Result<&[u8]> {
    if body.len() < FRAME_CRC_LEN {
        return Err(Error::MessageTooShort {
            len: body.len(),
            min: FRAME_CRC_LEN,
        });
    }
    let (payload, fcs) = body.split_at(body.len() - FRAME_CRC_LEN);
    let received = u16::from_le_bytes([fcs[0], fcs[1]]);
    let computed = crc16_ccitt(payload);
    if computed != received {
        return Err(Error::ChecksumMismatch {
            expected: computed,
            actual: received,
        });
    }
    Ok(payload)
}

/// A received frame whose checksum has been verified.
///
/// Holds only the payload; flags, stuffing and CRC are already stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    data: Bytes,
}

impl Frame {
    /// Create a frame from an already verified payload.
    pub fn new(data: Bytes) -> Self {
        Frame { data }
    }

    /// Create a frame from a payload slice.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::new(Bytes::copy_from_slice(bytes))
    }

    /// Get the payload bytes.
    pub fn payload(&self) -> &[u8] {
        &self.data
    }

    /// Get the payload length in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Consume the frame and return its payload.
    pub fn into_bytes(self) -> Bytes {
        self.data
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.data.iter() {
            write!(f, "{byte:02X}")?;
        }
        Ok(())
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}
