//! Core constants for the door bus protocol.
//!
//! This module defines the protocol-level constants shared by every crate in
//! the workspace: the protocol version byte, the framing bytes used on the
//! RS-485 line, the fixed payload sizes and the default actuator timings.
//!
//! # Message Structure
//!
//! A request decoded from one frame has the layout:
//!
//! ```text
//! [protocol_version:1][device_address:1][command_id:1][payload:fixed-per-command]
//! ```
//!
//! and the matching response:
//!
//! ```text
//! [protocol_version:1][device_address:1][response_payload:fixed-per-command]
//! ```
//!
//! # Usage
//!
//! ```
//! use doorkey_core::constants::*;
//!
//! assert_eq!(REQUEST_HEADER_LEN, 3);
//! assert_eq!(RESPONSE_HEADER_LEN, 2);
//! assert!(MAX_FRAME_PAYLOAD >= REQUEST_HEADER_LEN + PING_PAYLOAD_LENGTH);
//! ```
//!
//! # Compatibility
//!
//! Every node on a bus must agree on [`PROTOCOL_VERSION`] and the framing
//! constants. Changing them splits the bus into incompatible populations.

// ============================================================================
// Protocol Identification
// ============================================================================

/// Protocol version byte carried as the first byte of every message.
///
/// Frames carrying a different version belong to nodes speaking another
/// revision of the protocol and are discarded.
pub const PROTOCOL_VERSION: u8 = 1;

/// Number of header bytes in a request (version, address, command id).
pub const REQUEST_HEADER_LEN: usize = 3;

/// Number of header bytes in a response (version, address).
pub const RESPONSE_HEADER_LEN: usize = 2;

// ============================================================================
// Command Identifiers
// ============================================================================

/// Ping: echoes its payload back.
pub const COMMAND_PING: u8 = 0x01;

/// Get status: reports the current key token snapshot.
pub const COMMAND_GET_STATUS: u8 = 0x02;

/// Unlock door: engages the relay and lights the green indicator.
pub const COMMAND_UNLOCK_DOOR: u8 = 0x03;

/// Reject key: lights the red indicator.
pub const COMMAND_REJECT_KEY: u8 = 0x04;

// ============================================================================
// Payload Sizes
// ============================================================================

/// Number of opaque echo bytes in a ping request and its response.
pub const PING_PAYLOAD_LENGTH: usize = 2;

/// Number of serial number bytes of a key token (48-bit serial).
pub const SERIAL_NUMBER_LENGTH: usize = 6;

/// Length of a one-wire ROM code: family code, serial number, CRC-8.
pub const ROM_CODE_LENGTH: usize = 1 + SERIAL_NUMBER_LENGTH + 1;

/// Length of a status response payload: present flag, family code, serial.
pub const STATUS_PAYLOAD_LENGTH: usize = 1 + 1 + SERIAL_NUMBER_LENGTH;

// ============================================================================
// Message Framing
// ============================================================================

/// Frame delimiter byte.
///
/// Marks both the start and the end of a frame. Back-to-back flags are idle
/// fill and never produce an empty frame.
///
/// ```text
/// 0x7E <stuffed payload> <stuffed crc lo> <stuffed crc hi> 0x7E
/// ```
pub const FRAME_FLAG: u8 = 0x7E;

/// Control escape byte.
///
/// A payload or CRC byte equal to [`FRAME_FLAG`] or [`FRAME_ESCAPE`] is sent
/// as `FRAME_ESCAPE` followed by the byte XOR [`FRAME_ESCAPE_XOR`].
pub const FRAME_ESCAPE: u8 = 0x7D;

/// Value XORed into an escaped byte.
pub const FRAME_ESCAPE_XOR: u8 = 0x20;

/// Length of the frame check sequence (CRC-16) in bytes.
pub const FRAME_CRC_LEN: usize = 2;

/// Maximum payload bytes (excluding the CRC) accepted in one received frame.
///
/// The two CRC bytes come on top, so a frame body holds up to 18 bytes before
/// it is dropped. The largest message, a status response, needs 10.
pub const MAX_FRAME_PAYLOAD: usize = 16;

// ============================================================================
// Addressing
// ============================================================================

/// Device address used when none is configured.
pub const DEFAULT_DEVICE_ADDRESS: u8 = 0;

// ============================================================================
// Timing Configuration (milliseconds)
// ============================================================================

/// How long the door strike relay stays engaged after an unlock.
pub const DEFAULT_RELAY_HOLD_MS: u32 = 5000;

/// How long the green or red indicator stays lit after activation.
pub const DEFAULT_INDICATOR_HOLD_MS: u32 = 5000;

/// Interval between one-wire presence searches of the token reader.
pub const DEFAULT_TOKEN_SEARCH_INTERVAL_MS: u32 = 50;

/// How long a token is remembered after it stops answering searches.
pub const DEFAULT_TOKEN_KEEP_INTERVAL_MS: u32 = 2000;

/// Interval between diagnostic reports of a present token.
pub const TOKEN_REPORT_INTERVAL_MS: u32 = 100;

// ============================================================================
// Serial Line
// ============================================================================

/// Default baud rate of the shared bus.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;
