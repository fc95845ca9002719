//! Typed request records.
//!
//! A received frame is first split into a [`RawRequest`] (header bytes plus
//! a borrowed payload slice) and then, once the header has been checked,
//! turned into an owned [`Command`] by [`Command::decode`]. Decoding checks
//! the payload length before copying any field, so a wrong-sized payload
//! never produces a partially filled record.

use crate::commands::CommandId;
use doorkey_core::{DeviceAddress, Error, Result, constants::*};

/// Echo payload of a ping request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PingRequest {
    pub data: [u8; PING_PAYLOAD_LENGTH],
}

impl PingRequest {
    pub fn new(data: [u8; PING_PAYLOAD_LENGTH]) -> Self {
        Self { data }
    }
}

/// A validated command, decoded from the payload that follows the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Ping(PingRequest),
    GetStatus,
    UnlockDoor,
    RejectKey,
}

impl Command {
    /// Decode the command-specific payload for `id`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidPayloadLength` if `payload` is not exactly
    /// [`CommandId::payload_len`] bytes long.
    ///
    /// # Examples
    ///
    /// ```
    /// use doorkey_protocol::{Command, CommandId, PingRequest};
    ///
    /// let cmd = Command::decode(CommandId::Ping, &[0xAA, 0xBB]).unwrap();
    /// assert_eq!(cmd, Command::Ping(PingRequest::new([0xAA, 0xBB])));
    ///
    /// assert!(Command::decode(CommandId::UnlockDoor, &[0x00]).is_err());
    /// ```
    pub fn decode(id: CommandId, payload: &[u8]) -> Result<Self> {
        let expected = id.payload_len();
        if payload.len() != expected {
            return Err(Error::InvalidPayloadLength {
                command: id.name(),
                expected,
                actual: payload.len(),
            });
        }

        let command = match id {
            CommandId::Ping => {
                let mut data = [0u8; PING_PAYLOAD_LENGTH];
                data.copy_from_slice(payload);
                Command::Ping(PingRequest { data })
            }
            CommandId::GetStatus => Command::GetStatus,
            CommandId::UnlockDoor => Command::UnlockDoor,
            CommandId::RejectKey => Command::RejectKey,
        };
        Ok(command)
    }

    /// Identifier of this command.
    #[must_use]
    pub fn id(&self) -> CommandId {
        match self {
            Command::Ping(_) => CommandId::Ping,
            Command::GetStatus => CommandId::GetStatus,
            Command::UnlockDoor => CommandId::UnlockDoor,
            Command::RejectKey => CommandId::RejectKey,
        }
    }

    /// Command-specific payload bytes.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        match self {
            Command::Ping(ping) => &ping.data,
            Command::GetStatus | Command::UnlockDoor | Command::RejectKey => &[],
        }
    }

    /// Encode a complete request message for a bus master.
    ///
    /// # Examples
    ///
    /// ```
    /// use doorkey_core::DeviceAddress;
    /// use doorkey_protocol::Command;
    ///
    /// let bytes = Command::UnlockDoor.encode_request(1, DeviceAddress::new(7));
    /// assert_eq!(bytes, vec![1, 7, 0x03]);
    /// ```
    #[must_use]
    pub fn encode_request(&self, version: u8, address: DeviceAddress) -> Vec<u8> {
        let payload = self.payload();
        let mut bytes = Vec::with_capacity(REQUEST_HEADER_LEN + payload.len());
        bytes.push(version);
        bytes.push(address.as_u8());
        bytes.push(self.id().as_u8());
        bytes.extend_from_slice(payload);
        bytes
    }
}

/// Borrowed view of a received message split at the request header.
///
/// Only the header length is checked; version, address and command identity
/// are left to the caller so it can apply its own validation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawRequest<'a> {
    pub version: u8,
    pub address: u8,
    pub command_id: u8,
    pub payload: &'a [u8],
}

impl<'a> RawRequest<'a> {
    /// Split a message into header fields and payload.
    ///
    /// # Errors
    ///
    /// Returns `Error::MessageTooShort` if fewer than
    /// [`REQUEST_HEADER_LEN`] bytes are present.
    pub fn split(bytes: &'a [u8]) -> Result<Self> {
        match bytes {
            [version, address, command_id, payload @ ..] => Ok(Self {
                version: *version,
                address: *address,
                command_id: *command_id,
                payload,
            }),
            _ => Err(Error::MessageTooShort {
                len: bytes.len(),
                min: REQUEST_HEADER_LEN,
            }),
        }
    }
}
