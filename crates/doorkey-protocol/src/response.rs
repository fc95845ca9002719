//! Typed response records.
//!
//! Responses are built fresh for every dispatched request and carry no
//! command identifier on the wire: the bus master knows which command it
//! sent and decodes the payload accordingly with [`Response::decode`].
//!
//! ```text
//! [protocol_version:1][device_address:1][response_payload:fixed-per-command]
//! ```

use crate::commands::CommandId;
use doorkey_core::{
    DeviceAddress, Error, Result, SerialNumber, TokenSnapshot,
    constants::{PING_PAYLOAD_LENGTH, RESPONSE_HEADER_LEN, SERIAL_NUMBER_LENGTH},
};

/// Response produced by a command handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    /// Echo of the ping payload.
    Pong { data: [u8; PING_PAYLOAD_LENGTH] },

    /// Current key token snapshot.
    Status(TokenSnapshot),

    /// Acknowledgment of an unlock-door request (empty payload).
    DoorUnlocked,

    /// Acknowledgment of a reject-key request (empty payload).
    KeyRejected,
}

impl Response {
    /// Identifier of the command this response answers.
    #[must_use]
    pub fn command_id(&self) -> CommandId {
        match self {
            Response::Pong { .. } => CommandId::Ping,
            Response::Status(_) => CommandId::GetStatus,
            Response::DoorUnlocked => CommandId::UnlockDoor,
            Response::KeyRejected => CommandId::RejectKey,
        }
    }

    /// Wire payload of this response.
    ///
    /// A status payload is `[present, family_code, serial_number..]` with the
    /// present flag encoded as `0x00`/`0x01`.
    #[must_use]
    pub fn payload(&self) -> Vec<u8> {
        match self {
            Response::Pong { data } => data.to_vec(),
            Response::Status(snapshot) => {
                let mut bytes = Vec::with_capacity(self.command_id().response_len());
                bytes.push(u8::from(snapshot.present));
                bytes.push(snapshot.family_code);
                bytes.extend_from_slice(snapshot.serial_number.as_bytes());
                bytes
            }
            Response::DoorUnlocked | Response::KeyRejected => Vec::new(),
        }
    }

    /// Decode a response payload, given the command that was sent.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidPayloadLength` if the payload does not have the
    /// fixed response length of `command`.
    ///
    /// # Examples
    ///
    /// ```
    /// use doorkey_protocol::{CommandId, Response};
    ///
    /// let response = Response::decode(CommandId::Ping, &[0xAA, 0xBB]).unwrap();
    /// assert_eq!(response, Response::Pong { data: [0xAA, 0xBB] });
    /// ```
    pub fn decode(command: CommandId, payload: &[u8]) -> Result<Self> {
        let expected = command.response_len();
        if payload.len() != expected {
            return Err(Error::InvalidPayloadLength {
                command: command.name(),
                expected,
                actual: payload.len(),
            });
        }

        let response = match command {
            CommandId::Ping => {
                let mut data = [0u8; PING_PAYLOAD_LENGTH];
                data.copy_from_slice(payload);
                Response::Pong { data }
            }
            CommandId::GetStatus => {
                let serial = SerialNumber::from_slice(&payload[2..2 + SERIAL_NUMBER_LENGTH])?;
                Response::Status(TokenSnapshot {
                    present: payload[0] != 0,
                    family_code: payload[1],
                    serial_number: serial,
                })
            }
            CommandId::UnlockDoor => Response::DoorUnlocked,
            CommandId::RejectKey => Response::KeyRejected,
        };
        Ok(response)
    }
}

/// Header of a response message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseHeader {
    pub version: u8,
    pub address: DeviceAddress,
}

impl ResponseHeader {
    pub fn new(version: u8, address: DeviceAddress) -> Self {
        Self { version, address }
    }

    /// Split a response message into header and payload.
    ///
    /// # Errors
    ///
    /// Returns `Error::MessageTooShort` if the message is shorter than the
    /// two header bytes.
    pub fn split(bytes: &[u8]) -> Result<(Self, &[u8])> {
        match bytes {
            [version, address, payload @ ..] => Ok((
                Self {
                    version: *version,
                    address: DeviceAddress::new(*address),
                },
                payload,
            )),
            _ => Err(Error::MessageTooShort {
                len: bytes.len(),
                min: RESPONSE_HEADER_LEN,
            }),
        }
    }
}

/// Encode a complete response message: header followed by payload.
///
/// # Examples
///
/// ```
/// use doorkey_core::DeviceAddress;
/// use doorkey_protocol::{Response, encode_response};
///
/// let bytes = encode_response(1, DeviceAddress::new(4), &Response::DoorUnlocked);
/// assert_eq!(bytes, vec![1, 4]);
/// ```
#[must_use]
pub fn encode_response(version: u8, address: DeviceAddress, response: &Response) -> Vec<u8> {
    let payload = response.payload();
    let mut bytes = Vec::with_capacity(RESPONSE_HEADER_LEN + payload.len());
    bytes.push(version);
    bytes.push(address.as_u8());
    bytes.extend_from_slice(&payload);
    bytes
}
