//! Command identifiers for the door bus protocol.
//!
//! Every request carries a one-byte command identifier right after the
//! version and address bytes. The identifier determines, exactly, how many
//! payload bytes follow and how many bytes the response payload has:
//!
//! | Command | Id | Request payload | Response payload |
//! |---------|----|-----------------|------------------|
//! | `Ping` | `0x01` | 2 echo bytes | the same 2 bytes |
//! | `GetStatus` | `0x02` | none | present, family code, 6 serial bytes |
//! | `UnlockDoor` | `0x03` | none | none |
//! | `RejectKey` | `0x04` | none | none |
//!
//! # Examples
//!
//! ```
//! use doorkey_protocol::CommandId;
//!
//! let id = CommandId::from_u8(0x03).unwrap();
//! assert_eq!(id, CommandId::UnlockDoor);
//! assert_eq!(id.payload_len(), 0);
//!
//! assert!(CommandId::from_u8(0x7F).is_err());
//! ```

use doorkey_core::{Error, Result, constants::*};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Command identifiers understood by a door node.
///
/// The set is closed: any other identifier invalidates the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum CommandId {
    /// Echo request.
    Ping = COMMAND_PING,

    /// Key token status query.
    GetStatus = COMMAND_GET_STATUS,

    /// Engage the door strike and show green.
    UnlockDoor = COMMAND_UNLOCK_DOOR,

    /// Show red.
    RejectKey = COMMAND_REJECT_KEY,
}

impl CommandId {
    /// All command identifiers, in wire order.
    pub const ALL: [CommandId; 4] = [
        CommandId::Ping,
        CommandId::GetStatus,
        CommandId::UnlockDoor,
        CommandId::RejectKey,
    ];

    /// Look up a command identifier from its wire byte.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownCommand` if the byte is not a known identifier.
    pub fn from_u8(value: u8) -> Result<Self> {
        match value {
            COMMAND_PING => Ok(CommandId::Ping),
            COMMAND_GET_STATUS => Ok(CommandId::GetStatus),
            COMMAND_UNLOCK_DOOR => Ok(CommandId::UnlockDoor),
            COMMAND_REJECT_KEY => Ok(CommandId::RejectKey),
            other => Err(Error::UnknownCommand(other)),
        }
    }

    /// Get the wire byte of this identifier.
    #[inline]
    #[must_use]
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Exact request payload length registered for this command.
    #[must_use]
    pub fn payload_len(self) -> usize {
        match self {
            CommandId::Ping => PING_PAYLOAD_LENGTH,
            CommandId::GetStatus | CommandId::UnlockDoor | CommandId::RejectKey => 0,
        }
    }

    /// Exact response payload length produced for this command.
    #[must_use]
    pub fn response_len(self) -> usize {
        match self {
            CommandId::Ping => PING_PAYLOAD_LENGTH,
            CommandId::GetStatus => STATUS_PAYLOAD_LENGTH,
            CommandId::UnlockDoor | CommandId::RejectKey => 0,
        }
    }

    /// Human readable command name used in diagnostics.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            CommandId::Ping => "ping",
            CommandId::GetStatus => "get status",
            CommandId::UnlockDoor => "unlock door",
            CommandId::RejectKey => "reject key",
        }
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl TryFrom<u8> for CommandId {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        CommandId::from_u8(value)
    }
}
