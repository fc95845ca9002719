//! Request validation and command routing.
//!
//! The dispatcher receives the payload of every verified frame seen on the
//! bus. It validates, in order and stopping at the first failure:
//!
//! 1. at least 3 bytes (version, address, command id)
//! 2. protocol version equals [`PROTOCOL_VERSION`]
//! 3. device address equals this node's address
//! 4. command id is known
//! 5. payload length equals the length registered for the command
//!
//! A message failing any check is discarded. Discards never touch actuator
//! state and never produce a response. Every discard reason except an
//! address mismatch leaves a debug note; traffic for other nodes is normal on
//! a shared bus and is dropped without a trace.

use doorkey_core::{DeviceAddress, Error, Result, constants::PROTOCOL_VERSION};
use doorkey_protocol::{Command, CommandId, RawRequest};
use tracing::{debug, trace};

/// Validates raw messages for one device address.
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher {
    address: DeviceAddress,
    version: u8,
}

impl Dispatcher {
    /// Dispatcher for `address` speaking the compiled protocol version.
    pub fn new(address: DeviceAddress) -> Self {
        Self {
            address,
            version: PROTOCOL_VERSION,
        }
    }

    /// Address this dispatcher accepts.
    pub fn address(&self) -> DeviceAddress {
        self.address
    }

    /// Validate `message` and decode its command.
    ///
    /// # Errors
    ///
    /// Returns the error of the first failing check: `MessageTooShort`,
    /// `VersionMismatch`, `AddressMismatch`, `UnknownCommand` or
    /// `InvalidPayloadLength`.
    pub fn validate(&self, message: &[u8]) -> Result<Command> {
        let raw = RawRequest::split(message)?;

        if raw.version != self.version {
            return Err(Error::VersionMismatch {
                expected: self.version,
                actual: raw.version,
            });
        }

        if raw.address != self.address.as_u8() {
            return Err(Error::AddressMismatch {
                expected: self.address.as_u8(),
                actual: raw.address,
            });
        }

        let id = CommandId::from_u8(raw.command_id)?;
        Command::decode(id, raw.payload)
    }

    /// Validate `message`, logging why it was discarded if it was.
    ///
    /// Returns the decoded command when every check passes.
    pub fn dispatch(&self, message: &[u8]) -> Option<Command> {
        match self.validate(message) {
            Ok(command) => {
                trace!(command = %command.id(), "command accepted");
                Some(command)
            }
            Err(e) => {
                if let Some(reason) = discard_reason(&e) {
                    debug!(error = %e, "{reason}");
                }
                None
            }
        }
    }
}

/// Diagnostic note for a discarded message, `None` for traffic addressed to
/// another node.
fn discard_reason(error: &Error) -> Option<&'static str> {
    match error {
        Error::AddressMismatch { .. } => None,
        Error::MessageTooShort { .. } => Some("too short"),
        Error::VersionMismatch { .. } => Some("invalid protocol"),
        Error::UnknownCommand(_) => Some("invalid command"),
        Error::InvalidPayloadLength { .. } => Some("invalid command length"),
        _ => Some("message discarded"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doorkey_core::constants::*;
    use doorkey_protocol::PingRequest;
    use rstest::rstest;

    const ADDR: u8 = 5;

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(DeviceAddress::new(ADDR))
    }

    #[rstest]
    #[case(&[])]
    #[case(&[PROTOCOL_VERSION])]
    #[case(&[PROTOCOL_VERSION, ADDR])]
    fn test_too_short(#[case] message: &[u8]) {
        assert!(matches!(
            dispatcher().validate(message),
            Err(Error::MessageTooShort { .. })
        ));
        assert_eq!(dispatcher().dispatch(message), None);
    }

    #[test]
    fn test_version_checked_before_address() {
        let message = [PROTOCOL_VERSION + 1, ADDR + 1, COMMAND_PING];
        assert!(matches!(
            dispatcher().validate(&message),
            Err(Error::VersionMismatch { expected: 1, actual: 2 })
        ));
    }

    #[test]
    fn test_address_checked_before_command() {
        let message = [PROTOCOL_VERSION, ADDR + 1, 0xEE];
        assert!(matches!(
            dispatcher().validate(&message),
            Err(Error::AddressMismatch { .. })
        ));
    }

    #[test]
    fn test_command_checked_before_length() {
        let message = [PROTOCOL_VERSION, ADDR, 0xEE, 0x00, 0x00, 0x00];
        assert!(matches!(
            dispatcher().validate(&message),
            Err(Error::UnknownCommand(0xEE))
        ));
    }

    #[rstest]
    #[case(&[PROTOCOL_VERSION, ADDR, COMMAND_PING, 0xAA])]
    #[case(&[PROTOCOL_VERSION, ADDR, COMMAND_PING, 0xAA, 0xBB, 0xCC])]
    #[case(&[PROTOCOL_VERSION, ADDR, COMMAND_GET_STATUS, 0x00])]
    #[case(&[PROTOCOL_VERSION, ADDR, COMMAND_UNLOCK_DOOR, 0x00])]
    #[case(&[PROTOCOL_VERSION, ADDR, COMMAND_REJECT_KEY, 0x00, 0x00])]
    fn test_wrong_length(#[case] message: &[u8]) {
        assert!(matches!(
            dispatcher().validate(message),
            Err(Error::InvalidPayloadLength { .. })
        ));
    }

    #[rstest]
    #[case(&[PROTOCOL_VERSION, ADDR, COMMAND_PING, 0xAA, 0xBB], Command::Ping(PingRequest::new([0xAA, 0xBB])))]
    #[case(&[PROTOCOL_VERSION, ADDR, COMMAND_GET_STATUS], Command::GetStatus)]
    #[case(&[PROTOCOL_VERSION, ADDR, COMMAND_UNLOCK_DOOR], Command::UnlockDoor)]
    #[case(&[PROTOCOL_VERSION, ADDR, COMMAND_REJECT_KEY], Command::RejectKey)]
    fn test_valid_messages(#[case] message: &[u8], #[case] expected: Command) {
        assert_eq!(dispatcher().dispatch(message), Some(expected));
    }

    #[rstest]
    #[case(&[PROTOCOL_VERSION, ADDR], Some("too short"))]
    #[case(&[PROTOCOL_VERSION + 1, ADDR, COMMAND_PING], Some("invalid protocol"))]
    #[case(&[PROTOCOL_VERSION, ADDR + 1, COMMAND_PING], None)]
    #[case(&[PROTOCOL_VERSION, ADDR, 0xEE], Some("invalid command"))]
    #[case(&[PROTOCOL_VERSION, ADDR, COMMAND_UNLOCK_DOOR, 0x00], Some("invalid command length"))]
    fn test_discard_reasons(#[case] message: &[u8], #[case] expected: Option<&str>) {
        let error = dispatcher().validate(message).unwrap_err();
        assert_eq!(discard_reason(&error), expected);
    }

    #[test]
    fn test_other_errors_are_not_labelled_as_length() {
        let error = Error::ChecksumMismatch {
            expected: 0x1234,
            actual: 0x4321,
        };
        assert_eq!(discard_reason(&error), Some("message discarded"));
    }

    #[test]
    fn test_other_address_is_discarded() {
        let message = [PROTOCOL_VERSION, ADDR + 1, COMMAND_UNLOCK_DOOR];
        assert_eq!(dispatcher().dispatch(&message), None);
    }
}
