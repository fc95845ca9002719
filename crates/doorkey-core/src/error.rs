use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Message validation errors
    #[error("Message too short: {len} bytes, need at least {min}")]
    MessageTooShort { len: usize, min: usize },

    #[error("Protocol version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: u8, actual: u8 },

    #[error("Device address mismatch: expected {expected}, got {actual}")]
    AddressMismatch { expected: u8, actual: u8 },

    #[error("Unknown command id: 0x{0:02X}")]
    UnknownCommand(u8),

    #[error("Invalid payload length for {command}: expected {expected}, got {actual}")]
    InvalidPayloadLength {
        command: &'static str,
        expected: usize,
        actual: usize,
    },

    // Framing errors
    #[error("Frame too large: {size} bytes (max {max_size})")]
    FrameTooLarge { size: usize, max_size: usize },

    #[error("Checksum mismatch: expected 0x{expected:04X}, got 0x{actual:04X}")]
    ChecksumMismatch { expected: u16, actual: u16 },

    #[error("Invalid escape sequence: 0x{0:02X}")]
    InvalidEscape(u8),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
