//! Error types for hardware operations.
//!
//! This module defines the error type shared by every peripheral of a door
//! node: digital output pins, the serial transport, the one-wire token bus
//! and their configuration.

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur during hardware device operations.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// Writing a digital output failed.
    #[error("Pin error on {pin}: {message}")]
    PinError { pin: String, message: String },

    /// Serial transport read, write or drain failed.
    #[error("Transport error: {message}")]
    TransportError { message: String },

    /// One-wire search failed.
    #[error("One-wire error: {message}")]
    OneWireError { message: String },

    /// Device is not connected or has been disconnected.
    #[error("Device disconnected: {device}")]
    Disconnected { device: String },

    /// Device configuration error.
    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HardwareError {
    /// Create a new pin error.
    pub fn pin(pin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::PinError {
            pin: pin.into(),
            message: message.into(),
        }
    }

    /// Create a new transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::TransportError {
            message: message.into(),
        }
    }

    /// Create a new one-wire error.
    pub fn one_wire(message: impl Into<String>) -> Self {
        Self::OneWireError {
            message: message.into(),
        }
    }

    /// Create a new disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    /// Create a new configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
        }
    }
}

#[cfg(feature = "hardware-serial")]
impl From<serialport::Error> for HardwareError {
    fn from(err: serialport::Error) -> Self {
        match err.kind() {
            serialport::ErrorKind::NoDevice => Self::disconnected(err.description),
            serialport::ErrorKind::InvalidInput => Self::configuration(err.description),
            _ => Self::transport(err.description),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pin_error() {
        let error = HardwareError::pin("relay", "gpio write failed");
        assert!(matches!(error, HardwareError::PinError { .. }));
        assert_eq!(error.to_string(), "Pin error on relay: gpio write failed");
    }

    #[test]
    fn test_transport_error() {
        let error = HardwareError::transport("drain failed");
        assert_eq!(error.to_string(), "Transport error: drain failed");
    }

    #[test]
    fn test_one_wire_error() {
        let error = HardwareError::one_wire("bus shorted");
        assert_eq!(error.to_string(), "One-wire error: bus shorted");
    }

    #[test]
    fn test_disconnected_error() {
        let error = HardwareError::disconnected("/dev/ttyUSB0");
        assert_eq!(error.to_string(), "Device disconnected: /dev/ttyUSB0");
    }

    #[test]
    fn test_configuration_error() {
        let error = HardwareError::configuration("baud rate 0");
        assert_eq!(error.to_string(), "Configuration error: baud rate 0");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let error: HardwareError = io_error.into();
        assert!(matches!(error, HardwareError::Io(_)));
        assert!(error.to_string().contains("pipe closed"));
    }
}
