//! Error types for node assembly and operation.

use doorkey_hardware::HardwareError;

/// Result type alias for node operations.
pub type Result<T> = std::result::Result<T, NodeError>;

/// Errors surfaced while building or driving a node.
///
/// The loop itself never stops on these: a failed pin write or transmit is
/// logged and the next tick tries again.
#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    /// A peripheral failed.
    #[error("Hardware error: {0}")]
    Hardware(#[from] HardwareError),

    /// Invalid configuration or protocol-level failure.
    #[error(transparent)]
    Core(#[from] doorkey_core::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hardware_error_wraps() {
        let error: NodeError = HardwareError::transport("drain failed").into();
        assert_eq!(
            error.to_string(),
            "Hardware error: Transport error: drain failed"
        );
    }

    #[test]
    fn test_core_error_is_transparent() {
        let error: NodeError = doorkey_core::Error::Config("bad".to_string()).into();
        assert_eq!(error.to_string(), "Configuration error: bad");
    }
}
