//! Error types for peripheral operations.
//!
//! Drivers report failures with [`PeripheralError`]. The ports in
//! [`crate::ports`] absorb them (log and continue), so only initialization
//! code ever propagates one to a caller.

/// Result type alias for peripheral operations.
pub type Result<T> = std::result::Result<T, PeripheralError>;

/// Errors that can occur while driving the actuator or the display.
#[derive(Debug, thiserror::Error)]
pub enum PeripheralError {
    /// The device (or the kernel interface behind it) is not present.
    #[error("Device unavailable: {device}")]
    Unavailable { device: String },

    /// A single bus or sysfs write failed.
    #[error("Transient I/O error: {message}")]
    TransientIo { message: String },

    /// Device initialization failed.
    #[error("Initialization failed: {message}")]
    InitializationFailed { message: String },

    /// Device configuration error.
    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    /// Operation is not supported by this device.
    #[error("Unsupported operation: {operation}")]
    Unsupported { operation: String },

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PeripheralError {
    /// Create a new unavailable device error.
    pub fn unavailable(device: impl Into<String>) -> Self {
        Self::Unavailable {
            device: device.into(),
        }
    }

    /// Create a new transient I/O error.
    pub fn transient(message: impl Into<String>) -> Self {
        Self::TransientIo {
            message: message.into(),
        }
    }

    /// Create a new initialization failed error.
    pub fn initialization_failed(message: impl Into<String>) -> Self {
        Self::InitializationFailed {
            message: message.into(),
        }
    }

    /// Create a new configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
        }
    }

    /// Create a new unsupported operation error.
    pub fn unsupported(operation: impl Into<String>) -> Self {
        Self::Unsupported {
            operation: operation.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_error() {
        let error = PeripheralError::unavailable("pwmchip0");
        assert!(matches!(error, PeripheralError::Unavailable { .. }));
        assert_eq!(error.to_string(), "Device unavailable: pwmchip0");
    }

    #[test]
    fn test_transient_error() {
        let error = PeripheralError::transient("NACK from 0x27");
        assert!(matches!(error, PeripheralError::TransientIo { .. }));
        assert_eq!(error.to_string(), "Transient I/O error: NACK from 0x27");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let error: PeripheralError = io.into();
        assert!(matches!(error, PeripheralError::Io(_)));
    }
}
