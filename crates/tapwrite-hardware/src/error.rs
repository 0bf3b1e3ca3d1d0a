//! Error types for NFC platform operations.
//!
//! This module defines the errors a platform NFC driver can raise, covering
//! missing hardware, subsystem start-up, session exclusivity, and tag-level
//! write failures.

use tapwrite_core::Error as CoreError;

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur during NFC driver operations.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// Operation is not supported by this device or platform.
    #[error("Unsupported operation: {operation}")]
    Unsupported { operation: String },

    /// The NFC subsystem failed to start.
    #[error("Initialization failed: {message}")]
    InitializationFailed { message: String },

    /// The NFC subsystem has not been started.
    #[error("NFC subsystem not started")]
    NotStarted,

    /// NFC is turned off in system settings.
    #[error("NFC is disabled")]
    Disabled,

    /// Another session already holds the radio.
    #[error("NFC session already in use")]
    SessionBusy,

    /// A tag operation was attempted without an open session.
    #[error("No NFC session is open")]
    NoSession,

    /// Tag left the field before the operation completed.
    #[error("Tag was removed before the operation completed")]
    TagLost,

    /// Tag is locked against writes.
    #[error("Tag is read-only")]
    ReadOnly,

    /// Message does not fit the tag's NDEF area.
    #[error("Message needs {required} bytes but tag holds {capacity}")]
    CapacityExceeded { required: usize, capacity: usize },

    /// Tag or reader refused the write.
    #[error("Write rejected: {message}")]
    WriteRejected { message: String },

    /// Device is not connected or has been disconnected.
    #[error("Device disconnected: {device}")]
    Disconnected { device: String },

    /// Platform-enforced timeout elapsed.
    #[error("Operation timeout after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Reader communication error.
    #[error("Communication error: {message}")]
    CommunicationError { message: String },

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with custom message.
    #[error("{0}")]
    Other(String),
}

impl HardwareError {
    /// Create a new unsupported operation error.
    pub fn unsupported(operation: impl Into<String>) -> Self {
        Self::Unsupported {
            operation: operation.into(),
        }
    }

    /// Create a new initialization failed error.
    pub fn initialization_failed(message: impl Into<String>) -> Self {
        Self::InitializationFailed {
            message: message.into(),
        }
    }

    /// Create a new write rejected error.
    pub fn write_rejected(message: impl Into<String>) -> Self {
        Self::WriteRejected {
            message: message.into(),
        }
    }

    /// Create a new disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    /// Create a new timeout error.
    pub fn timeout(duration_ms: u64) -> Self {
        Self::Timeout { duration_ms }
    }

    /// Create a new communication error.
    pub fn communication(message: impl Into<String>) -> Self {
        Self::CommunicationError {
            message: message.into(),
        }
    }

    /// Create a generic error with custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }

    /// Convert a fault raised while acquiring or releasing a session.
    pub fn into_session_error(self) -> CoreError {
        CoreError::Session(self.to_string())
    }
}

impl From<HardwareError> for CoreError {
    fn from(error: HardwareError) -> Self {
        match error {
            HardwareError::Unsupported { .. } | HardwareError::Disabled => {
                CoreError::Capability(error.to_string())
            }
            HardwareError::SessionBusy | HardwareError::NoSession | HardwareError::NotStarted => {
                CoreError::Session(error.to_string())
            }
            HardwareError::Io(io) => CoreError::Io(io),
            other => CoreError::Write(other.to_string()),
        }
    }
}
