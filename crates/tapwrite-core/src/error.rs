use thiserror::Error;

use crate::constants::{MSG_NFC_UNAVAILABLE, MSG_WRITE_FAILED};

#[derive(Error, Debug)]
pub enum Error {
    // Capability errors
    #[error("NFC unavailable: {0}")]
    Capability(String),

    // Session errors
    #[error("NFC session error: {0}")]
    Session(String),

    // Transmission errors
    #[error("Tag write failed: {0}")]
    Write(String),

    // Payload errors
    #[error("Cannot encode payload: {0}")]
    Encoding(String),

    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of [`Error`] used to decide how a failure is
/// surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The host cannot do NFC. Shown as a persistent disabled state.
    Capability,
    /// Acquiring or releasing the NDEF session failed.
    Session,
    /// Transmitting the message to the tag failed.
    Write,
    /// The request could not be turned into an NDEF message.
    Encoding,
    /// Programming or configuration fault.
    Internal,
}

impl Error {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Capability(_) => ErrorKind::Capability,
            Error::Session(_) => ErrorKind::Session,
            Error::Write(_) | Error::Io(_) => ErrorKind::Write,
            Error::Encoding(_) => ErrorKind::Encoding,
            Error::InvalidStateTransition { .. } | Error::Config(_) => ErrorKind::Internal,
        }
    }

    /// Whether re-triggering the whole write flow may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Session | ErrorKind::Write)
    }

    /// Message suitable for showing to the person holding the tag.
    ///
    /// Encoding errors carry their validation detail since the user can fix
    /// the input. Everything else collapses to a fixed message.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Error::Capability(_) => MSG_NFC_UNAVAILABLE.to_string(),
            Error::Encoding(detail) => detail.clone(),
            _ => MSG_WRITE_FAILED.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
