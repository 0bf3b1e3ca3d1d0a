//! Common types shared across NFC driver implementations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tag technology a session is requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Technology {
    /// NDEF-formatted tag of any type.
    Ndef,
}

impl fmt::Display for Technology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ndef => write!(f, "Ndef"),
        }
    }
}

/// Driver information.
///
/// Contains metadata about an NFC driver such as name, backend, and the
/// reader it is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverInfo {
    /// Driver name (e.g., "Mock NFC", "PC/SC").
    pub name: String,

    /// Backend identifier.
    pub backend: String,

    /// Optional reader name.
    pub reader: Option<String>,

    /// Optional firmware version string.
    pub firmware_version: Option<String>,
}

impl DriverInfo {
    /// Create a new DriverInfo with required fields.
    pub fn new(name: impl Into<String>, backend: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            backend: backend.into(),
            reader: None,
            firmware_version: None,
        }
    }

    /// Set the reader name.
    pub fn with_reader(mut self, reader: impl Into<String>) -> Self {
        self.reader = Some(reader.into());
        self
    }

    /// Set the firmware version.
    pub fn with_firmware_version(mut self, firmware_version: impl Into<String>) -> Self {
        self.firmware_version = Some(firmware_version.into());
        self
    }
}
