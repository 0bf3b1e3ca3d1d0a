//! Shared constants for NDEF encoding and user-facing messages.
//!
//! # Record Types
//!
//! NFC Forum Well-Known record types used by the encoder:
//!
//! | Constant | Type | Payload |
//! |----------|------|---------|
//! | `RTD_TEXT` | `T` | status byte, language code, text |
//! | `RTD_URI` | `U` | identifier code, remainder of the URI |
//!
//! MIME media records carry their media type as the record type:
//!
//! | Constant | Media type |
//! |----------|------------|
//! | `MIME_VCARD` | `text/vcard` |
//! | `MIME_WIFI_WSC` | `application/vnd.wfa.wsc` |
//!
//! # Usage
//!
//! ```
//! use tapwrite_core::constants::*;
//!
//! assert_eq!(RTD_TEXT, b"T");
//! assert_eq!(DEFAULT_LANGUAGE, "en");
//! assert!(DEFAULT_LANGUAGE.len() <= MAX_LANGUAGE_CODE_LENGTH);
//! ```

// ============================================================================
// NDEF Record Types
// ============================================================================

/// Well-Known Text record type.
pub const RTD_TEXT: &[u8] = b"T";

/// Well-Known URI record type.
pub const RTD_URI: &[u8] = b"U";

/// MIME type for vCard payloads.
pub const MIME_VCARD: &str = "text/vcard";

/// MIME type for Wi-Fi Simple Configuration credential payloads.
pub const MIME_WIFI_WSC: &str = "application/vnd.wfa.wsc";

// ============================================================================
// Text Record Encoding
// ============================================================================

/// Default IANA language code for text records.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Maximum language code length (6 bits of the text record status byte).
pub const MAX_LANGUAGE_CODE_LENGTH: usize = 63;

/// Status byte flag selecting UTF-16 text. Unset means UTF-8.
pub const TEXT_STATUS_UTF16: u8 = 0x80;

/// Encoding label passed to browser-hosted writers.
pub const BROWSER_TEXT_ENCODING: &str = "utf-8";

// ============================================================================
// Record Framing
// ============================================================================

/// Largest payload that fits a short record (1-byte payload length).
pub const MAX_SHORT_RECORD_PAYLOAD: usize = 255;

/// Default number of state transitions kept for diagnostics.
pub const DEFAULT_HISTORY_SIZE: usize = 100;

// ============================================================================
// User-Facing Messages
// ============================================================================

/// Shown after a confirmed write.
pub const MSG_WRITE_SUCCESS: &str = "Write successful!";

/// Shown after any session or transmission failure.
pub const MSG_WRITE_FAILED: &str = "Writing failed. Please try again.";

/// Shown when a write is requested while NFC is unavailable.
pub const MSG_NFC_UNAVAILABLE: &str = "NFC is not available";

pub const MSG_NO_READER_API: &str = "Web NFC is not available in this browser";
pub const MSG_UNSUPPORTED_HARDWARE: &str = "NFC is not supported on this device";
pub const MSG_INIT_FAILED: &str = "Failed to initialize NFC. Please check your device settings.";
pub const MSG_DISABLED: &str = "NFC is disabled. Please enable NFC in system settings.";
pub const MSG_PROBE_FAULT: &str =
    "Unable to initialize NFC. Please check if NFC is enabled on your device.";
