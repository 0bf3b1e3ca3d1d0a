//! NDEF message encoding for tag writes.
//!
//! Pure, synchronous encoders from [`tapwrite_core::WriteRequest`] to NDEF
//! bytes, plus a decoder used to inspect what was written.

pub mod encoder;
pub mod message;
pub mod record;
pub mod uri;
pub mod wifi;

pub use encoder::{
    BrowserRecord, EncodeOptions, browser_records, encode_request, encode_request_bytes,
};
pub use message::NdefMessage;
pub use record::{NdefRecord, TextContent, Tnf};
