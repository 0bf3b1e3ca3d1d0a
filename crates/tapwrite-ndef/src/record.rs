//! NDEF record representation and byte-level framing.
//!
//! # Record Layout
//!
//! ```text
//! +----+----+----+----+----+-----+
//! | MB | ME | CF | SR | IL | TNF |   header byte
//! +----+----+----+----+----+-----+
//! | TYPE LENGTH                  |   1 byte
//! | PAYLOAD LENGTH               |   1 byte if SR, else 4 bytes big-endian
//! | ID LENGTH                    |   1 byte, only if IL
//! | TYPE                         |
//! | ID                           |
//! | PAYLOAD                      |
//! +------------------------------+
//! ```
//!
//! The MB and ME flags are owned by the enclosing message, so they are
//! passed in at encode time rather than stored on the record.

use bytes::{BufMut, Bytes, BytesMut};
use std::fmt;
use tapwrite_core::{
    Error, Result, WifiCredentials,
    constants::{
        MAX_LANGUAGE_CODE_LENGTH, MAX_SHORT_RECORD_PAYLOAD, MIME_VCARD, MIME_WIFI_WSC, RTD_TEXT,
        RTD_URI, TEXT_STATUS_UTF16,
    },
};

use crate::{uri, wifi};

pub const FLAG_MB: u8 = 0x80;
pub const FLAG_ME: u8 = 0x40;
pub const FLAG_CF: u8 = 0x20;
pub const FLAG_SR: u8 = 0x10;
pub const FLAG_IL: u8 = 0x08;
pub const TNF_MASK: u8 = 0x07;

/// Type Name Format: the namespace of a record's type field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Tnf {
    Empty = 0x00,
    WellKnown = 0x01,
    Mime = 0x02,
    AbsoluteUri = 0x03,
    External = 0x04,
    Unknown = 0x05,
    Unchanged = 0x06,
    Reserved = 0x07,
}

impl Tnf {
    /// Decode the low three bits of a record header.
    #[must_use]
    pub fn from_header(header: u8) -> Self {
        match header & TNF_MASK {
            0x00 => Tnf::Empty,
            0x01 => Tnf::WellKnown,
            0x02 => Tnf::Mime,
            0x03 => Tnf::AbsoluteUri,
            0x04 => Tnf::External,
            0x05 => Tnf::Unknown,
            0x06 => Tnf::Unchanged,
            _ => Tnf::Reserved,
        }
    }

    #[must_use]
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Decoded content of a Well-Known Text record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextContent {
    pub language: String,
    pub text: String,
}

/// A single NDEF record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NdefRecord {
    pub tnf: Tnf,
    pub record_type: Bytes,
    pub id: Bytes,
    pub payload: Bytes,
}

impl NdefRecord {
    pub fn new(tnf: Tnf, record_type: impl Into<Bytes>, payload: impl Into<Bytes>) -> Self {
        Self {
            tnf,
            record_type: record_type.into(),
            id: Bytes::new(),
            payload: payload.into(),
        }
    }

    /// Attach a record identifier.
    pub fn with_id(mut self, id: impl Into<Bytes>) -> Self {
        self.id = id.into();
        self
    }

    /// Well-Known Text record with UTF-8 text.
    ///
    /// # Errors
    /// Returns `Error::Encoding` if the language code is empty, not ASCII,
    /// or longer than 63 bytes.
    ///
    /// # Examples
    ///
    /// ```
    /// use tapwrite_ndef::NdefRecord;
    ///
    /// let record = NdefRecord::text("Hello", "en").unwrap();
    /// assert_eq!(record.payload.as_ref(), b"\x02enHello");
    /// ```
    pub fn text(text: &str, language: &str) -> Result<Self> {
        validate_language(language)?;

        let mut payload = BytesMut::with_capacity(1 + language.len() + text.len());
        payload.put_u8(language.len() as u8);
        payload.put_slice(language.as_bytes());
        payload.put_slice(text.as_bytes());

        Ok(Self::new(
            Tnf::WellKnown,
            Bytes::from_static(RTD_TEXT),
            payload.freeze(),
        ))
    }

    /// Well-Known URI record with the longest known prefix abbreviated.
    pub fn uri(value: &str) -> Self {
        let (code, rest) = uri::abbreviate(value);

        let mut payload = BytesMut::with_capacity(1 + rest.len());
        payload.put_u8(code);
        payload.put_slice(rest.as_bytes());

        Self::new(Tnf::WellKnown, Bytes::from_static(RTD_URI), payload.freeze())
    }

    /// MIME media record carrying `payload` verbatim.
    pub fn mime(media_type: &str, payload: impl Into<Bytes>) -> Self {
        Self::new(
            Tnf::Mime,
            Bytes::copy_from_slice(media_type.as_bytes()),
            payload,
        )
    }

    /// `text/vcard` record. The vCard body is not validated.
    pub fn vcard(body: &str) -> Self {
        Self::mime(MIME_VCARD, Bytes::copy_from_slice(body.as_bytes()))
    }

    /// Wi-Fi Simple Configuration credential record.
    ///
    /// # Errors
    /// Returns `Error::Encoding` if the credentials exceed WSC limits.
    pub fn wifi(credentials: &WifiCredentials) -> Result<Self> {
        Ok(Self::mime(
            MIME_WIFI_WSC,
            wifi::encode_credentials(credentials)?,
        ))
    }

    /// Whether this record fits the short-record form.
    #[must_use]
    pub fn is_short(&self) -> bool {
        self.payload.len() <= MAX_SHORT_RECORD_PAYLOAD
    }

    /// Number of bytes [`encode_into`](Self::encode_into) will append.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        let payload_len_field = if self.is_short() { 1 } else { 4 };
        let id_len_field = usize::from(!self.id.is_empty());
        2 + payload_len_field
            + id_len_field
            + self.record_type.len()
            + self.id.len()
            + self.payload.len()
    }

    /// Append this record to `buf` with the given message-boundary flags.
    ///
    /// # Errors
    /// Returns `Error::Encoding` if the type or id exceeds 255 bytes or the
    /// payload exceeds `u32::MAX` bytes.
    pub fn encode_into(&self, buf: &mut BytesMut, first: bool, last: bool) -> Result<()> {
        let type_len = u8::try_from(self.record_type.len()).map_err(|_| {
            Error::Encoding(format!(
                "Record type must be at most 255 bytes, got {}",
                self.record_type.len()
            ))
        })?;
        let id_len = u8::try_from(self.id.len()).map_err(|_| {
            Error::Encoding(format!(
                "Record id must be at most 255 bytes, got {}",
                self.id.len()
            ))
        })?;
        let payload_len = u32::try_from(self.payload.len()).map_err(|_| {
            Error::Encoding(format!(
                "Record payload too large: {} bytes",
                self.payload.len()
            ))
        })?;

        let mut header = self.tnf.as_u8();
        if first {
            header |= FLAG_MB;
        }
        if last {
            header |= FLAG_ME;
        }
        if self.is_short() {
            header |= FLAG_SR;
        }
        if id_len > 0 {
            header |= FLAG_IL;
        }

        buf.reserve(self.encoded_len());
        buf.put_u8(header);
        buf.put_u8(type_len);
        if self.is_short() {
            buf.put_u8(payload_len as u8);
        } else {
            buf.put_u32(payload_len);
        }
        if id_len > 0 {
            buf.put_u8(id_len);
        }
        buf.put_slice(&self.record_type);
        buf.put_slice(&self.id);
        buf.put_slice(&self.payload);

        Ok(())
    }

    /// Returns `true` for a Well-Known record of the given type.
    #[must_use]
    pub fn is_well_known(&self, rtd: &[u8]) -> bool {
        self.tnf == Tnf::WellKnown && self.record_type.as_ref() == rtd
    }

    /// MIME type of a MIME media record.
    #[must_use]
    pub fn media_type(&self) -> Option<&str> {
        if self.tnf != Tnf::Mime {
            return None;
        }
        std::str::from_utf8(&self.record_type).ok()
    }

    /// Decode a Well-Known Text record.
    ///
    /// # Errors
    /// Returns `Error::Encoding` if this is not a text record or its payload
    /// is malformed.
    pub fn as_text(&self) -> Result<TextContent> {
        if !self.is_well_known(RTD_TEXT) {
            return Err(Error::Encoding("Not a text record".to_string()));
        }

        let (&status, rest) = self
            .payload
            .split_first()
            .ok_or_else(|| Error::Encoding("Empty text record payload".to_string()))?;

        let lang_len = (status & 0x3F) as usize;
        if rest.len() < lang_len {
            return Err(Error::Encoding(
                "Text record language code is truncated".to_string(),
            ));
        }
        let (lang, body) = rest.split_at(lang_len);

        let language = String::from_utf8(lang.to_vec())
            .map_err(|_| Error::Encoding("Language code is not ASCII".to_string()))?;
        let text = if status & TEXT_STATUS_UTF16 != 0 {
            decode_utf16(body)?
        } else {
            String::from_utf8(body.to_vec())
                .map_err(|_| Error::Encoding("Text record is not valid UTF-8".to_string()))?
        };

        Ok(TextContent { language, text })
    }

    /// Decode a Well-Known URI record to its full URI.
    ///
    /// # Errors
    /// Returns `Error::Encoding` if this is not a URI record or its payload
    /// is malformed.
    pub fn as_uri(&self) -> Result<String> {
        if !self.is_well_known(RTD_URI) {
            return Err(Error::Encoding("Not a URI record".to_string()));
        }

        let (&code, rest) = self
            .payload
            .split_first()
            .ok_or_else(|| Error::Encoding("Empty URI record payload".to_string()))?;
        let rest = std::str::from_utf8(rest)
            .map_err(|_| Error::Encoding("URI record is not valid UTF-8".to_string()))?;

        Ok(uri::expand(code, rest))
    }

    /// Decode a Wi-Fi credential record.
    ///
    /// # Errors
    /// Returns `Error::Encoding` if this is not a WSC record or its payload
    /// is malformed.
    pub fn as_wifi(&self) -> Result<WifiCredentials> {
        if self.media_type() != Some(MIME_WIFI_WSC) {
            return Err(Error::Encoding("Not a Wi-Fi credential record".to_string()));
        }
        wifi::decode_credentials(&self.payload)
    }
}

impl fmt::Display for NdefRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{:?} '{}' ({} bytes)",
            self.tnf,
            String::from_utf8_lossy(&self.record_type),
            self.payload.len()
        )
    }
}

/// Check a language code against the text record status byte limit.
///
/// # Errors
/// Returns `Error::Encoding` if the code is empty, not ASCII, or too long.
pub fn validate_language(language: &str) -> Result<()> {
    if language.is_empty() || !language.is_ascii() || language.len() > MAX_LANGUAGE_CODE_LENGTH {
        return Err(Error::Encoding(format!(
            "Language code must be 1-{MAX_LANGUAGE_CODE_LENGTH} ASCII bytes, got '{language}'"
        )));
    }
    Ok(())
}

fn decode_utf16(body: &[u8]) -> Result<String> {
    if body.len() % 2 != 0 {
        return Err(Error::Encoding(
            "UTF-16 text has odd byte length".to_string(),
        ));
    }

    let mut units: Vec<u16> = body
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect();

    // Honour a little-endian byte order mark; big-endian is the default.
    match units.first() {
        Some(0xFEFF) => {
            units.remove(0);
        }
        Some(0xFFFE) => {
            units.remove(0);
            for unit in &mut units {
                *unit = unit.swap_bytes();
            }
        }
        _ => {}
    }

    String::from_utf16(&units)
        .map_err(|_| Error::Encoding("Text record is not valid UTF-16".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn encode(record: &NdefRecord) -> Vec<u8> {
        let mut buf = BytesMut::new();
        record.encode_into(&mut buf, true, true).unwrap();
        buf.to_vec()
    }

    #[test]
    fn test_text_record_bytes() {
        let record = NdefRecord::text("Hello", "en").unwrap();
        assert_eq!(
            encode(&record),
            vec![0xD1, 0x01, 0x08, 0x54, 0x02, 0x65, 0x6E, 0x48, 0x65, 0x6C, 0x6C, 0x6F]
        );
    }

    #[test]
    fn test_uri_record_bytes() {
        let record = NdefRecord::uri("https://example.com");
        let bytes = encode(&record);
        assert_eq!(&bytes[..5], &[0xD1, 0x01, 0x0C, 0x55, 0x04]);
        assert_eq!(&bytes[5..], b"example.com");
    }

    #[test]
    fn test_vcard_is_verbatim() {
        let body = "BEGIN:VCARD\r\nVERSION:3.0\r\nFN:Jane\r\nEND:VCARD";
        let record = NdefRecord::vcard(body);
        assert_eq!(record.media_type(), Some("text/vcard"));
        assert_eq!(record.payload.as_ref(), body.as_bytes());
        assert_eq!(encode(&record)[0], 0xD2);
    }

    #[test]
    fn test_long_record_uses_four_byte_length() {
        let text = "x".repeat(300);
        let record = NdefRecord::text(&text, "en").unwrap();
        assert!(!record.is_short());

        let bytes = encode(&record);
        assert_eq!(bytes[0] & FLAG_SR, 0);
        assert_eq!(&bytes[2..6], &(303u32).to_be_bytes());
        assert_eq!(bytes.len(), record.encoded_len());
    }

    #[test]
    fn test_id_sets_il_flag() {
        let record = NdefRecord::uri("tel:123").with_id(&b"a"[..]);
        let bytes = encode(&record);
        assert_ne!(bytes[0] & FLAG_IL, 0);
        assert_eq!(bytes[3], 1);
        assert_eq!(bytes.len(), record.encoded_len());
    }

    #[test]
    fn test_boundary_flags() {
        let record = NdefRecord::uri("tel:1");
        let mut buf = BytesMut::new();
        record.encode_into(&mut buf, false, false).unwrap();
        assert_eq!(buf[0] & (FLAG_MB | FLAG_ME), 0);
    }

    #[rstest]
    #[case("")]
    #[case("ça")]
    fn test_invalid_language(#[case] lang: &str) {
        assert!(NdefRecord::text("hi", lang).is_err());
    }

    #[test]
    fn test_language_too_long() {
        assert!(NdefRecord::text("hi", &"a".repeat(64)).is_err());
        assert!(NdefRecord::text("hi", &"a".repeat(63)).is_ok());
    }

    #[test]
    fn test_oversized_type_rejected() {
        let record = NdefRecord::mime(&"a".repeat(256), Bytes::new());
        let mut buf = BytesMut::new();
        assert!(record.encode_into(&mut buf, true, true).is_err());
    }

    #[test]
    fn test_text_decode() {
        let record = NdefRecord::text("Olá", "pt-BR").unwrap();
        let content = record.as_text().unwrap();
        assert_eq!(content.language, "pt-BR");
        assert_eq!(content.text, "Olá");
    }

    #[test]
    fn test_text_decode_utf16() {
        let mut payload = vec![TEXT_STATUS_UTF16 | 2, b'e', b'n'];
        payload.extend_from_slice(&[0x00, b'H', 0x00, b'i']);
        let record = NdefRecord::new(Tnf::WellKnown, &b"T"[..], payload);
        assert_eq!(record.as_text().unwrap().text, "Hi");
    }

    #[test]
    fn test_uri_decode() {
        let record = NdefRecord::uri("https://www.example.com/path");
        assert_eq!(record.as_uri().unwrap(), "https://www.example.com/path");
        assert!(record.as_text().is_err());
    }

    #[test]
    fn test_tnf_from_header() {
        assert_eq!(Tnf::from_header(0xD1), Tnf::WellKnown);
        assert_eq!(Tnf::from_header(0xD2), Tnf::Mime);
        assert_eq!(Tnf::from_header(0x07), Tnf::Reserved);
    }
}
