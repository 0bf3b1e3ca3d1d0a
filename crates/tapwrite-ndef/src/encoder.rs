//! Mapping from logical write requests to NDEF payloads.
//!
//! Native platforms receive a framed [`NdefMessage`]. Browser platforms frame
//! NDEF themselves and receive [`BrowserRecord`] objects shaped like the Web
//! NFC `NDEFRecordInit` dictionary.
//!
//! | Request | Native record | Browser record |
//! |---------|---------------|----------------|
//! | `Text` | Well-Known `T` | `text` |
//! | `Uri` | Well-Known `U` | `url` |
//! | `Wifi` | MIME `application/vnd.wfa.wsc` | `mime` |
//! | `Vcard` | MIME `text/vcard` | `mime` |
//! | `Card` | Well-Known `T` holding JSON | `text` holding JSON |
//!
//! Encoding is pure: nothing here touches the radio.

use serde::{Deserialize, Serialize};
use tapwrite_core::{
    Error, Result, WriteRequest,
    constants::{BROWSER_TEXT_ENCODING, DEFAULT_LANGUAGE, MIME_VCARD, MIME_WIFI_WSC},
};

use crate::{message::NdefMessage, record::NdefRecord, record::validate_language, wifi};

/// Options that affect how requests are encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeOptions {
    /// IANA language code for text records.
    pub language: String,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

impl EncodeOptions {
    pub fn with_language(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
        }
    }
}

/// Record object handed to a browser-hosted NFC writer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowserRecord {
    pub record_type: String,
    pub data: Vec<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
}

impl BrowserRecord {
    fn text(data: &str, lang: &str) -> Self {
        Self {
            record_type: "text".to_string(),
            data: data.as_bytes().to_vec(),
            encoding: Some(BROWSER_TEXT_ENCODING.to_string()),
            lang: Some(lang.to_string()),
            media_type: None,
        }
    }

    fn url(data: &str) -> Self {
        Self {
            record_type: "url".to_string(),
            data: data.as_bytes().to_vec(),
            encoding: None,
            lang: None,
            media_type: None,
        }
    }

    fn mime(media_type: &str, data: Vec<u8>) -> Self {
        Self {
            record_type: "mime".to_string(),
            data,
            encoding: None,
            lang: None,
            media_type: Some(media_type.to_string()),
        }
    }

    /// Frame this record the way a browser's NFC stack does before writing.
    ///
    /// # Errors
    /// Returns `Error::Encoding` for unknown record types, non-UTF-8 text or
    /// URL data, an unsupported text encoding, or a `mime` record without a
    /// media type.
    pub fn to_ndef_record(&self) -> Result<NdefRecord> {
        match self.record_type.as_str() {
            "text" => {
                if let Some(encoding) = &self.encoding
                    && !encoding.eq_ignore_ascii_case(BROWSER_TEXT_ENCODING)
                {
                    return Err(Error::Encoding(format!(
                        "Unsupported text encoding: {encoding}"
                    )));
                }
                let text = std::str::from_utf8(&self.data)
                    .map_err(|_| Error::Encoding("Text data is not valid UTF-8".to_string()))?;
                NdefRecord::text(text, self.lang.as_deref().unwrap_or(DEFAULT_LANGUAGE))
            }
            "url" => {
                let url = std::str::from_utf8(&self.data)
                    .map_err(|_| Error::Encoding("URL data is not valid UTF-8".to_string()))?;
                Ok(NdefRecord::uri(url))
            }
            "mime" => {
                let media_type = self.media_type.as_deref().ok_or_else(|| {
                    Error::Encoding("mime record needs a media type".to_string())
                })?;
                Ok(NdefRecord::mime(media_type, self.data.clone()))
            }
            other => Err(Error::Encoding(format!("Unknown record type: {other}"))),
        }
    }
}

fn require_value(value: &str, what: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::Encoding(format!("{what} cannot be empty")));
    }
    Ok(())
}

/// Encode a request as a single-record NDEF message.
///
/// # Errors
/// Returns `Error::Encoding` if the value is empty, the language code is
/// invalid, or the payload exceeds a record limit.
///
/// # Examples
///
/// ```
/// use tapwrite_core::WriteRequest;
/// use tapwrite_ndef::{EncodeOptions, encode_request};
///
/// let request = WriteRequest::Text("Hello".into());
/// let message = encode_request(&request, &EncodeOptions::default()).unwrap();
/// let bytes = message.to_bytes().unwrap();
/// assert_eq!(bytes.as_ref(), b"\xD1\x01\x08T\x02enHello");
/// ```
pub fn encode_request(request: &WriteRequest, options: &EncodeOptions) -> Result<NdefMessage> {
    let record = match request {
        WriteRequest::Text(text) => {
            require_value(text, "Text")?;
            NdefRecord::text(text, &options.language)?
        }
        WriteRequest::Uri(uri) => {
            require_value(uri, "URI")?;
            NdefRecord::uri(uri)
        }
        WriteRequest::Wifi(credentials) => NdefRecord::wifi(credentials)?,
        WriteRequest::Vcard(body) => {
            require_value(body, "vCard")?;
            NdefRecord::vcard(body)
        }
        WriteRequest::Card(card) => NdefRecord::text(&card.to_json()?, &options.language)?,
    };
    Ok(NdefMessage::single(record))
}

/// Encode a request straight to wire bytes.
///
/// # Errors
/// Same as [`encode_request`].
pub fn encode_request_bytes(
    request: &WriteRequest,
    options: &EncodeOptions,
) -> Result<bytes::Bytes> {
    encode_request(request, options)?.to_bytes()
}

/// Shape a request as browser record objects.
///
/// # Errors
/// Returns `Error::Encoding` under the same conditions as [`encode_request`].
pub fn browser_records(
    request: &WriteRequest,
    options: &EncodeOptions,
) -> Result<Vec<BrowserRecord>> {
    validate_language(&options.language)?;

    let record = match request {
        WriteRequest::Text(text) => {
            require_value(text, "Text")?;
            BrowserRecord::text(text, &options.language)
        }
        WriteRequest::Uri(uri) => {
            require_value(uri, "URI")?;
            BrowserRecord::url(uri)
        }
        WriteRequest::Wifi(credentials) => {
            BrowserRecord::mime(MIME_WIFI_WSC, wifi::encode_credentials(credentials)?.to_vec())
        }
        WriteRequest::Vcard(body) => {
            require_value(body, "vCard")?;
            BrowserRecord::mime(MIME_VCARD, body.as_bytes().to_vec())
        }
        WriteRequest::Card(card) => BrowserRecord::text(&card.to_json()?, &options.language),
    };
    Ok(vec![record])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tapwrite_core::{CardRecord, WifiCredentials};

    fn opts() -> EncodeOptions {
        EncodeOptions::default()
    }

    #[rstest]
    #[case(WriteRequest::Text("Hello".into()))]
    #[case(WriteRequest::Uri("https://example.com".into()))]
    #[case(WriteRequest::Wifi(WifiCredentials::new("MyNet", "secret123")))]
    #[case(WriteRequest::Vcard("BEGIN:VCARD\nFN:Jane\nEND:VCARD".into()))]
    #[case(WriteRequest::Card(CardRecord::new("1234", "Jane", "01/30", "VISA")))]
    fn test_well_formed_requests_encode_non_empty(#[case] request: WriteRequest) {
        let bytes = encode_request_bytes(&request, &opts()).unwrap();
        assert!(!bytes.is_empty());
        assert_eq!(NdefMessage::parse(&bytes).unwrap().len(), 1);
    }

    #[rstest]
    #[case(WriteRequest::Text(String::new()))]
    #[case(WriteRequest::Uri(String::new()))]
    #[case(WriteRequest::Vcard(String::new()))]
    #[case(WriteRequest::Wifi(WifiCredentials::new("", "pw")))]
    fn test_empty_values_rejected(#[case] request: WriteRequest) {
        assert!(matches!(
            encode_request(&request, &opts()),
            Err(Error::Encoding(_))
        ));
        assert!(browser_records(&request, &opts()).is_err());
    }

    #[test]
    fn test_card_json_text_record() {
        let card = CardRecord::new("1234", "Jane", "01/30", "VISA");
        let message = encode_request(&WriteRequest::Card(card), &opts()).unwrap();
        let content = message.first().as_text().unwrap();
        assert_eq!(
            content.text,
            r#"{"number":"1234","holder":"Jane","expiry":"01/30","type":"VISA"}"#
        );
        assert_eq!(content.language, "en");
    }

    #[test]
    fn test_language_option() {
        let message = encode_request(
            &WriteRequest::Text("Bonjour".into()),
            &EncodeOptions::with_language("fr"),
        )
        .unwrap();
        assert_eq!(message.first().as_text().unwrap().language, "fr");
    }

    #[test]
    fn test_browser_text_record_shape() {
        let records = browser_records(&WriteRequest::Text("Hello".into()), &opts()).unwrap();
        let json = serde_json::to_value(&records[0]).unwrap();
        assert_eq!(json["recordType"], "text");
        assert_eq!(json["encoding"], "utf-8");
        assert_eq!(json["lang"], "en");
        assert_eq!(json["data"], serde_json::json!([72, 101, 108, 108, 111]));
        assert!(json.get("mediaType").is_none());
    }

    #[test]
    fn test_browser_mime_records() {
        let records =
            browser_records(&WriteRequest::Vcard("BEGIN:VCARD".into()), &opts()).unwrap();
        assert_eq!(records[0].record_type, "mime");
        assert_eq!(records[0].media_type.as_deref(), Some("text/vcard"));

        let records = browser_records(
            &WriteRequest::Wifi(WifiCredentials::new("net", "pw")),
            &opts(),
        )
        .unwrap();
        assert_eq!(
            records[0].media_type.as_deref(),
            Some("application/vnd.wfa.wsc")
        );
    }

    #[test]
    fn test_browser_records_frame_like_native() {
        let request = WriteRequest::Text("Hello".into());
        let native = encode_request(&request, &opts()).unwrap();
        let browser = browser_records(&request, &opts()).unwrap();
        assert_eq!(&browser[0].to_ndef_record().unwrap(), native.first());

        let request = WriteRequest::Uri("https://example.com".into());
        let native = encode_request(&request, &opts()).unwrap();
        let browser = browser_records(&request, &opts()).unwrap();
        assert_eq!(&browser[0].to_ndef_record().unwrap(), native.first());
    }

    #[test]
    fn test_browser_record_unknown_type() {
        let record = BrowserRecord {
            record_type: "smart-poster".into(),
            data: vec![],
            encoding: None,
            lang: None,
            media_type: None,
        };
        assert!(record.to_ndef_record().is_err());
    }

    #[test]
    fn test_browser_uri_record() {
        let records =
            browser_records(&WriteRequest::Uri("https://example.com".into()), &opts()).unwrap();
        assert_eq!(records[0].record_type, "url");
        assert_eq!(records[0].data, b"https://example.com");
    }
}
