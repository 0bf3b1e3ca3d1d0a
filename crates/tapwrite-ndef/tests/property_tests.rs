//! Property-based tests for NDEF encoding.
//!
//! These tests use proptest to generate random valid inputs and verify that
//! encoder invariants hold for all of them.

use proptest::prelude::*;
use tapwrite_core::{WifiCredentials, WriteMode, WriteRequest};
use tapwrite_ndef::{EncodeOptions, NdefMessage, encode_request_bytes};

/// Strategy for non-empty text payloads, including multi-byte characters.
fn valid_text() -> impl Strategy<Value = String> {
    prop::string::string_regex(".{1,400}").expect("Failed to create text regex strategy")
}

/// Strategy for SSIDs without commas or surrounding whitespace.
fn valid_ssid() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Za-z0-9_-]{1,32}").expect("Failed to create SSID regex strategy")
}

/// Strategy for network keys; commas are allowed after the first split.
fn valid_key() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Za-z0-9,!@#]{0,63}[A-Za-z0-9]")
        .expect("Failed to create key regex strategy")
}

/// Strategy for language codes accepted by the text record status byte.
fn valid_language() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z]{2}(-[A-Z]{2})?")
        .expect("Failed to create language regex strategy")
}

proptest! {
    /// Property: any non-empty text re-parses to the same text and language.
    #[test]
    fn prop_text_survives_encoding(text in valid_text(), lang in valid_language()) {
        let bytes = encode_request_bytes(
            &WriteRequest::Text(text.clone()),
            &EncodeOptions::with_language(lang.clone()),
        ).unwrap();

        let message = NdefMessage::parse(&bytes).unwrap();
        let content = message.first().as_text().unwrap();
        prop_assert_eq!(content.text, text);
        prop_assert_eq!(content.language, lang);
    }

    /// Property: "ssid, key" form input survives parse, encode and decode.
    #[test]
    fn prop_wifi_form_input_survives(ssid in valid_ssid(), key in valid_key()) {
        let input = format!("  {ssid} ,  {key} ");
        let request = WriteRequest::from_form(WriteMode::WifiSimple, &input).unwrap();
        let bytes = encode_request_bytes(&request, &EncodeOptions::default()).unwrap();

        let decoded = NdefMessage::parse(&bytes).unwrap().first().as_wifi().unwrap();
        prop_assert_eq!(decoded, WifiCredentials::new(ssid, key));
    }

    /// Property: URIs keep their full value through prefix abbreviation.
    #[test]
    fn prop_uri_survives_abbreviation(
        scheme in prop_oneof![
            Just("https://"),
            Just("http://www."),
            Just("tel:"),
            Just("geo:"),
            Just("urn:epc:id:"),
        ],
        rest in "[a-z0-9./]{1,80}",
    ) {
        let uri = format!("{scheme}{rest}");
        let request = WriteRequest::Uri(uri.clone());
        let bytes = encode_request_bytes(&request, &EncodeOptions::default()).unwrap();
        let decoded = NdefMessage::parse(&bytes).unwrap().first().as_uri().unwrap();
        prop_assert_eq!(decoded, uri);
    }

    /// Property: the short-record flag tracks the payload size exactly.
    #[test]
    fn prop_short_record_boundary(len in 200usize..320) {
        let text = "a".repeat(len);
        let request = WriteRequest::Text(text);
        let bytes = encode_request_bytes(&request, &EncodeOptions::default()).unwrap();
        let payload_len = len + 3;
        prop_assert_eq!(bytes[0] & 0x10 != 0, payload_len <= 255);
    }
}
