//! Wi-Fi Simple Configuration credential payloads.
//!
//! Android and iOS recognise a MIME record of type `application/vnd.wfa.wsc`
//! holding a WSC Credential attribute and offer to join the network.
//!
//! # Layout
//!
//! Every attribute is a TLV with a 2-byte big-endian type and length:
//!
//! ```text
//! 10 0E <len>                 Credential
//!   10 26 00 01 01            Network Index = 1
//!   10 45 <len> <ssid>        SSID
//!   10 03 00 02 00 20         Authentication Type = WPA2-Personal
//!   10 0F 00 02 00 08         Encryption Type = AES
//!   10 27 <len> <key>         Network Key
//!   10 20 00 06 FF FF FF FF FF FF   MAC Address (broadcast)
//! ```

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tapwrite_core::{Error, Result, WifiCredentials};

pub const ATTR_CREDENTIAL: u16 = 0x100E;
pub const ATTR_NETWORK_INDEX: u16 = 0x1026;
pub const ATTR_SSID: u16 = 0x1045;
pub const ATTR_AUTH_TYPE: u16 = 0x1003;
pub const ATTR_ENCRYPTION_TYPE: u16 = 0x100F;
pub const ATTR_NETWORK_KEY: u16 = 0x1027;
pub const ATTR_MAC_ADDRESS: u16 = 0x1020;

pub const AUTH_WPA2_PERSONAL: u16 = 0x0020;
pub const ENCRYPTION_AES: u16 = 0x0008;

/// SSIDs are at most 32 octets.
pub const MAX_SSID_LENGTH: usize = 32;

/// WPA2 passphrases are at most 64 characters.
pub const MAX_NETWORK_KEY_LENGTH: usize = 64;

const BROADCAST_MAC: [u8; 6] = [0xFF; 6];

fn put_attr(buf: &mut BytesMut, attr: u16, value: &[u8]) {
    buf.put_u16(attr);
    buf.put_u16(value.len() as u16);
    buf.put_slice(value);
}

/// Encode credentials as a WSC Credential payload.
///
/// # Errors
/// Returns `Error::Encoding` if the SSID is empty or the SSID or key
/// exceeds its WSC limit.
pub fn encode_credentials(credentials: &WifiCredentials) -> Result<Bytes> {
    let ssid = credentials.ssid.as_bytes();
    let key = credentials.network_key.as_bytes();

    if ssid.is_empty() {
        return Err(Error::Encoding("Wi-Fi SSID cannot be empty".to_string()));
    }
    if ssid.len() > MAX_SSID_LENGTH {
        return Err(Error::Encoding(format!(
            "Wi-Fi SSID must be at most {MAX_SSID_LENGTH} bytes, got {}",
            ssid.len()
        )));
    }
    if key.len() > MAX_NETWORK_KEY_LENGTH {
        return Err(Error::Encoding(format!(
            "Wi-Fi key must be at most {MAX_NETWORK_KEY_LENGTH} bytes, got {}",
            key.len()
        )));
    }

    let mut inner = BytesMut::with_capacity(64 + ssid.len() + key.len());
    put_attr(&mut inner, ATTR_NETWORK_INDEX, &[0x01]);
    put_attr(&mut inner, ATTR_SSID, ssid);
    put_attr(&mut inner, ATTR_AUTH_TYPE, &AUTH_WPA2_PERSONAL.to_be_bytes());
    put_attr(&mut inner, ATTR_ENCRYPTION_TYPE, &ENCRYPTION_AES.to_be_bytes());
    put_attr(&mut inner, ATTR_NETWORK_KEY, key);
    put_attr(&mut inner, ATTR_MAC_ADDRESS, &BROADCAST_MAC);

    let mut out = BytesMut::with_capacity(inner.len() + 4);
    put_attr(&mut out, ATTR_CREDENTIAL, &inner);
    Ok(out.freeze())
}

/// Read SSID and network key back out of a WSC Credential payload.
///
/// Unknown attributes inside the credential are skipped.
///
/// # Errors
/// Returns `Error::Encoding` if the TLVs are truncated, the credential
/// attribute is missing, or SSID/key are absent or not UTF-8.
pub fn decode_credentials(payload: &[u8]) -> Result<WifiCredentials> {
    let mut outer = payload;
    let credential = loop {
        let (attr, value) = next_attr(&mut outer)?
            .ok_or_else(|| Error::Encoding("WSC credential attribute missing".to_string()))?;
        if attr == ATTR_CREDENTIAL {
            break value;
        }
    };

    let mut inner = credential;
    let mut ssid = None;
    let mut key = None;
    while let Some((attr, value)) = next_attr(&mut inner)? {
        match attr {
            ATTR_SSID => ssid = Some(utf8(value, "SSID")?),
            ATTR_NETWORK_KEY => key = Some(utf8(value, "network key")?),
            _ => {}
        }
    }

    match (ssid, key) {
        (Some(ssid), Some(key)) => Ok(WifiCredentials::new(ssid, key)),
        _ => Err(Error::Encoding(
            "WSC credential lacks SSID or network key".to_string(),
        )),
    }
}

fn next_attr<'a>(buf: &mut &'a [u8]) -> Result<Option<(u16, &'a [u8])>> {
    if buf.is_empty() {
        return Ok(None);
    }
    if buf.len() < 4 {
        return Err(Error::Encoding("Truncated WSC attribute header".to_string()));
    }
    let attr = buf.get_u16();
    let len = buf.get_u16() as usize;
    if buf.len() < len {
        return Err(Error::Encoding(format!(
            "WSC attribute 0x{attr:04X} claims {len} bytes, {} remain",
            buf.len()
        )));
    }
    let remaining: &'a [u8] = *buf;
    let (value, rest) = remaining.split_at(len);
    *buf = rest;
    Ok(Some((attr, value)))
}

fn utf8(value: &[u8], what: &str) -> Result<String> {
    String::from_utf8(value.to_vec())
        .map_err(|_| Error::Encoding(format!("WSC {what} is not valid UTF-8")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_layout() {
        let payload = encode_credentials(&WifiCredentials::new("AB", "pw")).unwrap();

        #[rustfmt::skip]
        let expected: &[u8] = &[
            0x10, 0x0E, 0x00, 0x27,
            0x10, 0x26, 0x00, 0x01, 0x01,
            0x10, 0x45, 0x00, 0x02, b'A', b'B',
            0x10, 0x03, 0x00, 0x02, 0x00, 0x20,
            0x10, 0x0F, 0x00, 0x02, 0x00, 0x08,
            0x10, 0x27, 0x00, 0x02, b'p', b'w',
            0x10, 0x20, 0x00, 0x06, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
        ];
        assert_eq!(payload.as_ref(), expected);
    }

    #[test]
    fn test_decode_encoded() {
        let creds = WifiCredentials::new("MyNet", "secret123");
        let payload = encode_credentials(&creds).unwrap();
        assert_eq!(decode_credentials(&payload).unwrap(), creds);
    }

    #[test]
    fn test_ssid_too_long() {
        let creds = WifiCredentials::new("x".repeat(33), "pw");
        assert!(matches!(encode_credentials(&creds), Err(Error::Encoding(_))));
    }

    #[test]
    fn test_empty_ssid_rejected() {
        let creds = WifiCredentials::new("", "pw");
        assert!(matches!(encode_credentials(&creds), Err(Error::Encoding(_))));
    }

    #[test]
    fn test_open_network_key_accepted() {
        let payload = encode_credentials(&WifiCredentials::new("Cafe", "")).unwrap();
        assert_eq!(decode_credentials(&payload).unwrap().network_key, "");
    }

    #[test]
    fn test_key_too_long() {
        let creds = WifiCredentials::new("net", "k".repeat(65));
        assert!(matches!(encode_credentials(&creds), Err(Error::Encoding(_))));
    }

    #[test]
    fn test_decode_truncated() {
        let payload = encode_credentials(&WifiCredentials::new("MyNet", "pw")).unwrap();
        let truncated = &payload[..payload.len() - 3];
        assert!(decode_credentials(truncated).is_err());
    }

    #[test]
    fn test_decode_missing_credential() {
        let mut buf = BytesMut::new();
        put_attr(&mut buf, ATTR_SSID, b"loose");
        assert!(decode_credentials(&buf).is_err());
    }
}
