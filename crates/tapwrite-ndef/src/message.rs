use bytes::{Buf, Bytes, BytesMut};
use tapwrite_core::{Error, Result};

use crate::record::{FLAG_CF, FLAG_IL, FLAG_MB, FLAG_ME, FLAG_SR, NdefRecord, Tnf};

/// An NDEF message: one or more records framed by MB/ME flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NdefMessage {
    records: Vec<NdefRecord>,
}

impl NdefMessage {
    /// Create a message from records.
    ///
    /// # Errors
    /// Returns `Error::Encoding` if `records` is empty.
    pub fn new(records: Vec<NdefRecord>) -> Result<Self> {
        if records.is_empty() {
            return Err(Error::Encoding(
                "NDEF message needs at least one record".to_string(),
            ));
        }
        Ok(Self { records })
    }

    /// Message holding exactly one record.
    pub fn single(record: NdefRecord) -> Self {
        Self {
            records: vec![record],
        }
    }

    pub fn records(&self) -> &[NdefRecord] {
        &self.records
    }

    /// First record of the message.
    pub fn first(&self) -> &NdefRecord {
        // Constructors guarantee at least one record.
        &self.records[0]
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Total encoded size in bytes.
    pub fn encoded_len(&self) -> usize {
        self.records.iter().map(NdefRecord::encoded_len).sum()
    }

    /// Serialize the message to its wire form.
    ///
    /// # Errors
    /// Returns `Error::Encoding` if any record cannot be framed.
    ///
    /// # Examples
    ///
    /// ```
    /// use tapwrite_ndef::{NdefMessage, NdefRecord};
    ///
    /// let message = NdefMessage::single(NdefRecord::uri("tel:123"));
    /// let bytes = message.to_bytes().unwrap();
    /// assert_eq!(bytes[0], 0xD1);
    /// assert_eq!(NdefMessage::parse(&bytes).unwrap(), message);
    /// ```
    pub fn to_bytes(&self) -> Result<Bytes> {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        let last = self.records.len() - 1;
        for (index, record) in self.records.iter().enumerate() {
            record.encode_into(&mut buf, index == 0, index == last)?;
        }
        Ok(buf.freeze())
    }

    /// Parse a complete NDEF message.
    ///
    /// # Errors
    /// Returns `Error::Encoding` if the input is empty or truncated, the
    /// first record lacks MB, the last lacks ME, bytes follow the ME record,
    /// or a record is chunked.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.is_empty() {
            return Err(Error::Encoding("Empty NDEF message".to_string()));
        }

        let mut buf = data;
        let mut records = Vec::new();

        loop {
            let header = take_u8(&mut buf)?;

            if records.is_empty() && header & FLAG_MB == 0 {
                return Err(Error::Encoding(
                    "First record is missing the MB flag".to_string(),
                ));
            }
            if !records.is_empty() && header & FLAG_MB != 0 {
                return Err(Error::Encoding(
                    "MB flag set on a non-initial record".to_string(),
                ));
            }
            if header & FLAG_CF != 0 {
                return Err(Error::Encoding(
                    "Chunked records are not supported".to_string(),
                ));
            }

            let type_len = take_u8(&mut buf)? as usize;
            let payload_len = if header & FLAG_SR != 0 {
                take_u8(&mut buf)? as usize
            } else {
                take_u32(&mut buf)? as usize
            };
            let id_len = if header & FLAG_IL != 0 {
                take_u8(&mut buf)? as usize
            } else {
                0
            };

            let record_type = take_bytes(&mut buf, type_len)?;
            let id = take_bytes(&mut buf, id_len)?;
            let payload = take_bytes(&mut buf, payload_len)?;

            records.push(NdefRecord {
                tnf: Tnf::from_header(header),
                record_type,
                id,
                payload,
            });

            if header & FLAG_ME != 0 {
                break;
            }
            if buf.is_empty() {
                return Err(Error::Encoding(
                    "Last record is missing the ME flag".to_string(),
                ));
            }
        }

        if !buf.is_empty() {
            return Err(Error::Encoding(format!(
                "{} trailing bytes after end of message",
                buf.len()
            )));
        }

        Ok(Self { records })
    }
}

impl From<NdefRecord> for NdefMessage {
    fn from(record: NdefRecord) -> Self {
        Self::single(record)
    }
}

fn truncated() -> Error {
    Error::Encoding("Truncated NDEF record".to_string())
}

fn take_u8(buf: &mut &[u8]) -> Result<u8> {
    if buf.remaining() < 1 {
        return Err(truncated());
    }
    Ok(buf.get_u8())
}

fn take_u32(buf: &mut &[u8]) -> Result<u32> {
    if buf.remaining() < 4 {
        return Err(truncated());
    }
    Ok(buf.get_u32())
}

fn take_bytes(buf: &mut &[u8], len: usize) -> Result<Bytes> {
    if buf.remaining() < len {
        return Err(truncated());
    }
    Ok(buf.copy_to_bytes(len))
}
