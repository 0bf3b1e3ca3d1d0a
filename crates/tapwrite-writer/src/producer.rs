//! Sources of write requests.
//!
//! A producer is consulted when the user triggers a write, so it always
//! reflects the latest form state. Its result is consumed by exactly one
//! attempt.

use tapwrite_core::{CardRecord, Result, WriteMode, WriteRequest};

/// Builds the request for one write attempt.
pub trait RequestProducer {
    /// # Errors
    ///
    /// Returns `Error::Encoding` if the form input cannot form a request.
    fn produce(&self) -> Result<WriteRequest>;
}

/// The write screen's mode selector and input field.
///
/// # Examples
///
/// ```
/// use tapwrite_core::{WriteMode, WriteRequest};
/// use tapwrite_writer::{FormProducer, RequestProducer};
///
/// let form = FormProducer::new(WriteMode::Uri, "https://example.com");
/// assert_eq!(form.produce().unwrap(), WriteRequest::Uri("https://example.com".into()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormProducer {
    pub mode: WriteMode,
    pub value: String,
}

impl FormProducer {
    pub fn new(mode: WriteMode, value: impl Into<String>) -> Self {
        Self {
            mode,
            value: value.into(),
        }
    }
}

impl RequestProducer for FormProducer {
    fn produce(&self) -> Result<WriteRequest> {
        WriteRequest::from_form(self.mode, &self.value)
    }
}

/// The card widget, which always writes its card as JSON text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardProducer(pub CardRecord);

impl RequestProducer for CardProducer {
    fn produce(&self) -> Result<WriteRequest> {
        Ok(WriteRequest::Card(self.0.clone()))
    }
}

impl RequestProducer for WriteRequest {
    fn produce(&self) -> Result<WriteRequest> {
        Ok(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tapwrite_core::{Error, WifiCredentials};

    #[test]
    fn test_form_wifi() {
        let form = FormProducer::new(WriteMode::WifiSimple, "Home , hunter2 ");
        assert_eq!(
            form.produce().unwrap(),
            WriteRequest::Wifi(WifiCredentials::new("Home", "hunter2"))
        );
    }

    #[test]
    fn test_form_wifi_without_comma() {
        let form = FormProducer::new(WriteMode::WifiSimple, "HomeNetwork");
        assert!(matches!(form.produce(), Err(Error::Encoding(_))));
    }

    #[test]
    fn test_card_producer() {
        let card = CardRecord::new("4111", "Ana", "12/29", "VISA");
        let producer = CardProducer(card.clone());
        assert_eq!(producer.produce().unwrap(), WriteRequest::Card(card));
    }
}
