//! Tag writer configuration.

use serde::{Deserialize, Serialize};
use tapwrite_core::{
    Error, Result,
    constants::{
        BROWSER_TEXT_ENCODING, DEFAULT_HISTORY_SIZE, DEFAULT_LANGUAGE, MAX_LANGUAGE_CODE_LENGTH,
    },
};
use tapwrite_ndef::EncodeOptions;

/// Configuration for a [`TagWriter`](crate::TagWriter).
///
/// # Examples
///
/// ```
/// use tapwrite_writer::WriterConfig;
///
/// let config: WriterConfig = serde_json::from_str(r#"{"language": "pt-BR"}"#).unwrap();
/// assert_eq!(config.language, "pt-BR");
/// assert_eq!(config.history_size, 100);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WriterConfig {
    /// IANA language code stamped on text records.
    pub language: String,

    /// Text encoding declared on browser text records. Only UTF-8 is written.
    pub text_encoding: String,

    /// State transitions kept for diagnostics.
    pub history_size: usize,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            text_encoding: BROWSER_TEXT_ENCODING.to_string(),
            history_size: DEFAULT_HISTORY_SIZE,
        }
    }
}

impl WriterConfig {
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Check the configuration.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the language code is empty, longer than 63
    /// bytes or not ASCII, if the text encoding is not UTF-8, or if the
    /// history size is zero.
    pub fn validate(&self) -> Result<()> {
        if self.language.is_empty() || self.language.len() > MAX_LANGUAGE_CODE_LENGTH {
            return Err(Error::Config(format!(
                "language must be 1-{MAX_LANGUAGE_CODE_LENGTH} bytes, got {}",
                self.language.len()
            )));
        }
        if !self.language.is_ascii() {
            return Err(Error::Config(format!(
                "language must be ASCII: {}",
                self.language
            )));
        }
        if !self.text_encoding.eq_ignore_ascii_case(BROWSER_TEXT_ENCODING) {
            return Err(Error::Config(format!(
                "unsupported text encoding: {}",
                self.text_encoding
            )));
        }
        if self.history_size == 0 {
            return Err(Error::Config("history_size must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Encoder options derived from this configuration.
    pub fn encode_options(&self) -> EncodeOptions {
        EncodeOptions::with_language(self.language.clone())
    }
}
