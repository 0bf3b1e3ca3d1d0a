use crate::{
    Result,
    constants::{
        MSG_DISABLED, MSG_INIT_FAILED, MSG_NO_READER_API, MSG_PROBE_FAULT, MSG_UNSUPPORTED_HARDWARE,
        MSG_WRITE_SUCCESS,
    },
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Host environment the NFC flow runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    /// Native mobile target with a platform NFC driver.
    Native,
    /// Browser target exposing a Web NFC reader object.
    Browser,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Platform::Native => write!(f, "native"),
            Platform::Browser => write!(f, "browser"),
        }
    }
}

/// Why the host cannot perform NFC operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnavailableReason {
    /// Browser has no NDEF reader API.
    NoReaderApi,
    /// Device hardware has no NFC controller.
    UnsupportedHardware,
    /// The NFC subsystem failed to start.
    InitializationFailed,
    /// NFC is turned off in system settings.
    Disabled,
    /// The platform raised while probing.
    ProbeFault(String),
}

impl UnavailableReason {
    /// Human-readable message for this failure point.
    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            UnavailableReason::NoReaderApi => MSG_NO_READER_API,
            UnavailableReason::UnsupportedHardware => MSG_UNSUPPORTED_HARDWARE,
            UnavailableReason::InitializationFailed => MSG_INIT_FAILED,
            UnavailableReason::Disabled => MSG_DISABLED,
            UnavailableReason::ProbeFault(_) => MSG_PROBE_FAULT,
        }
    }
}

impl fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

/// NFC capability of the host as seen by one component instance.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Not probed yet.
    #[default]
    Unknown,
    /// Probe in progress.
    Checking,
    /// NFC can be used.
    Available,
    /// NFC cannot be used.
    Unavailable(UnavailableReason),
}

impl Capability {
    #[must_use]
    pub fn is_available(&self) -> bool {
        matches!(self, Capability::Available)
    }

    /// Returns `true` once the probe has reported.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Capability::Available | Capability::Unavailable(_))
    }

    /// The unavailability reason, if any.
    #[must_use]
    pub fn reason(&self) -> Option<&UnavailableReason> {
        match self {
            Capability::Unavailable(reason) => Some(reason),
            _ => None,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Capability::Unknown => write!(f, "unknown"),
            Capability::Checking => write!(f, "checking"),
            Capability::Available => write!(f, "available"),
            Capability::Unavailable(reason) => write!(f, "unavailable: {reason}"),
        }
    }
}

/// Payload mode selected on the write screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WriteMode {
    #[default]
    Text,
    Uri,
    WifiSimple,
    Vcard,
}

impl WriteMode {
    pub const ALL: [WriteMode; 4] = [
        WriteMode::Text,
        WriteMode::Uri,
        WriteMode::WifiSimple,
        WriteMode::Vcard,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            WriteMode::Text => "TEXT",
            WriteMode::Uri => "URI",
            WriteMode::WifiSimple => "WIFI_SIMPLE",
            WriteMode::Vcard => "VCARD",
        }
    }
}

impl fmt::Display for WriteMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for WriteMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        match normalized.as_str() {
            "TEXT" => Ok(WriteMode::Text),
            "URI" | "URL" => Ok(WriteMode::Uri),
            "WIFI_SIMPLE" | "WIFI" => Ok(WriteMode::WifiSimple),
            "VCARD" => Ok(WriteMode::Vcard),
            _ => Err(Error::Config(format!("Unknown write mode: {s}"))),
        }
    }
}

/// Wi-Fi network credentials written as a WSC handover record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WifiCredentials {
    pub ssid: String,
    pub network_key: String,
}

impl WifiCredentials {
    pub fn new(ssid: impl Into<String>, network_key: impl Into<String>) -> Self {
        Self {
            ssid: ssid.into(),
            network_key: network_key.into(),
        }
    }

    /// Parse `"SSID, password"` form input.
    ///
    /// Splits on the first comma and trims both sides, so the key may itself
    /// contain commas. An empty key is accepted for open networks.
    ///
    /// # Errors
    /// Returns `Error::Encoding` if the input has no comma or the SSID is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use tapwrite_core::WifiCredentials;
    ///
    /// let creds = WifiCredentials::parse("MyNet, secret123").unwrap();
    /// assert_eq!(creds.ssid, "MyNet");
    /// assert_eq!(creds.network_key, "secret123");
    ///
    /// assert!(WifiCredentials::parse("MyNet").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Self> {
        let (ssid, key) = input.split_once(',').ok_or_else(|| {
            Error::Encoding("Wi-Fi input must be \"SSID, password\"".to_string())
        })?;

        let ssid = ssid.trim();
        if ssid.is_empty() {
            return Err(Error::Encoding("Wi-Fi SSID cannot be empty".to_string()));
        }

        Ok(Self::new(ssid, key.trim()))
    }
}

/// Fixed-shape card record written by the card widget.
///
/// Serializes with the keys `number`, `holder`, `expiry`, `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardRecord {
    pub number: String,
    pub holder: String,
    pub expiry: String,
    #[serde(rename = "type")]
    pub card_type: String,
}

impl CardRecord {
    pub fn new(
        number: impl Into<String>,
        holder: impl Into<String>,
        expiry: impl Into<String>,
        card_type: impl Into<String>,
    ) -> Self {
        Self {
            number: number.into(),
            holder: holder.into(),
            expiry: expiry.into(),
            card_type: card_type.into(),
        }
    }

    /// JSON text stored on the tag.
    ///
    /// # Errors
    /// Returns `Error::Encoding` if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::Encoding(e.to_string()))
    }
}

/// One logical payload to be written to a tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum WriteRequest {
    Text(String),
    Uri(String),
    Wifi(WifiCredentials),
    Vcard(String),
    Card(CardRecord),
}

impl WriteRequest {
    /// Build a request from the write screen's mode and input value.
    ///
    /// # Errors
    /// Returns `Error::Encoding` if Wi-Fi input cannot be parsed.
    pub fn from_form(mode: WriteMode, value: &str) -> Result<Self> {
        Ok(match mode {
            WriteMode::Text => WriteRequest::Text(value.to_string()),
            WriteMode::Uri => WriteRequest::Uri(value.to_string()),
            WriteMode::WifiSimple => WriteRequest::Wifi(WifiCredentials::parse(value)?),
            WriteMode::Vcard => WriteRequest::Vcard(value.to_string()),
        })
    }

    /// Short label used in logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            WriteRequest::Text(_) => "text",
            WriteRequest::Uri(_) => "uri",
            WriteRequest::Wifi(_) => "wifi",
            WriteRequest::Vcard(_) => "vcard",
            WriteRequest::Card(_) => "card",
        }
    }
}

/// Result of one write attempt as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum WriteOutcome {
    Success,
    Failure(String),
}

impl WriteOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, WriteOutcome::Success)
    }

    /// Message displayed for this outcome.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            WriteOutcome::Success => MSG_WRITE_SUCCESS,
            WriteOutcome::Failure(message) => message,
        }
    }
}

impl From<&Error> for WriteOutcome {
    fn from(error: &Error) -> Self {
        WriteOutcome::Failure(error.user_message())
    }
}

impl fmt::Display for WriteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("MyNet, secret123", "MyNet", "secret123")]
    #[case("  Cafe  ,  pw  ", "Cafe", "pw")]
    #[case("Home,pa,ss", "Home", "pa,ss")]
    #[case("Guest,", "Guest", "")]
    fn test_wifi_parse_valid(#[case] input: &str, #[case] ssid: &str, #[case] key: &str) {
        let creds = WifiCredentials::parse(input).unwrap();
        assert_eq!(creds.ssid, ssid);
        assert_eq!(creds.network_key, key);
    }

    #[rstest]
    #[case("")]
    #[case("NoComma")]
    #[case(" , secret")]
    fn test_wifi_parse_invalid(#[case] input: &str) {
        let result = WifiCredentials::parse(input);
        assert!(matches!(result, Err(Error::Encoding(_))));
    }

    #[rstest]
    #[case("TEXT", WriteMode::Text)]
    #[case("uri", WriteMode::Uri)]
    #[case("wifi-simple", WriteMode::WifiSimple)]
    #[case("WIFI_SIMPLE", WriteMode::WifiSimple)]
    #[case("VCard", WriteMode::Vcard)]
    fn test_write_mode_parse(#[case] input: &str, #[case] expected: WriteMode) {
        assert_eq!(input.parse::<WriteMode>().unwrap(), expected);
    }

    #[test]
    fn test_write_mode_unknown() {
        assert!("nfc".parse::<WriteMode>().is_err());
    }

    #[test]
    fn test_write_mode_display_roundtrip() {
        for mode in WriteMode::ALL {
            assert_eq!(mode.to_string().parse::<WriteMode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_card_record_json_shape() {
        let card = CardRecord::new("4111 1111 1111 1111", "Jane Doe", "12/27", "VISA");
        assert_eq!(
            card.to_json().unwrap(),
            r#"{"number":"4111 1111 1111 1111","holder":"Jane Doe","expiry":"12/27","type":"VISA"}"#
        );
    }

    #[test]
    fn test_from_form() {
        assert_eq!(
            WriteRequest::from_form(WriteMode::Text, "Hello").unwrap(),
            WriteRequest::Text("Hello".into())
        );
        assert_eq!(
            WriteRequest::from_form(WriteMode::WifiSimple, "MyNet, secret123").unwrap(),
            WriteRequest::Wifi(WifiCredentials::new("MyNet", "secret123"))
        );
        assert!(WriteRequest::from_form(WriteMode::WifiSimple, "MyNet").is_err());
    }

    #[test]
    fn test_capability_states() {
        assert!(!Capability::Unknown.is_terminal());
        assert!(!Capability::Checking.is_terminal());
        assert!(Capability::Available.is_available());

        let unavailable = Capability::Unavailable(UnavailableReason::Disabled);
        assert!(unavailable.is_terminal());
        assert!(!unavailable.is_available());
        assert_eq!(unavailable.reason(), Some(&UnavailableReason::Disabled));
    }

    #[test]
    fn test_outcome_messages() {
        assert_eq!(WriteOutcome::Success.message(), "Write successful!");
        let failure = WriteOutcome::from(&Error::Write("tag lost".into()));
        assert_eq!(failure.message(), "Writing failed. Please try again.");
        assert!(!failure.is_success());
    }
}
