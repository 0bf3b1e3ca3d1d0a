//! Enum wrappers for NFC platform dispatch.
//!
//! Native `async fn` in traits (RPITIT, Edition 2024) are not object-safe,
//! so `Box<dyn NfcDriver>` is unavailable. These enums give concrete
//! dispatch at compile time instead, with hardware variants behind feature
//! flags.
//!
//! # Examples
//!
//! ```
//! use tapwrite_hardware::devices::{AnyNfcDriver, NfcPlatform};
//! use tapwrite_hardware::mock::MockNfcDriver;
//! use tapwrite_core::Platform;
//!
//! let (driver, _handle) = MockNfcDriver::new();
//! let platform = NfcPlatform::Native(AnyNfcDriver::Mock(driver));
//! assert_eq!(platform.platform(), Platform::Native);
//! ```

use crate::mock::{MockBrowserNfc, MockNfcDriver};
use crate::traits::{BrowserNfc, NfcDriver};
use crate::types::{DriverInfo, Technology};
use crate::Result;
use tapwrite_core::Platform;
use tapwrite_ndef::BrowserRecord;

#[cfg(feature = "hardware-pcsc")]
use crate::pcsc_driver::PcscDriver;

/// Enum wrapper for native driver dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyNfcDriver {
    /// Mock driver for development and testing.
    Mock(MockNfcDriver),

    /// PC/SC contactless reader.
    #[cfg(feature = "hardware-pcsc")]
    Pcsc(PcscDriver),
}

impl NfcDriver for AnyNfcDriver {
    async fn probe_support(&self) -> Result<bool> {
        match self {
            Self::Mock(driver) => driver.probe_support().await,
            #[cfg(feature = "hardware-pcsc")]
            Self::Pcsc(driver) => driver.probe_support().await,
        }
    }

    async fn initialize(&mut self) -> Result<()> {
        match self {
            Self::Mock(driver) => driver.initialize().await,
            #[cfg(feature = "hardware-pcsc")]
            Self::Pcsc(driver) => driver.initialize().await,
        }
    }

    async fn is_enabled(&self) -> Result<bool> {
        match self {
            Self::Mock(driver) => driver.is_enabled().await,
            #[cfg(feature = "hardware-pcsc")]
            Self::Pcsc(driver) => driver.is_enabled().await,
        }
    }

    async fn acquire_session(&mut self, technology: Technology) -> Result<()> {
        match self {
            Self::Mock(driver) => driver.acquire_session(technology).await,
            #[cfg(feature = "hardware-pcsc")]
            Self::Pcsc(driver) => driver.acquire_session(technology).await,
        }
    }

    async fn release_session(&mut self) -> Result<()> {
        match self {
            Self::Mock(driver) => driver.release_session().await,
            #[cfg(feature = "hardware-pcsc")]
            Self::Pcsc(driver) => driver.release_session().await,
        }
    }

    async fn write_message(&mut self, message: &[u8]) -> Result<()> {
        match self {
            Self::Mock(driver) => driver.write_message(message).await,
            #[cfg(feature = "hardware-pcsc")]
            Self::Pcsc(driver) => driver.write_message(message).await,
        }
    }

    async fn get_info(&self) -> Result<DriverInfo> {
        match self {
            Self::Mock(driver) => driver.get_info().await,
            #[cfg(feature = "hardware-pcsc")]
            Self::Pcsc(driver) => driver.get_info().await,
        }
    }
}

/// Enum wrapper for browser writer dispatch.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyBrowserNfc {
    /// Mock browser for development and testing.
    Mock(MockBrowserNfc),
}

impl BrowserNfc for AnyBrowserNfc {
    fn has_reader_api(&self) -> bool {
        match self {
            Self::Mock(browser) => browser.has_reader_api(),
        }
    }

    async fn write(&mut self, records: &[BrowserRecord]) -> Result<()> {
        match self {
            Self::Mock(browser) => browser.write(records).await,
        }
    }
}

/// The NFC stack a writer is mounted on.
#[derive(Debug)]
pub enum NfcPlatform {
    Native(AnyNfcDriver),
    Browser(AnyBrowserNfc),
}

impl NfcPlatform {
    pub fn platform(&self) -> Platform {
        match self {
            Self::Native(_) => Platform::Native,
            Self::Browser(_) => Platform::Browser,
        }
    }
}

impl From<MockNfcDriver> for NfcPlatform {
    fn from(driver: MockNfcDriver) -> Self {
        Self::Native(AnyNfcDriver::Mock(driver))
    }
}

impl From<MockBrowserNfc> for NfcPlatform {
    fn from(browser: MockBrowserNfc) -> Self {
        Self::Browser(AnyBrowserNfc::Mock(browser))
    }
}

#[cfg(feature = "hardware-pcsc")]
impl From<PcscDriver> for NfcPlatform {
    fn from(driver: PcscDriver) -> Self {
        Self::Native(AnyNfcDriver::Pcsc(driver))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTag;

    #[tokio::test]
    async fn test_any_driver_mock() {
        let (driver, handle) = MockNfcDriver::new();
        let mut any = AnyNfcDriver::Mock(driver);

        assert!(any.probe_support().await.unwrap());
        any.initialize().await.unwrap();
        assert!(any.is_enabled().await.unwrap());
        any.acquire_session(Technology::Ndef).await.unwrap();

        handle.present_tag(MockTag::new(vec![0x04])).await.unwrap();
        any.write_message(b"\xD1\x01\x00T").await.unwrap();
        any.release_session().await.unwrap();

        let info = any.get_info().await.unwrap();
        assert_eq!(info.name, "Mock NFC");
    }

    #[test]
    fn test_any_browser_mock() {
        let (browser, _handle) = MockBrowserNfc::new(true);
        let any = AnyBrowserNfc::Mock(browser);
        assert!(any.has_reader_api());
    }

    #[test]
    fn test_platform_kind() {
        let (browser, _handle) = MockBrowserNfc::new(true);
        let platform = NfcPlatform::from(browser);
        assert_eq!(platform.platform(), Platform::Browser);
    }
}
