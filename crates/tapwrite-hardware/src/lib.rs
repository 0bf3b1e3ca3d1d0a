//! NFC platform abstraction layer for tag writing.
//!
//! This crate provides trait-based abstractions over the two NFC stacks a
//! tag writer can run on, along with mock implementations for development
//! and testing and an optional PC/SC reader driver.
//!
//! # Design Philosophy
//!
//! - **Async-first**: All platform calls are asynchronous using native
//!   `async fn` in traits (Rust 1.90 + Edition 2024 RPITIT).
//! - **Enum dispatch**: Concrete platforms are wrapped in enums
//!   ([`AnyNfcDriver`], [`AnyBrowserNfc`], [`NfcPlatform`]) since the traits
//!   are not object-safe.
//! - **Thread-safe**: All traits require `Send + Sync` for use with Tokio.
//! - **Error-aware**: All operations return `Result<T>` with [`HardwareError`].
//!
//! # Platforms
//!
//! ## Native
//!
//! The [`NfcDriver`] trait mirrors a mobile NFC manager. Writes go through an
//! [`NdefSession`] bracket:
//!
//! ```no_run
//! use tapwrite_hardware::{NdefSession, NfcDriver, Technology};
//! use tapwrite_hardware::error::Result;
//!
//! async fn write<D: NfcDriver>(session: &mut NdefSession<D>, message: &[u8]) -> Result<()> {
//!     let written = match session.acquire(Technology::Ndef).await {
//!         Ok(()) => session.write(message).await,
//!         Err(e) => Err(e),
//!     };
//!     session.release().await?;
//!     written
//! }
//! ```
//!
//! ## Browser
//!
//! The [`BrowserNfc`] trait mirrors Web NFC: a presence check and a single
//! `write` that frames NDEF itself.
//!
//! # Availability
//!
//! [`AvailabilityProber`] turns platform answers into a
//! [`tapwrite_core::Capability`] with a distinct reason per failure point.
//!
//! # Features
//!
//! - `hardware-pcsc`: `PcscDriver` for ACR122-style readers.
//!
//! [`NfcDriver`]: traits::NfcDriver
//! [`BrowserNfc`]: traits::BrowserNfc
//! [`AnyNfcDriver`]: devices::AnyNfcDriver
//! [`AnyBrowserNfc`]: devices::AnyBrowserNfc
//! [`NfcPlatform`]: devices::NfcPlatform

pub mod devices;
pub mod error;
pub mod mock;
#[cfg(feature = "hardware-pcsc")]
pub mod pcsc_driver;
pub mod prober;
pub mod session;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use devices::{AnyBrowserNfc, AnyNfcDriver, NfcPlatform};
pub use error::{HardwareError, Result};
pub use prober::{AvailabilityProber, SubsystemState};
pub use session::{NdefSession, SessionState, SessionStats};
pub use traits::{BrowserNfc, NfcDriver};
pub use types::{DriverInfo, Technology};

#[cfg(feature = "hardware-pcsc")]
pub use pcsc_driver::{PcscConfig, PcscDriver};
