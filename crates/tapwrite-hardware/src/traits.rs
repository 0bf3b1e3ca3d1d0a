//! NFC platform trait definitions.
//!
//! These traits establish the contract between the tag writer and the
//! platform's NFC stack. A native target exposes a driver with explicit
//! session control; a browser target exposes only a capability flag and a
//! single write call that frames NDEF itself.
//!
//! All traits use native `async fn` methods (Rust 1.90 + Edition 2024 RPITIT),
//! eliminating the need for the `async_trait` macro.

#![allow(async_fn_in_trait)]

use crate::error::Result;
use crate::types::{DriverInfo, Technology};
use tapwrite_ndef::BrowserRecord;

/// Native platform NFC driver.
///
/// Mirrors the operations a mobile NFC manager exposes. Only one session
/// may be open process-wide; the driver is free to reject a second
/// [`acquire_session`](Self::acquire_session) with
/// [`HardwareError::SessionBusy`](crate::HardwareError::SessionBusy).
///
/// # Object Safety and Dynamic Dispatch
///
/// **NOTE**: This trait is NOT object-safe because `async fn` methods return
/// `impl Future`. Use generic parameters, or the enum wrapper
/// [`AnyNfcDriver`](crate::devices::AnyNfcDriver) for concrete dispatch.
///
/// # Examples
///
/// ```no_run
/// use tapwrite_hardware::traits::NfcDriver;
/// use tapwrite_hardware::types::Technology;
/// use tapwrite_hardware::error::Result;
///
/// async fn write_once<D: NfcDriver>(driver: &mut D, message: &[u8]) -> Result<()> {
///     driver.acquire_session(Technology::Ndef).await?;
///     let written = driver.write_message(message).await;
///     driver.release_session().await?;
///     written
/// }
/// ```
pub trait NfcDriver: Send + Sync {
    /// Whether the hardware has an NFC controller.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform cannot be queried.
    async fn probe_support(&self) -> Result<bool>;

    /// Start the NFC subsystem.
    ///
    /// Calling this more than once must be harmless.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::InitializationFailed`](crate::HardwareError::InitializationFailed)
    /// if the subsystem cannot be started.
    async fn initialize(&mut self) -> Result<()>;

    /// Whether NFC is enabled in system settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the setting cannot be read.
    async fn is_enabled(&self) -> Result<bool>;

    /// Request exclusive access to the given technology.
    ///
    /// May suspend until a tag of that technology is in range.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Another session is open
    /// - The subsystem has not been started
    /// - The platform times out or the request is cancelled
    async fn acquire_session(&mut self, technology: Technology) -> Result<()>;

    /// Relinquish the current technology request.
    ///
    /// Must succeed as a no-op when no session is open.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform rejects the cancellation.
    async fn release_session(&mut self) -> Result<()>;

    /// Write an encoded NDEF message to the tag in range.
    ///
    /// Suspends until the platform confirms the write or raises.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No session is open
    /// - The tag leaves the field
    /// - The tag is read-only or too small
    /// - The platform times out
    async fn write_message(&mut self, message: &[u8]) -> Result<()>;

    /// Get driver information.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver cannot be queried.
    async fn get_info(&self) -> Result<DriverInfo>;
}

/// Browser-hosted NFC writer (Web NFC `NDEFReader`).
///
/// # Object Safety and Dynamic Dispatch
///
/// Not object-safe; see [`NfcDriver`]. For dynamic dispatch, use
/// [`AnyBrowserNfc`](crate::devices::AnyBrowserNfc).
pub trait BrowserNfc: Send + Sync {
    /// Whether an NDEF-capable reader object exists in the environment.
    ///
    /// This is a presence check only; it performs no I/O.
    fn has_reader_api(&self) -> bool;

    /// Write records to the next tag tapped.
    ///
    /// The browser performs NDEF framing itself.
    ///
    /// # Errors
    ///
    /// Returns an error if the user denies permission, the tag leaves the
    /// field, or the write is rejected.
    async fn write(&mut self, records: &[BrowserRecord]) -> Result<()>;
}
