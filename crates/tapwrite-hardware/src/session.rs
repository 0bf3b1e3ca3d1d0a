//! Acquire/release bracket around a native NFC session.
//!
//! [`NdefSession`] owns the driver and tracks whether a technology request
//! is outstanding. A write future dropped mid-flight leaves the bracket in
//! `Pending` or `Held`; the next [`acquire`](NdefSession::acquire) releases
//! that session before requesting a new one, so a second concurrent session
//! is never requested.

use crate::{HardwareError, Result, traits::NfcDriver, types::Technology};
use serde::Serialize;
use tracing::{debug, warn};

/// Bracket state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No request outstanding.
    #[default]
    Idle,
    /// Acquire sent, not yet confirmed. A release is still owed.
    Pending,
    /// The driver granted the session.
    Held,
}

/// Driver call counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SessionStats {
    /// `acquire_session` calls sent to the driver.
    pub acquired: u64,
    /// `release_session` calls sent to the driver.
    pub released: u64,
    /// Leaked sessions released before a new acquire.
    pub recovered: u64,
}

impl SessionStats {
    /// Sessions requested but not yet released.
    pub fn outstanding(&self) -> u64 {
        self.acquired.saturating_sub(self.released)
    }
}

/// Session bracket over a native driver.
///
/// # Examples
///
/// ```
/// use tapwrite_hardware::mock::{MockNfcDriver, MockTag};
/// use tapwrite_hardware::session::NdefSession;
/// use tapwrite_hardware::traits::NfcDriver;
/// use tapwrite_hardware::types::Technology;
///
/// #[tokio::main]
/// async fn main() -> tapwrite_hardware::Result<()> {
///     let (mut driver, handle) = MockNfcDriver::new();
///     driver.initialize().await?;
///     handle.present_tag(MockTag::new(vec![0x04])).await?;
///
///     let mut session = NdefSession::new(driver);
///     session.acquire(Technology::Ndef).await?;
///     session.write(b"\xD1\x01\x00T").await?;
///     session.release().await?;
///
///     assert_eq!(session.stats().outstanding(), 0);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct NdefSession<D> {
    driver: D,
    state: SessionState,
    stats: SessionStats,
}

impl<D: NfcDriver> NdefSession<D> {
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            state: SessionState::Idle,
            stats: SessionStats::default(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether a release is owed to the driver.
    pub fn is_open(&self) -> bool {
        self.state != SessionState::Idle
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Request a session, first releasing any left open by a dropped attempt.
    ///
    /// On failure the bracket stays `Pending`, so the caller's release still
    /// reaches the driver.
    ///
    /// # Errors
    ///
    /// Returns the driver's error if the request is refused.
    pub async fn acquire(&mut self, technology: Technology) -> Result<()> {
        if self.is_open() {
            warn!(state = ?self.state, "Releasing leaked NFC session before acquiring");
            self.stats.recovered += 1;
            if let Err(e) = self.release().await {
                warn!(error = %e, "Leaked session release failed");
            }
        }

        self.state = SessionState::Pending;
        self.stats.acquired += 1;
        debug!(%technology, "Requesting NFC session");
        self.driver.acquire_session(technology).await?;

        self.state = SessionState::Held;
        Ok(())
    }

    /// Release the session. A no-op when nothing is outstanding.
    ///
    /// The bracket returns to `Idle` even if the driver raises.
    ///
    /// # Errors
    ///
    /// Returns the driver's error if the cancellation is rejected.
    pub async fn release(&mut self) -> Result<()> {
        if !self.is_open() {
            return Ok(());
        }

        let result = self.driver.release_session().await;
        self.state = SessionState::Idle;
        self.stats.released += 1;
        debug!("NFC session released");
        result
    }

    /// Write an encoded message through the held session.
    ///
    /// # Errors
    ///
    /// Returns `NoSession` unless a session is held, otherwise the driver's
    /// write error.
    pub async fn write(&mut self, message: &[u8]) -> Result<()> {
        if self.state != SessionState::Held {
            return Err(HardwareError::NoSession);
        }
        self.driver.write_message(message).await
    }
}
