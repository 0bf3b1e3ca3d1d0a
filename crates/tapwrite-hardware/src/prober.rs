//! NFC availability probing.
//!
//! Native targets are checked in three steps, each with its own failure
//! reason: hardware support, subsystem start-up, then the system setting.
//! The subsystem is started at most once per prober, however many times it
//! probes. Browser targets only check for the reader API.

use crate::traits::{BrowserNfc, NfcDriver};
use crate::Result;
use serde::Serialize;
use tapwrite_core::{Capability, UnavailableReason};
use tracing::{debug, info, warn};

/// Lifecycle of the platform NFC subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubsystemState {
    #[default]
    NotStarted,
    Started,
}

/// Determines whether the host can write tags.
#[derive(Debug, Default)]
pub struct AvailabilityProber {
    subsystem: SubsystemState,
}

impl AvailabilityProber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subsystem(&self) -> SubsystemState {
        self.subsystem
    }

    /// Probe a native driver.
    ///
    /// Never fails: a platform fault is logged and reported as
    /// [`UnavailableReason::ProbeFault`].
    pub async fn probe_native<D: NfcDriver>(&mut self, driver: &mut D) -> Capability {
        let capability = match self.check_native(driver).await {
            Ok(capability) => capability,
            Err(e) => {
                warn!(error = %e, "NFC probe raised");
                Capability::Unavailable(UnavailableReason::ProbeFault(e.to_string()))
            }
        };
        info!(%capability, "NFC probe finished");
        capability
    }

    async fn check_native<D: NfcDriver>(&mut self, driver: &mut D) -> Result<Capability> {
        if !driver.probe_support().await? {
            return Ok(Capability::Unavailable(UnavailableReason::UnsupportedHardware));
        }

        if self.subsystem == SubsystemState::NotStarted {
            if let Err(e) = driver.initialize().await {
                warn!(error = %e, "NFC subsystem failed to start");
                return Ok(Capability::Unavailable(UnavailableReason::InitializationFailed));
            }
            self.subsystem = SubsystemState::Started;
            debug!("NFC subsystem started");
        }

        if !driver.is_enabled().await? {
            return Ok(Capability::Unavailable(UnavailableReason::Disabled));
        }

        Ok(Capability::Available)
    }

    /// Probe a browser host. Performs no I/O.
    pub fn probe_browser<B: BrowserNfc>(&self, browser: &B) -> Capability {
        let capability = if browser.has_reader_api() {
            Capability::Available
        } else {
            Capability::Unavailable(UnavailableReason::NoReaderApi)
        };
        info!(%capability, "Browser NFC probe finished");
        capability
    }
}
