//! The reusable tag writer component.
//!
//! One [`TagWriter`] stands in for one mounted write screen or card widget.
//! It owns its platform, probes availability on [`mount`](TagWriter::mount),
//! runs one attempt per [`write`](TagWriter::write) call, and releases the
//! session on every exit path, including [`unmount`](TagWriter::unmount).
//!
//! `write` takes `&mut self`, so at most one attempt is in flight per
//! instance. Share a writer across tasks behind a `tokio::sync::Mutex`.

use std::collections::VecDeque;

use tapwrite_core::{Capability, Error, Platform, Result, WriteOutcome};
use tapwrite_hardware::{
    AnyBrowserNfc, AnyNfcDriver, AvailabilityProber, BrowserNfc, DriverInfo, HardwareError,
    NdefSession, NfcDriver, NfcPlatform, SessionStats, Technology,
};
use tapwrite_ndef::{EncodeOptions, browser_records, encode_request, encode_request_bytes};
use tracing::{Instrument, Span, debug, field, info, info_span, warn};
use uuid::Uuid;

use crate::config::WriterConfig;
use crate::producer::RequestProducer;
use crate::report::WriteReport;
use crate::state_machine::{StateTransition, WriteState, WriteStateMachine};

#[derive(Debug)]
enum Backend {
    Native(NdefSession<AnyNfcDriver>),
    Browser(AnyBrowserNfc),
}

impl From<NfcPlatform> for Backend {
    fn from(platform: NfcPlatform) -> Self {
        match platform {
            NfcPlatform::Native(driver) => Backend::Native(NdefSession::new(driver)),
            NfcPlatform::Browser(browser) => Backend::Browser(browser),
        }
    }
}

/// NFC tag writer.
///
/// # Examples
///
/// ```
/// use tapwrite_core::WriteMode;
/// use tapwrite_hardware::mock::{MockNfcDriver, MockTag};
/// use tapwrite_writer::{FormProducer, TagWriter, WriterConfig};
///
/// #[tokio::main]
/// async fn main() -> tapwrite_core::Result<()> {
///     let (driver, handle) = MockNfcDriver::new();
///     let mut writer = TagWriter::new(driver, WriterConfig::default())?;
///
///     writer.mount().await?;
///     handle.present_tag(MockTag::new(vec![0x04, 0x01])).await?;
///
///     let report = writer
///         .write(&FormProducer::new(WriteMode::Text, "Hello"))
///         .await
///         .unwrap();
///     assert_eq!(report.outcome.message(), "Write successful!");
///
///     writer.unmount().await;
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct TagWriter {
    backend: Backend,
    prober: AvailabilityProber,
    capability: Capability,
    machine: WriteStateMachine,
    config: WriterConfig,
    options: EncodeOptions,
    last_outcome: Option<WriteOutcome>,
}

impl TagWriter {
    /// Create an unmounted writer over the given platform.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the configuration is invalid.
    pub fn new(platform: impl Into<NfcPlatform>, config: WriterConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            backend: Backend::from(platform.into()),
            prober: AvailabilityProber::new(),
            capability: Capability::Unknown,
            machine: WriteStateMachine::builder()
                .with_history_size(config.history_size)
                .build(),
            options: config.encode_options(),
            config,
            last_outcome: None,
        })
    }

    pub fn platform(&self) -> Platform {
        match self.backend {
            Backend::Native(_) => Platform::Native,
            Backend::Browser(_) => Platform::Browser,
        }
    }

    pub fn capability(&self) -> &Capability {
        &self.capability
    }

    /// Whether the write control is enabled.
    pub fn can_write(&self) -> bool {
        self.capability.is_available()
    }

    pub fn state(&self) -> WriteState {
        self.machine.current_state()
    }

    pub fn history(&self) -> &VecDeque<StateTransition> {
        self.machine.history()
    }

    /// Outcome of the last completed attempt, cleared when the next starts.
    pub fn last_outcome(&self) -> Option<&WriteOutcome> {
        self.last_outcome.as_ref()
    }

    /// Session counters. `None` on browser targets.
    pub fn session_stats(&self) -> Option<SessionStats> {
        match &self.backend {
            Backend::Native(session) => Some(session.stats()),
            Backend::Browser(_) => None,
        }
    }

    pub fn config(&self) -> &WriterConfig {
        &self.config
    }

    /// Native driver metadata. `None` on browser targets or if the driver
    /// cannot be queried.
    pub async fn driver_info(&self) -> Option<DriverInfo> {
        let Backend::Native(session) = &self.backend else {
            return None;
        };
        match session.driver().get_info().await {
            Ok(info) => Some(info),
            Err(e) => {
                warn!(error = %e, "Driver info unavailable");
                None
            }
        }
    }

    /// Probe availability.
    ///
    /// Probing again after an `Unavailable` result re-checks the platform.
    /// Once `Available`, further calls return the cached result until
    /// [`unmount`](Self::unmount).
    ///
    /// A mount future dropped mid-probe leaves the writer in `Probing`; the
    /// next call starts the probe over.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidStateTransition` if the state machine rejects
    /// the probe transitions.
    pub async fn mount(&mut self) -> Result<Capability> {
        if self.capability.is_available() {
            return Ok(self.capability.clone());
        }

        if self.machine.current_state() == WriteState::Probing {
            warn!("Previous probe was abandoned");
            self.machine.reset();
        }

        self.machine.transition_to(WriteState::Probing)?;
        self.capability = Capability::Checking;

        let capability = match &mut self.backend {
            Backend::Native(session) => self.prober.probe_native(session.driver_mut()).await,
            Backend::Browser(browser) => self.prober.probe_browser(browser),
        };

        let next = if capability.is_available() {
            WriteState::Available
        } else {
            WriteState::Unavailable
        };
        self.machine.transition_to(next)?;
        self.capability = capability.clone();
        Ok(capability)
    }

    /// Run one write attempt.
    ///
    /// Returns `None` without touching any state when NFC is not available.
    /// Every failure is folded into the report's outcome.
    pub async fn write<P>(&mut self, producer: &P) -> Option<WriteReport>
    where
        P: RequestProducer + ?Sized,
    {
        if !self.can_write() {
            debug!(capability = %self.capability, "Write ignored: NFC not available");
            return None;
        }

        let state = self.machine.current_state();
        if state.is_busy() {
            // Only a dropped attempt leaves the machine mid-flight.
            warn!(%state, "Previous write attempt was abandoned");
            if state != WriteState::Releasing {
                self.step(WriteState::Releasing);
            }
            self.release_session().await;
            self.step(WriteState::Idle);
        }

        let attempt_id = Uuid::new_v4();
        let span = info_span!("write_attempt", %attempt_id, mode = field::Empty);
        Some(self.attempt(attempt_id, producer).instrument(span).await)
    }

    /// Tear down: release any open session and forget the capability.
    pub async fn unmount(&mut self) {
        self.release_session().await;
        self.machine.reset();
        self.capability = Capability::Unknown;
        self.last_outcome = None;
        debug!("Tag writer unmounted");
    }

    async fn attempt<P>(&mut self, attempt_id: Uuid, producer: &P) -> WriteReport
    where
        P: RequestProducer + ?Sized,
    {
        self.last_outcome = None;
        debug!(platform = %self.platform(), "Write attempt started");

        let result = self.run(producer).await;
        let outcome = match &result {
            Ok(bytes) => {
                info!(bytes, "Tag written");
                WriteOutcome::Success
            }
            Err(e) => {
                warn!(error = %e, kind = ?e.kind(), "Write attempt failed");
                WriteOutcome::from(e)
            }
        };

        self.step(if outcome.is_success() {
            WriteState::Succeeded
        } else {
            WriteState::Failed
        });
        self.step(WriteState::Releasing);
        self.release_session().await;
        self.step(WriteState::Idle);

        self.last_outcome = Some(outcome.clone());
        WriteReport::new(attempt_id, outcome, result.unwrap_or(0))
    }

    async fn run<P>(&mut self, producer: &P) -> Result<usize>
    where
        P: RequestProducer + ?Sized,
    {
        let request = match producer.produce() {
            Ok(request) => request,
            Err(e) => {
                // Rejected before any session is requested.
                self.machine.transition_to(WriteState::Encoding)?;
                return Err(e);
            }
        };
        Span::current().record("mode", request.kind());

        match &mut self.backend {
            Backend::Native(session) => {
                self.machine.transition_to(WriteState::Acquiring)?;
                session
                    .acquire(Technology::Ndef)
                    .await
                    .map_err(HardwareError::into_session_error)?;

                self.machine.transition_to(WriteState::Encoding)?;
                let message = encode_request_bytes(&request, &self.options)?;
                debug!(len = message.len(), "NDEF message encoded");

                self.machine.transition_to(WriteState::Writing)?;
                session.write(&message).await.map_err(Error::from)?;
                Ok(message.len())
            }
            Backend::Browser(browser) => {
                self.machine.transition_to(WriteState::Encoding)?;
                let records = browser_records(&request, &self.options)?;
                let framed_len = encode_request(&request, &self.options)?.encoded_len();

                self.machine.transition_to(WriteState::Writing)?;
                browser.write(&records).await.map_err(Error::from)?;
                Ok(framed_len)
            }
        }
    }

    async fn release_session(&mut self) {
        if let Backend::Native(session) = &mut self.backend
            && let Err(e) = session.release().await
        {
            warn!(error = %e, "NFC session release failed");
        }
    }

    fn step(&mut self, to: WriteState) {
        if let Err(e) = self.machine.transition_to(to) {
            warn!(error = %e, "Resetting write state");
            self.machine.reset();
        }
    }
}
