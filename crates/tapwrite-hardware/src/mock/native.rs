//! Mock native NFC driver for testing and development.
//!
//! The driver models a mobile NFC manager: a support probe, a subsystem that
//! must be started once, an enabled flag from system settings, a single
//! process-wide technology session, and writes that wait for a tag to be
//! tapped. Every aspect is controlled through a [`MockNfcHandle`].

use crate::{
    HardwareError, Result,
    mock::MockTag,
    traits::NfcDriver,
    types::{DriverInfo, Technology},
};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard, mpsc};

/// Driver operation, as recorded in the call log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriverOp {
    ProbeSupport,
    Initialize,
    IsEnabled,
    AcquireSession,
    ReleaseSession,
    WriteMessage,
}

#[derive(Debug)]
struct DriverState {
    supported: bool,
    init_error: Option<String>,
    enabled: bool,
    started: bool,
    session: Option<Technology>,
    calls: Vec<DriverOp>,
    faults: VecDeque<(DriverOp, HardwareError)>,
}

impl Default for DriverState {
    fn default() -> Self {
        Self {
            supported: true,
            init_error: None,
            enabled: true,
            started: false,
            session: None,
            calls: Vec::new(),
            faults: VecDeque::new(),
        }
    }
}

/// Mock native NFC driver.
///
/// # Examples
///
/// ```
/// use tapwrite_hardware::mock::{MockNfcDriver, MockTag};
/// use tapwrite_hardware::traits::NfcDriver;
/// use tapwrite_hardware::types::Technology;
///
/// #[tokio::main]
/// async fn main() -> tapwrite_hardware::Result<()> {
///     let (mut driver, handle) = MockNfcDriver::new();
///     let tag = MockTag::new(vec![0x04, 0x11, 0x22, 0x33]);
///     handle.present_tag(tag.clone()).await?;
///
///     driver.initialize().await?;
///     driver.acquire_session(Technology::Ndef).await?;
///     driver.write_message(b"\xD1\x01\x08T\x02enHello").await?;
///     driver.release_session().await?;
///
///     assert_eq!(tag.write_count(), 1);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockNfcDriver {
    state: Arc<Mutex<DriverState>>,
    tag_rx: mpsc::Receiver<MockTag>,
    name: String,
}

impl MockNfcDriver {
    /// Create a supported, enabled, not-yet-started driver.
    pub fn new() -> (Self, MockNfcHandle) {
        Self::with_name("Mock NFC".to_string())
    }

    pub fn with_name(name: String) -> (Self, MockNfcHandle) {
        let (tag_tx, tag_rx) = mpsc::channel(8);
        let state = Arc::new(Mutex::new(DriverState::default()));

        let driver = Self {
            state: Arc::clone(&state),
            tag_rx,
            name,
        };
        let handle = MockNfcHandle { state, tag_tx };

        (driver, handle)
    }

    /// Log the call and surface any fault queued for it.
    async fn enter(&self, op: DriverOp) -> Result<MutexGuard<'_, DriverState>> {
        let mut state = self.state.lock().await;
        state.calls.push(op);

        if let Some(index) = state.faults.iter().position(|(target, _)| *target == op)
            && let Some((_, error)) = state.faults.remove(index)
        {
            return Err(error);
        }

        Ok(state)
    }
}

impl NfcDriver for MockNfcDriver {
    async fn probe_support(&self) -> Result<bool> {
        let state = self.enter(DriverOp::ProbeSupport).await?;
        Ok(state.supported)
    }

    async fn initialize(&mut self) -> Result<()> {
        let mut state = self.enter(DriverOp::Initialize).await?;
        if let Some(message) = &state.init_error {
            return Err(HardwareError::initialization_failed(message.clone()));
        }
        state.started = true;
        Ok(())
    }

    async fn is_enabled(&self) -> Result<bool> {
        let state = self.enter(DriverOp::IsEnabled).await?;
        Ok(state.enabled)
    }

    async fn acquire_session(&mut self, technology: Technology) -> Result<()> {
        let mut state = self.enter(DriverOp::AcquireSession).await?;
        if !state.started {
            return Err(HardwareError::NotStarted);
        }
        if !state.enabled {
            return Err(HardwareError::Disabled);
        }
        if state.session.is_some() {
            return Err(HardwareError::SessionBusy);
        }
        state.session = Some(technology);
        Ok(())
    }

    async fn release_session(&mut self) -> Result<()> {
        let mut state = self.enter(DriverOp::ReleaseSession).await?;
        state.session = None;
        Ok(())
    }

    async fn write_message(&mut self, message: &[u8]) -> Result<()> {
        {
            let state = self.enter(DriverOp::WriteMessage).await?;
            if state.session.is_none() {
                return Err(HardwareError::NoSession);
            }
        }

        // Suspends until a tag is tapped.
        let tag = self
            .tag_rx
            .recv()
            .await
            .ok_or_else(|| HardwareError::disconnected("mock tag channel closed"))?;

        tag.store(message).await
    }

    async fn get_info(&self) -> Result<DriverInfo> {
        Ok(DriverInfo::new(self.name.clone(), "mock").with_firmware_version(tapwrite_core::VERSION))
    }
}

/// Handle for controlling a [`MockNfcDriver`].
#[derive(Debug, Clone)]
pub struct MockNfcHandle {
    state: Arc<Mutex<DriverState>>,
    tag_tx: mpsc::Sender<MockTag>,
}

impl MockNfcHandle {
    /// Tap a tag. The next pending or future write lands on it.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver has been dropped.
    pub async fn present_tag(&self, tag: MockTag) -> Result<()> {
        self.tag_tx
            .send(tag)
            .await
            .map_err(|_| HardwareError::disconnected("mock tag channel closed"))
    }

    /// Report whether the device has an NFC controller.
    pub async fn set_supported(&self, supported: bool) {
        self.state.lock().await.supported = supported;
    }

    /// Toggle NFC in the simulated system settings.
    pub async fn set_enabled(&self, enabled: bool) {
        self.state.lock().await.enabled = enabled;
    }

    /// Make every subsequent `initialize` fail with the given message.
    pub async fn fail_initialization(&self, message: impl Into<String>) {
        self.state.lock().await.init_error = Some(message.into());
    }

    /// Fail the next call to `op` with `error`.
    pub async fn inject_fault(&self, op: DriverOp, error: HardwareError) {
        self.state.lock().await.faults.push_back((op, error));
    }

    /// Simulate a session left open by an earlier, interrupted caller.
    pub async fn leak_session(&self) {
        let mut state = self.state.lock().await;
        state.started = true;
        state.session = Some(Technology::Ndef);
    }

    pub async fn is_started(&self) -> bool {
        self.state.lock().await.started
    }

    pub async fn is_session_open(&self) -> bool {
        self.state.lock().await.session.is_some()
    }

    /// Technology of the open session, if any.
    pub async fn session_technology(&self) -> Option<Technology> {
        self.state.lock().await.session
    }

    /// Every driver call in order.
    pub async fn calls(&self) -> Vec<DriverOp> {
        self.state.lock().await.calls.clone()
    }

    /// Number of times `op` was called.
    pub async fn call_count(&self, op: DriverOp) -> usize {
        self.state
            .lock()
            .await
            .calls
            .iter()
            .filter(|call| **call == op)
            .count()
    }
}
