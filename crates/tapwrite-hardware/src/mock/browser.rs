//! Mock browser NFC writer.
//!
//! Stands in for a Web NFC `NDEFReader`: the reader API may or may not
//! exist, and `write` frames the record objects into NDEF before storing
//! them on the next tag tapped.

use crate::{HardwareError, Result, mock::MockTag, traits::BrowserNfc};
use std::sync::Arc;
use tapwrite_ndef::{BrowserRecord, NdefMessage};
use tokio::sync::{Mutex, mpsc};

#[derive(Debug, Default)]
struct BrowserState {
    writes: Vec<Vec<BrowserRecord>>,
    fault: Option<HardwareError>,
}

/// Mock browser NFC writer.
///
/// # Examples
///
/// ```
/// use tapwrite_hardware::mock::MockBrowserNfc;
/// use tapwrite_hardware::traits::BrowserNfc;
///
/// let (browser, _handle) = MockBrowserNfc::new(false);
/// assert!(!browser.has_reader_api());
/// ```
#[derive(Debug)]
pub struct MockBrowserNfc {
    reader_api: bool,
    state: Arc<Mutex<BrowserState>>,
    tag_rx: mpsc::Receiver<MockTag>,
}

impl MockBrowserNfc {
    /// Create a browser mock, with or without an `NDEFReader` global.
    pub fn new(reader_api: bool) -> (Self, MockBrowserHandle) {
        let (tag_tx, tag_rx) = mpsc::channel(8);
        let state = Arc::new(Mutex::new(BrowserState::default()));

        let browser = Self {
            reader_api,
            state: Arc::clone(&state),
            tag_rx,
        };
        let handle = MockBrowserHandle { state, tag_tx };

        (browser, handle)
    }
}

impl BrowserNfc for MockBrowserNfc {
    fn has_reader_api(&self) -> bool {
        self.reader_api
    }

    async fn write(&mut self, records: &[BrowserRecord]) -> Result<()> {
        if !self.reader_api {
            return Err(HardwareError::unsupported("NDEFReader.write"));
        }

        {
            let mut state = self.state.lock().await;
            state.writes.push(records.to_vec());
            if let Some(error) = state.fault.take() {
                return Err(error);
            }
        }

        let framed = records
            .iter()
            .map(BrowserRecord::to_ndef_record)
            .collect::<tapwrite_core::Result<Vec<_>>>()
            .and_then(NdefMessage::new)
            .and_then(|message| message.to_bytes())
            .map_err(|e| HardwareError::write_rejected(e.to_string()))?;

        let tag = self
            .tag_rx
            .recv()
            .await
            .ok_or_else(|| HardwareError::disconnected("mock tag channel closed"))?;

        tag.store(&framed).await
    }
}

/// Handle for controlling a [`MockBrowserNfc`].
#[derive(Debug, Clone)]
pub struct MockBrowserHandle {
    state: Arc<Mutex<BrowserState>>,
    tag_tx: mpsc::Sender<MockTag>,
}

impl MockBrowserHandle {
    /// Tap a tag.
    ///
    /// # Errors
    ///
    /// Returns an error if the browser mock has been dropped.
    pub async fn present_tag(&self, tag: MockTag) -> Result<()> {
        self.tag_tx
            .send(tag)
            .await
            .map_err(|_| HardwareError::disconnected("mock tag channel closed"))
    }

    /// Fail the next write, as when the user denies the permission prompt.
    pub async fn fail_next_write(&self, error: HardwareError) {
        self.state.lock().await.fault = Some(error);
    }

    /// Record lists passed to each `write` call.
    pub async fn writes(&self) -> Vec<Vec<BrowserRecord>> {
        self.state.lock().await.writes.clone()
    }
}
