//! PC/SC contactless reader driver for NFC Forum Type 2 tags.
//!
//! Targets ACR122-style readers, which accept pseudo-APDUs with class
//! `0xFF` for tag memory access. The NDEF message is wrapped in a TLV and
//! written page by page from page 4, after the Capability Container on
//! page 3 has been read to learn the data area size and lock state.
//!
//! All PC/SC calls block, so they run on `tokio::task::spawn_blocking`.

use crate::{
    HardwareError, Result,
    traits::NfcDriver,
    types::{DriverInfo, Technology},
};
use pcsc::{Card, Context, Disposition, Protocols, ReaderState, Scope, ShareMode, State};
use std::ffi::CString;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Type 2 page size in bytes.
pub const PAGE_SIZE: usize = 4;

/// First page of the Type 2 data area.
pub const FIRST_DATA_PAGE: u8 = 4;

/// Capability Container page.
pub const CC_PAGE: u8 = 3;

/// Bytes reachable with a one-byte page address from the first data page.
pub const MAX_ADDRESSABLE_BYTES: usize = (256 - FIRST_DATA_PAGE as usize) * PAGE_SIZE;

const TLV_NDEF: u8 = 0x03;
const TLV_TERMINATOR: u8 = 0xFE;
const CC_MAGIC: u8 = 0xE1;
const SW_SUCCESS: [u8; 2] = [0x90, 0x00];

/// PC/SC driver settings.
#[derive(Debug, Clone)]
pub struct PcscConfig {
    /// Substring of the reader name to bind to. The first reader is used
    /// when unset.
    pub reader: Option<String>,

    /// How long an acquire waits for a tag to enter the field.
    pub presence_timeout: Duration,
}

impl Default for PcscConfig {
    fn default() -> Self {
        Self {
            reader: None,
            presence_timeout: Duration::from_secs(30),
        }
    }
}

/// Parsed Type 2 Capability Container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapabilityContainer {
    pub version: u8,
    /// Data area size in bytes.
    pub data_size: usize,
    pub read_only: bool,
}

impl CapabilityContainer {
    /// Parse the four CC bytes read from page 3.
    ///
    /// # Errors
    ///
    /// Returns `WriteRejected` if the magic number is missing, meaning the
    /// tag is not NDEF formatted.
    pub fn parse(page: &[u8]) -> Result<Self> {
        let [magic, version, size, access] = page
            .get(..4)
            .and_then(|p| <[u8; 4]>::try_from(p).ok())
            .ok_or_else(|| HardwareError::communication("short Capability Container"))?;

        if magic != CC_MAGIC {
            return Err(HardwareError::write_rejected(format!(
                "tag is not NDEF formatted (CC magic {magic:#04X})"
            )));
        }

        Ok(Self {
            version,
            data_size: usize::from(size) * 8,
            read_only: access & 0x0F != 0,
        })
    }

    /// Data area bytes this driver can address.
    pub fn writable_size(&self) -> usize {
        self.data_size.min(MAX_ADDRESSABLE_BYTES)
    }
}

/// Wrap an NDEF message in a Type 2 TLV, terminated and padded to whole pages.
pub fn ndef_tlv(message: &[u8]) -> Result<Vec<u8>> {
    let mut tlv = Vec::with_capacity(message.len() + 8);
    tlv.push(TLV_NDEF);
    match message.len() {
        len @ 0..=0xFE => tlv.push(len as u8),
        len => {
            let len = u16::try_from(len).map_err(|_| HardwareError::CapacityExceeded {
                required: len,
                capacity: usize::from(u16::MAX),
            })?;
            tlv.push(0xFF);
            tlv.extend_from_slice(&len.to_be_bytes());
        }
    }
    tlv.extend_from_slice(message);
    tlv.push(TLV_TERMINATOR);

    let padded = tlv.len().div_ceil(PAGE_SIZE) * PAGE_SIZE;
    tlv.resize(padded, 0x00);
    Ok(tlv)
}

/// `UPDATE BINARY` pseudo-APDU writing one page.
pub fn update_binary(page: u8, data: &[u8]) -> Vec<u8> {
    let mut apdu = vec![0xFF, 0xD6, 0x00, page, PAGE_SIZE as u8];
    apdu.extend_from_slice(data);
    apdu
}

/// `READ BINARY` pseudo-APDU reading one page.
pub fn read_binary(page: u8) -> [u8; 5] {
    [0xFF, 0xB0, 0x00, page, PAGE_SIZE as u8]
}

fn map_pcsc(error: pcsc::Error) -> HardwareError {
    match error {
        pcsc::Error::RemovedCard | pcsc::Error::ResetCard | pcsc::Error::NoSmartcard => {
            HardwareError::TagLost
        }
        pcsc::Error::NoService | pcsc::Error::ServiceStopped => {
            HardwareError::initialization_failed(error.to_string())
        }
        other => HardwareError::communication(other.to_string()),
    }
}

fn check_status<'a>(response: &'a [u8], what: &str) -> Result<&'a [u8]> {
    match response.len().checked_sub(2) {
        Some(split) if response[split..] == SW_SUCCESS => Ok(&response[..split]),
        _ => Err(HardwareError::write_rejected(format!(
            "{what} returned status {response:02X?}"
        ))),
    }
}

fn transmit(card: &Card, apdu: &[u8], what: &str) -> Result<Vec<u8>> {
    let mut buf = [0u8; pcsc::MAX_BUFFER_SIZE];
    let response = card.transmit(apdu, &mut buf).map_err(map_pcsc)?;
    check_status(response, what).map(<[u8]>::to_vec)
}

fn list_readers(context: &Context) -> Result<Vec<CString>> {
    match context.list_readers_owned() {
        Ok(readers) => Ok(readers),
        Err(pcsc::Error::NoReadersAvailable) => Ok(Vec::new()),
        Err(e) => Err(map_pcsc(e)),
    }
}

fn select_reader(readers: Vec<CString>, wanted: Option<&str>) -> Option<CString> {
    readers.into_iter().find(|name| match wanted {
        Some(wanted) => name.to_string_lossy().contains(wanted),
        None => true,
    })
}

/// Block until a tag is in the reader's field.
fn wait_for_tag(context: &Context, reader: &CString, timeout: Duration) -> Result<()> {
    let mut states = vec![ReaderState::new(reader.clone(), State::UNAWARE)];
    loop {
        context
            .get_status_change(Some(timeout), &mut states)
            .map_err(|e| match e {
                pcsc::Error::Timeout => {
                    HardwareError::timeout(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX))
                }
                other => map_pcsc(other),
            })?;

        if states[0].event_state().contains(State::PRESENT) {
            return Ok(());
        }
        states[0].sync_current_state();
    }
}

async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| HardwareError::other(format!("PC/SC task failed: {e}")))?
}

struct PcscSession {
    card: Arc<Mutex<Card>>,
    cc: CapabilityContainer,
}

/// PC/SC NFC driver.
pub struct PcscDriver {
    config: PcscConfig,
    context: Option<Context>,
    reader: Option<CString>,
    session: Option<PcscSession>,
}

impl fmt::Debug for PcscDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PcscDriver")
            .field("config", &self.config)
            .field("reader", &self.reader)
            .field("started", &self.context.is_some())
            .field("session", &self.session.as_ref().map(|s| s.cc))
            .finish()
    }
}

impl PcscDriver {
    pub fn new(config: PcscConfig) -> Self {
        Self {
            config,
            context: None,
            reader: None,
            session: None,
        }
    }

    /// Name of the bound reader, once initialized.
    pub fn reader_name(&self) -> Option<String> {
        self.reader
            .as_ref()
            .map(|name| name.to_string_lossy().into_owned())
    }
}

impl NfcDriver for PcscDriver {
    async fn probe_support(&self) -> Result<bool> {
        blocking(|| match Context::establish(Scope::User) {
            Ok(context) => Ok(!list_readers(&context)?.is_empty()),
            // No PC/SC service means no reader stack on this host.
            Err(pcsc::Error::NoService) => Ok(false),
            Err(e) => Err(map_pcsc(e)),
        })
        .await
    }

    async fn initialize(&mut self) -> Result<()> {
        if self.context.is_some() {
            return Ok(());
        }

        let wanted = self.config.reader.clone();
        let (context, reader) = blocking(move || {
            let context = Context::establish(Scope::User).map_err(map_pcsc)?;
            let reader = select_reader(list_readers(&context)?, wanted.as_deref());
            Ok((context, reader))
        })
        .await?;

        let reader = reader.ok_or_else(|| {
            HardwareError::initialization_failed("no matching PC/SC reader attached")
        })?;
        info!(reader = %reader.to_string_lossy(), "PC/SC reader bound");

        self.context = Some(context);
        self.reader = Some(reader);
        Ok(())
    }

    async fn is_enabled(&self) -> Result<bool> {
        let (Some(context), Some(reader)) = (self.context.clone(), self.reader.clone()) else {
            return Ok(false);
        };
        blocking(move || Ok(list_readers(&context)?.contains(&reader))).await
    }

    async fn acquire_session(&mut self, technology: Technology) -> Result<()> {
        if self.session.is_some() {
            return Err(HardwareError::SessionBusy);
        }
        let (Some(context), Some(reader)) = (self.context.clone(), self.reader.clone()) else {
            return Err(HardwareError::NotStarted);
        };

        let timeout = self.config.presence_timeout;
        let (card, cc) = blocking(move || {
            wait_for_tag(&context, &reader, timeout)?;
            let card = context
                .connect(&reader, ShareMode::Shared, Protocols::ANY)
                .map_err(map_pcsc)?;
            let page = transmit(&card, &read_binary(CC_PAGE), "READ BINARY")?;
            let cc = CapabilityContainer::parse(&page)?;
            Ok((card, cc))
        })
        .await?;

        debug!(?cc, %technology, "Tag connected");
        self.session = Some(PcscSession {
            card: Arc::new(Mutex::new(card)),
            cc,
        });
        Ok(())
    }

    async fn release_session(&mut self) -> Result<()> {
        let Some(session) = self.session.take() else {
            return Ok(());
        };

        blocking(move || {
            let Ok(card) = Arc::try_unwrap(session.card) else {
                return Err(HardwareError::other("PC/SC card still in use"));
            };
            let card = card
                .into_inner()
                .map_err(|_| HardwareError::other("PC/SC card lock poisoned"))?;
            card.disconnect(Disposition::LeaveCard)
                .map_err(|(_, e)| map_pcsc(e))
        })
        .await
    }

    async fn write_message(&mut self, message: &[u8]) -> Result<()> {
        let session = self.session.as_ref().ok_or(HardwareError::NoSession)?;
        if session.cc.read_only {
            return Err(HardwareError::ReadOnly);
        }

        let tlv = ndef_tlv(message)?;
        let capacity = session.cc.writable_size();
        if tlv.len() > capacity {
            return Err(HardwareError::CapacityExceeded {
                required: tlv.len(),
                capacity,
            });
        }

        let card = Arc::clone(&session.card);
        let pages = tlv.len() / PAGE_SIZE;
        blocking(move || {
            let card = card
                .lock()
                .map_err(|_| HardwareError::other("PC/SC card lock poisoned"))?;
            for (page, chunk) in (FIRST_DATA_PAGE..).zip(tlv.chunks(PAGE_SIZE)) {
                transmit(&card, &update_binary(page, chunk), "UPDATE BINARY")?;
            }
            Ok(())
        })
        .await
        .inspect_err(|e| warn!(error = %e, "PC/SC write failed"))?;

        debug!(pages, "NDEF message written");
        Ok(())
    }

    async fn get_info(&self) -> Result<DriverInfo> {
        let info = DriverInfo::new("PC/SC", "pcsc");
        Ok(match self.reader_name() {
            Some(reader) => info.with_reader(reader),
            None => info,
        })
    }
}
