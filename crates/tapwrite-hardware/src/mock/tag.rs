//! Simulated NFC tag shared by the mock drivers.

use crate::{HardwareError, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tapwrite_ndef::NdefMessage;
use tokio::sync::Mutex;

/// NDEF message capacity of a default mock tag, in bytes.
pub const DEFAULT_TAG_CAPACITY: usize = 496;

/// Simulated NDEF tag.
///
/// Clones share the same memory, so a test can keep one clone and inspect
/// what a driver wrote to the other.
///
/// # Examples
///
/// ```
/// use tapwrite_hardware::mock::MockTag;
///
/// let tag = MockTag::new(vec![0x04, 0xA2, 0x3B, 0x1C]).with_capacity(137);
/// assert_eq!(tag.capacity(), 137);
/// assert!(tag.is_present());
/// ```
#[derive(Debug, Clone)]
pub struct MockTag {
    uid: Vec<u8>,
    capacity: usize,
    read_only: bool,
    present: Arc<AtomicBool>,
    writes: Arc<AtomicUsize>,
    memory: Arc<Mutex<Option<Vec<u8>>>>,
}

impl MockTag {
    /// Create a blank, writable tag with the default capacity.
    pub fn new(uid: Vec<u8>) -> Self {
        Self {
            uid,
            capacity: DEFAULT_TAG_CAPACITY,
            read_only: false,
            present: Arc::new(AtomicBool::new(true)),
            writes: Arc::new(AtomicUsize::new(0)),
            memory: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn uid(&self) -> &[u8] {
        &self.uid
    }

    /// Tag UID as uppercase hex.
    pub fn uid_hex(&self) -> String {
        self.uid.iter().map(|b| format!("{b:02X}")).collect()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Take the tag out of the field. Later writes fail with `TagLost`.
    pub fn remove(&self) {
        self.present.store(false, Ordering::SeqCst);
    }

    pub fn is_present(&self) -> bool {
        self.present.load(Ordering::SeqCst)
    }

    /// Number of successful writes.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Raw NDEF bytes last written, if any.
    pub async fn contents(&self) -> Option<Vec<u8>> {
        self.memory.lock().await.clone()
    }

    /// Decoded NDEF message last written, if any and well-formed.
    pub async fn message(&self) -> Option<NdefMessage> {
        let memory = self.memory.lock().await;
        memory.as_deref().and_then(|bytes| NdefMessage::parse(bytes).ok())
    }

    /// Store an NDEF message, enforcing presence, lock and capacity.
    pub(crate) async fn store(&self, message: &[u8]) -> Result<()> {
        if !self.is_present() {
            return Err(HardwareError::TagLost);
        }
        if self.read_only {
            return Err(HardwareError::ReadOnly);
        }
        if message.len() > self.capacity {
            return Err(HardwareError::CapacityExceeded {
                required: message.len(),
                capacity: self.capacity,
            });
        }

        *self.memory.lock().await = Some(message.to_vec());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
