//! Shared helpers for tag writer integration tests.

#![allow(dead_code)]

use tapwrite_hardware::mock::{MockBrowserHandle, MockBrowserNfc, MockNfcDriver, MockNfcHandle};
use tapwrite_writer::{StateTransition, TagWriter, WriteState, WriterConfig};

/// Route `tracing` output to the test harness once per binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}

/// A native writer over a fresh mock driver, not yet mounted.
pub fn native_writer() -> (TagWriter, MockNfcHandle) {
    init_tracing();
    let (driver, handle) = MockNfcDriver::new();
    let writer = TagWriter::new(driver, WriterConfig::default()).expect("default config is valid");
    (writer, handle)
}

/// A native writer that has been mounted and found NFC available.
pub async fn mounted_native_writer() -> (TagWriter, MockNfcHandle) {
    let (mut writer, handle) = native_writer();
    let capability = writer.mount().await.expect("mount from idle");
    assert!(capability.is_available());
    (writer, handle)
}

/// A mounted browser writer.
pub async fn mounted_browser_writer(reader_api: bool) -> (TagWriter, MockBrowserHandle) {
    init_tracing();
    let (browser, handle) = MockBrowserNfc::new(reader_api);
    let mut writer =
        TagWriter::new(browser, WriterConfig::default()).expect("default config is valid");
    writer.mount().await.expect("mount from idle");
    (writer, handle)
}

/// Target states of the recorded transitions, oldest first.
pub fn visited(history: impl IntoIterator<Item = StateTransition>) -> Vec<WriteState> {
    history.into_iter().map(|t| t.to).collect()
}
