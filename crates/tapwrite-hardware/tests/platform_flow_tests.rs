//! Probe, session and write flows through the enum-dispatched platforms.

use tapwrite_core::{Capability, Platform, UnavailableReason};
use tapwrite_hardware::mock::{DriverOp, MockBrowserNfc, MockNfcDriver, MockTag};
use tapwrite_hardware::{
    AnyNfcDriver, AvailabilityProber, BrowserNfc, HardwareError, NdefSession, NfcPlatform,
    SessionState, SubsystemState, Technology,
};
use tapwrite_ndef::NdefRecord;

const HELLO: &[u8] = b"\xD1\x01\x08T\x02enHello";

fn native(platform: NfcPlatform) -> AnyNfcDriver {
    match platform {
        NfcPlatform::Native(driver) => driver,
        NfcPlatform::Browser(_) => panic!("expected a native platform"),
    }
}

#[tokio::test]
async fn test_probe_then_write_through_session() {
    let (driver, handle) = MockNfcDriver::new();
    let platform = NfcPlatform::from(driver);
    assert_eq!(platform.platform(), Platform::Native);

    let mut prober = AvailabilityProber::new();
    let mut session = NdefSession::new(native(platform));

    let capability = prober.probe_native(session.driver_mut()).await;
    assert_eq!(capability, Capability::Available);
    assert_eq!(prober.subsystem(), SubsystemState::Started);

    let tag = MockTag::new(vec![0x04, 0x11, 0x22, 0x33]);
    handle.present_tag(tag.clone()).await.unwrap();

    session.acquire(Technology::Ndef).await.unwrap();
    assert_eq!(handle.session_technology().await, Some(Technology::Ndef));
    session.write(HELLO).await.unwrap();
    session.release().await.unwrap();

    assert_eq!(tag.contents().await.as_deref(), Some(HELLO));
    let message = tag.message().await.unwrap();
    assert_eq!(message.first().as_text().unwrap().text, "Hello");

    assert_eq!(
        handle.calls().await,
        vec![
            DriverOp::ProbeSupport,
            DriverOp::Initialize,
            DriverOp::IsEnabled,
            DriverOp::AcquireSession,
            DriverOp::WriteMessage,
            DriverOp::ReleaseSession,
        ]
    );
    assert_eq!(session.stats().outstanding(), 0);
}

#[tokio::test]
async fn test_disabled_then_enabled_reprobe() {
    let (driver, handle) = MockNfcDriver::new();
    let mut driver = native(driver.into());
    let mut prober = AvailabilityProber::new();

    handle.set_enabled(false).await;
    assert_eq!(
        prober.probe_native(&mut driver).await,
        Capability::Unavailable(UnavailableReason::Disabled)
    );

    handle.set_enabled(true).await;
    assert_eq!(prober.probe_native(&mut driver).await, Capability::Available);
    assert_eq!(handle.call_count(DriverOp::Initialize).await, 1);
}

#[tokio::test]
async fn test_busy_radio_fails_acquire_and_release_still_reaches_driver() {
    let (driver, handle) = MockNfcDriver::new();
    let mut session = NdefSession::new(native(driver.into()));
    let mut prober = AvailabilityProber::new();
    prober.probe_native(session.driver_mut()).await;

    handle.leak_session().await;
    let err = session.acquire(Technology::Ndef).await.unwrap_err();
    assert!(matches!(err, HardwareError::SessionBusy));
    assert_eq!(session.state(), SessionState::Pending);

    session.release().await.unwrap();
    assert!(!handle.is_session_open().await);
    assert_eq!(session.state(), SessionState::Idle);

    // The radio is free again.
    session.acquire(Technology::Ndef).await.unwrap();
    session.release().await.unwrap();
    assert_eq!(session.stats().acquired, 2);
    assert_eq!(session.stats().released, 2);
}

#[tokio::test]
async fn test_oversized_write_leaves_tag_blank() {
    let (driver, handle) = MockNfcDriver::new();
    let mut session = NdefSession::new(native(driver.into()));
    AvailabilityProber::new().probe_native(session.driver_mut()).await;

    let tag = MockTag::new(vec![0x04]).with_capacity(8);
    handle.present_tag(tag.clone()).await.unwrap();

    session.acquire(Technology::Ndef).await.unwrap();
    let err = session.write(HELLO).await.unwrap_err();
    session.release().await.unwrap();

    assert!(matches!(
        err,
        HardwareError::CapacityExceeded {
            required: 12,
            capacity: 8
        }
    ));
    assert!(tag.contents().await.is_none());
}

#[tokio::test]
async fn test_browser_platform_writes_records() {
    let (browser, handle) = MockBrowserNfc::new(true);
    let platform = NfcPlatform::from(browser);
    assert_eq!(platform.platform(), Platform::Browser);
    let NfcPlatform::Browser(mut browser) = platform else {
        panic!("expected a browser platform");
    };

    assert_eq!(AvailabilityProber::new().probe_browser(&browser), Capability::Available);

    let tag = MockTag::new(vec![0x04, 0x99]);
    handle.present_tag(tag.clone()).await.unwrap();

    let records = tapwrite_ndef::browser_records(
        &tapwrite_core::WriteRequest::Uri("https://example.com".into()),
        &tapwrite_ndef::EncodeOptions::default(),
    )
    .unwrap();
    browser.write(&records).await.unwrap();

    let message = tag.message().await.unwrap();
    assert_eq!(message.first(), &NdefRecord::uri("https://example.com"));
    assert_eq!(handle.writes().await.len(), 1);
}
