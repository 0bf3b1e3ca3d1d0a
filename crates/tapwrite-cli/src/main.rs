//! `tapwrite` command line front end.
//!
//! Drives a [`TagWriter`] the way the write screen does: mount, write on
//! request, unmount. The mock drivers simulate a tag tap shortly after the
//! write starts.

mod cli;

use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use serde::Serialize;
use tapwrite_core::Capability;
use tapwrite_hardware::mock::{
    MockBrowserHandle, MockBrowserNfc, MockNfcDriver, MockNfcHandle, MockTag,
};
use tapwrite_hardware::{DriverInfo, NfcPlatform};
use tapwrite_ndef::{browser_records, encode_request};
use tapwrite_writer::{
    CardProducer, FormProducer, RequestProducer, TagWriter, WriteReport, WriterConfig,
};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, DriverKind, Payload};

/// Delay before the simulated tag enters the field.
const TAP_DELAY: Duration = Duration::from_millis(250);

/// Exit code when NFC is unavailable or the write failed.
const EXIT_UNAVAILABLE: u8 = 2;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli).await?;
    debug!(?config, "Writer configuration loaded");

    match &cli.command {
        Command::Encode { payload, records } => encode(&cli, &config, payload, *records),
        Command::Probe => probe(&cli, config).await,
        Command::Write { payload } => {
            let producer = FormProducer::new(payload.mode, payload.value.clone());
            write(&cli, config, &producer).await
        }
        Command::Card { .. } => {
            let card = cli.command.card().context("card arguments missing")?;
            write(&cli, config, &CardProducer(card)).await
        }
    }
}

async fn load_config(cli: &Cli) -> Result<WriterConfig> {
    let mut config = match &cli.config {
        Some(path) => read_config(path).await?,
        None => WriterConfig::default(),
    };
    if let Some(lang) = &cli.lang {
        config = config.with_language(lang.clone());
    }
    config.validate()?;
    Ok(config)
}

async fn read_config(path: &Path) -> Result<WriterConfig> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid config in {}", path.display()))
}

/// Simulated tag source for the mock drivers.
enum Tapper {
    Native(MockNfcHandle),
    Browser(MockBrowserHandle),
    Hardware,
}

impl Tapper {
    /// Present `tag` after [`TAP_DELAY`]. `None` for real readers.
    fn schedule(&self, tag: MockTag) -> Option<JoinHandle<()>> {
        let tap = match self {
            Tapper::Native(handle) => {
                let handle = handle.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(TAP_DELAY).await;
                    if let Err(e) = handle.present_tag(tag).await {
                        debug!(error = %e, "Simulated tap dropped");
                    }
                })
            }
            Tapper::Browser(handle) => {
                let handle = handle.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(TAP_DELAY).await;
                    if let Err(e) = handle.present_tag(tag).await {
                        debug!(error = %e, "Simulated tap dropped");
                    }
                })
            }
            Tapper::Hardware => return None,
        };
        Some(tap)
    }
}

fn open_platform(cli: &Cli) -> Result<(NfcPlatform, Tapper)> {
    match cli.driver {
        DriverKind::Mock => {
            let (driver, handle) = MockNfcDriver::new();
            Ok((driver.into(), Tapper::Native(handle)))
        }
        DriverKind::MockBrowser => {
            let (browser, handle) = MockBrowserNfc::new(true);
            Ok((browser.into(), Tapper::Browser(handle)))
        }
        DriverKind::Pcsc => open_pcsc(cli),
    }
}

#[cfg(feature = "hardware-pcsc")]
fn open_pcsc(cli: &Cli) -> Result<(NfcPlatform, Tapper)> {
    let config = tapwrite_hardware::PcscConfig {
        reader: cli.reader.clone(),
        ..Default::default()
    };
    Ok((tapwrite_hardware::PcscDriver::new(config).into(), Tapper::Hardware))
}

#[cfg(not(feature = "hardware-pcsc"))]
fn open_pcsc(_cli: &Cli) -> Result<(NfcPlatform, Tapper)> {
    bail!("tapwrite was built without PC/SC support; rebuild with --features hardware-pcsc")
}

fn simulated_tag(cli: &Cli) -> MockTag {
    let tag = MockTag::new(vec![0x04, 0xA2, 0x3B, 0x1C, 0x5D, 0x80, 0x00])
        .with_capacity(cli.tag_capacity);
    if cli.read_only_tag { tag.read_only() } else { tag }
}

fn encode(cli: &Cli, config: &WriterConfig, payload: &Payload, records: bool) -> Result<ExitCode> {
    let request = FormProducer::new(payload.mode, payload.value.clone()).produce()?;
    let options = config.encode_options();

    if records {
        let records = browser_records(&request, &options)?;
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(ExitCode::SUCCESS);
    }

    let message = encode_request(&request, &options)?;
    let bytes = message.to_bytes()?;
    if cli.json {
        let output = EncodeOutput {
            mode: request.kind(),
            len: bytes.len(),
            hex: hex(&bytes),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", hex(&bytes));
    }
    Ok(ExitCode::SUCCESS)
}

async fn probe(cli: &Cli, config: WriterConfig) -> Result<ExitCode> {
    let (platform, _tapper) = open_platform(cli)?;
    let mut writer = TagWriter::new(platform, config)?;

    let capability = writer.mount().await?;
    let driver = writer.driver_info().await;
    writer.unmount().await;

    if cli.json {
        let output = ProbeOutput {
            platform: writer.platform().to_string(),
            capability: &capability,
            message: capability.reason().map(|reason| reason.message()),
            driver,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{capability}");
        if let Some(reason) = capability.reason() {
            println!("{}", reason.message());
        }
        if let Some(driver) = driver {
            println!("driver: {} ({})", driver.name, driver.backend);
            if let Some(reader) = driver.reader {
                println!("reader: {reader}");
            }
        }
    }

    Ok(exit_code(capability.is_available()))
}

async fn write<P>(cli: &Cli, config: WriterConfig, producer: &P) -> Result<ExitCode>
where
    P: RequestProducer + ?Sized,
{
    let (platform, tapper) = open_platform(cli)?;
    let mut writer = TagWriter::new(platform, config)?;

    let capability = writer.mount().await?;
    if let Capability::Unavailable(reason) = &capability {
        eprintln!("{}", reason.message());
        return Ok(ExitCode::from(EXIT_UNAVAILABLE));
    }

    let tag = simulated_tag(cli);
    let tap = tapper.schedule(tag.clone());
    if tap.is_none() {
        info!("Hold a tag to the reader");
    }

    let Some(report) = writer.write(producer).await else {
        bail!("NFC is not available");
    };
    if let Some(tap) = tap {
        tap.abort();
    }
    writer.unmount().await;

    let contents = match tapper {
        Tapper::Hardware => None,
        _ => tag.contents().await,
    };
    print_report(cli, &report, contents.as_deref())?;
    Ok(exit_code(report.is_success()))
}

fn print_report(cli: &Cli, report: &WriteReport, contents: Option<&[u8]>) -> Result<()> {
    if cli.json {
        let output = WriteOutput {
            report,
            tag_contents: contents.map(hex),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if report.is_success() {
        println!("{}", report.outcome.message());
        println!("{} bytes written", report.bytes_written);
    } else {
        warn!(attempt_id = %report.attempt_id, "Write did not complete");
        eprintln!("{}", report.outcome.message());
    }
    if let Some(contents) = contents {
        println!("tag: {}", hex(contents));
    }
    Ok(())
}

fn exit_code(ok: bool) -> ExitCode {
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(EXIT_UNAVAILABLE)
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Serialize)]
struct EncodeOutput {
    mode: &'static str,
    len: usize,
    hex: String,
}

#[derive(Serialize)]
struct ProbeOutput<'a> {
    platform: String,
    capability: &'a Capability,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    driver: Option<DriverInfo>,
}

#[derive(Serialize)]
struct WriteOutput<'a> {
    #[serde(flatten)]
    report: &'a WriteReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    tag_contents: Option<String>,
}
