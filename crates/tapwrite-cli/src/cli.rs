use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tapwrite_core::{CardRecord, WriteMode};

#[derive(Debug, Parser)]
#[command(name = "tapwrite")]
#[command(about = "Write NDEF messages to NFC tags", version)]
pub struct Cli {
    /// NFC stack to use
    #[arg(long, value_enum, default_value_t = DriverKind::Mock, global = true)]
    pub driver: DriverKind,

    /// Language code stamped on text records
    #[arg(long, global = true)]
    pub lang: Option<String>,

    /// PC/SC reader name (substring match)
    #[arg(long, global = true)]
    pub reader: Option<String>,

    /// Path to a JSON writer config
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Capacity of the simulated tag, in bytes
    #[arg(long, default_value_t = tapwrite_hardware::mock::DEFAULT_TAG_CAPACITY, global = true)]
    pub tag_capacity: usize,

    /// Simulate a locked tag
    #[arg(long, global = true)]
    pub read_only_tag: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DriverKind {
    /// Simulated native NFC manager
    Mock,
    /// Simulated Web NFC writer
    MockBrowser,
    /// PC/SC contactless reader
    Pcsc,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check whether NFC can be used
    Probe,

    /// Print the NDEF bytes for a payload without writing
    Encode {
        #[command(flatten)]
        payload: Payload,

        /// Print browser record objects instead of NDEF bytes
        #[arg(long)]
        records: bool,
    },

    /// Write a payload to the next tag tapped
    Write {
        #[command(flatten)]
        payload: Payload,
    },

    /// Write a card record as JSON text
    Card {
        #[arg(long)]
        number: String,
        #[arg(long)]
        holder: String,
        #[arg(long)]
        expiry: String,
        #[arg(long = "type")]
        card_type: String,
    },
}

#[derive(Debug, clap::Args)]
pub struct Payload {
    /// TEXT, URI, WIFI_SIMPLE or VCARD
    #[arg(long, short = 'm', default_value = "TEXT")]
    pub mode: WriteMode,

    /// Payload value. Wi-Fi takes "SSID, password".
    #[arg(long, short = 'v')]
    pub value: String,
}

impl Command {
    pub fn card(&self) -> Option<CardRecord> {
        match self {
            Command::Card {
                number,
                holder,
                expiry,
                card_type,
            } => Some(CardRecord::new(
                number.clone(),
                holder.clone(),
                expiry.clone(),
                card_type.clone(),
            )),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_args() {
        let cli = Cli::try_parse_from([
            "tapwrite",
            "write",
            "--mode",
            "wifi_simple",
            "--value",
            "Home, pw",
            "--lang",
            "pt",
        ])
        .unwrap();

        assert_eq!(cli.driver, DriverKind::Mock);
        assert_eq!(cli.lang.as_deref(), Some("pt"));
        let Command::Write { payload } = cli.command else {
            panic!("expected write");
        };
        assert_eq!(payload.mode, WriteMode::WifiSimple);
        assert_eq!(payload.value, "Home, pw");
    }

    #[test]
    fn test_card_args() {
        let cli = Cli::try_parse_from([
            "tapwrite",
            "--driver",
            "mock-browser",
            "card",
            "--number",
            "4111",
            "--holder",
            "Ana",
            "--expiry",
            "01/30",
            "--type",
            "VISA",
        ])
        .unwrap();

        assert_eq!(cli.driver, DriverKind::MockBrowser);
        let card = cli.command.card().unwrap();
        assert_eq!(card.card_type, "VISA");
    }

    #[test]
    fn test_unknown_mode_rejected() {
        let result = Cli::try_parse_from(["tapwrite", "encode", "--mode", "SMS", "--value", "x"]);
        assert!(result.is_err());
    }
}
