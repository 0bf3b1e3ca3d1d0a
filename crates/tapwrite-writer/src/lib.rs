//! Reusable NFC tag writer component.
//!
//! This crate contains the per-instance state machine and the [`TagWriter`]
//! that sequences probe, acquire, encode, write and release over a native
//! driver or a browser NFC writer.

pub mod config;
pub mod producer;
pub mod report;
pub mod state_machine;
pub mod writer;

pub use config::WriterConfig;
pub use producer::{CardProducer, FormProducer, RequestProducer};
pub use report::WriteReport;
pub use state_machine::{StateTransition, WriteState, WriteStateMachine, WriteStateMachineBuilder};
pub use writer::TagWriter;
