//! Mock NFC implementations for testing and development.
//!
//! This module provides simulated platforms and tags that can be controlled
//! programmatically without requiring physical hardware.

pub mod browser;
pub mod native;
pub mod tag;

// Re-export commonly used types
pub use browser::{MockBrowserHandle, MockBrowserNfc};
pub use native::{DriverOp, MockNfcDriver, MockNfcHandle};
pub use tag::{DEFAULT_TAG_CAPACITY, MockTag};
