//! Board-agnostic logic for the camlink SPI camera link
//!
//! Both ends of the link live here, generic over the traits in
//! `camlink-hal` and the sensor driver trait:
//!
//! - Capture manager: owns the sensor and the single held frame
//! - Slave dispatcher: command decode, state machine, READY line
//! - Master client: command transactions, READY wait, chunked reassembly
//! - Link diagnostics, status LED patterns, configuration types

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

// Must come first so the macros are visible to the other modules
mod fmt;

pub mod capture;
pub mod config;
pub mod indicator;
pub mod link;
pub mod master;
pub mod ready;
pub mod slave;
pub mod state;
pub mod traits;

#[cfg(test)]
mod mock;

pub use capture::{CaptureError, CaptureManager};
pub use indicator::{BlinkPattern, LedMode, StatusLed};
pub use link::{MasterLinkState, SlaveLinkState};
pub use master::{CameraClient, ClientError};
pub use ready::{ReadySignal, SignalReadyWait};
pub use slave::Dispatcher;
pub use state::{Event, SlaveState};
