//! Camlink Hardware Abstraction Layer
//!
//! This crate defines the hardware traits the camera link is written
//! against. Board firmware for the camera sub-module and for the main
//! controller implements them on top of its chip HAL, and the host
//! simulator implements them in memory.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────┐        ┌──────────────────────────┐
//! │ camlink-core (slave)     │        │ camlink-core (master)    │
//! │ Dispatcher               │        │ CameraClient             │
//! └──────────────────────────┘        └──────────────────────────┘
//!        │ SpiSlave  │ OutputPin            │ SpiMaster │ InputPin + ReadyWait
//!        ▼           ▼                      ▼           ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  camlink-hal (this crate - traits)                          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`], [`gpio::InputPin`] - READY line drive and sense
//! - [`spi::SpiMaster`], [`spi::SpiSlave`] - one blocking full-duplex
//!   transaction primitive per side
//! - [`ready::ReadyWait`], [`ready::AsyncReadyWait`] - single-slot "ready
//!   went high" notification, blocking or async

#![no_std]
#![deny(unsafe_code)]

#[cfg(feature = "embedded-hal")]
pub mod adapters;
pub mod gpio;
pub mod ready;
pub mod spi;

// Re-export key traits at crate root for convenience
pub use gpio::{InputPin, OutputPin};
pub use ready::{AsyncReadyWait, ReadyLatch, ReadyWait};
pub use spi::{SpiMaster, SpiSlave};
