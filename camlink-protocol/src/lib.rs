//! Camera Link SPI Protocol
//!
//! This crate defines the command/response protocol between the main
//! controller (SPI master) and the camera sub-module (SPI slave). Both
//! firmwares share it bit-exactly.
//!
//! # Protocol Overview
//!
//! Every exchange is one synchronous full-duplex transaction. The master
//! sends a command packet; the slave answers with a response header and
//! optional data. All multi-byte fields are little-endian and there is no
//! padding beyond the explicit `reserved` fields.
//!
//! ```text
//! Command  ┌─────────┬──────────┬─────────────┬─────────────────┐
//!          │ COMMAND │ SEQUENCE │ PAYLOAD_LEN │ PAYLOAD         │
//!          │ 1B      │ 1B       │ 2B          │ 0–4096B         │
//!          └─────────┴──────────┴─────────────┴─────────────────┘
//! Response ┌────────┬───────┬──────────┬──────────┬──────────┬──────────┐
//!          │ STATUS │ ERROR │ SEQUENCE │ RESERVED │ DATA_LEN │ DATA     │
//!          │ 1B     │ 1B    │ 1B       │ 1B       │ 4B       │ 0–4096B  │
//!          └────────┴───────┴──────────┴──────────┴──────────┴──────────┘
//! ```
//!
//! A side-band READY line, driven by the slave, tells the master that a
//! captured image is waiting to be fetched.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod command;
pub mod constants;
pub mod crc;
pub mod error;
pub mod payload;
pub mod response;

pub use command::{Command, CommandPacket};
pub use constants::*;
pub use crc::crc16;
pub use error::ProtocolError;
pub use payload::{ConfigInfo, GetImageReq, ImageFormat, ImageInfo, Resolution};
pub use response::{ErrorCode, ResponseHeader, Status};
