//! Configuration types
//!
//! Board-agnostic structures; the host harness loads them from TOML.

pub mod hardware;
pub mod types;

pub use hardware::*;
pub use types::*;
