//! Master side: protocol client for the camera sub-module

pub mod client;
pub mod error;

pub use client::CameraClient;
pub use error::ClientError;
