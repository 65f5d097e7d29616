use std::io;
use std::path::PathBuf;

use camlink_core::config::ConfigError;
use camlink_core::ClientError;
use thiserror::Error;

/// Errors raised by the in-memory SPI bus
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusError {
    #[error("injected bus fault")]
    Injected,

    #[error("slave state lock poisoned")]
    Poisoned,

    #[error("transaction timed out")]
    Timeout,
}

/// The primary error type for the simulation harness.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("failed to read {}: {source}", path.display())]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid configuration: {0:?}")]
    Config(ConfigError),

    #[error("camera link error: {0:?}")]
    Client(ClientError<BusError>),

    #[error("camera module did not initialize")]
    CameraInit,
}

impl From<ConfigError> for SimError {
    fn from(e: ConfigError) -> Self {
        SimError::Config(e)
    }
}

impl From<ClientError<BusError>> for SimError {
    fn from(e: ClientError<BusError>) -> Self {
        SimError::Client(e)
    }
}
