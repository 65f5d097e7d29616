//! Simulation configuration
//!
//! Loaded from TOML. Every section is optional and falls back to the
//! firmware defaults.
//!
//! ```toml
//! [link]
//! chunk_size = 4096
//! verify_checksum = true
//!
//! [camera]
//! resolution = "VGA"
//! quality = 70
//!
//! [sensor]
//! seed = 1234
//!
//! [pins.slave]
//! mosi = 3
//! miso = 4
//! sclk = 5
//! cs = 6
//! ready = 7
//! led = 21
//! ```

use std::fs;
use std::path::Path;

use camlink_core::config::{CameraConfig, LinkConfig, PinConfig};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::SimError;
use crate::sensor::SensorConfig;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub link: LinkConfig,
    pub camera: CameraConfig,
    pub sensor: SensorConfig,
    pub pins: PinsConfig,
}

/// GPIO assignments of the boards being modelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PinsConfig {
    pub master: PinConfig,
    pub slave: PinConfig,
}

impl Default for PinsConfig {
    fn default() -> Self {
        Self {
            master: PinConfig::master_default(),
            slave: PinConfig::slave_default(),
        }
    }
}

impl SimConfig {
    /// Parse and validate a TOML document
    pub fn from_toml(text: &str) -> Result<Self, SimError> {
        let config: SimConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file, or use defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self, SimError> {
        let Some(path) = path else {
            debug!("No config file, using defaults");
            return Ok(Self::default());
        };

        let text = fs::read_to_string(path).map_err(|source| SimError::ReadConfig {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&text)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        self.link.validate()?;
        self.camera.validate()?;
        self.pins.master.validate()?;
        self.pins.slave.validate()?;
        Ok(())
    }
}
