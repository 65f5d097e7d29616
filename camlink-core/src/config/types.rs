//! Link and camera configuration
//!
//! Defaults match the shipped firmware: 10 MHz, SPI mode 0, 4096-byte
//! chunks, VGA at internal quality 20.

use camlink_hal::spi::{Mode, SpiConfig};
use camlink_protocol::{Resolution, CHUNK_SIZE, TIMEOUT_CAPTURE_MS, TIMEOUT_COMMAND_MS};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::capture::{quality_to_internal, CameraSettings};

/// Highest SPI clock the link is rated for
pub const MAX_SPI_FREQUENCY: u32 = 40_000_000;

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// SPI clock is zero or above the rated maximum
    InvalidFrequency,
    /// SPI mode is not 0-3
    InvalidSpiMode,
    /// Chunk size is zero or above the transaction buffer
    InvalidChunkSize,
    /// Timeout is zero
    InvalidTimeout,
    /// Quality outside 1-100
    InvalidQuality,
    /// Brightness or contrast outside -2..=2
    InvalidLevel,
    /// Two signals assigned to the same GPIO
    PinConflict(u8),
}

/// SPI link configuration (master side)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LinkConfig {
    /// SPI clock in Hz
    pub spi_frequency: u32,
    /// SPI mode number (0-3)
    pub spi_mode: u8,
    /// Bytes requested per GET_IMAGE_DATA
    pub chunk_size: u16,
    /// How long `capture_and_get` waits for READY
    pub capture_timeout_ms: u32,
    /// Budget for a single command transaction, applied by the SPI driver
    pub command_timeout_ms: u32,
    /// Check the reassembled image against the slave's CRC
    pub verify_checksum: bool,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            spi_frequency: 10_000_000,
            spi_mode: 0,
            chunk_size: CHUNK_SIZE as u16,
            capture_timeout_ms: TIMEOUT_CAPTURE_MS,
            command_timeout_ms: TIMEOUT_COMMAND_MS,
            verify_checksum: true,
        }
    }
}

impl LinkConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.spi_frequency == 0 || self.spi_frequency > MAX_SPI_FREQUENCY {
            return Err(ConfigError::InvalidFrequency);
        }
        if Mode::from_number(self.spi_mode).is_none() {
            return Err(ConfigError::InvalidSpiMode);
        }
        if self.chunk_size == 0 || self.chunk_size as usize > CHUNK_SIZE {
            return Err(ConfigError::InvalidChunkSize);
        }
        if self.capture_timeout_ms == 0 || self.command_timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        Ok(())
    }

    /// Bus settings for the SPI driver
    pub fn spi_config(&self) -> Result<SpiConfig, ConfigError> {
        let mode = Mode::from_number(self.spi_mode).ok_or(ConfigError::InvalidSpiMode)?;
        Ok(SpiConfig {
            frequency: self.spi_frequency,
            mode,
            timeout_ms: self.command_timeout_ms,
        })
    }
}

/// Camera settings applied at slave startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CameraConfig {
    pub resolution: Resolution,
    /// External quality (1-100, higher is better)
    pub quality: u8,
    pub brightness: i8,
    pub contrast: i8,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            resolution: Resolution::Vga,
            // Maps to internal quality 20
            quality: 70,
            brightness: 0,
            contrast: 0,
        }
    }
}

impl CameraConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.quality) {
            return Err(ConfigError::InvalidQuality);
        }
        if !(-2..=2).contains(&self.brightness) || !(-2..=2).contains(&self.contrast) {
            return Err(ConfigError::InvalidLevel);
        }
        Ok(())
    }

    /// Settings for the capture manager
    pub fn settings(&self) -> Result<CameraSettings, ConfigError> {
        self.validate()?;
        Ok(CameraSettings {
            resolution: self.resolution,
            quality: quality_to_internal(self.quality),
            brightness: self.brightness,
            contrast: self.contrast,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_defaults() {
        let config = LinkConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.chunk_size, 4096);
        assert_eq!(config.capture_timeout_ms, 5000);
        assert!(config.verify_checksum);

        let spi = config.spi_config().unwrap();
        assert_eq!(spi.frequency, 10_000_000);
        assert_eq!(spi.mode, Mode::Mode0);
        assert_eq!(spi.timeout_ms, 1000);
    }

    #[test]
    fn test_command_timeout_reaches_driver_config() {
        let config = LinkConfig {
            command_timeout_ms: 250,
            ..Default::default()
        };
        assert_eq!(config.spi_config().unwrap().timeout_ms, 250);

        let config = LinkConfig {
            command_timeout_ms: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidTimeout));
    }

    #[test]
    fn test_link_validation() {
        let mut config = LinkConfig::default();
        config.spi_mode = 4;
        assert_eq!(config.validate(), Err(ConfigError::InvalidSpiMode));
        assert_eq!(config.spi_config().err(), Some(ConfigError::InvalidSpiMode));

        let mut config = LinkConfig::default();
        config.chunk_size = 4097;
        assert_eq!(config.validate(), Err(ConfigError::InvalidChunkSize));

        let mut config = LinkConfig::default();
        config.spi_frequency = 0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidFrequency));

        let mut config = LinkConfig::default();
        config.capture_timeout_ms = 0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidTimeout));
    }

    #[test]
    fn test_camera_default_matches_firmware() {
        let settings = CameraConfig::default().settings().unwrap();
        assert_eq!(settings, CameraSettings::default());
    }

    #[test]
    fn test_camera_validation() {
        let config = CameraConfig {
            quality: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidQuality));

        let config = CameraConfig {
            contrast: 3,
            ..Default::default()
        };
        assert_eq!(config.settings(), Err(ConfigError::InvalidLevel));
    }
}
