//! Board pin assignments
//!
//! GPIO numbers for each side of the link. They are deployment data, not
//! part of the protocol.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::types::ConfigError;

/// SPI bus and READY line pins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PinConfig {
    pub mosi: u8,
    pub miso: u8,
    pub sclk: u8,
    pub cs: u8,
    /// READY line (output on the slave, input on the master)
    pub ready: u8,
    /// Status LED (slave only)
    #[cfg_attr(feature = "serde", serde(default))]
    pub led: Option<u8>,
}

impl PinConfig {
    /// Main controller side
    pub const fn master_default() -> Self {
        Self {
            mosi: 24,
            miso: 28,
            sclk: 29,
            cs: 30,
            ready: 33,
            led: None,
        }
    }

    /// Camera sub-module side
    pub const fn slave_default() -> Self {
        Self {
            mosi: 3,
            miso: 4,
            sclk: 5,
            cs: 6,
            ready: 7,
            led: Some(21),
        }
    }

    /// Check that no GPIO is assigned twice
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut pins = [self.mosi, self.miso, self.sclk, self.cs, self.ready, 0];
        let count = match self.led {
            Some(led) => {
                pins[5] = led;
                6
            }
            None => 5,
        };
        let pins = &pins[..count];
        for (i, pin) in pins.iter().enumerate() {
            if pins[i + 1..].contains(pin) {
                return Err(ConfigError::PinConflict(*pin));
            }
        }
        Ok(())
    }
}
