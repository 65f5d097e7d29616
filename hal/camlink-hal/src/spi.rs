//! SPI bus abstractions
//!
//! Each side of the link needs exactly one primitive: a blocking,
//! full-duplex transaction. The master initiates it; the slave blocks
//! until the master clocks one.

/// SPI bus master
pub trait SpiMaster {
    /// Error type for SPI operations
    type Error;

    /// Run one full-duplex transaction
    ///
    /// Clocks out `write` while filling `read`. Both buffers must be the
    /// same length; chip select is asserted for the whole transaction.
    /// A transaction that outlasts [`SpiConfig::timeout_ms`] fails.
    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error>;
}

/// SPI bus slave
pub trait SpiSlave {
    /// Error type for SPI operations
    type Error;

    /// Wait for the master to clock one transaction
    ///
    /// `write` is presented on MISO while the master's bytes are stored in
    /// `read`. Blocks without a timeout. Returns the number of bytes the
    /// master actually clocked, which may be shorter than either buffer.
    fn transaction(&mut self, read: &mut [u8], write: &[u8]) -> Result<usize, Self::Error>;
}

impl<T: SpiMaster + ?Sized> SpiMaster for &mut T {
    type Error = T::Error;

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
        (**self).transfer(read, write)
    }
}

impl<T: SpiSlave + ?Sized> SpiSlave for &mut T {
    type Error = T::Error;

    fn transaction(&mut self, read: &mut [u8], write: &[u8]) -> Result<usize, Self::Error> {
        (**self).transaction(read, write)
    }
}

/// SPI link configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpiConfig {
    /// Clock frequency in Hz
    pub frequency: u32,
    /// Clock polarity and phase
    pub mode: Mode,
    /// Driver timeout for one transaction, in milliseconds
    pub timeout_ms: u32,
}

impl Default for SpiConfig {
    fn default() -> Self {
        Self {
            frequency: 10_000_000, // 10 MHz
            mode: Mode::Mode0,
            timeout_ms: 1000,
        }
    }
}

/// SPI clock polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    /// Clock idles low (CPOL=0)
    IdleLow,
    /// Clock idles high (CPOL=1)
    IdleHigh,
}

/// SPI clock phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Data captured on first clock transition (CPHA=0)
    CaptureOnFirstTransition,
    /// Data captured on second clock transition (CPHA=1)
    CaptureOnSecondTransition,
}

/// SPI mode (combined polarity and phase)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Mode 0: CPOL=0, CPHA=0
    #[default]
    Mode0,
    /// Mode 1: CPOL=0, CPHA=1
    Mode1,
    /// Mode 2: CPOL=1, CPHA=0
    Mode2,
    /// Mode 3: CPOL=1, CPHA=1
    Mode3,
}

impl Mode {
    /// Build a mode from its conventional number (0-3)
    pub const fn from_number(n: u8) -> Option<Self> {
        match n {
            0 => Some(Mode::Mode0),
            1 => Some(Mode::Mode1),
            2 => Some(Mode::Mode2),
            3 => Some(Mode::Mode3),
            _ => None,
        }
    }

    /// Conventional mode number (0-3)
    pub const fn number(self) -> u8 {
        match self {
            Mode::Mode0 => 0,
            Mode::Mode1 => 1,
            Mode::Mode2 => 2,
            Mode::Mode3 => 3,
        }
    }
}

impl From<Mode> for (Polarity, Phase) {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Mode0 => (Polarity::IdleLow, Phase::CaptureOnFirstTransition),
            Mode::Mode1 => (Polarity::IdleLow, Phase::CaptureOnSecondTransition),
            Mode::Mode2 => (Polarity::IdleHigh, Phase::CaptureOnFirstTransition),
            Mode::Mode3 => (Polarity::IdleHigh, Phase::CaptureOnSecondTransition),
        }
    }
}
